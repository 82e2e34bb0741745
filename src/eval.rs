/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use crate::{Color, File, Piece, PieceKind, Position, Psqt, Rank, Score, Square};

/// Combined count of Queens and Rooks at or below which the King uses its endgame table.
const ENDGAME_HEAVY_PIECES: usize = 4;

/// Penalty/bonus for a King being in check.
const CHECK_PENALTY: i32 = 100;

/// Penalty for each file holding more than one friendly Pawn.
const DOUBLED_PAWN_PENALTY: i32 = 20;

/// Penalty for each file holding Pawns with no friendly Pawn on either neighboring file.
const ISOLATED_PAWN_PENALTY: i32 = 15;

/// Bonus for holding both Bishops.
const BISHOP_PAIR_BONUS: i32 = 20;

/// Bonus for each Pawn standing in the center.
const CENTER_PAWN_BONUS: i32 = 10;

const CENTER: [Square; 4] = [Square::D4, Square::E4, Square::D5, Square::E5];

/// How much each term of the evaluation counts, as a percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalWeights {
    pub material: i32,
    pub position: i32,
    pub mobility: i32,
    pub king_safety: i32,
    pub pawn_structure: i32,
    pub other: i32,
}

impl Default for EvalWeights {
    fn default() -> Self {
        Self {
            material: 100,
            position: 15,
            mobility: 8,
            king_safety: 30,
            pawn_structure: 5,
            other: 5,
        }
    }
}

/// Every term of an evaluation, unweighted and White-relative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvalBreakdown {
    pub material: i32,
    pub position: i32,
    pub mobility: i32,
    pub king_safety: i32,
    pub pawn_structure: i32,
    pub other: i32,
}

impl EvalBreakdown {
    /// Sums every term scaled by its weight.
    pub fn total(&self, weights: &EvalWeights) -> Score {
        let sum = self.material * weights.material
            + self.position * weights.position
            + self.mobility * weights.mobility
            + self.king_safety * weights.king_safety
            + self.pawn_structure * weights.pawn_structure
            + self.other * weights.other;

        Score(sum / 100)
    }
}

/// Encapsulates the logic of scoring a chess position.
///
/// A high score is good for White, and a low score is good for Black, regardless of whose turn it is.
/// Every term is computed identically for both colors, so mirroring a position negates its score.
#[derive(Debug, Clone)]
pub struct Evaluator<'a> {
    /// The position to evaluate.
    position: &'a Position,

    weights: EvalWeights,

    /// Whether the King reads its endgame table.
    pub(crate) endgame: bool,
}

impl<'a> Evaluator<'a> {
    /// Construct a new [`Evaluator`] with the default weights.
    #[inline(always)]
    pub fn new(position: &'a Position) -> Self {
        Self::with_weights(position, EvalWeights::default())
    }

    /// Construct a new [`Evaluator`] with custom weights.
    pub fn with_weights(position: &'a Position, weights: EvalWeights) -> Self {
        let board = position.board();
        let heavy = Color::all()
            .into_iter()
            .map(|color| {
                board.count(Piece::new(color, PieceKind::Queen))
                    + board.count(Piece::new(color, PieceKind::Rook))
            })
            .sum::<usize>();

        Self {
            position,
            weights,
            endgame: heavy <= ENDGAME_HEAVY_PIECES,
        }
    }

    /// Evaluate this position, White-relative.
    ///
    /// # Example
    /// ```
    /// # use tadpole::*;
    /// let pos = Position::default();
    /// assert_eq!(Evaluator::new(&pos).eval(), Score::DRAW);
    ///
    /// // Black is missing its Queen
    /// let pos = Position::from_fen("rnb1kbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1").unwrap();
    /// assert!(Evaluator::new(&pos).eval() > Score(800));
    /// ```
    #[inline(always)]
    pub fn eval(&self) -> Score {
        self.breakdown().total(&self.weights)
    }

    /// Computes every term of the evaluation without weighting them.
    pub fn breakdown(&self) -> EvalBreakdown {
        let board = self.position.board();
        let mut terms = EvalBreakdown::default();

        for (square, piece) in board.iter() {
            let sign = piece.color().negation_multiplier();
            terms.material += sign * piece.kind().value();
            terms.position += sign * Psqt::eval(piece, square, self.endgame);
        }

        // Pseudo-legal, so pinned pieces still count toward mobility
        terms.mobility = self.position.pseudo_legal_moves(Color::White).len() as i32
            - self.position.pseudo_legal_moves(Color::Black).len() as i32;

        for color in Color::all() {
            let sign = color.negation_multiplier();

            if self.position.is_in_check(color) {
                terms.king_safety -= sign * CHECK_PENALTY;
            }

            terms.pawn_structure += sign * self.pawn_structure(color);
            terms.other += sign * self.other(color);
        }

        terms
    }

    /// Penalties for `color`'s doubled and isolated Pawns.
    fn pawn_structure(&self, color: Color) -> i32 {
        let pawn = Piece::new(color, PieceKind::Pawn);
        let mut files = [0; File::COUNT];
        for (square, _) in self.position.board().iter().filter(|&(_, p)| p == pawn) {
            files[square.file().index()] += 1;
        }

        let mut penalty = 0;
        for (i, &count) in files.iter().enumerate() {
            if count > 1 {
                penalty -= DOUBLED_PAWN_PENALTY;
            }

            let left = i.checked_sub(1).map_or(0, |j| files[j]);
            let right = files.get(i + 1).copied().unwrap_or(0);
            if count > 0 && left == 0 && right == 0 {
                penalty -= ISOLATED_PAWN_PENALTY;
            }
        }

        penalty
    }

    /// Small bonuses for the Bishop pair and central Pawns.
    fn other(&self, color: Color) -> i32 {
        let board = self.position.board();
        let mut bonus = 0;

        if board.count(Piece::new(color, PieceKind::Bishop)) >= 2 {
            bonus += BISHOP_PAIR_BONUS;
        }

        let pawn = Piece::new(color, PieceKind::Pawn);
        bonus += CENTER
            .iter()
            .filter(|&&sq| board.piece_at(sq) == Some(pawn))
            .count() as i32
            * CENTER_PAWN_BONUS;

        bonus
    }

    /// Material plus table value of the piece on the specified square, if one exists.
    ///
    /// Only used when printing the evaluator
    #[inline(always)]
    fn value_at(&self, square: Square) -> Option<i32> {
        self.position.piece_at(square).map(|piece| {
            let value = piece.kind().value() + Psqt::eval(piece, square, self.endgame);
            value * piece.color().negation_multiplier()
        })
    }
}

impl fmt::Display for Evaluator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  +")?;
        for _ in File::iter() {
            write!(f, "-----+")?;
        }
        writeln!(f)?;

        for rank in Rank::iter().rev() {
            write!(f, "{rank} |")?;

            // Step 1: Write the piece char
            for file in File::iter() {
                let piece = self.position.piece_at(Square::new(file, rank));
                let piece_char = piece.map(|p| p.to_uci()).unwrap_or(' ');
                write!(f, "  {piece_char}  |")?;
            }
            writeln!(f)?;
            write!(f, "  |")?;

            // Step 2: Write the contribution of that piece
            for file in File::iter() {
                let value = match self.value_at(Square::new(file, rank)) {
                    Some(val) if val > 0 => format!("+{val}"),
                    Some(val) => format!("{val}"),
                    None => String::new(),
                };
                write!(f, "{value:^5}|")?;
            }
            writeln!(f)?;

            write!(f, "  +")?;
            for _ in File::iter() {
                write!(f, "-----+")?;
            }
            writeln!(f)?;
        }
        for file in File::iter() {
            write!(f, "     {file}")?;
        }

        let terms = self.breakdown();
        let w = &self.weights;
        writeln!(f, "\n")?;
        writeln!(f, "{:<15}{:>8}{:>8}", "Term", "Raw", "Weight")?;
        for (name, raw, weight) in [
            ("Material", terms.material, w.material),
            ("Position", terms.position, w.position),
            ("Mobility", terms.mobility, w.mobility),
            ("King safety", terms.king_safety, w.king_safety),
            ("Pawn structure", terms.pawn_structure, w.pawn_structure),
            ("Other", terms.other, w.other),
        ] {
            writeln!(f, "{name:<15}{raw:>8}{:>7}%", weight)?;
        }

        let score = terms.total(w);
        let winning_side = if score > Score::DRAW {
            Some(Color::White)
        } else if score < Score::DRAW {
            Some(Color::Black)
        } else {
            None
        };

        writeln!(f, "\nEndgame: {}", self.endgame)?;
        writeln!(
            f,
            "Winning side: {}",
            winning_side.map(|c| c.name()).unwrap_or("N/A")
        )?;
        write!(f, "Score: {score}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CastlingRights, FEN_KIWIPETE};

    /// Flips `fen` vertically and swaps the colors of every piece.
    fn mirror(fen: &str) -> String {
        let parts: Vec<&str> = fen.split_whitespace().collect();
        let swap = |c: char| {
            if c.is_ascii_uppercase() {
                c.to_ascii_lowercase()
            } else {
                c.to_ascii_uppercase()
            }
        };

        let placements = parts[0]
            .split('/')
            .rev()
            .map(|rank| rank.chars().map(swap).collect::<String>())
            .collect::<Vec<_>>()
            .join("/");
        let stm = if parts[1] == "w" { "b" } else { "w" };
        let castling: String = parts[2].chars().map(|c| if c == '-' { c } else { swap(c) }).collect();
        let castling = CastlingRights::from_uci(&castling).unwrap();
        let ep = parts[3]
            .chars()
            .map(|c| match c {
                '3' => '6',
                '6' => '3',
                c => c,
            })
            .collect::<String>();

        format!("{placements} {stm} {castling} {ep} {} {}", parts[4], parts[5])
    }

    #[test]
    fn test_startpos_is_even() {
        let pos = Position::default();
        let eval = Evaluator::new(&pos);
        assert_eq!(eval.breakdown(), EvalBreakdown::default());
        assert_eq!(eval.eval(), Score::DRAW);
    }

    #[test]
    fn test_mirrored_positions_negate() {
        for fen in [
            FEN_KIWIPETE,
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
            "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
            "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3",
            "4k3/8/8/8/8/8/3q4/R3K3 w Q - 0 1",
        ] {
            let pos = Position::from_fen(fen).unwrap();
            let mirrored = Position::from_fen(&mirror(fen)).unwrap();

            let eval = Evaluator::new(&pos).eval();
            let mirrored_eval = Evaluator::new(&mirrored).eval();
            assert_eq!(eval, -mirrored_eval, "{fen}");
        }
    }

    #[test]
    fn test_material_advantage() {
        let pos = Position::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 0 1").unwrap();
        let eval = Evaluator::new(&pos);
        assert_eq!(eval.breakdown().material, 500);
        assert!(eval.eval() > Score::DRAW);
    }

    #[test]
    fn test_pawn_structure() {
        // Doubled and isolated on the a file
        let pos = Position::from_fen("4k3/8/8/8/8/P7/P7/4K3 w - - 0 1").unwrap();
        assert_eq!(
            Evaluator::new(&pos).breakdown().pawn_structure,
            -(DOUBLED_PAWN_PENALTY + ISOLATED_PAWN_PENALTY)
        );

        // Connected and on separate files
        let pos = Position::from_fen("4k3/8/8/8/8/8/PP6/4K3 w - - 0 1").unwrap();
        assert_eq!(Evaluator::new(&pos).breakdown().pawn_structure, 0);
    }

    #[test]
    fn test_check_and_bonuses() {
        let pos = Position::from_fen("k3r3/8/8/8/3P4/8/8/2B1KB2 w - - 0 1").unwrap();
        let terms = Evaluator::new(&pos).breakdown();
        assert_eq!(terms.king_safety, -CHECK_PENALTY);
        assert_eq!(terms.other, BISHOP_PAIR_BONUS + CENTER_PAWN_BONUS);
    }

    #[test]
    fn test_endgame_king_table() {
        assert!(!Evaluator::new(&Position::default()).endgame);
        let pos = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w - - 0 1").unwrap();
        assert!(Evaluator::new(&pos).endgame);
    }
}
