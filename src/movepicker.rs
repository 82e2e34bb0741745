/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use arrayvec::ArrayVec;

use crate::{tune, HistoryTable, KillerTable, Move, MoveList, PieceKind, Position, MAX_NUM_MOVES};

/// This table represents values for [MVV-LVA](https://www.chessprogramming.org/MVV-LVA) move ordering.
///
/// It is indexed by `[attacker][victim]`, and yields `10 * victim - attacker` using each kind's material value:
/// ```text
///                     VICTIM
/// A       P     N     B     R     Q     K
/// T    +-----------------------------------
/// T   P| 900   3100  3200  4900  8900  0
/// A   N| 680   2880  2980  4680  8680  0
/// C   B| 670   2870  2970  4670  8670  0
/// K   R| 500   2700  2800  4500  8500  0
/// E   Q| 100   2300  2400  4100  8100  0
/// R   K| 1000  3200  3300  5000  9000  0
/// ```
///
/// Kings are never captured, so that column is zero.
pub const MVV_LVA: [[i32; PieceKind::COUNT]; PieceKind::COUNT] = {
    let kinds = PieceKind::all();
    let mut matrix = [[0; PieceKind::COUNT]; PieceKind::COUNT];

    let mut attacker = 0;
    while attacker < PieceKind::COUNT {
        let mut victim = 0;
        while victim < PieceKind::COUNT - 1 {
            matrix[attacker][victim] = 10 * kinds[victim].value() - kinds[attacker].value();
            victim += 1;
        }
        attacker += 1;
    }
    matrix
};

/// Scores a single move for ordering. Higher scores are searched first.
///
/// In order: the transposition table's move, captures by MVV-LVA, promotions, killers, then history.
pub fn score_move(
    position: &Position,
    mv: Move,
    tt_move: Option<Move>,
    killers: &KillerTable,
    history: &HistoryTable,
    ply: u8,
) -> i32 {
    if tt_move == Some(mv) {
        return i32::MAX;
    }

    // A move always has a piece on its starting square
    let Some(attacker) = position.piece_at(mv.from()).map(|p| p.kind()) else {
        return i32::MIN;
    };

    let mut score = 0;

    if mv.is_capture() {
        let victim = if mv.is_en_passant() {
            PieceKind::Pawn
        } else {
            position
                .piece_at(mv.to())
                .map_or(PieceKind::Pawn, |p| p.kind())
        };
        score += tune::capture_bonus!() + MVV_LVA[attacker][victim];
    }

    if let Some(promotion) = mv.promotion() {
        score += tune::promotion_bonus!() + promotion.value();
    }

    if mv.is_quiet() {
        if killers.contains(ply, mv) {
            score += tune::killer_bonus!();
        } else {
            score += history.get(attacker, mv.to());
        }
    }

    score
}

/// Hands out moves in order of their score, best first.
///
/// Uses a lazy selection sort, since a cutoff often happens long before every move is looked at.
pub struct MovePicker {
    moves: MoveList,
    scores: ArrayVec<i32, MAX_NUM_MOVES>,
    current: usize,
}

impl MovePicker {
    /// Scores every move in `moves` with `score_fn`.
    pub fn new(moves: MoveList, score_fn: impl Fn(Move) -> i32) -> Self {
        let scores = moves.iter().map(|&mv| score_fn(mv)).collect();

        Self {
            moves,
            scores,
            current: 0,
        }
    }

    /// Number of moves handed out so far.
    #[inline(always)]
    pub fn moves_so_far(&self) -> usize {
        self.current
    }
}

impl Iterator for MovePicker {
    type Item = (Move, i32);

    fn next(&mut self) -> Option<Self::Item> {
        // No more moves left
        if self.current >= self.moves.len() {
            return None;
        }

        // Fetch the current best
        let mut best_index = self.current;
        let mut best_score = self.scores[best_index];

        // Find the index of the next highest score
        for i in (self.current + 1)..self.moves.len() {
            if self.scores[i] > best_score {
                best_index = i;
                best_score = self.scores[i];
            }
        }

        // Swap, if necessary
        if best_index != self.current {
            self.moves.swap(self.current, best_index);
            self.scores.swap(self.current, best_index);
        }

        let mv = self.moves[self.current];
        let score = self.scores[self.current];

        // Increment for next call
        self.current += 1;

        Some((mv, score))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Square, FEN_KIWIPETE};

    #[test]
    fn test_mvv_lva() {
        assert_eq!(MVV_LVA[PieceKind::Pawn][PieceKind::Queen], 8900);
        assert_eq!(MVV_LVA[PieceKind::Queen][PieceKind::Pawn], 100);
        assert_eq!(MVV_LVA[PieceKind::Knight][PieceKind::King], 0);
    }

    #[test]
    fn test_picker_order() {
        let mut pos = Position::from_fen(FEN_KIWIPETE).unwrap();
        let moves = pos.legal_moves(pos.side_to_move());

        let tt_move = Move::from_uci(&pos, "b2b3").ok();
        let quiet = Move::from_uci(&pos, "a2a3").unwrap();
        let history_move = Move::from_uci(&pos, "a1b1").unwrap();

        let mut killers = KillerTable::default();
        killers.store(0, quiet);
        let mut history = HistoryTable::default();
        history.update(PieceKind::Rook, Square::B1, 5, i32::MAX);

        let picker = MovePicker::new(moves, |mv| {
            score_move(&pos, mv, tt_move, &killers, &history, 0)
        });
        let order: Vec<Move> = picker.map(|(mv, _)| mv).collect();

        // Hash move comes first
        assert_eq!(order[0], "b2b3");

        // MVV-LVA captures: BxB, QxN, then both PxP
        assert_eq!(order[1], "e2a6");
        assert_eq!(order[2], "f3f6");
        assert!(order[3..5].contains(&Move::from_uci(&pos, "g2h3").unwrap()));
        assert!(order[3..5].contains(&Move::from_uci(&pos, "d5e6").unwrap()));

        // All captures precede the killer, which precedes history moves
        let killer_index = order.iter().position(|&mv| mv == quiet).unwrap();
        let history_index = order.iter().position(|&mv| mv == history_move).unwrap();
        assert!(order[..killer_index].iter().skip(1).all(|mv| mv.is_capture()));
        assert_eq!(history_index, killer_index + 1);
        assert!(order[killer_index + 1..].iter().all(|mv| !mv.is_capture()));
    }
}
