/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use super::{
    geometry::{BISHOP_DELTAS, KNIGHT_DELTAS, QUEEN_DELTAS, ROOK_DELTAS},
    CastlingRights, Color, File, GameStatus, Piece, PieceKind, Position, Rank, Square,
};

impl Position {
    /// Returns `true` if any piece of color `by` attacks `square`.
    ///
    /// Attacks are counted regardless of pins or of what stands on `square`.
    ///
    /// # Example
    /// ```
    /// # use tadpole::*;
    /// let pos = Position::default();
    /// assert!(pos.is_square_attacked(Square::F3, Color::White));
    /// assert!(!pos.is_square_attacked(Square::E4, Color::White));
    /// assert!(pos.is_square_attacked(Square::D6, Color::Black));
    /// ```
    pub fn is_square_attacked(&self, square: Square, by: Color) -> bool {
        let holds = |sq: Option<Square>, kind: PieceKind| {
            sq.and_then(|sq| self.piece_at(sq)) == Some(Piece::new(by, kind))
        };

        // A pawn of `by` attacks diagonally forward, so look one rank behind `square`
        let behind = -by.forward();
        if holds(square.offset(-1, behind), PieceKind::Pawn)
            || holds(square.offset(1, behind), PieceKind::Pawn)
        {
            return true;
        }

        if KNIGHT_DELTAS
            .iter()
            .any(|&(df, dr)| holds(square.offset(df, dr), PieceKind::Knight))
        {
            return true;
        }

        if QUEEN_DELTAS
            .iter()
            .any(|&(df, dr)| holds(square.offset(df, dr), PieceKind::King))
        {
            return true;
        }

        self.slider_attacks(square, by, &ROOK_DELTAS, PieceKind::Rook)
            || self.slider_attacks(square, by, &BISHOP_DELTAS, PieceKind::Bishop)
    }

    /// Returns `true` if `color`'s King is attacked.
    #[inline(always)]
    pub fn is_in_check(&self, color: Color) -> bool {
        self.is_square_attacked(self.king_square(color), color.opponent())
    }

    /// Returns `true` if `color` may castle right now, toward the `h` file if `kingside`, else toward the `a` file.
    ///
    /// Requires the right to still be held, the King and Rook on their starting squares, every square between
    /// them empty, and none of the squares the King starts on, passes over, or lands on to be attacked.
    ///
    /// # Example
    /// ```
    /// # use tadpole::*;
    /// let pos = Position::from_fen(FEN_KIWIPETE).unwrap();
    /// assert!(pos.can_castle(Color::White, true));
    /// assert!(pos.can_castle(Color::White, false));
    /// assert!(!Position::default().can_castle(Color::White, true));
    /// ```
    pub fn can_castle(&self, color: Color, kingside: bool) -> bool {
        let right = if kingside {
            CastlingRights::short(color)
        } else {
            CastlingRights::long(color)
        };
        if !self.castling_rights().contains(right) {
            return false;
        }

        let rank = Rank::first(color);
        let at = |file: File| Square::new(file, rank);

        let (rook_file, empty, king_path): (File, &[File], [File; 3]) = if kingside {
            (File::H, &[File::F, File::G][..], [File::E, File::F, File::G])
        } else {
            (File::A, &[File::B, File::C, File::D][..], [File::E, File::D, File::C])
        };

        if self.piece_at(at(File::E)) != Some(Piece::new(color, PieceKind::King))
            || self.piece_at(at(rook_file)) != Some(Piece::new(color, PieceKind::Rook))
        {
            return false;
        }

        if empty.iter().any(|&file| self.piece_at(at(file)).is_some()) {
            return false;
        }

        !king_path
            .iter()
            .any(|&file| self.is_square_attacked(at(file), color.opponent()))
    }

    /// Returns `true` if moving the piece on `from` to `to` is an en passant capture.
    ///
    /// The en passant target must be `to`, the mover must be a Pawn stepping one square diagonally forward,
    /// and the square beside `from` on `to`'s file must hold an enemy Pawn.
    ///
    /// # Example
    /// ```
    /// # use tadpole::*;
    /// let pos = Position::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2").unwrap();
    /// assert!(pos.is_en_passant(Square::E5, Square::D6));
    /// assert!(!pos.is_en_passant(Square::E5, Square::F6));
    /// ```
    pub fn is_en_passant(&self, from: Square, to: Square) -> bool {
        if self.ep_square() != Some(to) {
            return false;
        }
        let Some(piece) = self.piece_at(from) else {
            return false;
        };
        if !piece.is_pawn() {
            return false;
        }

        let color = piece.color();
        let file_delta = to.file().index().abs_diff(from.file().index());
        if file_delta != 1 || from.forward_by(color, 1).map(|sq| sq.rank()) != Some(to.rank()) {
            return false;
        }

        let passed = Square::new(to.file(), from.rank());
        self.piece_at(passed) == Some(Piece::new(color.opponent(), PieceKind::Pawn))
    }

    /// Returns `true` if `color` is in check and has no legal moves.
    pub fn is_checkmate(&mut self, color: Color) -> bool {
        self.is_in_check(color) && !self.has_any_legal_move(color)
    }

    /// Returns `true` if `color` is not in check but has no legal moves.
    pub fn is_stalemate(&mut self, color: Color) -> bool {
        !self.is_in_check(color) && !self.has_any_legal_move(color)
    }

    /// Whether the game has ended for the side to move.
    ///
    /// # Example
    /// ```
    /// # use tadpole::*;
    /// let mut pos = Position::from_fen("k7/2Q5/1K6/8/8/8/8/8 b - - 0 1").unwrap();
    /// assert_eq!(pos.status(), GameStatus::Stalemate);
    /// ```
    pub fn status(&mut self) -> GameStatus {
        let color = self.side_to_move();
        if self.has_any_legal_move(color) {
            GameStatus::Ongoing
        } else if self.is_in_check(color) {
            GameStatus::Checkmate {
                winner: color.opponent(),
            }
        } else {
            GameStatus::Stalemate
        }
    }

    /// Casts rays from `square` along `deltas`, looking for a Queen or a `kind` belonging to `by`.
    fn slider_attacks(
        &self,
        square: Square,
        by: Color,
        deltas: &[(i8, i8)],
        kind: PieceKind,
    ) -> bool {
        for &(df, dr) in deltas {
            let mut current = square;
            while let Some(next) = current.offset(df, dr) {
                if let Some(piece) = self.piece_at(next) {
                    if piece.color() == by && (piece.kind() == kind || piece.kind() == PieceKind::Queen) {
                        return true;
                    }
                    break;
                }
                current = next;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Move;

    fn play(pos: &mut Position, moves: &[&str]) {
        for mv in moves {
            let mv = Move::from_uci(pos, mv).unwrap();
            pos.apply(mv);
        }
    }

    #[test]
    fn test_slider_attacks_are_blocked() {
        let pos = Position::from_fen("4k3/8/8/8/1b6/8/3P4/R3K3 w - - 0 1").unwrap();
        assert!(pos.is_square_attacked(Square::A8, Color::White));
        assert!(pos.is_square_attacked(Square::D1, Color::White));
        assert!(!pos.is_square_attacked(Square::E1, Color::Black), "d2 blocks the bishop");
        assert!(pos.is_square_attacked(Square::D2, Color::Black));
        assert!(!pos.is_in_check(Color::White));
    }

    #[test]
    fn test_pawn_attacks_point_forward() {
        let pos = Position::from_fen("4k3/8/8/3p4/8/8/3P4/4K3 w - - 0 1").unwrap();
        assert!(pos.is_square_attacked(Square::C4, Color::Black));
        assert!(pos.is_square_attacked(Square::E4, Color::Black));
        assert!(!pos.is_square_attacked(Square::D4, Color::Black));
        assert!(!pos.is_square_attacked(Square::C6, Color::Black));
        assert!(pos.is_square_attacked(Square::C3, Color::White));
        assert!(!pos.is_square_attacked(Square::C1, Color::White));
    }

    #[test]
    fn test_fools_mate() {
        let mut pos = Position::default();
        play(&mut pos, &["f2f3", "e7e5", "g2g4", "d8h4"]);

        assert!(pos.is_in_check(Color::White));
        assert!(pos.is_checkmate(Color::White));
        assert!(!pos.is_stalemate(Color::White));
        assert!(pos.legal_moves(Color::White).is_empty());
        assert_eq!(
            pos.status(),
            GameStatus::Checkmate {
                winner: Color::Black
            }
        );
    }

    #[test]
    fn test_stalemate() {
        let mut pos = Position::from_fen("k7/2Q5/1K6/8/8/8/8/8 b - - 0 1").unwrap();
        assert!(!pos.is_in_check(Color::Black));
        assert!(pos.is_stalemate(Color::Black));
        assert!(!pos.is_checkmate(Color::Black));
        assert!(pos.legal_moves(Color::Black).is_empty());
    }

    #[test]
    fn test_status_ongoing() {
        let mut pos = Position::default();
        assert_eq!(pos.status(), GameStatus::Ongoing);
    }

    #[test]
    fn test_cannot_castle_through_attacked_squares() {
        // The f8 Rook covers f1
        let pos = Position::from_fen("5rk1/8/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
        assert!(!pos.can_castle(Color::White, true));
        assert!(pos.can_castle(Color::White, false));

        // b1 may be attacked, since the King never crosses it
        let pos = Position::from_fen("1r4k1/8/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
        assert!(pos.can_castle(Color::White, false));

        // Not while in check
        let pos = Position::from_fen("4r1k1/8/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
        assert!(!pos.can_castle(Color::White, true));
        assert!(!pos.can_castle(Color::White, false));
    }

    #[test]
    fn test_cannot_castle_through_pieces() {
        let pos = Position::from_fen("4k3/8/8/8/8/8/8/RN2K1NR w KQ - 0 1").unwrap();
        assert!(!pos.can_castle(Color::White, true));
        assert!(!pos.can_castle(Color::White, false));
    }

    #[test]
    fn test_en_passant_only_immediately() {
        let mut pos = Position::from_fen("4k3/3p4/8/4P3/8/8/8/4K3 b - - 0 1").unwrap();
        play(&mut pos, &["d7d5"]);
        assert!(pos.is_en_passant(Square::E5, Square::D6));

        play(&mut pos, &["e1d1", "e8d8"]);
        assert!(!pos.is_en_passant(Square::E5, Square::D6));
    }
}
