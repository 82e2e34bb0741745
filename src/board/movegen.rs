/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use anyhow::{bail, Result};

use super::{Color, Move, MoveKind, MoveList, MoveRecord, PieceKind, Position, Square};

impl Position {
    /// Generates every move `color` could make if check did not matter.
    ///
    /// Each destination from [`Position::destinations`] becomes one move, or four if it is a promotion.
    /// Castling is included whenever [`Position::can_castle`] allows it.
    pub fn pseudo_legal_moves(&self, color: Color) -> MoveList {
        let mut moves = MoveList::new();

        for (from, piece) in self.board().iter_color(color) {
            for to in self.destinations(from) {
                let kind = MoveKind::new(piece, from, to, self, None);
                let mv = Move::new(from, to, kind);

                if mv.is_promotion() {
                    for promotion in PieceKind::PROMOTIONS {
                        let kind = MoveKind::new(piece, from, to, self, Some(promotion));
                        moves.push(Move::new(from, to, kind));
                    }
                } else {
                    moves.push(mv);
                }
            }
        }

        moves
    }

    /// Generates every legal move for `color`.
    ///
    /// Each pseudo-legal move is applied, kept only if it does not leave `color` in check, then taken back.
    ///
    /// # Example
    /// ```
    /// # use tadpole::*;
    /// let mut pos = Position::default();
    /// assert_eq!(pos.legal_moves(Color::White).len(), 20);
    /// assert_eq!(pos.legal_moves(Color::Black).len(), 20);
    /// assert_eq!(pos, Position::default());
    /// ```
    pub fn legal_moves(&mut self, color: Color) -> MoveList {
        let pseudo = self.pseudo_legal_moves(color);
        pseudo
            .into_iter()
            .filter(|&mv| self.leaves_king_safe(mv, color))
            .collect()
    }

    /// Legal moves of the piece standing on `square`, if any.
    pub fn legal_moves_from(&mut self, square: Square) -> MoveList {
        let Some(piece) = self.piece_at(square) else {
            return MoveList::new();
        };

        let mut moves = self.legal_moves(piece.color());
        moves.retain(|mv| mv.from() == square);
        moves
    }

    /// Legal captures (including en passant) and promotions for `color`.
    pub fn legal_noisy_moves(&mut self, color: Color) -> MoveList {
        let pseudo = self.pseudo_legal_moves(color);
        pseudo
            .into_iter()
            .filter(|mv| !mv.is_quiet())
            .filter(|&mv| self.leaves_king_safe(mv, color))
            .collect()
    }

    /// Returns `true` if `color` has at least one legal move.
    ///
    /// Stops at the first one found.
    pub fn has_any_legal_move(&mut self, color: Color) -> bool {
        let pseudo = self.pseudo_legal_moves(color);
        pseudo
            .into_iter()
            .any(|mv| self.leaves_king_safe(mv, color))
    }

    /// Parses `uci` and applies it if it is legal for the side to move.
    ///
    /// # Example
    /// ```
    /// # use tadpole::*;
    /// let mut pos = Position::default();
    /// assert!(pos.play_uci("e2e4").is_ok());
    /// assert!(pos.play_uci("e4e5").is_err(), "White just moved");
    /// assert_eq!(pos.history().len(), 1);
    /// ```
    pub fn play_uci(&mut self, uci: &str) -> Result<MoveRecord> {
        let mv = Move::from_uci(self, uci)?;
        let color = self.side_to_move();

        if !self.legal_moves(color).contains(&mv) {
            bail!("Illegal move {uci:?} for {} in {}", color.name(), self.to_fen());
        }

        Ok(self.apply(mv))
    }

    /// Tries `mv` and reports whether `color`'s King is safe afterwards. `self` is unchanged.
    pub(crate) fn leaves_king_safe(&mut self, mv: Move, color: Color) -> bool {
        self.apply(mv);
        let safe = !self.is_in_check(color);
        self.undo();
        safe
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ZobristKey, FEN_KIWIPETE, FEN_STARTPOS};

    #[test]
    fn test_all_promotions_generated() {
        let mut pos = Position::from_fen("2n1k3/1P6/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let moves = pos.legal_moves_from(Square::B7);
        assert_eq!(moves.len(), 8);
        for uci in ["b7b8q", "b7b8r", "b7b8b", "b7b8n", "b7c8q", "b7c8n"] {
            assert!(moves.iter().any(|mv| *mv == uci), "missing {uci}");
        }
        assert!(moves.iter().filter(|mv| mv.is_capture()).count() == 4);
    }

    #[test]
    fn test_castling_generated() {
        let mut pos = Position::from_fen(FEN_KIWIPETE).unwrap();
        let castles = pos
            .legal_moves(Color::White)
            .into_iter()
            .filter(|mv| mv.is_castle())
            .collect::<Vec<_>>();
        assert_eq!(castles.len(), 2);
    }

    #[test]
    fn test_legal_moves_never_leave_king_in_check() {
        let mut pos = Position::from_fen(FEN_KIWIPETE).unwrap();
        for mv in pos.legal_moves(Color::White) {
            pos.apply(mv);
            assert!(!pos.is_in_check(Color::White), "{mv:?}");
            pos.undo();
        }
    }

    #[test]
    fn test_noisy_moves() {
        let mut pos = Position::from_fen(FEN_KIWIPETE).unwrap();
        let noisy = pos.legal_noisy_moves(Color::White);
        assert_eq!(noisy.len(), 8);
        assert!(noisy.iter().all(|mv| mv.is_capture() || mv.is_promotion()));
    }

    #[test]
    fn test_legal_moves_from_empty_square() {
        let mut pos = Position::default();
        assert!(pos.legal_moves_from(Square::E4).is_empty());
        assert_eq!(pos.legal_moves_from(Square::G1).len(), 2);
    }

    #[test]
    fn test_queries_for_side_not_to_move_keep_position() {
        for (fen, square) in [(FEN_STARTPOS, Square::G8), (FEN_KIWIPETE, Square::E8)] {
            let mut pos = Position::from_fen(fen).unwrap();
            let original = pos.clone();
            let key = pos.key();

            assert!(!pos.legal_moves(Color::Black).is_empty());
            assert!(pos.has_any_legal_move(Color::Black));
            assert!(!pos.is_checkmate(Color::Black));
            assert!(!pos.is_stalemate(Color::Black));
            assert!(!pos.legal_moves_from(square).is_empty());
            pos.legal_noisy_moves(Color::Black);

            assert_eq!(pos.side_to_move(), Color::White, "{fen}");
            assert_eq!(pos.key(), key, "{fen}");
            assert_eq!(ZobristKey::new(&pos), pos.key(), "{fen}");
            assert_eq!(pos, original, "{fen}");
        }
    }

    #[test]
    fn test_play_uci_rejects_illegal_moves() {
        let mut pos = Position::default();
        assert!(pos.play_uci("e2e5").is_err());
        assert!(pos.play_uci("e1e2").is_err());
        assert!(pos.play_uci("zz").is_err());
        assert!(pos.history().is_empty());
    }
}
