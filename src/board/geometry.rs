/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use arrayvec::ArrayVec;

use super::{Color, Move, MoveKind, PieceKind, Position, Rank, Square};

/// Deltas for the movement of the Queen and the King, as `(file, rank)` offsets.
pub(crate) const QUEEN_DELTAS: [(i8, i8); 8] = [
    /* Orthogonal */
    (1, 0),
    (0, -1),
    (-1, 0),
    (0, 1),
    /* Diagonal */
    (1, 1),
    (1, -1),
    (-1, -1),
    (-1, 1),
];

/// Deltas for the movement of the Rook.
pub(crate) const ROOK_DELTAS: [(i8, i8); 4] = [
    QUEEN_DELTAS[0],
    QUEEN_DELTAS[1],
    QUEEN_DELTAS[2],
    QUEEN_DELTAS[3],
];

/// Deltas for the movement of the Bishop.
pub(crate) const BISHOP_DELTAS: [(i8, i8); 4] = [
    QUEEN_DELTAS[4],
    QUEEN_DELTAS[5],
    QUEEN_DELTAS[6],
    QUEEN_DELTAS[7],
];

/// Deltas for the movement of the Knight.
pub(crate) const KNIGHT_DELTAS: [(i8, i8); 8] = [
    (1, 2),
    (1, -2),
    (2, 1),
    (2, -1),
    (-1, 2),
    (-1, -2),
    (-2, 1),
    (-2, -1),
];

/// Most destinations a single piece can have: a Queen in the center of an empty board.
const MAX_DESTINATIONS: usize = 27;

/// Destination squares of a single piece.
pub type SquareList = ArrayVec<Square, MAX_DESTINATIONS>;

/// Ray directions a slider of `kind` moves along.
#[inline(always)]
pub(crate) fn slider_deltas(kind: PieceKind) -> &'static [(i8, i8)] {
    match kind {
        PieceKind::Bishop => &BISHOP_DELTAS,
        PieceKind::Rook => &ROOK_DELTAS,
        PieceKind::Queen => &QUEEN_DELTAS,
        _ => &[],
    }
}

/// Signed `(file, rank)` distance from `from` to `to`.
#[inline(always)]
const fn delta(from: Square, to: Square) -> (i8, i8) {
    (
        to.file().index() as i8 - from.file().index() as i8,
        to.rank().index() as i8 - from.rank().index() as i8,
    )
}

impl Position {
    /// Returns `true` if the piece on `from` can reach `to` by its movement pattern.
    ///
    /// Check is ignored entirely. Squares holding a friendly piece or either King are never reachable.
    /// En passant is delegated to [`Position::is_en_passant`] and castling to [`Position::can_castle`].
    ///
    /// # Example
    /// ```
    /// # use tadpole::*;
    /// let pos = Position::default();
    /// assert!(pos.can_reach(Square::G1, Square::F3));
    /// assert!(pos.can_reach(Square::E2, Square::E4));
    /// assert!(!pos.can_reach(Square::F1, Square::C4), "blocked by the e2 pawn");
    /// assert!(!pos.can_reach(Square::E4, Square::E5), "no piece on e4");
    /// ```
    pub fn can_reach(&self, from: Square, to: Square) -> bool {
        let Some(piece) = self.piece_at(from) else {
            return false;
        };
        if from == to {
            return false;
        }
        if let Some(target) = self.piece_at(to) {
            if target.color() == piece.color() || target.is_king() {
                return false;
            }
        }

        let color = piece.color();
        let (df, dr) = delta(from, to);

        match piece.kind() {
            PieceKind::Pawn => self.pawn_can_reach(color, from, to),

            PieceKind::Knight => KNIGHT_DELTAS.contains(&(df, dr)),

            PieceKind::King => {
                if df.abs() <= 1 && dr.abs() <= 1 {
                    true
                } else if dr == 0 && df.abs() == 2 && from.rank() == Rank::first(color) {
                    self.can_castle(color, df > 0)
                } else {
                    false
                }
            }

            kind => {
                let step = (df.signum(), dr.signum());
                if !slider_deltas(kind).contains(&step) {
                    return false;
                }
                // Must lie exactly on the ray, not just in its general direction
                if df != 0 && dr != 0 && df.abs() != dr.abs() {
                    return false;
                }
                self.ray_is_clear(from, to, step)
            }
        }
    }

    /// Every square the piece on `from` can reach; see [`Position::can_reach`].
    pub fn destinations(&self, from: Square) -> SquareList {
        let mut list = SquareList::new();
        let Some(piece) = self.piece_at(from) else {
            return list;
        };
        let color = piece.color();

        match piece.kind() {
            PieceKind::Pawn => {
                let forward = color.forward();
                for (df, dr) in [(0, forward), (0, 2 * forward), (-1, forward), (1, forward)] {
                    if let Some(to) = from.offset(df, dr) {
                        if self.can_reach(from, to) {
                            list.push(to);
                        }
                    }
                }
            }

            PieceKind::Knight => {
                for (df, dr) in KNIGHT_DELTAS {
                    if let Some(to) = from.offset(df, dr) {
                        if self.can_reach(from, to) {
                            list.push(to);
                        }
                    }
                }
            }

            PieceKind::King => {
                for (df, dr) in QUEEN_DELTAS.into_iter().chain([(2, 0), (-2, 0)]) {
                    if let Some(to) = from.offset(df, dr) {
                        if self.can_reach(from, to) {
                            list.push(to);
                        }
                    }
                }
            }

            kind => {
                for &(df, dr) in slider_deltas(kind) {
                    let mut current = from;
                    while let Some(to) = current.offset(df, dr) {
                        match self.piece_at(to) {
                            None => list.push(to),
                            Some(blocker) => {
                                if blocker.color() != color && !blocker.is_king() {
                                    list.push(to);
                                }
                                break;
                            }
                        }
                        current = to;
                    }
                }
            }
        }

        list
    }

    /// Returns `true` if the side to move may legally move the piece on `from` to `to`.
    ///
    /// The move is tried on the board and taken back, so `self` is unchanged afterwards.
    ///
    /// # Example
    /// ```
    /// # use tadpole::*;
    /// // The e2 Knight is pinned to its King
    /// let mut pos = Position::from_fen("4r1k1/8/8/8/8/8/4N3/4K3 w - - 0 1").unwrap();
    /// assert!(!pos.is_valid_move(Square::E2, Square::C3));
    /// assert!(pos.is_valid_move(Square::E1, Square::D1));
    /// ```
    pub fn is_valid_move(&mut self, from: Square, to: Square) -> bool {
        let Some(piece) = self.piece_at(from) else {
            return false;
        };
        if piece.color() != self.side_to_move() || !self.can_reach(from, to) {
            return false;
        }

        let mv = Move::new(from, to, MoveKind::new(piece, from, to, self, None));
        self.leaves_king_safe(mv, piece.color())
    }

    /// Pawns push onto empty squares and capture diagonally onto enemy pieces.
    fn pawn_can_reach(&self, color: Color, from: Square, to: Square) -> bool {
        let forward = color.forward();
        let (df, dr) = delta(from, to);
        let is_empty = self.piece_at(to).is_none();

        match (df.abs(), dr) {
            (0, dr) if dr == forward => is_empty,

            (0, dr) if dr == 2 * forward => {
                from.rank() == Rank::pawn_start(color)
                    && is_empty
                    && from
                        .forward_by(color, 1)
                        .is_some_and(|mid| self.piece_at(mid).is_none())
            }

            (1, dr) if dr == forward => !is_empty || self.is_en_passant(from, to),

            _ => false,
        }
    }

    /// Returns `true` if every square strictly between `from` and `to` along `step` is empty.
    fn ray_is_clear(&self, from: Square, to: Square, step: (i8, i8)) -> bool {
        let mut current = from;
        while let Some(next) = current.offset(step.0, step.1) {
            if next == to {
                return true;
            }
            if self.piece_at(next).is_some() {
                return false;
            }
            current = next;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Piece, FEN_KIWIPETE};

    const FENS: [&str; 5] = [
        FEN_KIWIPETE,
        "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
        "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
        "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3",
    ];

    #[test]
    fn test_destinations_agree_with_can_reach() {
        for fen in FENS {
            let pos = Position::from_fen(fen).unwrap();
            for from in Square::iter() {
                let destinations = pos.destinations(from);
                for to in Square::iter() {
                    assert_eq!(
                        destinations.contains(&to),
                        pos.can_reach(from, to),
                        "{from}{to} in {fen}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_kings_are_never_reachable() {
        let pos = Position::from_fen("8/8/8/3kK3/8/8/8/7Q w - - 0 1").unwrap();
        assert!(!pos.can_reach(Square::E5, Square::D5));
        assert!(!pos.can_reach(Square::H1, Square::D5));
        assert!(pos.can_reach(Square::H1, Square::E4));
    }

    #[test]
    fn test_pawn_geometry() {
        let pos = Position::from_fen("4k3/8/8/8/8/p1n5/1P1P4/4K3 w - - 0 1").unwrap();
        assert!(pos.can_reach(Square::B2, Square::B4));
        assert!(pos.can_reach(Square::B2, Square::A3));
        assert!(pos.can_reach(Square::B2, Square::C3));
        assert!(pos.can_reach(Square::D2, Square::D4));
        assert!(pos.can_reach(Square::D2, Square::C3));
        assert!(!pos.can_reach(Square::D2, Square::E3), "no diagonal onto empty squares");
        assert!(!pos.can_reach(Square::B2, Square::B1), "no moving backwards");

        let blocked = Position::from_fen("4k3/8/8/8/8/1n6/1P6/4K3 w - - 0 1").unwrap();
        assert!(!blocked.can_reach(Square::B2, Square::B3));
        assert!(!blocked.can_reach(Square::B2, Square::B4));
    }

    #[test]
    fn test_en_passant_geometry() {
        let pos = Position::from_fen(FENS[4]).unwrap();
        assert!(pos.can_reach(Square::E5, Square::F6));
        assert!(!pos.can_reach(Square::E5, Square::D6), "the d-pawn moved two turns ago");
    }

    #[test]
    fn test_castling_geometry() {
        let pos = Position::from_fen(FEN_KIWIPETE).unwrap();
        assert!(pos.can_reach(Square::E1, Square::G1));
        assert!(pos.can_reach(Square::E1, Square::C1));
        assert!(!pos.can_reach(Square::E1, Square::E3));

        let no_rights = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w - - 0 1").unwrap();
        assert!(!no_rights.can_reach(Square::E1, Square::G1));
    }

    #[test]
    fn test_is_valid_move() {
        let mut pos = Position::default();
        assert!(pos.is_valid_move(Square::E2, Square::E4));
        assert!(!pos.is_valid_move(Square::E7, Square::E5), "not Black's turn");
        assert!(!pos.is_valid_move(Square::E1, Square::E2));
        assert_eq!(pos, Position::default());

        // Only moves that resolve check are valid
        let mut check = Position::from_fen("4k3/8/8/8/8/8/3q4/R3K3 w Q - 0 1").unwrap();
        assert!(check.is_valid_move(Square::E1, Square::D2));
        assert!(!check.is_valid_move(Square::E1, Square::C1));
        assert!(!check.is_valid_move(Square::A1, Square::A8));
        assert_eq!(check.piece_at(Square::D2), Some(Piece::BLACK_QUEEN));
    }
}
