/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use anyhow::{anyhow, Result};

use crate::{File, Piece, PieceKind, Position, Rank, Square};

/// The different kinds of moves that can be made during a chess game.
///
/// Internally these are bit flags occupying the top four bits of a [`Move`].
/// The encoding is taken from the [chess programming wiki](https://www.chessprogramming.org/Encoding_Moves#From-To_Based).
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, PartialOrd, Ord)]
#[repr(u16)]
pub enum MoveKind {
    /// A single piece moves without capturing.
    Quiet = 0 << Move::FLG_BITS,

    /// A Pawn advances two squares from its starting rank.
    PawnDoublePush = 1 << Move::FLG_BITS,

    /// The King moves two files toward the `h` file and the `h` Rook jumps over it.
    ShortCastle = 2 << Move::FLG_BITS,

    /// The King moves two files toward the `a` file and the `a` Rook jumps over it.
    LongCastle = 3 << Move::FLG_BITS,

    /// A piece moves onto a square occupied by an enemy piece.
    Capture = 4 << Move::FLG_BITS,

    /// A Pawn captures the enemy Pawn that just passed it with a double push.
    EnPassantCapture = 5 << Move::FLG_BITS,

    PromoteKnight = 8 << Move::FLG_BITS,
    PromoteBishop = 9 << Move::FLG_BITS,
    PromoteRook = 10 << Move::FLG_BITS,
    PromoteQueen = 11 << Move::FLG_BITS,

    CaptureAndPromoteKnight = 12 << Move::FLG_BITS,
    CaptureAndPromoteBishop = 13 << Move::FLG_BITS,
    CaptureAndPromoteRook = 14 << Move::FLG_BITS,
    CaptureAndPromoteQueen = 15 << Move::FLG_BITS,
}

impl MoveKind {
    /// A non-capturing promotion to `promotion`.
    ///
    /// Pawns and Kings are not valid promotions, and yield a Queen promotion.
    #[inline(always)]
    pub const fn promotion(promotion: PieceKind) -> Self {
        match promotion {
            PieceKind::Knight => Self::PromoteKnight,
            PieceKind::Bishop => Self::PromoteBishop,
            PieceKind::Rook => Self::PromoteRook,
            _ => Self::PromoteQueen,
        }
    }

    /// A capturing promotion to `promotion`.
    ///
    /// Pawns and Kings are not valid promotions, and yield a Queen promotion.
    #[inline(always)]
    pub const fn promotion_capture(promotion: PieceKind) -> Self {
        match promotion {
            PieceKind::Knight => Self::CaptureAndPromoteKnight,
            PieceKind::Bishop => Self::CaptureAndPromoteBishop,
            PieceKind::Rook => Self::CaptureAndPromoteRook,
            _ => Self::CaptureAndPromoteQueen,
        }
    }

    /// Classifies moving `piece` from `from` onto `to` within `position`.
    ///
    /// If `piece` is a Pawn landing on its promotion rank, the move promotes to `promotion`,
    /// or to a Queen if none was supplied. A King moving two files is a castle.
    ///
    /// # Example
    /// ```
    /// # use tadpole::{Position, MoveKind, Piece, PieceKind, Square};
    /// let pos = Position::default();
    /// let kind = MoveKind::new(Piece::WHITE_PAWN, Square::E2, Square::E4, &pos, None);
    /// assert_eq!(kind, MoveKind::PawnDoublePush);
    /// ```
    pub fn new(
        piece: Piece,
        from: Square,
        to: Square,
        position: &Position,
        promotion: Option<PieceKind>,
    ) -> Self {
        let is_capture = position.piece_at(to).is_some();

        match piece.kind() {
            PieceKind::Pawn => {
                if to.rank() == Rank::promotion(piece.color()) {
                    let promotion = promotion.unwrap_or(PieceKind::Queen);
                    if is_capture {
                        Self::promotion_capture(promotion)
                    } else {
                        Self::promotion(promotion)
                    }
                } else if is_capture {
                    Self::Capture
                } else if from.file() != to.file() && Some(to) == position.ep_square() {
                    Self::EnPassantCapture
                } else if from.rank().index().abs_diff(to.rank().index()) == 2 {
                    Self::PawnDoublePush
                } else {
                    Self::Quiet
                }
            }

            PieceKind::King if from.file().index().abs_diff(to.file().index()) == 2 => {
                if to.file() > from.file() {
                    Self::ShortCastle
                } else {
                    Self::LongCastle
                }
            }

            _ if is_capture => Self::Capture,

            _ => Self::Quiet,
        }
    }
}

impl fmt::Display for MoveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let desc = match self {
            Self::Quiet => "quiet",
            Self::PawnDoublePush => "double push",
            Self::ShortCastle => "short castle",
            Self::LongCastle => "long castle",
            Self::Capture => "capture",
            Self::EnPassantCapture => "en passant",
            Self::PromoteKnight => "promote to knight",
            Self::PromoteBishop => "promote to bishop",
            Self::PromoteRook => "promote to rook",
            Self::PromoteQueen => "promote to queen",
            Self::CaptureAndPromoteKnight => "capture and promote to knight",
            Self::CaptureAndPromoteBishop => "capture and promote to bishop",
            Self::CaptureAndPromoteRook => "capture and promote to rook",
            Self::CaptureAndPromoteQueen => "capture and promote to queen",
        };
        write!(f, "{desc}")
    }
}

/// A move from one square to another, packed into 16 bits.
///
/// ```text
///     0000 000000 000000
///      |     |      |
///      |     |      +- Source square.
///      |     +- Destination square.
///      +- Flags for the kind of move (see [`MoveKind`]).
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Move(u16);

impl Move {
    /// Number of bits to shift to reach the flag bits.
    const FLG_BITS: u16 = 12;
    /// Mask of the flag bits.
    const FLG_MASK: u16 = 0b1111 << Self::FLG_BITS;
    /// Bit set on every capture flag.
    const FLG_CAPTURE: u16 = 0b0100 << Self::FLG_BITS;
    /// Bit set on every promotion flag.
    const FLG_PROMOTION: u16 = 0b1000 << Self::FLG_BITS;
    /// Number of bits to shift to reach the destination bits.
    const DST_BITS: u16 = 6;
    /// Mask of the destination bits.
    const DST_MASK: u16 = 0b111111 << Self::DST_BITS;
    /// Mask of the source bits.
    const SRC_MASK: u16 = 0b111111;

    /// Creates a new [`Move`] from `from` to `to` of the given `kind`.
    ///
    /// # Example
    /// ```
    /// # use tadpole::{Move, MoveKind, Square};
    /// let e2e4 = Move::new(Square::E2, Square::E4, MoveKind::PawnDoublePush);
    /// assert_eq!(e2e4.to_string(), "e2e4");
    /// ```
    #[inline(always)]
    pub const fn new(from: Square, to: Square, kind: MoveKind) -> Self {
        Self(kind as u16 | (to.index() as u16) << Self::DST_BITS | from.index() as u16)
    }

    /// Builds a move from user input: the piece on `from` moving to `to` in `position`,
    /// promoting to `promotion` (a Queen by default) when a Pawn reaches its last rank.
    ///
    /// Returns `None` if `from` is empty. The result is not checked for legality.
    #[inline(always)]
    pub fn build(
        position: &Position,
        from: Square,
        to: Square,
        promotion: Option<PieceKind>,
    ) -> Option<Self> {
        let piece = position.piece_at(from)?;
        Some(Self::new(
            from,
            to,
            MoveKind::new(piece, from, to, position, promotion),
        ))
    }

    #[inline(always)]
    pub const fn from(&self) -> Square {
        Square::from_index_unchecked((self.0 & Self::SRC_MASK) as usize)
    }

    #[inline(always)]
    pub const fn to(&self) -> Square {
        Square::from_index_unchecked(((self.0 & Self::DST_MASK) >> Self::DST_BITS) as usize)
    }

    /// Fetches the [`MoveKind`] of this move.
    #[inline(always)]
    pub const fn kind(&self) -> MoveKind {
        match (self.0 & Self::FLG_MASK) >> Self::FLG_BITS {
            0 => MoveKind::Quiet,
            1 => MoveKind::PawnDoublePush,
            2 => MoveKind::ShortCastle,
            3 => MoveKind::LongCastle,
            4 => MoveKind::Capture,
            5 => MoveKind::EnPassantCapture,
            8 => MoveKind::PromoteKnight,
            9 => MoveKind::PromoteBishop,
            10 => MoveKind::PromoteRook,
            11 => MoveKind::PromoteQueen,
            12 => MoveKind::CaptureAndPromoteKnight,
            13 => MoveKind::CaptureAndPromoteBishop,
            14 => MoveKind::CaptureAndPromoteRook,
            15 => MoveKind::CaptureAndPromoteQueen,
            _ => unreachable!(),
        }
    }

    /// Returns `true` if this move removes an enemy piece, including en passant.
    #[inline(always)]
    pub const fn is_capture(&self) -> bool {
        self.0 & Self::FLG_CAPTURE != 0
    }

    #[inline(always)]
    pub const fn is_en_passant(&self) -> bool {
        matches!(self.kind(), MoveKind::EnPassantCapture)
    }

    #[inline(always)]
    pub const fn is_promotion(&self) -> bool {
        self.0 & Self::FLG_PROMOTION != 0
    }

    #[inline(always)]
    pub const fn is_castle(&self) -> bool {
        matches!(self.kind(), MoveKind::ShortCastle | MoveKind::LongCastle)
    }

    #[inline(always)]
    pub const fn is_pawn_double_push(&self) -> bool {
        matches!(self.kind(), MoveKind::PawnDoublePush)
    }

    /// A move that neither captures nor promotes.
    #[inline(always)]
    pub const fn is_quiet(&self) -> bool {
        !self.is_capture() && !self.is_promotion()
    }

    /// The kind this move promotes to, if it is a promotion.
    #[inline(always)]
    pub const fn promotion(&self) -> Option<PieceKind> {
        match self.kind() {
            MoveKind::PromoteKnight | MoveKind::CaptureAndPromoteKnight => Some(PieceKind::Knight),
            MoveKind::PromoteBishop | MoveKind::CaptureAndPromoteBishop => Some(PieceKind::Bishop),
            MoveKind::PromoteRook | MoveKind::CaptureAndPromoteRook => Some(PieceKind::Rook),
            MoveKind::PromoteQueen | MoveKind::CaptureAndPromoteQueen => Some(PieceKind::Queen),
            _ => None,
        }
    }

    /// Source and destination of the Rook that jumps the King, if this is a castle.
    #[inline(always)]
    pub const fn castling_rook(&self) -> Option<(Square, Square)> {
        let rank = self.from().rank();
        match self.kind() {
            MoveKind::ShortCastle => Some((Square::new(File::H, rank), Square::new(File::F, rank))),
            MoveKind::LongCastle => Some((Square::new(File::A, rank), Square::new(File::D, rank))),
            _ => None,
        }
    }

    /// Parses a move in long algebraic notation, such as `e2e4` or `e7e8q`, using
    /// `position` to classify it.
    ///
    /// Returns an error if the text is malformed or there is no piece on the source square.
    ///
    /// # Example
    /// ```
    /// # use tadpole::*;
    /// let position = Position::from_fen("n1n5/PPPk4/8/8/8/8/4Kppp/5N1N b - - 0 1").unwrap();
    /// let g2h1n = Move::from_uci(&position, "g2h1n").unwrap();
    /// assert_eq!(g2h1n, Move::new(Square::G2, Square::H1, MoveKind::promotion_capture(PieceKind::Knight)));
    /// ```
    pub fn from_uci(position: &Position, uci: &str) -> Result<Self> {
        let from = uci
            .get(0..2)
            .ok_or(anyhow!("Move str must contain a `from` square. Got {uci:?}"))?;
        let to = uci
            .get(2..4)
            .ok_or(anyhow!("Move str must contain a `to` square. Got {uci:?}"))?;

        let from = Square::from_uci(from)?;
        let to = Square::from_uci(to)?;

        let promotion = match uci.get(4..) {
            None | Some("") => None,
            Some(promotion) => Some(promotion.parse::<PieceKind>()?),
        };

        Self::build(position, from, to, promotion).ok_or(anyhow!(
            "No piece found at {from} when parsing {uci:?} on position {}",
            position.to_fen()
        ))
    }

    /// Long algebraic notation for this move.
    #[inline(always)]
    pub fn to_uci(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from(), self.to())?;
        if let Some(promotion) = self.promotion() {
            write!(f, "{promotion}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self} ({})", self.kind())
    }
}

impl PartialEq<&str> for Move {
    fn eq(&self, other: &&str) -> bool {
        self.to_string() == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FEN_KIWIPETE;

    #[test]
    fn test_move_packing() {
        for kind in [
            MoveKind::Quiet,
            MoveKind::PawnDoublePush,
            MoveKind::ShortCastle,
            MoveKind::LongCastle,
            MoveKind::Capture,
            MoveKind::EnPassantCapture,
            MoveKind::PromoteKnight,
            MoveKind::PromoteQueen,
            MoveKind::CaptureAndPromoteRook,
            MoveKind::CaptureAndPromoteQueen,
        ] {
            let mv = Move::new(Square::H7, Square::G8, kind);
            assert_eq!(mv.from(), Square::H7);
            assert_eq!(mv.to(), Square::G8);
            assert_eq!(mv.kind(), kind);
        }
    }

    #[test]
    fn test_move_flags() {
        let ep = Move::new(Square::E5, Square::D6, MoveKind::EnPassantCapture);
        assert!(ep.is_capture());
        assert!(ep.is_en_passant());
        assert!(!ep.is_quiet());

        let promo = Move::new(Square::B7, Square::B8, MoveKind::PromoteRook);
        assert!(promo.is_promotion());
        assert!(!promo.is_capture());
        assert_eq!(promo.promotion(), Some(PieceKind::Rook));
        assert_eq!(promo, "b7b8r");

        let castle = Move::new(Square::E1, Square::G1, MoveKind::ShortCastle);
        assert!(castle.is_castle());
        assert!(castle.is_quiet());
        assert_eq!(castle.castling_rook(), Some((Square::H1, Square::F1)));
    }

    #[test]
    fn test_from_uci_classifies_moves() {
        let pos = Position::from_fen(FEN_KIWIPETE).unwrap();

        let e1c1 = Move::from_uci(&pos, "e1c1").unwrap();
        assert_eq!(e1c1.kind(), MoveKind::LongCastle);

        let e5f7 = Move::from_uci(&pos, "e5f7").unwrap();
        assert_eq!(e5f7.kind(), MoveKind::Capture);

        let a2a4 = Move::from_uci(&pos, "a2a4").unwrap();
        assert_eq!(a2a4.kind(), MoveKind::PawnDoublePush);

        assert!(Move::from_uci(&pos, "e4e5").is_err(), "e4 is empty");
        assert!(Move::from_uci(&pos, "e2").is_err());
        assert!(Move::from_uci(&pos, "e2e3x").is_err());
    }

    #[test]
    fn test_promotion_defaults_to_queen() {
        let pos = Position::from_fen("8/4P3/8/8/8/8/k7/4K3 w - - 0 1").unwrap();
        let mv = Move::build(&pos, Square::E7, Square::E8, None).unwrap();
        assert_eq!(mv.kind(), MoveKind::PromoteQueen);

        let mv = Move::build(&pos, Square::E7, Square::E8, Some(PieceKind::Knight)).unwrap();
        assert_eq!(mv, "e7e8n");
    }
}
