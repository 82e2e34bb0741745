/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, str::FromStr};

use anyhow::{anyhow, bail, Context, Result};

use super::{Color, File, Move, Piece, PieceKind, Rank, Square, ZobristKey};

/// The castling rights of both players, as a set of four flags.
///
/// A right only records that neither the King nor the relevant Rook has moved or been captured.
/// Whether castling is possible *right now* is answered by [`Position::can_castle`].
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Default)]
pub struct CastlingRights(u8);

impl CastlingRights {
    pub const NONE: Self = Self(0);
    pub const WHITE_SHORT: Self = Self(1 << 0);
    pub const WHITE_LONG: Self = Self(1 << 1);
    pub const BLACK_SHORT: Self = Self(1 << 2);
    pub const BLACK_LONG: Self = Self(1 << 3);
    pub const ALL: Self = Self(0b1111);

    /// Number of possible combinations of castling rights.
    pub const COUNT: usize = 16;

    /// The kingside right of `color`.
    #[inline(always)]
    pub const fn short(color: Color) -> Self {
        match color {
            Color::White => Self::WHITE_SHORT,
            Color::Black => Self::BLACK_SHORT,
        }
    }

    /// The queenside right of `color`.
    #[inline(always)]
    pub const fn long(color: Color) -> Self {
        match color {
            Color::White => Self::WHITE_LONG,
            Color::Black => Self::BLACK_LONG,
        }
    }

    /// Both rights of `color`.
    #[inline(always)]
    pub const fn both(color: Color) -> Self {
        Self(Self::short(color).0 | Self::long(color).0)
    }

    /// The right that is lost when anything moves off of, or onto, `square`.
    ///
    /// Only the four corners are associated with a right.
    ///
    /// # Example
    /// ```
    /// # use tadpole::{CastlingRights, Square};
    /// assert_eq!(CastlingRights::for_corner(Square::H8), CastlingRights::BLACK_SHORT);
    /// assert_eq!(CastlingRights::for_corner(Square::E1), CastlingRights::NONE);
    /// ```
    #[inline(always)]
    pub const fn for_corner(square: Square) -> Self {
        match square.index() {
            0 => Self::WHITE_LONG,
            7 => Self::WHITE_SHORT,
            56 => Self::BLACK_LONG,
            63 => Self::BLACK_SHORT,
            _ => Self::NONE,
        }
    }

    /// Returns `true` if all rights in `other` are also in `self`.
    #[inline(always)]
    pub const fn contains(&self, other: Self) -> bool {
        self.0 & other.0 == other.0 && other.0 != 0
    }

    #[inline(always)]
    pub const fn has_short(&self, color: Color) -> bool {
        self.contains(Self::short(color))
    }

    #[inline(always)]
    pub const fn has_long(&self, color: Color) -> bool {
        self.contains(Self::long(color))
    }

    #[inline(always)]
    pub fn remove(&mut self, rights: Self) {
        self.0 &= !rights.0;
    }

    #[inline(always)]
    pub fn insert(&mut self, rights: Self) {
        self.0 |= rights.0;
    }

    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Index into tables of [`CastlingRights::COUNT`] elements.
    #[inline(always)]
    pub(crate) const fn index(&self) -> usize {
        self.0 as usize
    }

    /// Drops every right whose King or Rook is not on its starting square in `board`.
    pub fn sanitized(mut self, board: &Board) -> Self {
        for color in Color::all() {
            let rank = Rank::first(color);
            let king = Piece::new(color, PieceKind::King);
            let rook = Piece::new(color, PieceKind::Rook);

            if board.piece_at(Square::new(File::E, rank)) != Some(king) {
                self.remove(Self::both(color));
            }
            if board.piece_at(Square::new(File::H, rank)) != Some(rook) {
                self.remove(Self::short(color));
            }
            if board.piece_at(Square::new(File::A, rank)) != Some(rook) {
                self.remove(Self::long(color));
            }
        }
        self
    }

    /// Parses the castling field of a FEN string, such as `KQkq` or `-`.
    ///
    /// # Example
    /// ```
    /// # use tadpole::CastlingRights;
    /// let rights = CastlingRights::from_uci("Kq").unwrap();
    /// assert!(rights.contains(CastlingRights::WHITE_SHORT));
    /// assert!(!rights.contains(CastlingRights::WHITE_LONG));
    /// assert_eq!(rights.to_string(), "Kq");
    /// ```
    pub fn from_uci(castling: &str) -> Result<Self> {
        if castling == "-" {
            return Ok(Self::NONE);
        }

        let mut rights = Self::NONE;
        for c in castling.chars() {
            let right = match c {
                'K' => Self::WHITE_SHORT,
                'Q' => Self::WHITE_LONG,
                'k' => Self::BLACK_SHORT,
                'q' => Self::BLACK_LONG,
                _ => bail!("Invalid char in castling rights: Must be one of \"KQkq\". Got {c:?}"),
            };
            rights.insert(right);
        }

        Ok(rights)
    }
}

impl fmt::Display for CastlingRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "-");
        }

        for (right, c) in [
            (Self::WHITE_SHORT, 'K'),
            (Self::WHITE_LONG, 'Q'),
            (Self::BLACK_SHORT, 'k'),
            (Self::BLACK_LONG, 'q'),
        ] {
            if self.contains(right) {
                write!(f, "{c}")?;
            }
        }
        Ok(())
    }
}

/// All pieces and their locations on the board, stored as one optional [`Piece`] per [`Square`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    mailbox: [Option<Piece>; Square::COUNT],
}

impl Board {
    /// An empty board.
    #[inline(always)]
    pub const fn new() -> Self {
        Self {
            mailbox: [None; Square::COUNT],
        }
    }

    /// Parses the piece placement field of a FEN string.
    ///
    /// # Example
    /// ```
    /// # use tadpole::{Board, Piece, Square};
    /// let board = Board::from_fen("8/8/8/8/4P3/8/8/8").unwrap();
    /// assert_eq!(board.piece_at(Square::E4), Some(Piece::WHITE_PAWN));
    /// assert!(Board::from_fen("8/8/8").is_err());
    /// ```
    pub fn from_fen(placements: &str) -> Result<Self> {
        let mut board = Self::new();

        let ranks = placements.split('/').collect::<Vec<_>>();
        if ranks.len() != Rank::COUNT {
            bail!("FEN must have piece placements for all 8 ranks. Got {placements:?}");
        }

        // FEN lists the eighth rank first
        for (rank, row) in Rank::iter().rev().zip(ranks) {
            let mut file = 0;

            for c in row.chars() {
                if let Some(empty) = c.to_digit(10) {
                    file += empty as usize;
                    continue;
                }

                let piece = Piece::from_uci(c)?;
                let Some(square) = Square::from_row_col(7 - rank.index(), file) else {
                    bail!("Too many squares on rank {rank} of FEN placements {placements:?}");
                };
                board.place(piece, square);
                file += 1;
            }

            if file != File::COUNT {
                bail!("Rank {rank} of FEN placements {placements:?} must cover exactly 8 files");
            }
        }

        Ok(board)
    }

    #[inline(always)]
    pub const fn piece_at(&self, square: Square) -> Option<Piece> {
        self.mailbox[square.index()]
    }

    #[inline(always)]
    pub fn place(&mut self, piece: Piece, square: Square) {
        self.mailbox[square] = Some(piece);
    }

    #[inline(always)]
    pub fn take(&mut self, square: Square) -> Option<Piece> {
        self.mailbox[square].take()
    }

    /// Iterates over all occupied squares, from `A1` to `H8`.
    #[inline(always)]
    pub fn iter(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::iter().filter_map(|square| self.piece_at(square).map(|piece| (square, piece)))
    }

    /// Iterates over all squares occupied by `color`.
    #[inline(always)]
    pub fn iter_color(&self, color: Color) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.iter().filter(move |(_, piece)| piece.color() == color)
    }

    /// Number of `piece`s on the board.
    #[inline(always)]
    pub fn count(&self, piece: Piece) -> usize {
        self.mailbox.iter().filter(|&&p| p == Some(piece)).count()
    }

    /// Generates the piece placement field of a FEN string.
    pub fn to_fen(&self) -> String {
        let mut placements = Vec::with_capacity(Rank::COUNT);

        for rank in Rank::iter().rev() {
            let mut row = String::new();
            let mut empty = 0;

            for file in File::iter() {
                match self.piece_at(Square::new(file, rank)) {
                    Some(piece) => {
                        if empty != 0 {
                            row += &empty.to_string();
                            empty = 0;
                        }
                        row.push(piece.to_uci());
                    }
                    None => empty += 1,
                }
            }

            if empty != 0 {
                row += &empty.to_string();
            }
            placements.push(row);
        }

        placements.join("/")
    }
}

impl Default for Board {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in Rank::iter().rev() {
            write!(f, "{rank}|")?;
            for file in File::iter() {
                let c = self
                    .piece_at(Square::new(file, rank))
                    .map(|p| p.to_uci())
                    .unwrap_or('.');
                write!(f, " {c}")?;
            }
            writeln!(f)?;
        }

        write!(f, " +")?;
        for _ in File::iter() {
            write!(f, "--")?;
        }
        write!(f, "\n   ")?;
        for file in File::iter() {
            write!(f, "{file} ")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

/// Everything needed to take back a move that was applied to a [`Position`].
///
/// Returned by [`Position::apply`] and [`Position::undo`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct MoveRecord {
    /// The move that was applied.
    pub mv: Move,

    /// The piece that moved, before any promotion.
    pub moved: Piece,

    /// The piece that was captured, if any.
    pub captured: Option<Piece>,

    /// Where the captured piece stood. Differs from the destination only for en passant.
    pub captured_square: Square,

    /// State of the position before the move.
    pub side_to_move: Color,
    pub castling_rights: CastlingRights,
    pub ep_square: Option<Square>,
    pub kings: [Square; Color::COUNT],
    pub halfmove: usize,
    pub fullmove: usize,
    pub key: ZobristKey,
}

impl MoveRecord {
    #[inline(always)]
    pub const fn from(&self) -> Square {
        self.mv.from()
    }

    #[inline(always)]
    pub const fn to(&self) -> Square {
        self.mv.to()
    }

    /// The kind promoted to, if this move was a promotion.
    #[inline(always)]
    pub const fn is_promotion(&self) -> Option<PieceKind> {
        self.mv.promotion()
    }

    #[inline(always)]
    pub const fn is_castling(&self) -> bool {
        self.mv.is_castle()
    }

    #[inline(always)]
    pub const fn is_en_passant(&self) -> bool {
        self.mv.is_en_passant()
    }
}

/// Whether a game is over, as seen from the side to move.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameStatus {
    Ongoing,
    Checkmate { winner: Color },
    Stalemate,
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ongoing => write!(f, "ongoing"),
            Self::Checkmate { winner } => write!(f, "checkmate, {} wins", winner.name()),
            Self::Stalemate => write!(f, "stalemate"),
        }
    }
}

/// A chess position: the board, whose turn it is, castling and en passant state, move counters,
/// and the stack of moves applied so far.
///
/// Pieces only ever move through [`Position::apply`] and [`Position::undo`], which always pair exactly.
#[derive(Clone, PartialEq, Eq)]
pub struct Position {
    board: Board,

    side_to_move: Color,

    castling_rights: CastlingRights,

    /// Square a pawn may capture onto en passant, set only right after a double push.
    ep_square: Option<Square>,

    /// Cached King locations.
    kings: [Square; Color::COUNT],

    /// Used to enforce the fifty-move rule.
    ///
    /// - Incremented after each move.
    /// - Reset after a capture or a pawn moves.
    halfmove: usize,

    /// Number of full turns since the beginning of the game, starting at 1.
    fullmove: usize,

    /// Zobrist key, updated incrementally.
    key: ZobristKey,

    /// Applied moves, most recent last.
    history: Vec<MoveRecord>,
}

impl Position {
    /// The standard starting position.
    ///
    /// # Example
    /// ```
    /// # use tadpole::*;
    /// assert_eq!(Position::startpos().to_fen(), FEN_STARTPOS);
    /// ```
    pub fn startpos() -> Self {
        const BACK_RANK: [PieceKind; File::COUNT] = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];

        let mut board = Board::new();
        for color in Color::all() {
            for file in File::iter() {
                let back = Square::new(file, Rank::first(color));
                let pawn = Square::new(file, Rank::pawn_start(color));
                board.place(Piece::new(color, BACK_RANK[file.index()]), back);
                board.place(Piece::new(color, PieceKind::Pawn), pawn);
            }
        }

        let mut pos = Self {
            board,
            side_to_move: Color::White,
            castling_rights: CastlingRights::ALL,
            ep_square: None,
            kings: [Square::E1, Square::E8],
            halfmove: 0,
            fullmove: 1,
            key: ZobristKey::default(),
            history: Vec::new(),
        };
        pos.key = ZobristKey::new(&pos);
        pos
    }

    /// Creates a new [`Position`] from the provided FEN string.
    ///
    /// Trailing fields may be omitted and default to `w - - 0 1`.
    /// Castling rights whose King or Rook is not on its starting square are discarded.
    ///
    /// Fails if the FEN is malformed, or if either side does not have exactly one King.
    pub fn from_fen(fen: &str) -> Result<Self> {
        let mut split = fen.split_whitespace();

        let placements = split
            .next()
            .ok_or(anyhow!("FEN string must have piece placements."))?;
        let board = Board::from_fen(placements)?;

        let side_to_move = split.next().unwrap_or("w").parse::<Color>()?;

        let castling_rights = CastlingRights::from_uci(split.next().unwrap_or("-"))?.sanitized(&board);

        let ep_square = match split.next().unwrap_or("-") {
            "-" => None,
            square => {
                let square = Square::from_uci(square)?;
                if square.rank() != Rank::SIX.relative_to(side_to_move) {
                    bail!("En passant square {square} is not reachable with {} to move", side_to_move.name());
                }
                Some(square)
            }
        };

        let halfmove = split.next().unwrap_or("0");
        let halfmove = halfmove
            .parse()
            .with_context(|| format!("FEN string must have valid halfmove counter. Got {halfmove:?}"))?;

        let fullmove = split.next().unwrap_or("1");
        let fullmove = fullmove
            .parse()
            .with_context(|| format!("FEN string must have valid fullmove counter. Got {fullmove:?}"))?;

        let mut kings = [Square::default(); Color::COUNT];
        for color in Color::all() {
            let king = Piece::new(color, PieceKind::King);
            let mut squares = board.iter().filter(|&(_, p)| p == king).map(|(sq, _)| sq);
            match (squares.next(), squares.next()) {
                (Some(square), None) => kings[color] = square,
                _ => bail!("FEN must have exactly one {} king. Got {fen:?}", color.name()),
            }
        }

        let mut pos = Self {
            board,
            side_to_move,
            castling_rights,
            ep_square,
            kings,
            halfmove,
            fullmove,
            key: ZobristKey::default(),
            history: Vec::new(),
        };
        pos.key = ZobristKey::new(&pos);

        Ok(pos)
    }

    /// Generates a FEN string of this position.
    ///
    /// # Example
    /// ```
    /// # use tadpole::*;
    /// let pos = Position::from_fen(FEN_KIWIPETE).unwrap();
    /// assert_eq!(pos.to_fen(), FEN_KIWIPETE);
    /// ```
    pub fn to_fen(&self) -> String {
        let ep = self
            .ep_square
            .map(|sq| sq.to_string())
            .unwrap_or(String::from("-"));

        format!(
            "{} {} {} {ep} {} {}",
            self.board.to_fen(),
            self.side_to_move,
            self.castling_rights,
            self.halfmove,
            self.fullmove
        )
    }

    #[inline(always)]
    pub const fn board(&self) -> &Board {
        &self.board
    }

    #[inline(always)]
    pub const fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline(always)]
    pub const fn castling_rights(&self) -> CastlingRights {
        self.castling_rights
    }

    #[inline(always)]
    pub const fn ep_square(&self) -> Option<Square> {
        self.ep_square
    }

    #[inline(always)]
    pub const fn king_square(&self, color: Color) -> Square {
        self.kings[color.index()]
    }

    #[inline(always)]
    pub const fn halfmove(&self) -> usize {
        self.halfmove
    }

    #[inline(always)]
    pub const fn fullmove(&self) -> usize {
        self.fullmove
    }

    #[inline(always)]
    pub const fn key(&self) -> ZobristKey {
        self.key
    }

    /// All moves applied so far, oldest first.
    #[inline(always)]
    pub fn history(&self) -> &[MoveRecord] {
        &self.history
    }

    #[inline(always)]
    pub fn last_move(&self) -> Option<&MoveRecord> {
        self.history.last()
    }

    #[inline(always)]
    pub const fn piece_at(&self, square: Square) -> Option<Piece> {
        self.board.piece_at(square)
    }

    /// The piece at display coordinates `(row, col)`, where row `0` is the eighth rank.
    ///
    /// Out-of-range coordinates yield `None`.
    ///
    /// # Example
    /// ```
    /// # use tadpole::*;
    /// let pos = Position::default();
    /// assert_eq!(pos.get_piece(0, 4), Some(Piece::BLACK_KING));
    /// assert_eq!(pos.get_piece(6, 0), Some(Piece::WHITE_PAWN));
    /// assert_eq!(pos.get_piece(4, 4), None);
    /// ```
    #[inline(always)]
    pub fn get_piece(&self, row: usize, col: usize) -> Option<Piece> {
        Square::from_row_col(row, col).and_then(|square| self.piece_at(square))
    }

    /// Applies `mv` and returns a copy of the record needed to take it back.
    ///
    /// This is not a legality check: any move whose source square is occupied is carried out.
    /// Use [`Position::is_valid_move`] or [`Position::legal_moves`] to validate first.
    ///
    /// # Panics
    ///
    /// If there is no piece on the source square of `mv`.
    pub fn apply(&mut self, mv: Move) -> MoveRecord {
        let from = mv.from();
        let to = mv.to();
        let Some(piece) = self.board.piece_at(from) else {
            panic!("Cannot apply {mv}: no piece on {from} in {}", self.to_fen());
        };
        let color = piece.color();

        let captured_square = if mv.is_en_passant() {
            Square::new(to.file(), from.rank())
        } else {
            to
        };
        let captured = self.board.piece_at(captured_square);

        let record = MoveRecord {
            mv,
            moved: piece,
            captured,
            captured_square,
            side_to_move: self.side_to_move,
            castling_rights: self.castling_rights,
            ep_square: self.ep_square,
            kings: self.kings,
            halfmove: self.halfmove,
            fullmove: self.fullmove,
            key: self.key,
        };

        // Un-hash everything that is about to change wholesale
        self.key.hash_side_to_move(self.side_to_move);
        self.key.hash_optional_ep_square(self.ep_square.take());
        self.key.hash_castling_rights(self.castling_rights);

        self.take(from);
        if captured.is_some() {
            self.take(captured_square);
        }

        let placed = mv.promotion().map_or(piece, |kind| piece.promoted(kind));
        self.place(placed, to);

        if let Some((rook_from, rook_to)) = mv.castling_rook() {
            if let Some(rook) = self.take(rook_from) {
                self.place(rook, rook_to);
            }
        }

        if piece.is_king() {
            self.kings[color] = to;
            self.castling_rights.remove(CastlingRights::both(color));
        }
        self.castling_rights.remove(CastlingRights::for_corner(from));
        self.castling_rights.remove(CastlingRights::for_corner(to));

        if mv.is_pawn_double_push() {
            self.ep_square = from.forward_by(color, 1);
        }

        if piece.is_pawn() || captured.is_some() {
            self.halfmove = 0;
        } else {
            self.halfmove += 1;
        }
        self.fullmove += color.index();

        self.side_to_move = !color;

        self.key.hash_side_to_move(self.side_to_move);
        self.key.hash_optional_ep_square(self.ep_square);
        self.key.hash_castling_rights(self.castling_rights);

        self.history.push(record);
        record
    }

    /// Takes back the most recently applied move, restoring the position exactly.
    ///
    /// Returns `None`, changing nothing, if no moves have been applied.
    pub fn undo(&mut self) -> Option<MoveRecord> {
        let record = self.history.pop()?;
        let mv = record.mv;

        self.board.take(mv.to());
        self.board.place(record.moved, mv.from());

        if let Some(captured) = record.captured {
            self.board.place(captured, record.captured_square);
        }

        if let Some((rook_from, rook_to)) = mv.castling_rook() {
            if let Some(rook) = self.board.take(rook_to) {
                self.board.place(rook, rook_from);
            }
        }

        self.side_to_move = record.side_to_move;
        self.castling_rights = record.castling_rights;
        self.ep_square = record.ep_square;
        self.kings = record.kings;
        self.halfmove = record.halfmove;
        self.fullmove = record.fullmove;
        self.key = record.key;

        Some(record)
    }

    /// Places `piece` on `square`, updating the Zobrist key.
    #[inline(always)]
    fn place(&mut self, piece: Piece, square: Square) {
        self.board.place(piece, square);
        self.key.hash_piece(square, piece);
    }

    /// Removes whatever is on `square`, updating the Zobrist key.
    #[inline(always)]
    fn take(&mut self, square: Square) -> Option<Piece> {
        let piece = self.board.take(square)?;
        self.key.hash_piece(square, piece);
        Some(piece)
    }
}

impl FromStr for Position {
    type Err = anyhow::Error;
    #[inline(always)]
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_fen(s)
    }
}

impl Default for Position {
    #[inline(always)]
    fn default() -> Self {
        Self::startpos()
    }
}

impl fmt::Display for Position {
    /// Display this position's FEN string.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_fen())
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in Rank::iter().rev() {
            write!(f, "{rank}|")?;
            for file in File::iter() {
                let c = self
                    .piece_at(Square::new(file, rank))
                    .map(|p| p.to_uci())
                    .unwrap_or('.');
                write!(f, " {c}")?;
            }

            if rank == Rank::SEVEN {
                write!(f, "           FEN: {}", self.to_fen())?;
            } else if rank == Rank::SIX {
                write!(f, "          Side: {}", self.side_to_move.name())?;
            } else if rank == Rank::FIVE {
                write!(f, "      Castling: {}", self.castling_rights)?;
            } else if rank == Rank::FOUR {
                let ep = self
                    .ep_square
                    .map(|sq| sq.to_string())
                    .unwrap_or(String::from("-"));
                write!(f, "            EP: {ep}")?;
            } else if rank == Rank::THREE {
                write!(f, "     Half-move: {}", self.halfmove)?;
            } else if rank == Rank::TWO {
                write!(f, "     Full-move: {}", self.fullmove)?;
            } else if rank == Rank::ONE {
                write!(f, "           Key: {}", self.key)?;
            }
            writeln!(f)?;
        }

        write!(f, " +")?;
        for _ in File::iter() {
            write!(f, "--")?;
        }
        write!(f, "\n   ")?;
        for file in File::iter() {
            write!(f, "{file} ")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FEN_KIWIPETE, FEN_STARTPOS};

    fn play(pos: &mut Position, uci: &str) -> MoveRecord {
        let mv = Move::from_uci(pos, uci).unwrap();
        pos.apply(mv)
    }

    #[test]
    fn test_fen_round_trip() {
        for fen in [
            FEN_STARTPOS,
            FEN_KIWIPETE,
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
            "rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3",
        ] {
            assert_eq!(Position::from_fen(fen).unwrap().to_fen(), fen);
        }
        assert_eq!(Position::from_fen(FEN_STARTPOS).unwrap(), Position::default());
    }

    #[test]
    fn test_invalid_fens() {
        assert!(Position::from_fen("").is_err());
        assert!(Position::from_fen("8/8/8/8/8/8/8/8 w - - 0 1").is_err(), "no kings");
        assert!(Position::from_fen("kk6/8/8/8/8/8/8/K7 w - - 0 1").is_err(), "two kings");
        assert!(Position::from_fen("k7/8/8/8/8/8/8/K7 x - - 0 1").is_err());
        assert!(Position::from_fen("k7/8/8/8/8/8/8/K7 w X - 0 1").is_err());
        assert!(Position::from_fen("k7/8/8/8/8/8/8/K7 w - e4 0 1").is_err());
        assert!(Position::from_fen("k7/8/8/8/8/8/8/K7 w - - a 1").is_err());
        assert!(Position::from_fen("k7/8/8/8/8/8/8/K8 w - - 0 1").is_err());
    }

    #[test]
    fn test_castling_rights_sanitized_on_load() {
        let pos = Position::from_fen("r3k3/8/8/8/8/8/8/4K2R w KQkq - 0 1").unwrap();
        assert_eq!(pos.castling_rights().to_string(), "Kq");
    }

    #[test]
    fn test_zobrist_key_components() {
        let fen = "r3k2r/pppp1ppp/8/4p3/8/8/PPPPPPPP/R3K2R w KQkq e6 0 1";
        let pos = Position::from_fen(fen).unwrap();

        let other_side = Position::from_fen("r3k2r/pppp1ppp/8/4p3/8/8/PPPPPPPP/R3K2R b KQkq - 0 1").unwrap();
        let no_ep = Position::from_fen("r3k2r/pppp1ppp/8/4p3/8/8/PPPPPPPP/R3K2R w KQkq - 0 1").unwrap();
        let fewer_rights = Position::from_fen("r3k2r/pppp1ppp/8/4p3/8/8/PPPPPPPP/R3K2R w KQq e6 0 1").unwrap();

        assert_ne!(pos.key(), other_side.key());
        assert_ne!(pos.key(), no_ep.key());
        assert_ne!(pos.key(), fewer_rights.key());
    }

    #[test]
    fn test_zobrist_key_updates_incrementally() {
        let mut pos = Position::default();
        let original_key = pos.key();

        for mv in ["b1a3", "b8a6", "a3b1"] {
            play(&mut pos, mv);
            assert_ne!(pos.key(), original_key);
            assert_eq!(pos.key(), ZobristKey::new(&pos));
        }

        // Transposing back into the starting position yields the starting key
        play(&mut pos, "a6b8");
        assert_eq!(pos.key(), original_key);

        for mv in ["e2e4", "d7d5", "e4d5", "e8d7", "d5d6", "c7d6"] {
            play(&mut pos, mv);
            assert_eq!(pos.key(), ZobristKey::new(&pos), "after {mv}");
        }
    }

    #[test]
    fn test_apply_undo_round_trip() {
        let mut pos = Position::from_fen(FEN_KIWIPETE).unwrap();
        let original = pos.clone();

        for mv in pos.clone().legal_moves(pos.side_to_move()) {
            let record = pos.apply(mv);
            assert_eq!(record.mv, mv);
            assert_eq!(pos.key(), ZobristKey::new(&pos), "after {mv:?}");

            let undone = pos.undo();
            assert_eq!(undone, Some(record));
            assert_eq!(pos, original, "after undoing {mv:?}");
        }
    }

    #[test]
    fn test_apply_undo_round_trip_for_side_not_to_move() {
        let mut pos = Position::from_fen(FEN_KIWIPETE).unwrap();
        let original = pos.clone();

        for mv in pos.clone().pseudo_legal_moves(Color::Black) {
            let record = pos.apply(mv);
            assert_eq!(record.side_to_move, Color::White);
            assert_eq!(pos.key(), ZobristKey::new(&pos), "after {mv:?}");

            pos.undo();
            assert_eq!(pos, original, "after undoing {mv:?}");
            assert_eq!(pos.side_to_move(), Color::White);
            assert_eq!(pos.key(), ZobristKey::new(&pos), "after undoing {mv:?}");
        }
    }

    #[test]
    fn test_undo_with_no_history() {
        let mut pos = Position::default();
        assert_eq!(pos.undo(), None);
        assert_eq!(pos, Position::default());
    }

    #[test]
    fn test_move_counters() {
        let mut pos = Position::default();
        play(&mut pos, "g1f3");
        assert_eq!((pos.halfmove(), pos.fullmove()), (1, 1));
        play(&mut pos, "g8f6");
        assert_eq!((pos.halfmove(), pos.fullmove()), (2, 2));
        play(&mut pos, "e2e4");
        assert_eq!((pos.halfmove(), pos.fullmove()), (0, 2));

        pos.undo();
        pos.undo();
        assert_eq!((pos.halfmove(), pos.fullmove()), (1, 1));
    }

    #[test]
    fn test_en_passant_removes_passed_pawn() {
        let mut pos = Position::from_fen("4k3/3p4/8/4P3/8/8/8/4K3 b - - 0 1").unwrap();
        let before = pos.clone();

        play(&mut pos, "d7d5");
        assert_eq!(pos.ep_square(), Some(Square::D6));

        let record = play(&mut pos, "e5d6");
        assert!(record.is_en_passant());
        assert_eq!(record.captured, Some(Piece::BLACK_PAWN));
        assert_eq!(record.captured_square, Square::D5);
        assert_eq!(pos.piece_at(Square::D5), None);
        assert_eq!(pos.piece_at(Square::D6), Some(Piece::WHITE_PAWN));
        assert_eq!(pos.ep_square(), None);

        pos.undo();
        assert_eq!(pos.piece_at(Square::D5), Some(Piece::BLACK_PAWN));
        assert_eq!(pos.piece_at(Square::E5), Some(Piece::WHITE_PAWN));
        assert_eq!(pos.ep_square(), Some(Square::D6));

        pos.undo();
        assert_eq!(pos, before);
    }

    #[test]
    fn test_en_passant_target_cleared_after_one_move() {
        let mut pos = Position::from_fen("4k3/3p4/8/4P3/8/8/8/4K3 b - - 0 1").unwrap();
        play(&mut pos, "d7d5");
        play(&mut pos, "e1f1");
        assert_eq!(pos.ep_square(), None);
        play(&mut pos, "e8f8");
        assert!(!pos.legal_moves(Color::White).iter().any(|mv| mv.is_en_passant()));
    }

    #[test]
    fn test_castling_moves_rook() {
        let mut pos = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let before = pos.clone();

        let record = play(&mut pos, "e1g1");
        assert!(record.is_castling());
        assert_eq!(pos.piece_at(Square::G1), Some(Piece::WHITE_KING));
        assert_eq!(pos.piece_at(Square::F1), Some(Piece::WHITE_ROOK));
        assert_eq!(pos.piece_at(Square::H1), None);
        assert_eq!(pos.king_square(Color::White), Square::G1);

        play(&mut pos, "e8c8");
        assert_eq!(pos.piece_at(Square::C8), Some(Piece::BLACK_KING));
        assert_eq!(pos.piece_at(Square::D8), Some(Piece::BLACK_ROOK));
        assert_eq!(pos.piece_at(Square::A8), None);

        pos.undo();
        pos.undo();
        assert_eq!(pos, before);
    }

    #[test]
    fn test_promotion_replaces_pawn() {
        let mut pos = Position::from_fen("8/4P3/8/8/8/8/k7/4K3 w - - 0 1").unwrap();
        let record = play(&mut pos, "e7e8n");
        assert_eq!(record.is_promotion(), Some(PieceKind::Knight));
        assert_eq!(pos.piece_at(Square::E8), Some(Piece::WHITE_KNIGHT));

        pos.undo();
        assert_eq!(pos.piece_at(Square::E7), Some(Piece::WHITE_PAWN));
        assert_eq!(pos.piece_at(Square::E8), None);
    }

    // Castling rights are lost when the King moves, when a Rook moves,
    // when a Rook is captured, and when castling is performed.

    #[test]
    fn test_castling_rights_update_on_king_move() {
        let mut pos = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let original_key = pos.key();

        play(&mut pos, "e1d1");
        assert_eq!(pos.castling_rights().to_string(), "kq");

        play(&mut pos, "e8f8");
        assert_eq!(pos.castling_rights().to_string(), "-");

        // Returning home does not restore them
        play(&mut pos, "d1e1");
        play(&mut pos, "f8e8");
        assert_eq!(pos.castling_rights().to_string(), "-");
        assert_ne!(pos.key(), original_key);
        assert_eq!(pos.key(), ZobristKey::new(&pos));
    }

    #[test]
    fn test_castling_rights_update_on_rook_move() {
        let mut pos = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();

        play(&mut pos, "a1b1");
        assert_eq!(pos.castling_rights().to_string(), "Kkq");

        play(&mut pos, "h8g8");
        assert_eq!(pos.castling_rights().to_string(), "Kq");

        play(&mut pos, "b1a1");
        play(&mut pos, "g8h8");
        assert_eq!(pos.castling_rights().to_string(), "Kq");
    }

    #[test]
    fn test_castling_rights_update_on_rook_captured() {
        let mut pos = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();

        // The capturing Rook leaves its own corner too
        play(&mut pos, "a1a8");
        assert_eq!(pos.castling_rights().to_string(), "Kk");
        assert_eq!(pos.key(), ZobristKey::new(&pos));

        play(&mut pos, "h8h1");
        assert_eq!(pos.castling_rights().to_string(), "-");
        assert_eq!(pos.key(), ZobristKey::new(&pos));
    }

    #[test]
    fn test_castling_rights_not_restored_by_new_rook() {
        let mut pos = Position::from_fen("4k2r/P7/8/8/r7/8/8/RB2K2R b KQk - 0 1").unwrap();
        assert_eq!(pos.castling_rights().to_string(), "KQk");

        play(&mut pos, "a4a1");
        assert_eq!(pos.castling_rights().to_string(), "Kk");

        play(&mut pos, "a7a8r");
        play(&mut pos, "e8e7");
        assert_eq!(pos.castling_rights().to_string(), "K");

        play(&mut pos, "a8a1");
        assert_eq!(pos.castling_rights().to_string(), "K");
        assert!(!pos.can_castle(Color::White, false));
    }
}
