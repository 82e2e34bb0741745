/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use crate::{Board, CastlingRights, Color, Piece, Position, Rank, Square};

/// Hash keys for every component of a [`Position`].
///
/// Generated at compile time, so keys are identical between runs.
const ZOBRIST_TABLE: ZobristHashTable = ZobristHashTable::new();

/// Seed for the key generator.
const SEED: u64 = 0x7AD9_01E5_C0FF_EE42;

/// A key identifying a [`Position`], built by XOR-ing together keys for each of its components.
///
/// Two positions with the same pieces, side to move, castling rights, and en passant square share a key.
#[derive(Default, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Copy)]
pub struct ZobristKey(u64);

impl ZobristKey {
    /// Computes the key of `position` from scratch.
    ///
    /// # Example
    /// ```
    /// # use tadpole::*;
    /// let pos = Position::default();
    /// assert_eq!(ZobristKey::new(&pos), pos.key());
    /// assert_ne!(pos.key().inner(), 0);
    /// ```
    #[inline(always)]
    pub fn new(position: &Position) -> Self {
        Self::from_parts(
            position.board(),
            position.ep_square(),
            position.castling_rights(),
            position.side_to_move(),
        )
    }

    /// Computes a key from the individual components of a [`Position`].
    pub fn from_parts(
        board: &Board,
        ep_square: Option<Square>,
        castling_rights: CastlingRights,
        side_to_move: Color,
    ) -> Self {
        let mut key = Self::default();

        for (square, piece) in board.iter() {
            key.hash_piece(square, piece);
        }

        key.hash_optional_ep_square(ep_square);
        key.hash_castling_rights(castling_rights);
        key.hash_side_to_move(side_to_move);

        key
    }

    /// The raw `u64` of this key.
    #[inline(always)]
    pub const fn inner(&self) -> u64 {
        self.0
    }

    /// Toggles `hash_key` in this key. Hashing the same value twice undoes it.
    #[inline(always)]
    pub fn hash(&mut self, hash_key: u64) {
        self.0 ^= hash_key;
    }

    /// Toggles `piece` standing on `square`.
    ///
    /// # Example
    /// ```
    /// # use tadpole::*;
    /// let mut a = ZobristKey::default();
    /// a.hash_piece(Square::E4, Piece::WHITE_KNIGHT);
    ///
    /// let mut b = ZobristKey::default();
    /// b.hash_piece(Square::E4, Piece::BLACK_KNIGHT);
    /// assert_ne!(a, b);
    ///
    /// a.hash_piece(Square::E4, Piece::WHITE_KNIGHT);
    /// assert_eq!(a, ZobristKey::default());
    /// ```
    #[inline(always)]
    pub fn hash_piece(&mut self, square: Square, piece: Piece) {
        self.hash(ZOBRIST_TABLE.piece_keys[square][piece]);
    }

    /// Toggles the en passant target `ep_square`.
    ///
    /// Only squares on the third and sixth ranks carry a key; all others hash to nothing.
    #[inline(always)]
    pub fn hash_ep_square(&mut self, ep_square: Square) {
        self.hash(ZOBRIST_TABLE.ep_keys[ep_square]);
    }

    /// Same as [`ZobristKey::hash_ep_square`], doing nothing for `None`.
    #[inline(always)]
    pub fn hash_optional_ep_square(&mut self, ep_square: Option<Square>) {
        if let Some(ep_square) = ep_square {
            self.hash_ep_square(ep_square);
        }
    }

    /// Toggles a full set of castling rights.
    #[inline(always)]
    pub fn hash_castling_rights(&mut self, castling_rights: CastlingRights) {
        self.hash(ZOBRIST_TABLE.castling_keys[castling_rights.index()]);
    }

    /// Toggles the side to move. White's key is `0`.
    ///
    /// # Example
    /// ```
    /// # use tadpole::*;
    /// let mut key = ZobristKey::default();
    /// key.hash_side_to_move(Color::White);
    /// assert_eq!(key, ZobristKey::default());
    ///
    /// key.hash_side_to_move(Color::Black);
    /// assert_ne!(key, ZobristKey::default());
    /// ```
    #[inline(always)]
    pub fn hash_side_to_move(&mut self, color: Color) {
        self.hash(ZOBRIST_TABLE.color_key[color]);
    }
}

impl fmt::Display for ZobristKey {
    #[inline(always)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

/// All keys used for Zobrist hashing.
struct ZobristHashTable {
    /// One key for every piece on every square.
    piece_keys: [[u64; Piece::COUNT]; Square::COUNT],

    /// One key for every square on which an en passant target can appear.
    ep_keys: [u64; Square::COUNT],

    /// One key for every combination of castling rights.
    castling_keys: [u64; CastlingRights::COUNT],

    /// Black's key for side to move. White's is `0`.
    color_key: [u64; Color::COUNT],
}

impl ZobristHashTable {
    const fn new() -> Self {
        let mut piece_keys = [[0; Piece::COUNT]; Square::COUNT];
        let mut ep_keys = [0; Square::COUNT];
        let mut castling_keys = [0; CastlingRights::COUNT];
        let mut color_key = [0; Color::COUNT];

        let mut state = SEED;

        let mut i = 0;
        while i < Square::COUNT {
            let mut j = 0;
            while j < Piece::COUNT {
                let key;
                (key, state) = splitmix64(state);
                piece_keys[i][j] = key;
                j += 1;
            }

            let rank = Square::from_index_unchecked(i).rank().index();
            if rank == Rank::THREE.index() || rank == Rank::SIX.index() {
                let key;
                (key, state) = splitmix64(state);
                ep_keys[i] = key;
            }

            i += 1;
        }

        i = 0;
        while i < CastlingRights::COUNT {
            let key;
            (key, state) = splitmix64(state);
            castling_keys[i] = key;
            i += 1;
        }

        let (key, _) = splitmix64(state);
        color_key[Color::Black.index()] = key;

        Self {
            piece_keys,
            ep_keys,
            castling_keys,
            color_key,
        }
    }
}

/// One step of the [SplitMix64](https://prng.di.unimi.it/splitmix64.c) generator, returning `(output, next_state)`.
const fn splitmix64(state: u64) -> (u64, u64) {
    let state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    (z ^ (z >> 31), state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_distinct() {
        let mut keys = Vec::new();
        for square in ZOBRIST_TABLE.piece_keys {
            keys.extend(square);
        }
        keys.extend(ZOBRIST_TABLE.ep_keys.iter().filter(|&&k| k != 0));
        keys.extend(ZOBRIST_TABLE.castling_keys);
        keys.push(ZOBRIST_TABLE.color_key[Color::Black]);

        let total = keys.len();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), total);
        assert_eq!(total, 64 * 12 + 16 + 16 + 1);
    }

    #[test]
    fn test_ep_keys_only_on_ranks_three_and_six() {
        for square in Square::iter() {
            let has_key = ZOBRIST_TABLE.ep_keys[square] != 0;
            let expected = square.rank() == Rank::THREE || square.rank() == Rank::SIX;
            assert_eq!(has_key, expected, "{square}");
        }
    }
}
