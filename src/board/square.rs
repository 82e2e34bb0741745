/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    fmt,
    ops::{Index, IndexMut},
    str::FromStr,
};

use anyhow::{bail, Result};

use crate::Color;

/// A column of the board, `a` through `h`.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct File(u8);

impl File {
    pub const A: Self = Self(0);
    pub const B: Self = Self(1);
    pub const C: Self = Self(2);
    pub const D: Self = Self(3);
    pub const E: Self = Self(4);
    pub const F: Self = Self(5);
    pub const G: Self = Self(6);
    pub const H: Self = Self(7);

    pub const COUNT: usize = 8;

    /// Iterate over all files, from `a` to `h`.
    #[inline(always)]
    pub fn iter() -> impl DoubleEndedIterator<Item = Self> {
        (0..Self::COUNT as u8).map(Self)
    }

    /// Creates a [`File`] from a lowercase or uppercase char `a` through `h`.
    ///
    /// # Example
    /// ```
    /// # use tadpole::File;
    /// assert_eq!(File::from_char('c').unwrap(), File::C);
    /// assert!(File::from_char('z').is_err());
    /// ```
    #[inline(always)]
    pub fn from_char(file: char) -> Result<Self> {
        let file = file.to_ascii_lowercase();
        if !('a'..='h').contains(&file) {
            bail!("Invalid char for File: Must be between 'a' and 'h'. Got {file:?}");
        }
        Ok(Self(file as u8 - b'a'))
    }

    #[inline(always)]
    pub const fn char(&self) -> char {
        (b'a' + self.0) as char
    }

    #[inline(always)]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }

    /// Offset this file by `delta`, if the result stays on the board.
    #[inline(always)]
    pub const fn offset(&self, delta: i8) -> Option<Self> {
        let new = self.0 as i8 + delta;
        if 0 <= new && new < Self::COUNT as i8 {
            Some(Self(new as u8))
        } else {
            None
        }
    }
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.char())
    }
}

/// A row of the board, `1` through `8`.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct Rank(u8);

impl Rank {
    pub const ONE: Self = Self(0);
    pub const TWO: Self = Self(1);
    pub const THREE: Self = Self(2);
    pub const FOUR: Self = Self(3);
    pub const FIVE: Self = Self(4);
    pub const SIX: Self = Self(5);
    pub const SEVEN: Self = Self(6);
    pub const EIGHT: Self = Self(7);

    pub const COUNT: usize = 8;

    /// Iterate over all ranks, from `1` to `8`.
    #[inline(always)]
    pub fn iter() -> impl DoubleEndedIterator<Item = Self> {
        (0..Self::COUNT as u8).map(Self)
    }

    /// The back rank of `color`.
    #[inline(always)]
    pub const fn first(color: Color) -> Self {
        match color {
            Color::White => Self::ONE,
            Color::Black => Self::EIGHT,
        }
    }

    /// The rank `color`'s pawns start on.
    #[inline(always)]
    pub const fn pawn_start(color: Color) -> Self {
        match color {
            Color::White => Self::TWO,
            Color::Black => Self::SEVEN,
        }
    }

    /// The rank `color`'s pawns promote on.
    #[inline(always)]
    pub const fn promotion(color: Color) -> Self {
        match color {
            Color::White => Self::EIGHT,
            Color::Black => Self::ONE,
        }
    }

    /// Creates a [`Rank`] from a char `1` through `8`.
    #[inline(always)]
    pub fn from_char(rank: char) -> Result<Self> {
        if !('1'..='8').contains(&rank) {
            bail!("Invalid char for Rank: Must be between '1' and '8'. Got {rank:?}");
        }
        Ok(Self(rank as u8 - b'1'))
    }

    #[inline(always)]
    pub const fn char(&self) -> char {
        (b'1' + self.0) as char
    }

    #[inline(always)]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }

    /// Offset this rank by `delta`, if the result stays on the board.
    #[inline(always)]
    pub const fn offset(&self, delta: i8) -> Option<Self> {
        let new = self.0 as i8 + delta;
        if 0 <= new && new < Self::COUNT as i8 {
            Some(Self(new as u8))
        } else {
            None
        }
    }

    /// This rank as seen from `color`'s side of the board.
    #[inline(always)]
    pub const fn relative_to(self, color: Color) -> Self {
        match color {
            Color::White => self,
            Color::Black => Self(7 - self.0),
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.char())
    }
}

/// One of the 64 squares of the board.
///
/// Stored as `rank * 8 + file`, so `A1` is `0` and `H8` is `63`.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square(u8);

impl Square {
    pub const A1: Self = Self::new(File::A, Rank::ONE);
    pub const A2: Self = Self::new(File::A, Rank::TWO);
    pub const A3: Self = Self::new(File::A, Rank::THREE);
    pub const A4: Self = Self::new(File::A, Rank::FOUR);
    pub const A5: Self = Self::new(File::A, Rank::FIVE);
    pub const A6: Self = Self::new(File::A, Rank::SIX);
    pub const A7: Self = Self::new(File::A, Rank::SEVEN);
    pub const A8: Self = Self::new(File::A, Rank::EIGHT);

    pub const B1: Self = Self::new(File::B, Rank::ONE);
    pub const B2: Self = Self::new(File::B, Rank::TWO);
    pub const B3: Self = Self::new(File::B, Rank::THREE);
    pub const B4: Self = Self::new(File::B, Rank::FOUR);
    pub const B5: Self = Self::new(File::B, Rank::FIVE);
    pub const B6: Self = Self::new(File::B, Rank::SIX);
    pub const B7: Self = Self::new(File::B, Rank::SEVEN);
    pub const B8: Self = Self::new(File::B, Rank::EIGHT);

    pub const C1: Self = Self::new(File::C, Rank::ONE);
    pub const C2: Self = Self::new(File::C, Rank::TWO);
    pub const C3: Self = Self::new(File::C, Rank::THREE);
    pub const C4: Self = Self::new(File::C, Rank::FOUR);
    pub const C5: Self = Self::new(File::C, Rank::FIVE);
    pub const C6: Self = Self::new(File::C, Rank::SIX);
    pub const C7: Self = Self::new(File::C, Rank::SEVEN);
    pub const C8: Self = Self::new(File::C, Rank::EIGHT);

    pub const D1: Self = Self::new(File::D, Rank::ONE);
    pub const D2: Self = Self::new(File::D, Rank::TWO);
    pub const D3: Self = Self::new(File::D, Rank::THREE);
    pub const D4: Self = Self::new(File::D, Rank::FOUR);
    pub const D5: Self = Self::new(File::D, Rank::FIVE);
    pub const D6: Self = Self::new(File::D, Rank::SIX);
    pub const D7: Self = Self::new(File::D, Rank::SEVEN);
    pub const D8: Self = Self::new(File::D, Rank::EIGHT);

    pub const E1: Self = Self::new(File::E, Rank::ONE);
    pub const E2: Self = Self::new(File::E, Rank::TWO);
    pub const E3: Self = Self::new(File::E, Rank::THREE);
    pub const E4: Self = Self::new(File::E, Rank::FOUR);
    pub const E5: Self = Self::new(File::E, Rank::FIVE);
    pub const E6: Self = Self::new(File::E, Rank::SIX);
    pub const E7: Self = Self::new(File::E, Rank::SEVEN);
    pub const E8: Self = Self::new(File::E, Rank::EIGHT);

    pub const F1: Self = Self::new(File::F, Rank::ONE);
    pub const F2: Self = Self::new(File::F, Rank::TWO);
    pub const F3: Self = Self::new(File::F, Rank::THREE);
    pub const F4: Self = Self::new(File::F, Rank::FOUR);
    pub const F5: Self = Self::new(File::F, Rank::FIVE);
    pub const F6: Self = Self::new(File::F, Rank::SIX);
    pub const F7: Self = Self::new(File::F, Rank::SEVEN);
    pub const F8: Self = Self::new(File::F, Rank::EIGHT);

    pub const G1: Self = Self::new(File::G, Rank::ONE);
    pub const G2: Self = Self::new(File::G, Rank::TWO);
    pub const G3: Self = Self::new(File::G, Rank::THREE);
    pub const G4: Self = Self::new(File::G, Rank::FOUR);
    pub const G5: Self = Self::new(File::G, Rank::FIVE);
    pub const G6: Self = Self::new(File::G, Rank::SIX);
    pub const G7: Self = Self::new(File::G, Rank::SEVEN);
    pub const G8: Self = Self::new(File::G, Rank::EIGHT);

    pub const H1: Self = Self::new(File::H, Rank::ONE);
    pub const H2: Self = Self::new(File::H, Rank::TWO);
    pub const H3: Self = Self::new(File::H, Rank::THREE);
    pub const H4: Self = Self::new(File::H, Rank::FOUR);
    pub const H5: Self = Self::new(File::H, Rank::FIVE);
    pub const H6: Self = Self::new(File::H, Rank::SIX);
    pub const H7: Self = Self::new(File::H, Rank::SEVEN);
    pub const H8: Self = Self::new(File::H, Rank::EIGHT);

    pub const COUNT: usize = 64;

    /// Iterate over all squares, from `A1` to `H8`.
    #[inline(always)]
    pub fn iter() -> impl DoubleEndedIterator<Item = Self> {
        (0..Self::COUNT as u8).map(Self)
    }

    #[inline(always)]
    pub const fn new(file: File, rank: Rank) -> Self {
        Self(rank.0 * 8 + file.0)
    }

    /// Creates a [`Square`] from an index in `[0, 64)`.
    #[inline(always)]
    pub fn from_index(index: usize) -> Result<Self> {
        if index >= Self::COUNT {
            bail!("Invalid index for Square: Must be less than 64. Got {index}");
        }
        Ok(Self(index as u8))
    }

    /// Creates a [`Square`] from an index without bounds checking.
    ///
    /// Only the lowest 6 bits of `index` are used.
    #[inline(always)]
    pub(crate) const fn from_index_unchecked(index: usize) -> Self {
        Self((index & 63) as u8)
    }

    /// Creates a [`Square`] from display coordinates, where row `0` is the eighth rank and column `0` is the `a` file.
    ///
    /// # Example
    /// ```
    /// # use tadpole::Square;
    /// assert_eq!(Square::from_row_col(0, 0), Some(Square::A8));
    /// assert_eq!(Square::from_row_col(7, 4), Some(Square::E1));
    /// assert_eq!(Square::from_row_col(8, 0), None);
    /// ```
    #[inline(always)]
    pub const fn from_row_col(row: usize, col: usize) -> Option<Self> {
        if row < 8 && col < 8 {
            Some(Self(((7 - row) * 8 + col) as u8))
        } else {
            None
        }
    }

    /// Display coordinates of this square; the inverse of [`Square::from_row_col`].
    #[inline(always)]
    pub const fn row_col(&self) -> (usize, usize) {
        (7 - self.rank().index(), self.file().index())
    }

    #[inline(always)]
    pub const fn file(&self) -> File {
        File(self.0 % 8)
    }

    #[inline(always)]
    pub const fn rank(&self) -> Rank {
        Rank(self.0 / 8)
    }

    #[inline(always)]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }

    /// Flip the rank of this square if `color` is Black, so tables written from White's side can be read by Black.
    ///
    /// # Example
    /// ```
    /// # use tadpole::{Color, Square};
    /// assert_eq!(Square::B2.rank_relative_to(Color::White), Square::B2);
    /// assert_eq!(Square::B2.rank_relative_to(Color::Black), Square::B7);
    /// ```
    #[inline(always)]
    pub const fn rank_relative_to(self, color: Color) -> Self {
        match color {
            Color::White => self,
            Color::Black => Self(self.0 ^ 56),
        }
    }

    /// Attempt to offset this [`Square`] by the file and rank offsets.
    ///
    /// Returns `None` if the result would fall off the board.
    ///
    /// # Example
    /// ```
    /// # use tadpole::Square;
    /// assert_eq!(Square::C4.offset(1, 1), Some(Square::D5));
    /// assert_eq!(Square::C4.offset(-1, -1), Some(Square::B3));
    /// assert_eq!(Square::A1.offset(-1, -1), None);
    /// ```
    #[inline(always)]
    pub const fn offset(&self, file_delta: i8, rank_delta: i8) -> Option<Self> {
        let Some(file) = self.file().offset(file_delta) else {
            return None;
        };
        let Some(rank) = self.rank().offset(rank_delta) else {
            return None;
        };
        Some(Self::new(file, rank))
    }

    /// The square `n` ranks ahead of this one, from `color`'s point of view.
    ///
    /// # Example
    /// ```
    /// # use tadpole::{Color, Square};
    /// assert_eq!(Square::C4.forward_by(Color::White, 1), Some(Square::C5));
    /// assert_eq!(Square::C4.forward_by(Color::Black, 2), Some(Square::C2));
    /// ```
    #[inline(always)]
    pub const fn forward_by(&self, color: Color, n: i8) -> Option<Self> {
        self.offset(0, color.forward() * n)
    }

    /// The square `n` ranks behind this one, from `color`'s point of view.
    #[inline(always)]
    pub const fn backward_by(&self, color: Color, n: i8) -> Option<Self> {
        self.offset(0, -color.forward() * n)
    }

    /// Parses a square in algebraic notation, such as `"e4"`.
    ///
    /// # Example
    /// ```
    /// # use tadpole::Square;
    /// assert_eq!(Square::from_uci("c4").unwrap(), Square::C4);
    /// assert!(Square::from_uci("z0").is_err());
    /// ```
    #[inline(always)]
    pub fn from_uci(square: &str) -> Result<Self> {
        let mut chars = square.chars();
        let (Some(file), Some(rank), None) = (chars.next(), chars.next(), chars.next()) else {
            bail!("Invalid Square string: String must contain exactly 2 characters. Got {square:?}")
        };

        Ok(Self::new(File::from_char(file)?, Rank::from_char(rank)?))
    }

    #[inline(always)]
    pub fn to_uci(self) -> String {
        format!("{}{}", self.file(), self.rank())
    }
}

impl FromStr for Square {
    type Err = anyhow::Error;
    #[inline(always)]
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_uci(s)
    }
}

impl<T> Index<Square> for [T; Square::COUNT] {
    type Output = T;
    #[inline(always)]
    fn index(&self, index: Square) -> &Self::Output {
        &self[index.index()]
    }
}

impl<T> IndexMut<Square> for [T; Square::COUNT] {
    #[inline(always)]
    fn index_mut(&mut self, index: Square) -> &mut Self::Output {
        &mut self[index.index()]
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file(), self.rank())
    }
}

impl fmt::Debug for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self} ({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_col_round_trip() {
        for square in Square::iter() {
            let (row, col) = square.row_col();
            assert_eq!(Square::from_row_col(row, col), Some(square));
        }
        assert_eq!(Square::E2.row_col(), (6, 4));
    }

    #[test]
    fn test_uci_parsing() {
        assert_eq!("h8".parse::<Square>().unwrap(), Square::H8);
        assert_eq!(Square::A1.to_uci(), "a1");
        assert!(Square::from_uci("a").is_err());
        assert!(Square::from_uci("a9").is_err());
        assert!(Square::from_uci("e44").is_err());
    }
}
