/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use crate::{tune, Color};

/// Maximum depth, in plies, that a search will ever reach.
pub const MAX_DEPTH: u8 = u8::MAX / 2;

/// A numerical representation of the evaluation of a position, in ["centipawns"](https://www.chessprogramming.org/Score).
///
/// Scores are White-relative: positive values favor White and negative values favor Black.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Score(pub i32);

impl Score {
    /// Score of checkmate on the board.
    pub const MATE: Self = Self(tune::mate_score!());

    /// Larger than any score a search can return; used as the initial window.
    pub const INF: Self = Self(Self::MATE.0 + 1);

    /// Score of a draw.
    pub const DRAW: Self = Self(0);

    /// Lowest possible score for mate.
    ///
    /// This is only obtainable if mate is possible in [`MAX_DEPTH`] plies.
    pub const LOWEST_MATE: Self = Self(Self::MATE.0 - MAX_DEPTH as i32);

    /// Score of `color` being checkmated `ply` plies from the root.
    ///
    /// Closer mates score further from zero, so the winning side prefers the fastest mate
    /// and the losing side the slowest.
    ///
    /// # Example
    /// ```
    /// # use tadpole::*;
    /// assert!(Score::mated(Color::Black, 1) > Score::mated(Color::Black, 3));
    /// assert!(Score::mated(Color::White, 2).is_mate());
    /// ```
    #[inline(always)]
    pub const fn mated(color: Color, ply: u8) -> Self {
        Self(-color.negation_multiplier() * (Self::MATE.0 - ply as i32))
    }

    /// Returns `true` if the score is a mate score.
    #[inline(always)]
    pub const fn is_mate(&self) -> bool {
        self.0.abs() >= Self::LOWEST_MATE.0
    }

    /// Returns the number of plies (half moves) this score is from mate.
    #[inline(always)]
    pub const fn plies_to_mate(&self) -> i32 {
        Self::MATE.0 - self.0.abs()
    }

    /// Normalize the score to the provided ply.
    ///
    /// Mate distances become relative to the node at `ply`, for storing in a transposition table.
    #[inline(always)]
    pub fn relative(self, ply: u8) -> Self {
        let ply = ply as i32;
        if !self.is_mate() {
            self
        } else if self > Self::DRAW {
            self + ply
        } else {
            self - ply
        }
    }

    /// De-normalize the score from the provided ply.
    ///
    /// Inverse of [`Score::relative`]: mate distances become relative to the root again.
    #[inline(always)]
    pub fn absolute(self, ply: u8) -> Self {
        let ply = ply as i32;
        if !self.is_mate() {
            self
        } else if self > Self::DRAW {
            self - ply
        } else {
            self + ply
        }
    }

    /// Returns the absolute value of this [`Score`].
    #[inline(always)]
    pub const fn abs(self) -> Self {
        Self(self.0.abs())
    }

    /// This score from `color`'s point of view, so that higher is always better for `color`.
    #[inline(always)]
    pub const fn relative_to(self, color: Color) -> Self {
        Self(self.0 * color.negation_multiplier())
    }

    /// The score as pawns rather than centipawns.
    #[inline(always)]
    pub fn normalize(&self) -> f32 {
        self.0 as f32 / 100.0
    }
}

macro_rules! impl_binary_op {
    ($trait:tt, $fn:ident) => {
        impl std::ops::$trait for Score {
            type Output = Self;

            #[inline(always)]
            fn $fn(self, rhs: Self) -> Self::Output {
                Self(self.0.$fn(rhs.0))
            }
        }

        impl std::ops::$trait<i32> for Score {
            type Output = Self;

            #[inline(always)]
            fn $fn(self, rhs: i32) -> Self::Output {
                Self(self.0.$fn(rhs))
            }
        }
    };
}

macro_rules! impl_binary_op_assign {
    ($trait:tt, $fn:ident) => {
        impl std::ops::$trait for Score {
            #[inline(always)]
            fn $fn(&mut self, rhs: Self) {
                self.0.$fn(rhs.0);
            }
        }

        impl std::ops::$trait<i32> for Score {
            #[inline(always)]
            fn $fn(&mut self, rhs: i32) {
                self.0.$fn(rhs);
            }
        }
    };
}

impl_binary_op!(Add, add);
impl_binary_op!(Sub, sub);
impl_binary_op!(Mul, mul);
impl_binary_op!(Div, div);

impl_binary_op_assign!(AddAssign, add_assign);
impl_binary_op_assign!(SubAssign, sub_assign);

impl std::ops::Neg for Score {
    type Output = Self;

    #[inline(always)]
    fn neg(self) -> Self::Output {
        Self(self.0.neg())
    }
}

impl PartialEq<i32> for Score {
    fn eq(&self, other: &i32) -> bool {
        self.0.eq(other)
    }
}

impl PartialOrd<i32> for Score {
    fn partial_cmp(&self, other: &i32) -> Option<std::cmp::Ordering> {
        self.0.partial_cmp(other)
    }
}

impl fmt::Display for Score {
    #[inline(always)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_mate() {
            let winner = if self.0 > 0 { "white" } else { "black" };
            write!(f, "mate ({winner}) in {} plies", self.plies_to_mate())
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl fmt::Debug for Score {
    #[inline(always)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_mate() {
            write!(f, "{} (mate in {} plies)", self.0, self.plies_to_mate())
        } else {
            write!(f, "{}", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_absolute() {
        let plies = 3;

        let our_mate = Score::MATE - plies as i32;
        assert_eq!(our_mate.plies_to_mate(), plies as i32);

        let their_mate = -(Score::MATE - plies as i32);
        assert_eq!(their_mate.plies_to_mate(), plies as i32);

        assert_eq!(our_mate.relative(plies), Score::MATE);
        assert_eq!(their_mate.relative(plies), -Score::MATE);

        assert_eq!(our_mate.relative(plies).absolute(plies), our_mate);
        assert_eq!(their_mate.relative(plies).absolute(plies), their_mate);
    }

    #[test]
    fn test_non_mate_scores_ignore_ply() {
        let score = Score(250);
        assert!(!score.is_mate());
        assert_eq!(score.relative(10), score);
        assert_eq!(score.absolute(10), score);
    }

    #[test]
    fn test_mated_sign() {
        assert!(Score::mated(Color::White, 0) < Score::DRAW);
        assert!(Score::mated(Color::Black, 0) > Score::DRAW);
        assert_eq!(Score::mated(Color::Black, 0), Score::MATE);
        assert!(Score::INF > Score::MATE);
    }
}
