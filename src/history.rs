/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use crate::{File, Move, PieceKind, Rank, Square, MAX_DEPTH};

/// Stores bonuses for moving a kind of piece to a square.
///
/// Used to keep track of quiet moves that caused cutoffs during search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryTable([[i32; Square::COUNT]; PieceKind::COUNT]);

impl HistoryTable {
    /// Clear the history table, removing all scores.
    #[inline(always)]
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Score of moving a `kind` to `to`.
    #[inline(always)]
    pub fn get(&self, kind: PieceKind, to: Square) -> i32 {
        self.0[kind][to]
    }

    /// Rewards a `kind` moving to `to` for causing a cutoff with `depth` plies remaining.
    ///
    /// The bonus is `depth * depth`, and no entry grows past `max`.
    ///
    /// # Example
    /// ```
    /// # use tadpole::*;
    /// let mut history = HistoryTable::default();
    /// history.update(PieceKind::Knight, Square::F3, 4, 100);
    /// assert_eq!(history.get(PieceKind::Knight, Square::F3), 16);
    ///
    /// history.update(PieceKind::Knight, Square::F3, 10, 100);
    /// assert_eq!(history.get(PieceKind::Knight, Square::F3), 100);
    /// ```
    #[inline(always)]
    pub fn update(&mut self, kind: PieceKind, to: Square, depth: u8, max: i32) {
        let bonus = depth as i32 * depth as i32;
        let entry = &mut self.0[kind][to];
        *entry = (*entry + bonus).min(max);
    }
}

impl Default for HistoryTable {
    #[inline(always)]
    fn default() -> Self {
        Self([[0; Square::COUNT]; PieceKind::COUNT])
    }
}

impl fmt::Display for HistoryTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for kind in PieceKind::all() {
            writeln!(f, "\t\t\t{:^5}", kind.name())?;

            write!(f, "  +")?;
            for _ in File::iter() {
                write!(f, "-----+")?;
            }
            writeln!(f)?;

            for rank in Rank::iter().rev() {
                write!(f, "{rank} |")?;
                for file in File::iter() {
                    let score = self.get(kind, Square::new(file, rank));
                    let score = if score == 0 {
                        String::new()
                    } else {
                        score.to_string()
                    };
                    write!(f, "{score:^5}|")?;
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
            writeln!(f, "\n")?;
        }

        Ok(())
    }
}

/// Number of killer moves kept per ply.
const NUM_KILLERS: usize = 2;

/// Quiet moves that caused a cutoff, remembered per ply.
///
/// Sibling nodes at the same ply often share a refutation, so these are tried early.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KillerTable([[Option<Move>; NUM_KILLERS]; MAX_DEPTH as usize + 1]);

impl KillerTable {
    /// Remove every killer move.
    #[inline(always)]
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Record `mv` as the newest killer at `ply`, evicting the oldest.
    ///
    /// # Example
    /// ```
    /// # use tadpole::*;
    /// let pos = Position::default();
    /// let [a, b, c] = ["e2e4", "d2d4", "g1f3"].map(|mv| Move::from_uci(&pos, mv).unwrap());
    ///
    /// let mut killers = KillerTable::default();
    /// killers.store(3, a);
    /// killers.store(3, b);
    /// killers.store(3, b);
    /// assert!(killers.contains(3, a) && killers.contains(3, b));
    ///
    /// killers.store(3, c);
    /// assert!(!killers.contains(3, a));
    /// assert!(!killers.contains(4, c));
    /// ```
    #[inline(always)]
    pub fn store(&mut self, ply: u8, mv: Move) {
        let Some(slots) = self.0.get_mut(ply as usize) else {
            return;
        };

        if slots[0] != Some(mv) {
            slots[1] = slots[0];
            slots[0] = Some(mv);
        }
    }

    /// Returns `true` if `mv` is a killer move at `ply`.
    #[inline(always)]
    pub fn contains(&self, ply: u8, mv: Move) -> bool {
        self.0
            .get(ply as usize)
            .is_some_and(|slots| slots.contains(&Some(mv)))
    }
}

impl Default for KillerTable {
    #[inline(always)]
    fn default() -> Self {
        Self([[None; NUM_KILLERS]; MAX_DEPTH as usize + 1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_clear() {
        let mut history = HistoryTable::default();
        history.update(PieceKind::Rook, Square::D1, 3, i32::MAX);
        history.update(PieceKind::Rook, Square::D1, 2, i32::MAX);
        assert_eq!(history.get(PieceKind::Rook, Square::D1), 13);
        assert_eq!(history.get(PieceKind::Queen, Square::D1), 0);

        history.clear();
        assert_eq!(history, HistoryTable::default());
    }
}
