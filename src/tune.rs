/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// Score of checkmate on the board.
macro_rules! mate_score {
    () => {
        100_000
    };
}
pub(crate) use mate_score;

/// Maximum value a single history table entry can reach.
macro_rules! max_history_bonus {
    () => {
        16_384
    };
}
pub(crate) use max_history_bonus;

/// Minimum remaining depth at which Late Move Reductions are applied.
macro_rules! min_lmr_depth {
    () => {
        3
    };
}
pub(crate) use min_lmr_depth;

/// Number of moves searched at full depth before Late Move Reductions kick in.
macro_rules! min_lmr_moves {
    () => {
        4
    };
}
pub(crate) use min_lmr_moves;

/// Extra plies removed from a reduced move's search depth.
macro_rules! lmr_reduction {
    () => {
        1
    };
}
pub(crate) use lmr_reduction;

/// Base ordering score of any capture, placing captures above quiet moves.
macro_rules! capture_bonus {
    () => {
        1_000_000
    };
}
pub(crate) use capture_bonus;

/// Ordering bonus for promotions, on top of any capture bonus.
macro_rules! promotion_bonus {
    () => {
        900_000
    };
}
pub(crate) use promotion_bonus;

/// Ordering score of the first killer move at a ply. The second scores one less.
macro_rules! killer_bonus {
    () => {
        500_000
    };
}
pub(crate) use killer_bonus;

/// Default size of the transposition table, in megabytes.
macro_rules! default_hash_size {
    () => {
        16
    };
}
pub(crate) use default_hash_size;
