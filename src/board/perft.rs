/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use super::Position;

/// Counts the leaf nodes of the legal move tree of `position` to `depth`.
///
/// This performs bulk counting: at depth 1 it returns the number of legal moves
/// rather than applying each one just to count it.
///
/// # Example
/// ```
/// # use tadpole::*;
/// let mut pos = Position::default();
/// assert_eq!(perft(&mut pos, 2), 400);
/// assert_eq!(pos, Position::default());
/// ```
#[inline(always)]
pub fn perft(position: &mut Position, depth: usize) -> u64 {
    perft_generic::<true, false>(position, depth)
}

/// Same as [`perft`], but also prints the node count below each root move.
#[inline(always)]
pub fn splitperft(position: &mut Position, depth: usize) -> u64 {
    perft_generic::<true, true>(position, depth)
}

/// Generic version of [`perft`].
///
/// If `BULK` is set, depth 1 is counted without applying moves.
/// If `SPLIT` is set, the count for each root move is printed as `{move}\t{nodes}`.
pub fn perft_generic<const BULK: bool, const SPLIT: bool>(
    position: &mut Position,
    depth: usize,
) -> u64 {
    if depth == 0 {
        return 1;
    }

    let color = position.side_to_move();
    let moves = position.legal_moves(color);

    if BULK && !SPLIT && depth == 1 {
        return moves.len() as u64;
    }

    moves.into_iter().fold(0, |nodes, mv| {
        position.apply(mv);
        let new_nodes = perft_generic::<BULK, false>(position, depth - 1);
        position.undo();

        if SPLIT {
            println!("{mv}\t{new_nodes}");
        }

        nodes + new_nodes
    })
}
