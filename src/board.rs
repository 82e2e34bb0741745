/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// Attack detection, castling and en passant rules, and game-end detection.
mod attacks;

/// Movement patterns of each piece, ignoring check.
mod geometry;

/// Pseudo-legal and legal move generation.
mod movegen;

/// Compact representation of a single move.
mod moves;

/// Performance testing of move generation.
mod perft;

/// Colors, pieces, and their kinds.
mod piece;

/// The board, castling rights, and the position with its move history.
mod position;

/// Files, ranks, and squares.
mod square;

/// Misc constants and type aliases.
mod utils;

/// Zobrist hashing of positions.
mod zobrist;

pub use geometry::SquareList;
pub use moves::*;
pub use perft::*;
pub use piece::*;
pub use position::*;
pub use square::*;
pub use utils::*;
pub use zobrist::*;
