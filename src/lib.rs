/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// The board, its rules, and move generation.
mod board;

/// Command-line arguments and engine commands.
mod cli;

/// Code related to the engine's functionality, such as user input handling.
mod engine;

/// Evaluation of chess positions.
mod eval;

/// History and killer tables for move ordering.
mod history;

/// Ordering of moves during search.
mod movepicker;

/// Piece-Square tables.
mod psqt;

/// Scores of positions, including mate scores.
mod score;

/// Main engine logic; all search related code.
mod search;

/// Transposition table.
mod ttable;

/// Tunable constants.
mod tune;

pub use board::*;
pub use cli::*;
pub use engine::*;
pub use eval::*;
pub use history::*;
pub use movepicker::*;
pub use psqt::*;
pub use score::*;
pub use search::*;
pub use ttable::*;
