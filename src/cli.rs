/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::str::FromStr;

use clap::Parser;

use crate::{Square, TTable};

/// Command-line arguments of the engine.
#[derive(Debug, Clone, Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Size of the transposition table, in megabytes. `0` disables it.
    #[arg(long, default_value_t = TTable::DEFAULT_SIZE)]
    pub hash: usize,

    /// Default maximum depth of `go`.
    #[arg(long)]
    pub depth: Option<u8>,

    /// Default time limit of `go`, in milliseconds.
    #[arg(long)]
    pub movetime: Option<u64>,

    /// Commands to execute on startup, such as `"position startpos moves e2e4" "go --depth 4"`.
    pub commands: Vec<String>,
}

/// A command to be sent to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(multicall = true, about, rename_all = "lower")]
pub enum EngineCommand {
    /// Print a visual representation of the current board state.
    #[command(alias = "d")]
    Display,

    /// Print an evaluation of the current position.
    Eval {
        /// If set, every term of the evaluation will be printed alongside the board.
        #[arg(short, long, default_value = "false")]
        pretty: bool,
    },

    /// Quit the engine.
    #[command(alias = "quit")]
    Exit,

    /// Generate and print a FEN string for the current position.
    Fen,

    /// Search the current position and print the best move found.
    Go {
        /// Maximum depth of the search.
        #[arg(short, long)]
        depth: Option<u8>,

        /// Time limit of the search, in milliseconds. Only checked between iterations.
        #[arg(short, long)]
        movetime: Option<u64>,
    },

    /// Apply the provided move to the position, if it is legal.
    #[command(alias = "move")]
    MakeMove { mv_string: String },

    /// Shows all legal moves for the side to move, or for one of its pieces.
    Moves {
        square: Option<Square>,

        /// If set, moves will be printed using their debug formatter, which displays what kind of move it is (quiet, en passant, etc.).
        #[arg(short, long, default_value = "false")]
        debug: bool,

        /// If set, moves will be sorted in alphabetical order.
        ///
        /// By default, moves are generated in no particular order.
        #[arg(short, long, default_value = "false")]
        sort: bool,
    },

    /// Reset the position to the standard starting position.
    #[command(alias = "ucinewgame")]
    NewGame,

    /// Performs a perft on the current position at the supplied depth, printing total node count.
    Perft { depth: usize },

    /// Set the position: `startpos`, `kiwipete`, or `fen <FEN>`, optionally followed by `moves <MOVES>...`
    #[command(alias = "pos")]
    Position {
        #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Performs a split perft on the current position at the supplied depth.
    #[command(alias = "sperft")]
    Splitperft { depth: usize },

    /// Print whether the game is ongoing, or how it ended.
    Status,

    /// Take back the most recent move.
    Undo,

    /// Print whether moving the piece on `from` to `to` is legal.
    Valid { from: Square, to: Square },
}

impl FromStr for EngineCommand {
    type Err = clap::Error;
    /// Attempt to parse an [`EngineCommand`] from a string.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_parse_from(s.split_ascii_whitespace())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!("d".parse::<EngineCommand>().unwrap(), EngineCommand::Display);
        assert_eq!(
            "go --depth 3".parse::<EngineCommand>().unwrap(),
            EngineCommand::Go {
                depth: Some(3),
                movetime: None
            }
        );
        assert_eq!(
            "moves e2".parse::<EngineCommand>().unwrap(),
            EngineCommand::Moves {
                square: Some(Square::E2),
                debug: false,
                sort: false
            }
        );
        assert_eq!(
            "valid e2 e4".parse::<EngineCommand>().unwrap(),
            EngineCommand::Valid {
                from: Square::E2,
                to: Square::E4
            }
        );

        let EngineCommand::Position { args } = "position fen 8/8/8/8/8/8/8/8 w - - 0 1 moves e2e4"
            .parse::<EngineCommand>()
            .unwrap()
        else {
            panic!("Expected a position command");
        };
        assert_eq!(args.len(), 9);

        assert!("frobnicate".parse::<EngineCommand>().is_err());
        assert!("moves z9".parse::<EngineCommand>().is_err());
    }

    #[test]
    fn test_cli_args() {
        let cli = Cli::try_parse_from(["tadpole", "--hash", "4", "go --depth 2", "exit"]).unwrap();
        assert_eq!(cli.hash, 4);
        assert_eq!(cli.depth, None);
        assert_eq!(cli.commands, vec!["go --depth 2", "exit"]);
    }
}
