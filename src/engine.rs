/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    io,
    sync::mpsc::{channel, Receiver, Sender},
    thread,
    time::{Duration, Instant},
};

use anyhow::{bail, Context, Result};

use crate::{
    perft, splitperft, Cli, EngineCommand, Evaluator, Move, Position, Search, SearchConfig,
    SearchContext, Square, TTable, FEN_KIWIPETE, MAX_DEPTH,
};

/// Depth of `go` when neither a depth nor a time limit is supplied.
const DEFAULT_GO_DEPTH: u8 = 5;

/// The Tadpole chess engine.
#[derive(Debug)]
pub struct Engine {
    /// The current state of the chess board, as known to the engine.
    ///
    /// This is modified whenever moves are played or new positions are given,
    /// and is reset whenever the engine is told to start a new game.
    position: Position,

    /// One half of a channel, responsible for sending commands to the engine to execute.
    sender: Sender<EngineCommand>,

    /// One half of a channel, responsible for receiving commands for the engine to execute.
    receiver: Receiver<EngineCommand>,

    /// Size of the transposition table of each search, in megabytes.
    hash_size_mb: usize,

    /// Depth of `go` if none is given.
    default_depth: Option<u8>,

    /// Time limit of `go` if none is given.
    default_movetime: Option<Duration>,
}

impl Engine {
    /// Constructs a new [`Engine`] instance to be executed with [`Engine::run`].
    pub fn new() -> Self {
        let (sender, receiver) = channel();

        Self {
            position: Position::default(),
            sender,
            receiver,
            hash_size_mb: TTable::DEFAULT_SIZE,
            default_depth: None,
            default_movetime: None,
        }
    }

    /// Constructs a new [`Engine`] configured by command-line arguments.
    ///
    /// Startup commands that fail to parse are reported and skipped.
    pub fn from_cli(cli: Cli) -> Self {
        let mut engine = Self::new();
        engine.hash_size_mb = cli.hash;
        engine.default_depth = cli.depth;
        engine.default_movetime = cli.movetime.map(Duration::from_millis);

        for command in cli.commands {
            match command.parse() {
                Ok(cmd) => engine.send_command(cmd),
                Err(err) => eprintln!("{err}"),
            }
        }

        engine
    }

    /// Returns a string of the engine's name and current version.
    pub fn name(&self) -> String {
        format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
    }

    /// The position the engine is currently on.
    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Sends an [`EngineCommand`] to the engine to be executed.
    pub fn send_command(&self, command: EngineCommand) {
        // The receiver lives as long as the engine, so this only fails while the engine is being dropped
        if let Err(err) = self.sender.send(command) {
            log::error!("Failed to queue command: {err}");
        }
    }

    /// Execute the main event loop for the engine.
    ///
    /// This function spawns a thread to handle input from `stdin` and waits on received commands.
    pub fn run(&mut self) -> Result<()> {
        log::info!("{} ready", self.name());

        // Spawn a separate thread for handling user input
        let sender = self.sender.clone();
        thread::spawn(|| {
            if let Err(err) = input_handler(sender) {
                log::debug!("Input handler thread stopping: {err:#}");
            }
        });

        // Loop on user input
        while let Ok(cmd) = self.receiver.recv() {
            if cmd == EngineCommand::Exit {
                break;
            }

            // Keep running, even on error
            if let Err(e) = self.execute(cmd) {
                eprintln!("Error: {e:#}");
            }
        }

        Ok(())
    }

    /// Executes a single [`EngineCommand`], printing its output to `stdout`.
    ///
    /// [`EngineCommand::Exit`] does nothing here; [`Engine::run`] handles it.
    pub fn execute(&mut self, cmd: EngineCommand) -> Result<()> {
        match cmd {
            EngineCommand::Display => println!("{:?}", self.position),

            EngineCommand::Eval { pretty } => self.eval(pretty),

            EngineCommand::Exit => {}

            EngineCommand::Fen => println!("{}", self.position.to_fen()),

            EngineCommand::Go { depth, movetime } => {
                let bestmove = self.go(depth, movetime.map(Duration::from_millis));
                let bestmove = bestmove.map_or(String::from("(none)"), |mv| mv.to_string());
                println!("bestmove {bestmove}");
            }

            EngineCommand::MakeMove { mv_string } => {
                self.position.play_uci(&mv_string)?;
            }

            EngineCommand::Moves {
                square,
                debug,
                sort,
            } => println!("{}", self.moves(square, debug, sort)),

            EngineCommand::NewGame => self.position = Position::default(),

            EngineCommand::Perft { depth } => {
                let start = Instant::now();
                let nodes = perft(&mut self.position, depth);
                log::debug!("perft({depth}) took {}ms", start.elapsed().as_millis());
                println!("{nodes}");
            }

            EngineCommand::Position { args } => self.set_position(&args)?,

            EngineCommand::Splitperft { depth } => {
                let nodes = splitperft(&mut self.position, depth);
                println!("\n{nodes}");
            }

            EngineCommand::Status => println!("{}", self.position.status()),

            EngineCommand::Undo => {
                if self.position.undo().is_none() {
                    println!("No moves to undo");
                }
            }

            EngineCommand::Valid { from, to } => {
                println!("{}", self.position.is_valid_move(from, to))
            }
        }

        Ok(())
    }

    /// Executes the `eval` command, printing an evaluation of the current position.
    fn eval(&self, pretty: bool) {
        let evaluator = Evaluator::new(&self.position);
        if pretty {
            println!("{evaluator}");
        } else {
            println!("{}", evaluator.eval());
        }
    }

    /// Executes the `moves` command, listing the legal moves in the current position.
    fn moves(&mut self, square: Option<Square>, debug: bool, sort: bool) -> String {
        let color = self.position.side_to_move();
        let mut moves = if let Some(square) = square {
            if let Some(piece) = self.position.piece_at(square) {
                if piece.color() != color {
                    return format!(
                        "(none: {square} holds a {} piece, {} to move)",
                        piece.color().name(),
                        color.name()
                    );
                }
            }
            self.position.legal_moves_from(square)
        } else {
            self.position.legal_moves(color)
        };

        // If there are none, print "(none)"
        if moves.is_empty() {
            return String::from("(none)");
        }

        if sort {
            moves.sort_by_cached_key(|mv| mv.to_string());
        }

        // Otherwise, join them by comma-space
        moves
            .into_iter()
            .map(|mv| if debug { format!("{mv:?}") } else { mv.to_string() })
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Searches the current position, falling back to the engine's defaults for unset limits.
    fn go(&mut self, depth: Option<u8>, movetime: Option<Duration>) -> Option<Move> {
        let depth = depth.or(self.default_depth);
        let movetime = movetime.or(self.default_movetime);

        let config = SearchConfig {
            max_depth: match (depth, movetime) {
                (Some(depth), _) => depth,
                (None, Some(_)) => MAX_DEPTH,
                (None, None) => DEFAULT_GO_DEPTH,
            },
            starttime: Instant::now(),
            time_limit: movetime.unwrap_or(Duration::MAX),
            hash_size_mb: self.hash_size_mb,
        };

        let mut context = SearchContext::new(config.hash_size_mb);
        Search::new(&mut self.position, &mut context, config)
            .start()
            .bestmove
    }

    /// Set the position from `args`, as described by [`EngineCommand::Position`].
    ///
    /// The current position is only replaced if every part of `args` is valid.
    fn set_position(&mut self, args: &[String]) -> Result<()> {
        let mut tokens = args.iter().map(String::as_str);

        let mut position = match tokens.next() {
            Some("startpos") => Position::default(),

            Some("kiwipete") => Position::from_fen(FEN_KIWIPETE)?,

            Some("fen") => {
                // `take_while` also consumes the `moves` keyword
                let fen = tokens
                    .by_ref()
                    .take_while(|&token| token != "moves")
                    .collect::<Vec<_>>()
                    .join(" ");

                Position::from_fen(&fen).with_context(|| format!("Invalid FEN {fen:?}"))?
            }

            Some(other) => bail!("Expected `startpos`, `kiwipete`, or `fen`. Got {other:?}"),

            None => bail!("Expected a position to set"),
        };

        let mut moves = tokens;
        if args[0] != "fen" {
            match moves.next() {
                None | Some("moves") => {}
                Some(other) => bail!("Expected `moves` after {:?}. Got {other:?}", args[0]),
            }
        }

        for mv in moves {
            position
                .play_uci(mv)
                .with_context(|| format!("Failed to apply move {mv:?}"))?;
        }

        self.position = position;
        Ok(())
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

/// Loops endlessly to await input via `stdin`, sending all successfully-parsed commands through the supplied `sender`.
fn input_handler(sender: Sender<EngineCommand>) -> Result<()> {
    let mut buffer = String::with_capacity(2048);

    loop {
        buffer.clear();
        let bytes = io::stdin()
            .read_line(&mut buffer)
            .context("Failed to read line from stdin")?;

        // For ctrl + d
        if 0 == bytes {
            sender
                .send(EngineCommand::Exit)
                .context("Failed to send 'exit' command after receiving empty input")?;

            bail!("Engine received input of 0 bytes and is quitting");
        }

        // Trim any leading/trailing whitespace
        let buf = buffer.trim();

        // Ignore empty lines
        if buf.is_empty() {
            continue;
        }

        match buf.parse::<EngineCommand>() {
            Ok(cmd) => sender
                .send(cmd)
                .context("Failed to send command to engine")?,

            // If an invalid command was received, just print the error and continue running
            Err(err) => eprintln!("{err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Color;

    fn run(engine: &mut Engine, commands: &[&str]) {
        for command in commands {
            engine.execute(command.parse().unwrap()).unwrap();
        }
    }

    #[test]
    fn test_position_command() {
        let mut engine = Engine::new();
        run(&mut engine, &["position startpos moves e2e4 e7e5"]);
        assert_eq!(engine.position().history().len(), 2);

        run(&mut engine, &["position fen 4k3/8/8/8/8/8/8/4K2R w K - 0 1 moves e1g1"]);
        assert_eq!(engine.position().to_fen(), "4k3/8/8/8/8/8/8/5RK1 b - - 1 1");

        run(&mut engine, &["position kiwipete"]);
        assert_eq!(engine.position().to_fen(), FEN_KIWIPETE);
    }

    #[test]
    fn test_bad_position_keeps_current() {
        let mut engine = Engine::new();
        run(&mut engine, &["position startpos moves d2d4"]);

        for bad in [
            "position startpos moves e2e5",
            "position fen 8/8/8 w - - 0 1",
            "position nowhere",
            "position startpos e2e4",
        ] {
            assert!(engine.execute(bad.parse().unwrap()).is_err(), "{bad}");
        }
        assert_eq!(engine.position().history().len(), 1);
    }

    #[test]
    fn test_makemove_and_undo() {
        let mut engine = Engine::new();
        run(&mut engine, &["makemove e2e4", "undo", "undo"]);
        assert_eq!(engine.position(), &Position::default());

        assert!(engine.execute("makemove e2e5".parse().unwrap()).is_err());
    }

    #[test]
    fn test_go_keeps_position() {
        let mut engine = Engine::new();
        let mv = engine.go(Some(2), None);
        assert!(mv.is_some());
        assert_eq!(engine.position(), &Position::default());
    }

    #[test]
    fn test_moves_listing() {
        let mut engine = Engine::new();
        assert_eq!(engine.moves(Some(Square::G1), false, true), "g1f3, g1h3");
        assert_eq!(engine.moves(Some(Square::E4), false, false), "(none)");
    }

    #[test]
    fn test_moves_for_opponent_piece() {
        let mut engine = Engine::new();
        assert_eq!(
            engine.moves(Some(Square::G8), false, true),
            "(none: g8 holds a black piece, white to move)"
        );
        assert_eq!(engine.position(), &Position::default());
        assert_eq!(engine.position().side_to_move(), Color::White);

        run(&mut engine, &["makemove e2e4"]);
        assert_eq!(engine.moves(Some(Square::G8), false, true), "g8f6, g8h6");
    }
}
