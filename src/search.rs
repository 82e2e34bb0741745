/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::time::{Duration, Instant};

use crate::{
    movepicker::score_move, tune, Color, EvalWeights, Evaluator, HistoryTable, KillerTable, Move,
    MovePicker, Position, Score, TTable, TTableEntry, ZobristKey, MAX_DEPTH,
};

/// Bounds within an alpha-beta search.
///
/// Scores are White-relative, so White raises `alpha` and Black lowers `beta`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchBounds {
    /// Lower bound.
    ///
    /// White is guaranteed a score that is AT LEAST `alpha`.
    pub alpha: Score,

    /// Upper bound.
    ///
    /// Black is guaranteed a score that is AT MOST `beta`.
    pub beta: Score,
}

impl SearchBounds {
    /// Create a new [`SearchBounds`] from the provided `alpha` and `beta` values.
    #[inline(always)]
    pub const fn new(alpha: Score, beta: Score) -> Self {
        Self { alpha, beta }
    }

    /// Returns `true` if no score can fall strictly within these bounds.
    #[inline(always)]
    pub fn is_closed(&self) -> bool {
        self.beta <= self.alpha
    }
}

impl Default for SearchBounds {
    /// Default [`SearchBounds`] are a `(-infinity, infinity)`.
    #[inline(always)]
    fn default() -> Self {
        Self::new(-Score::INF, Score::INF)
    }
}

/// The result of a search, containing the best move found, score, and total nodes searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SearchResult {
    /// Number of nodes searched.
    pub nodes: u64,

    /// Deepest iteration that completed.
    pub depth: u8,

    /// Best move found during the search.
    pub bestmove: Option<Move>,

    /// White-relative evaluation of the position when `bestmove` is played.
    pub score: Score,
}

impl Default for SearchResult {
    #[inline(always)]
    fn default() -> Self {
        Self {
            nodes: 0,
            depth: 0,
            bestmove: None,
            score: Score::DRAW,
        }
    }
}

/// Configuration variables for executing a [`Search`].
#[derive(Debug, Clone, Copy)]
pub struct SearchConfig {
    /// Maximum depth to execute the search. Clamped to `1..=MAX_DEPTH`.
    pub max_depth: u8,

    /// Start time of the search.
    pub starttime: Instant,

    /// Wall-clock budget of the search.
    ///
    /// Only checked between iterations of iterative deepening, so a search may overrun it by up to one iteration.
    pub time_limit: Duration,

    /// Size of the transposition table, in megabytes. `0` disables it.
    pub hash_size_mb: usize,
}

impl Default for SearchConfig {
    /// A default [`SearchConfig`] will permit an "infinite" search.
    #[inline(always)]
    fn default() -> Self {
        Self {
            max_depth: MAX_DEPTH,
            starttime: Instant::now(),
            time_limit: Duration::MAX,
            hash_size_mb: TTable::DEFAULT_SIZE,
        }
    }
}

/// Parameters for the various features used to enhance the efficiency of a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchParameters {
    /// Minimum depth at which to apply late move reductions.
    ///
    /// Setting this to `u8::MAX` disables them.
    pub min_lmr_depth: u8,

    /// Number of moves that must be searched before late move reductions can be applied.
    pub min_lmr_moves: usize,

    /// Extra plies removed from a reduced move's depth.
    pub lmr_reduction: u8,

    /// Largest value a history entry can reach.
    pub max_history: i32,
}

impl Default for SearchParameters {
    fn default() -> Self {
        Self {
            min_lmr_depth: tune::min_lmr_depth!(),
            min_lmr_moves: tune::min_lmr_moves!(),
            lmr_reduction: tune::lmr_reduction!(),
            max_history: tune::max_history_bonus!(),
        }
    }
}

/// Everything a single search remembers between nodes.
///
/// Owned by one top-level search and cleared when it begins, so nothing carries over between decisions.
#[derive(Debug)]
pub struct SearchContext {
    /// Transposition table used to cache information during search.
    pub ttable: TTable,

    /// Quiet moves that caused a cutoff, per ply.
    pub killers: KillerTable,

    /// Storage for quiet moves that cause a cutoff during search.
    pub history: HistoryTable,

    /// Parameters for search features like reductions.
    pub params: SearchParameters,

    /// Weights handed to the [`Evaluator`] at leaf nodes.
    pub weights: EvalWeights,
}

impl SearchContext {
    /// Creates a new context with a transposition table of `hash_size_mb` megabytes.
    pub fn new(hash_size_mb: usize) -> Self {
        Self {
            ttable: TTable::new(hash_size_mb),
            killers: KillerTable::default(),
            history: HistoryTable::default(),
            params: SearchParameters::default(),
            weights: EvalWeights::default(),
        }
    }

    /// Clears every table, keeping the parameters and weights.
    pub fn clear(&mut self) {
        self.ttable.clear();
        self.killers.clear();
        self.history.clear();
    }
}

impl Default for SearchContext {
    fn default() -> Self {
        Self::new(TTable::DEFAULT_SIZE)
    }
}

/// Chooses a move for the side to move in `position`, searching at most `max_depth` plies for about `time_limit`.
///
/// Returns `None` if the side to move has no legal moves. `position` is unchanged afterwards.
///
/// # Example
/// ```
/// # use tadpole::*;
/// # use std::time::Duration;
/// let mut pos = Position::default();
/// let mv = choose_best_move(&mut pos, 2, Duration::from_secs(5)).unwrap();
/// assert!(pos.legal_moves(Color::White).contains(&mv));
/// assert_eq!(pos, Position::default());
/// ```
pub fn choose_best_move(position: &mut Position, max_depth: u8, time_limit: Duration) -> Option<Move> {
    let config = SearchConfig {
        max_depth,
        time_limit,
        ..Default::default()
    };

    let mut context = SearchContext::new(config.hash_size_mb);
    Search::new(position, &mut context, config).start().bestmove
}

/// Executes a search on a position of chess.
///
/// The position is mutated with [`Position::apply`] and restored with [`Position::undo`] along every path.
pub struct Search<'a> {
    /// The position to search on.
    position: &'a mut Position,

    /// Tables and parameters for this search.
    context: &'a mut SearchContext,

    /// Configuration variables for this instance of the search.
    config: SearchConfig,

    /// Number of nodes searched.
    nodes: u64,

    /// Best move found at the root by the latest call to [`Search::minimax`].
    root_bestmove: Option<Move>,
}

impl<'a> Search<'a> {
    /// Construct a new [`Search`] instance to execute.
    #[inline(always)]
    pub fn new(position: &'a mut Position, context: &'a mut SearchContext, config: SearchConfig) -> Self {
        Self {
            position,
            context,
            config,
            nodes: 0,
            root_bestmove: None,
        }
    }

    /// Start the search, returning its results.
    ///
    /// This is the entrypoint of the search. It clears the context, then runs [`Self::iterative_deepening`].
    pub fn start(mut self) -> SearchResult {
        log::debug!(
            "Starting search on {:?} (max depth {}, time limit {:?})",
            self.position.to_fen(),
            self.config.max_depth,
            self.config.time_limit
        );

        self.context.clear();

        let res = self.iterative_deepening();

        log::debug!("TT stats: {}", self.context.ttable);

        res
    }

    /// Performs [iterative deepening](https://www.chessprogramming.org/Iterative_Deepening) (ID) on the Search's position.
    ///
    /// The time limit is checked only between iterations, and depth 1 always runs.
    /// The result of the deepest completed iteration is returned, falling back to the first legal move
    /// if it somehow has no move, or a move that is not legal.
    fn iterative_deepening(&mut self) -> SearchResult {
        let color = self.position.side_to_move();
        let legal = self.position.legal_moves(color);

        let mut result = SearchResult::default();

        // Nothing to search; the game is already over
        if legal.is_empty() {
            if self.position.is_in_check(color) {
                result.score = Score::mated(color, 0);
            }
            return result;
        }

        let max_depth = self.config.max_depth.clamp(1, MAX_DEPTH);

        for depth in 1..=max_depth {
            if depth > 1 && self.config.starttime.elapsed() >= self.config.time_limit {
                break;
            }

            self.root_bestmove = None;
            let score = self.minimax(depth, 0, SearchBounds::default(), color.is_maximizing());

            result.depth = depth;
            result.score = score;
            result.bestmove = self.root_bestmove;
            result.nodes = self.nodes;

            let elapsed = self.config.starttime.elapsed();
            log::info!(
                "depth {depth} score {score} nodes {} time {}ms bestmove {}",
                self.nodes,
                elapsed.as_millis(),
                result.bestmove.map_or(String::from("(none)"), |mv| mv.to_string())
            );

            // No point in searching deeper once a forced mate is found
            if score.is_mate() && score.plies_to_mate() <= depth as i32 {
                break;
            }
        }

        match result.bestmove {
            Some(mv) if legal.contains(&mv) => {}
            other => {
                log::warn!(
                    "Search produced {} on {}; falling back to the first legal move",
                    other.map_or(String::from("no move"), |mv| format!("illegal move {mv}")),
                    self.position.to_fen()
                );
                result.bestmove = legal.first().copied();
            }
        }

        result
    }

    /// Primary location of search logic.
    ///
    /// Uses [minimax](https://www.chessprogramming.org/Minimax) with [alpha-beta pruning](https://www.chessprogramming.org/Alpha-Beta)
    /// over White-relative scores. White maximizes and Black minimizes.
    fn minimax(&mut self, depth: u8, ply: u8, mut bounds: SearchBounds, maximizing: bool) -> Score {
        self.nodes += 1;
        let key = self.position.key();

        /****************************************************************************************************
         * TT Cutoffs: https://www.chessprogramming.org/Transposition_Table#Transposition_Table_Cutoffs
         *
         * If we've already evaluated this position before at a higher depth, we can avoid re-doing a lot of
         * work by just returning the evaluation stored in the transposition table.
         ****************************************************************************************************/
        let tt_move = if ply == 0 {
            // The root is always searched, but a previous iteration's best move is still worth trying first
            self.context.ttable.get(&key).and_then(|entry| entry.bestmove)
        } else if let Some(entry) = self.context.ttable.probe(&key) {
            if entry.depth >= depth {
                if let Some(score) = entry.try_score(&mut bounds, ply) {
                    return score;
                }
            }
            entry.bestmove
        } else {
            None
        };

        // The window this node is actually searched with
        let window = bounds;

        /****************************************************************************************************
         * Quiescence Search: https://www.chessprogramming.org/Quiescence_Search
         ****************************************************************************************************/
        if depth == 0 {
            let score = self.quiescence(ply, bounds, maximizing);
            self.save_to_tt(key, None, score, window, depth, ply);
            return score;
        }

        // If there are no legal moves, it's either mate or a draw.
        let color = self.position.side_to_move();
        let moves = self.position.legal_moves(color);
        let in_check = self.position.is_in_check(color);
        if moves.is_empty() {
            let score = if in_check {
                // Offset by ply to prefer earlier mates
                Score::mated(color, ply)
            } else {
                Score::DRAW
            };

            // Terminal scores are exact regardless of the window
            self.save_to_tt(key, None, score, SearchBounds::default(), depth, ply);
            return score;
        }

        // Sort moves so that we look at "promising" ones first
        let picker = {
            let (position, context) = (&*self.position, &*self.context);
            MovePicker::new(moves, |mv| {
                score_move(position, mv, tt_move, &context.killers, &context.history, ply)
            })
        };

        let mut best = if maximizing { -Score::INF } else { Score::INF };
        let mut bestmove = None;

        /****************************************************************************************************
         * Primary move loop
         ****************************************************************************************************/
        for (i, (mv, _)) in picker.enumerate() {
            let Some(piece) = self.position.piece_at(mv.from()) else {
                continue;
            };

            let reduce = self.should_reduce(mv, i, depth, ply, in_check);

            self.position.apply(mv);

            /****************************************************************************************************
             * Late Move Reductions: https://www.chessprogramming.org/Late_Move_Reductions
             *
             * Quiet moves ordered late are unlikely to be good, so they are searched at a reduced depth first.
             * If that result still improves our bound, the move is searched again at full depth.
             ****************************************************************************************************/
            let mut score;
            if reduce {
                let reduced = depth.saturating_sub(1 + self.context.params.lmr_reduction);
                score = self.minimax(reduced, ply + 1, bounds, !maximizing);

                let improves = if maximizing {
                    score > bounds.alpha
                } else {
                    score < bounds.beta
                };
                if improves {
                    score = self.minimax(depth - 1, ply + 1, bounds, !maximizing);
                }
            } else {
                score = self.minimax(depth - 1, ply + 1, bounds, !maximizing);
            }

            self.position.undo();

            /****************************************************************************************************
             * Score evaluation & bounds adjustments
             ****************************************************************************************************/
            if maximizing {
                if score > best {
                    best = score;
                    bestmove = Some(mv);
                }
                bounds.alpha = bounds.alpha.max(score);
            } else {
                if score < best {
                    best = score;
                    bestmove = Some(mv);
                }
                bounds.beta = bounds.beta.min(score);
            }

            // Cutoff; the opponent will never allow this position
            if bounds.is_closed() {
                /****************************************************************************************************
                 * Killers & History Heuristic
                 *
                 * A quiet move that causes a cutoff is probably a good move. Therefore we want to look at it early
                 * on in sibling nodes and in future iterations.
                 ****************************************************************************************************/
                if mv.is_quiet() {
                    let max = self.context.params.max_history;
                    self.context.killers.store(ply, mv);
                    self.context
                        .history
                        .update(piece.kind(), mv.to(), depth, max);
                }
                break;
            }
        }

        if ply == 0 {
            self.root_bestmove = bestmove;
        }

        self.save_to_tt(key, bestmove, best, window, depth, ply);

        best
    }

    /// Quiescence Search (QSearch)
    ///
    /// A search that looks at only captures and promotions, starting from the static evaluation.
    /// This is called when [`Search::minimax`] reaches a depth of 0, and ends once the position is quiet.
    fn quiescence(&mut self, ply: u8, mut bounds: SearchBounds, maximizing: bool) -> Score {
        self.nodes += 1;

        // Evaluate the current position, to serve as our baseline
        let stand_pat = Evaluator::with_weights(&*self.position, self.context.weights).eval();

        if maximizing {
            if stand_pat >= bounds.beta {
                return stand_pat;
            }
            bounds.alpha = bounds.alpha.max(stand_pat);
        } else {
            if stand_pat <= bounds.alpha {
                return stand_pat;
            }
            bounds.beta = bounds.beta.min(stand_pat);
        }

        let color = self.position.side_to_move();
        let noisy = self.position.legal_noisy_moves(color);

        let picker = {
            let (position, context) = (&*self.position, &*self.context);
            MovePicker::new(noisy, |mv| {
                score_move(position, mv, None, &context.killers, &context.history, ply)
            })
        };

        let mut best = stand_pat;

        for (mv, _) in picker {
            self.position.apply(mv);
            let score = self.quiescence(ply.saturating_add(1), bounds, !maximizing);
            self.position.undo();

            if maximizing {
                best = best.max(score);
                bounds.alpha = bounds.alpha.max(score);
            } else {
                best = best.min(score);
                bounds.beta = bounds.beta.min(score);
            }

            if bounds.is_closed() {
                break;
            }
        }

        best
    }

    /// Returns `true` if `mv`, the `index`th move searched, should be searched at a reduced depth first.
    #[inline(always)]
    fn should_reduce(&self, mv: Move, index: usize, depth: u8, ply: u8, in_check: bool) -> bool {
        let params = &self.context.params;

        depth >= params.min_lmr_depth
            && index >= params.min_lmr_moves
            && !in_check
            && mv.is_quiet()
            && !self.context.killers.contains(ply, mv)
    }

    /// Save a node's result to the transposition table.
    #[inline(always)]
    fn save_to_tt(
        &mut self,
        key: ZobristKey,
        bestmove: Option<Move>,
        score: Score,
        bounds: SearchBounds,
        depth: u8,
        ply: u8,
    ) {
        let entry = TTableEntry::new(key, bestmove, score, bounds, depth, ply);
        self.context.ttable.store(entry);
    }
}

impl Color {
    /// Returns `true` if this side maximizes White-relative scores.
    #[inline(always)]
    const fn is_maximizing(&self) -> bool {
        self.is_white()
    }
}
