/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use crate::{tune, Move, Score, SearchBounds, ZobristKey};

/// Number of bytes in a megabyte
const BYTES_IN_MB: usize = 1024 * 1024;

/// Type of node encountered during search.
///
/// See [CPW](https://www.chessprogramming.org/Node_Types) for more.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash)]
pub enum NodeType {
    /// The score is exact.
    Pv,

    /// The score is less than alpha (upper bound).
    All,

    /// The score is greater than or equal to beta (lower bound).
    Cut,
}

impl NodeType {
    /// Creates a new [`NodeType`] based on the parameters as follows:
    ///
    /// ```text
    /// if score <= alpha:
    ///     UPPERBOUND
    /// else if score >= beta:
    ///     LOWERBOUND
    /// else:
    ///     EXACT
    /// ```
    ///
    /// `bounds` must be the window the node was entered with.
    #[inline(always)]
    pub fn new(score: Score, bounds: SearchBounds) -> Self {
        if score <= bounds.alpha {
            Self::All
        } else if score >= bounds.beta {
            Self::Cut
        } else {
            Self::Pv
        }
    }
}

/// An entry into a hash table
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct TTableEntry {
    /// Key of the node this entry represents.
    pub key: ZobristKey,

    /// Depth at which the data for this entry was found.
    pub depth: u8,

    /// Best move found for this position, if it had any moves.
    pub bestmove: Option<Move>,

    /// Best score found for this position, with mate distances relative to this node.
    pub score: Score,

    /// Node type of this entry.
    pub node_type: NodeType,
}

impl TTableEntry {
    /// Creates a new [`TTableEntry`] from the provided parameters.
    ///
    /// This will generate a node type through [`NodeType::new`] and
    /// will adjust `score` by `ply` if it was a mate score.
    #[inline(always)]
    pub fn new(
        key: ZobristKey,
        bestmove: Option<Move>,
        score: Score,
        bounds: SearchBounds,
        depth: u8,
        ply: u8,
    ) -> Self {
        // Determine what kind of node this is fist, before score adjustment
        let node_type = NodeType::new(score, bounds);

        Self {
            key,
            bestmove,
            score: score.relative(ply),
            depth,
            node_type,
        }
    }

    /// Applies this entry to the window of a node at `ply`, returning a score if the node can stop searching.
    ///
    /// Exact entries always return. Lower bounds raise alpha and upper bounds lower beta,
    /// returning only if that closes the window.
    #[inline(always)]
    pub fn try_score(&self, bounds: &mut SearchBounds, ply: u8) -> Option<Score> {
        // Adjust mate scores to be relative to the root again
        let score = self.score.absolute(ply);

        match self.node_type {
            NodeType::Pv => return Some(score),
            NodeType::Cut => bounds.alpha = bounds.alpha.max(score),
            NodeType::All => bounds.beta = bounds.beta.min(score),
        }

        (bounds.alpha >= bounds.beta).then_some(score)
    }
}

/// Transposition Table.
///
/// Used during a search to keep track of previous search results on positions,
/// avoiding unnecessary re-computations.
///
/// A table with a capacity of zero stores nothing and never hits.
#[derive(Debug)]
pub struct TTable {
    /// Internal cache of the TTable.
    cache: Vec<Option<TTableEntry>>,

    /// Number of collisions that have occurred since last clearing.
    pub(crate) collisions: usize,

    /// Number of accesses that have occurred since last clearing.
    pub(crate) accesses: usize,

    /// Number of hits that have occurred since last clearing.
    pub(crate) hits: usize,
}

impl TTable {
    /// Default size of the Transposition Table, in megabytes.
    pub const DEFAULT_SIZE: usize = tune::default_hash_size!();

    /// Maximum size of the Transposition Table, in megabytes.
    pub const MAX_SIZE: usize = 1_024;

    /// Create a new [`TTable`] that is at most `size` megabytes.
    #[inline(always)]
    pub fn new(size: usize) -> Self {
        let size = size.min(Self::MAX_SIZE);
        Self::from_capacity((size * BYTES_IN_MB) / size_of::<Option<TTableEntry>>())
    }

    /// Create a new [`TTable`] that can hold `capacity` entries, rounded down to a power of two.
    ///
    /// # Example
    /// ```
    /// # use tadpole::TTable;
    /// assert_eq!(TTable::from_capacity(100).capacity(), 64);
    /// assert_eq!(TTable::from_capacity(0).capacity(), 0);
    /// ```
    #[inline(always)]
    pub fn from_capacity(capacity: usize) -> Self {
        let capacity = if capacity == 0 {
            0
        } else {
            1 << capacity.ilog2()
        };

        Self {
            cache: vec![None; capacity],
            collisions: 0,
            accesses: 0,
            hits: 0,
        }
    }

    /// Clears the entries of this [`TTable`].
    #[inline(always)]
    pub fn clear(&mut self) {
        self.cache.iter_mut().for_each(|entry| *entry = None);
        self.collisions = 0;
        self.accesses = 0;
        self.hits = 0;
    }

    /// Returns the number of entries that can fit within this [`TTable`]
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.cache.len()
    }

    /// Returns the size of this [`TTable`], in megabytes.
    #[inline(always)]
    pub fn size(&self) -> usize {
        self.cache.len() * size_of::<Option<TTableEntry>>() / BYTES_IN_MB
    }

    /// Returns the number of `Some` entries in this [`TTable`].
    #[inline(always)]
    pub fn num_entries(&self) -> usize {
        self.cache.iter().filter(|entry| entry.is_some()).count()
    }

    /// Map `key` to an index into this [`TTable`], if it has any space.
    #[inline(always)]
    fn index(&self, key: &ZobristKey) -> Option<usize> {
        // Capacity is always a power of two, so this is a cheap modulo
        (!self.cache.is_empty()).then(|| key.inner() as usize & (self.capacity() - 1))
    }

    /// Get the entry if and only if it matches the provided key
    #[inline(always)]
    pub fn get(&self, key: &ZobristKey) -> Option<&TTableEntry> {
        self.entry(key).filter(|e| &e.key == key)
    }

    /// Same as [`TTable::get`], but records the lookup in this table's statistics.
    #[inline(always)]
    pub fn probe(&mut self, key: &ZobristKey) -> Option<TTableEntry> {
        self.accesses += 1;

        let entry = self.entry(key).copied();
        match entry {
            Some(entry) if &entry.key == key => {
                self.hits += 1;
                Some(entry)
            }
            Some(_) => {
                self.collisions += 1;
                None
            }
            None => None,
        }
    }

    /// Get the entry, without regards for whether it matches the provided key
    #[inline(always)]
    fn entry(&self, key: &ZobristKey) -> Option<&TTableEntry> {
        self.index(key).and_then(|index| self.cache[index].as_ref())
    }

    /// Store `entry` in the table at `entry.key`, overriding and returning whatever was there.
    #[inline(always)]
    pub fn store(&mut self, entry: TTableEntry) -> Option<TTableEntry> {
        let index = self.index(&entry.key)?;
        self.cache[index].replace(entry)
    }
}

impl Default for TTable {
    #[inline(always)]
    fn default() -> Self {
        Self::new(Self::DEFAULT_SIZE)
    }
}

impl fmt::Display for TTable {
    /// Displays the statistics gathered since the last time the table was cleared.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hitrate = if self.accesses == 0 {
            0.0
        } else {
            self.hits as f64 / self.accesses as f64 * 100.0
        };

        write!(
            f,
            "capacity {} accesses {} hits {} ({hitrate:.1}%) collisions {}",
            self.capacity(),
            self.accesses,
            self.hits,
            self.collisions
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::*;

    fn entry(key: ZobristKey, score: Score, node_type: NodeType) -> TTableEntry {
        TTableEntry {
            key,
            bestmove: None,
            score,
            depth: 0,
            node_type,
        }
    }

    #[test]
    fn test_ttable() {
        // Create two positions whose Zobrist keys are equal mod 2
        let pos1 = Position::default();
        let mut pos2 = Position::from_fen(FEN_KIWIPETE).unwrap();

        // Ensure that the two positions have Zobrist keys that are both odd/even
        while pos1.key().inner() % 2 != pos2.key().inner() % 2 {
            let mv = pos2.legal_moves(pos2.side_to_move())[0];
            pos2.apply(mv);
        }

        let key1 = pos1.key();
        let key2 = pos2.key();

        let entry1 = entry(key1, Score::DRAW, NodeType::Pv);
        let entry2 = entry(key2, Score::MATE, NodeType::Pv);

        // Create a TTable that can hold two elements.
        // This is important as both elements will need to map to the same index
        let mut tt = TTable::from_capacity(2);
        assert_eq!(tt.num_entries(), 0, "TTable should initialize to being empty");

        tt.store(entry1);
        assert_eq!(tt.num_entries(), 1);
        assert_eq!(tt.get(&key1), Some(&entry1));

        tt.store(entry2);
        assert_eq!(tt.num_entries(), 1, "Storing to the same index overwrites");
        assert!(tt.get(&key1).is_none(), "Cannot get an entry that has been overridden");
        assert_eq!(tt.get(&key2), Some(&entry2));

        assert!(tt.probe(&key1).is_none());
        assert!(tt.probe(&key2).is_some());
        assert_eq!((tt.accesses, tt.hits, tt.collisions), (2, 1, 1));

        tt.clear();
        assert_eq!(tt.num_entries(), 0);
        assert_eq!(tt.accesses, 0);
    }

    #[test]
    fn test_empty_ttable_stores_nothing() {
        let key = Position::default().key();
        let mut tt = TTable::from_capacity(0);
        assert!(tt.store(entry(key, Score::DRAW, NodeType::Pv)).is_none());
        assert!(tt.probe(&key).is_none());
        assert_eq!(tt.num_entries(), 0);
    }

    #[test]
    fn test_bounds_tighten_window() {
        let key = ZobristKey::default();

        let mut bounds = SearchBounds::new(Score(-50), Score(50));
        assert_eq!(entry(key, Score(10), NodeType::Cut).try_score(&mut bounds, 0), None);
        assert_eq!(bounds.alpha, Score(10));

        assert_eq!(
            entry(key, Score(5), NodeType::All).try_score(&mut bounds, 0),
            Some(Score(5)),
            "An upper bound below alpha closes the window"
        );

        let mut bounds = SearchBounds::new(Score(-50), Score(50));
        assert_eq!(entry(key, Score(70), NodeType::Pv).try_score(&mut bounds, 0), Some(Score(70)));
    }

    #[test]
    fn test_mate_scores_are_stored_relative_to_node() {
        let bounds = SearchBounds::new(-Score::INF, Score::INF);
        let mate_in_five = Score::mated(Color::Black, 5);
        let stored = TTableEntry::new(ZobristKey::default(), None, mate_in_five, bounds, 3, 2);
        assert_eq!(stored.score, Score::mated(Color::Black, 3));

        let mut bounds = SearchBounds::new(-Score::INF, Score::INF);
        assert_eq!(stored.try_score(&mut bounds, 2), Some(mate_in_five));
    }
}
