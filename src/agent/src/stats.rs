//! Incremental transition counts over the opponent's moves.
//!
//! Every table maps a context (the opponent's last `order` moves, oldest
//! first) to how often each move followed it. Counts only ever grow.

use std::collections::HashMap;

use common::model::game::Move;

use crate::history::HistoryLog;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Distribution([u32; 3]);

impl Distribution {
    pub fn count(&self, m: Move) -> u32 {
        self.0[m.index()]
    }

    pub fn record(&mut self, m: Move) {
        self.0[m.index()] += 1;
    }

    pub fn total(&self) -> u32 {
        self.0.iter().sum()
    }

    /// Highest count. Ties go to the first move in canonical order.
    pub fn best(&self) -> (Move, u32) {
        let mut best = (Move::ALL[0], self.count(Move::ALL[0]));
        for m in &Move::ALL[1..] {
            let count = self.count(*m);
            if count > best.1 {
                best = (*m, count);
            }
        }
        best
    }

    /// The best move, provided it was seen at least once.
    pub fn evidence(&self) -> Option<Move> {
        match self.best() {
            (_, 0) => None,
            (m, _) => Some(m),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TransitionTable {
    order: usize,
    counts: HashMap<Vec<Move>, Distribution>,
    increments: u64,
}

impl TransitionTable {
    pub fn new(order: usize) -> Self {
        TransitionTable {
            order,
            counts: HashMap::new(),
            increments: 0,
        }
    }

    pub fn order(&self) -> usize {
        self.order
    }

    /// Fold the newest round of `history` into the table. Returns false when
    /// the window of `order + 1` rounds is incomplete or has a missing move.
    pub fn observe(&mut self, history: &HistoryLog) -> bool {
        let Some(window) = history.opponent_context(self.order + 1) else {
            return false;
        };
        let (context, next) = window.split_at(self.order);
        self.counts.entry(context.to_vec()).or_default().record(next[0]);
        self.increments += 1;
        true
    }

    pub fn get(&self, context: &[Move]) -> Option<&Distribution> {
        self.counts.get(context)
    }

    pub fn predict(&self, context: &[Move]) -> Option<Move> {
        self.get(context).and_then(Distribution::evidence)
    }

    /// Total number of observations recorded since creation.
    pub fn increments(&self) -> u64 {
        self.increments
    }

    pub fn contexts(&self) -> usize {
        self.counts.len()
    }
}

/// First- and second-order Markov tables plus suffix tables for lengths
/// `1..=max_suffix_length`.
#[derive(Debug, Clone)]
pub struct TransitionStats {
    first_order: TransitionTable,
    second_order: TransitionTable,
    suffixes: Vec<TransitionTable>,
    observed: usize,
}

impl TransitionStats {
    pub fn new(max_suffix_length: usize) -> Self {
        TransitionStats {
            first_order: TransitionTable::new(1),
            second_order: TransitionTable::new(2),
            suffixes: (1..=max_suffix_length).map(TransitionTable::new).collect(),
            observed: 0,
        }
    }

    /// Record the newest round of `history` in every table it completes a
    /// window for. A history length that was already seen is ignored, so
    /// no round is ever counted twice.
    pub fn update(&mut self, history: &HistoryLog) {
        if history.len() <= self.observed {
            return;
        }
        self.observed = history.len();
        self.first_order.observe(history);
        self.second_order.observe(history);
        for table in self.suffixes.iter_mut() {
            table.observe(history);
        }
    }

    pub fn first_order(&self) -> &TransitionTable {
        &self.first_order
    }

    pub fn second_order(&self) -> &TransitionTable {
        &self.second_order
    }

    pub fn suffix(&self, length: usize) -> Option<&TransitionTable> {
        length.checked_sub(1).and_then(|i| self.suffixes.get(i))
    }

    pub fn max_suffix_length(&self) -> usize {
        self.suffixes.len()
    }

    pub fn tables(&self) -> impl Iterator<Item = &TransitionTable> {
        [&self.first_order, &self.second_order]
            .into_iter()
            .chain(self.suffixes.iter())
    }
}
