//! The predictor ensemble.
//!
//! A predictor is a pure guess of the opponent's next move from the round
//! history and the transition tables. `None` means "no opinion" and is the
//! normal answer whenever there is not enough evidence.

use std::{fmt, str::FromStr};

use common::model::game::Move;
use serde::{Deserialize, Serialize};

use crate::{config::EngineConfig, history::HistoryLog, stats::TransitionStats};

/// Identity of a predictor. Declaration order is alphabetical by name and
/// doubles as the tie-break order when scores are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictorKind {
    FirstOrder,
    Frequency,
    SecondOrder,
    Streak,
    Suffix,
}

impl PredictorKind {
    pub const DEFAULT_SET: [PredictorKind; 4] = [
        PredictorKind::FirstOrder,
        PredictorKind::SecondOrder,
        PredictorKind::Suffix,
        PredictorKind::Frequency,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PredictorKind::FirstOrder => "first_order",
            PredictorKind::Frequency => "frequency",
            PredictorKind::SecondOrder => "second_order",
            PredictorKind::Streak => "streak",
            PredictorKind::Suffix => "suffix",
        }
    }

    pub fn build(&self, config: &EngineConfig) -> Box<dyn Predictor> {
        match self {
            PredictorKind::FirstOrder => Box::new(Markov::first()),
            PredictorKind::SecondOrder => Box::new(Markov::second()),
            PredictorKind::Suffix => Box::new(SuffixMatcher::new(config.suffix_max_length)),
            PredictorKind::Frequency => Box::new(FrequencyWindow::new(config.frequency_window)),
            PredictorKind::Streak => Box::new(Streak::new(config.streak_length)),
        }
    }
}

impl fmt::Display for PredictorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PredictorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            PredictorKind::FirstOrder,
            PredictorKind::Frequency,
            PredictorKind::SecondOrder,
            PredictorKind::Streak,
            PredictorKind::Suffix,
        ]
        .into_iter()
        .find(|kind| kind.name() == s.trim())
        .ok_or_else(|| format!("unknown predictor '{}'", s.trim()))
    }
}

pub trait Predictor: Send + Sync {
    fn kind(&self) -> PredictorKind;
    fn predict(&self, history: &HistoryLog, stats: &TransitionStats) -> Option<Move>;
}

/// Build the predictors named in `config`, in registration order.
pub fn registry(config: &EngineConfig) -> Vec<Box<dyn Predictor>> {
    config.predictors.iter().map(|kind| kind.build(config)).collect()
}

/// Order-1 or order-2 Markov chain over the opponent's moves.
#[derive(Debug, Clone, Copy)]
pub struct Markov {
    order: usize,
}

impl Markov {
    pub fn first() -> Self {
        Markov { order: 1 }
    }

    pub fn second() -> Self {
        Markov { order: 2 }
    }
}

impl Predictor for Markov {
    fn kind(&self) -> PredictorKind {
        if self.order == 1 {
            PredictorKind::FirstOrder
        } else {
            PredictorKind::SecondOrder
        }
    }

    fn predict(&self, history: &HistoryLog, stats: &TransitionStats) -> Option<Move> {
        let context = history.opponent_context(self.order)?;
        let table = if self.order == 1 {
            stats.first_order()
        } else {
            stats.second_order()
        };
        table.predict(&context)
    }
}

/// Longest recorded suffix with evidence wins.
#[derive(Debug, Clone, Copy)]
pub struct SuffixMatcher {
    max_length: usize,
}

impl SuffixMatcher {
    pub fn new(max_length: usize) -> Self {
        SuffixMatcher { max_length }
    }
}

impl Predictor for SuffixMatcher {
    fn kind(&self) -> PredictorKind {
        PredictorKind::Suffix
    }

    fn predict(&self, history: &HistoryLog, stats: &TransitionStats) -> Option<Move> {
        (1..=self.max_length).rev().find_map(|length| {
            let context = history.opponent_context(length)?;
            stats.suffix(length)?.predict(&context)
        })
    }
}

/// Majority over the opponent's moves in the last `window` rounds.
#[derive(Debug, Clone, Copy)]
pub struct FrequencyWindow {
    window: usize,
}

impl FrequencyWindow {
    pub fn new(window: usize) -> Self {
        FrequencyWindow { window }
    }
}

impl Predictor for FrequencyWindow {
    fn kind(&self) -> PredictorKind {
        PredictorKind::Frequency
    }

    fn predict(&self, history: &HistoryLog, _stats: &TransitionStats) -> Option<Move> {
        let recent: Vec<Move> = history
            .last_n(self.window)
            .iter()
            .filter_map(|round| round.opponent_move)
            .collect();
        let last = *recent.last()?;

        let mut counts = [0usize; 3];
        for m in &recent {
            counts[m.index()] += 1;
        }
        let max = counts.iter().copied().max().unwrap_or(0);
        let tied: Vec<Move> = Move::ALL
            .into_iter()
            .filter(|m| counts[m.index()] == max)
            .collect();

        match tied.as_slice() {
            [only] => Some(*only),
            _ if tied.contains(&last) => Some(last),
            _ => tied.iter().copied().min_by_key(|m| m.name()),
        }
    }
}

/// Expects a run of identical opponent moves to continue.
#[derive(Debug, Clone, Copy)]
pub struct Streak {
    length: usize,
}

impl Streak {
    pub fn new(length: usize) -> Self {
        Streak { length }
    }
}

impl Predictor for Streak {
    fn kind(&self) -> PredictorKind {
        PredictorKind::Streak
    }

    fn predict(&self, history: &HistoryLog, _stats: &TransitionStats) -> Option<Move> {
        let context = history.opponent_context(self.length)?;
        let first = *context.first()?;
        context.iter().all(|m| *m == first).then_some(first)
    }
}
