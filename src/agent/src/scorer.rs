//! Predictor scores and the feedback rule that moves them.
//!
//! Only the predictor whose guess was actually played is touched: a hit
//! adds the learning rate, a miss subtracts it down to the floor.

use std::{collections::BTreeMap, fmt};

use common::model::game::Move;
use serde::Serialize;
use tracing::debug;

use crate::{config::EngineConfig, predictor::PredictorKind};

/// Who supplied the predicted opponent move for a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Predictor(PredictorKind),
    Fallback,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Predictor(kind) => write!(f, "{}", kind),
            Source::Fallback => f.write_str("fallback"),
        }
    }
}

/// The guess a submitted move was based on, kept until the round resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingPrediction {
    pub source: Source,
    pub predicted: Move,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictorRecord {
    pub score: f64,
    pub hits: u32,
    pub misses: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Feedback {
    Rewarded { kind: PredictorKind, score: f64 },
    Penalised { kind: PredictorKind, score: f64 },
    /// Fallback guess, missing opponent move, or nothing was pending.
    Unscored,
}

#[derive(Debug, Clone)]
pub struct PredictorScores {
    records: BTreeMap<PredictorKind, PredictorRecord>,
    initial_score: f64,
    score_floor: f64,
    learning_rate: f64,
}

impl PredictorScores {
    pub fn new(
        kinds: impl IntoIterator<Item = PredictorKind>,
        initial_score: f64,
        score_floor: f64,
        learning_rate: f64,
    ) -> Self {
        let records = kinds
            .into_iter()
            .map(|kind| {
                (
                    kind,
                    PredictorRecord {
                        score: initial_score,
                        hits: 0,
                        misses: 0,
                    },
                )
            })
            .collect();
        PredictorScores {
            records,
            initial_score,
            score_floor,
            learning_rate,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            config.predictors.iter().copied(),
            config.initial_score,
            config.score_floor,
            config.learning_rate,
        )
    }

    pub fn score(&self, kind: PredictorKind) -> Option<f64> {
        self.records.get(&kind).map(|record| record.score)
    }

    pub fn record(&self, kind: PredictorKind) -> Option<&PredictorRecord> {
        self.records.get(&kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = (PredictorKind, &PredictorRecord)> {
        self.records.iter().map(|(kind, record)| (*kind, record))
    }

    pub fn floor(&self) -> f64 {
        self.score_floor
    }

    pub fn reset(&mut self) {
        for record in self.records.values_mut() {
            *record = PredictorRecord {
                score: self.initial_score,
                hits: 0,
                misses: 0,
            };
        }
    }

    /// Grade `pending` against the revealed opponent move.
    pub fn apply(&mut self, pending: PendingPrediction, actual: Option<Move>) -> Feedback {
        let (Source::Predictor(kind), Some(actual)) = (pending.source, actual) else {
            return Feedback::Unscored;
        };
        let Some(record) = self.records.get_mut(&kind) else {
            return Feedback::Unscored;
        };
        let feedback = if pending.predicted == actual {
            record.score += self.learning_rate;
            record.hits += 1;
            Feedback::Rewarded {
                kind,
                score: record.score,
            }
        } else {
            record.score = (record.score - self.learning_rate).max(self.score_floor);
            record.misses += 1;
            Feedback::Penalised {
                kind,
                score: record.score,
            }
        };
        debug!(
            "{} predicted {} against {}: {:?}",
            kind, pending.predicted, actual, feedback
        );
        feedback
    }
}
