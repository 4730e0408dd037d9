//! Opponent-move prediction for repeated rock/paper/scissors.
//!
//! An [`Engine`] keeps the round history, incremental transition tables and
//! an ensemble of predictors. Each round the best-scoring predictor with an
//! opinion forecasts the opponent, the engine plays the counter, and once
//! the true move is revealed the predictor that was trusted gets rewarded
//! or penalised.

pub mod arena;
pub mod chooser;
pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod history;
pub mod predictor;
pub mod scorer;
pub mod selector;
pub mod stats;
pub mod strategy;

pub use config::EngineConfig;
pub use engine::{Decision, Engine, Resolution};
pub use error::{Error, Result};
pub use predictor::{Predictor, PredictorKind};
