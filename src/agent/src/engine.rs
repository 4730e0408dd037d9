//! The per-session prediction engine.
//!
//! Round lifecycle: `decide` (or `choose_next_move`) submits a move and
//! leaves one prediction pending; `on_round_resolved` appends the outcome,
//! updates the transition tables and grades the pending prediction. The
//! caller must alternate the two, one round at a time.

use common::model::game::{Move, RoundOutcome};
use rand::{rngs::SmallRng, Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::{
    chooser::MoveChooser,
    config::EngineConfig,
    error::{Error, Result},
    history::HistoryLog,
    predictor::{self, Predictor, PredictorKind},
    scorer::{Feedback, PendingPrediction, PredictorScores, Source},
    selector::MetaSelector,
    stats::TransitionStats,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub source: Source,
    /// What the opponent is expected to play.
    pub predicted: Move,
    /// The move that beats `predicted`.
    pub counter: Move,
    /// The move actually sent; differs from `counter` only after deviation.
    pub submitted: Move,
    pub deviated: bool,
}

impl Decision {
    pub fn prediction(&self) -> PendingPrediction {
        PendingPrediction {
            source: self.source,
            predicted: self.predicted,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    /// False for a round that carried no outcome at all.
    pub appended: bool,
    pub feedback: Feedback,
}

pub struct Engine<R = SmallRng> {
    config: EngineConfig,
    history: HistoryLog,
    stats: TransitionStats,
    predictors: Vec<Box<dyn Predictor>>,
    scores: PredictorScores,
    selector: MetaSelector,
    chooser: MoveChooser,
    rng: R,
    pending: Option<Decision>,
    submitted: usize,
}

impl Engine<SmallRng> {
    /// Seeds from `config.seed`, or from the thread RNG when unset.
    pub fn new(config: EngineConfig) -> Result<Self> {
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_rng(&mut rand::rng()),
        };
        Self::with_rng(config, rng)
    }
}

impl<R: Rng> Engine<R> {
    pub fn with_rng(config: EngineConfig, rng: R) -> Result<Self> {
        config.validate()?;
        info!(
            "Engine started with predictors {:?}, fallback {}",
            config.predictors, config.fallback_move
        );
        Ok(Engine {
            history: HistoryLog::new(),
            stats: TransitionStats::new(config.suffix_max_length),
            predictors: predictor::registry(&config),
            scores: PredictorScores::from_config(&config),
            selector: MetaSelector::new(config.fallback_move),
            chooser: MoveChooser::new(config.deviation_probability),
            rng,
            pending: None,
            submitted: 0,
            config,
        })
    }

    /// Forget the session: history, tables, scores and any pending guess.
    pub fn reset(&mut self) {
        self.history = HistoryLog::new();
        self.stats = TransitionStats::new(self.config.suffix_max_length);
        self.scores.reset();
        self.pending = None;
        self.submitted = 0;
        info!("Engine reset");
    }

    /// Record a finished round. `None` marks a round without data; it still
    /// consumes the pending prediction, unscored.
    ///
    /// Once a move has been submitted, every outcome must answer one. An
    /// outcome with nothing pending is rejected and changes nothing.
    pub fn on_round_resolved(&mut self, outcome: Option<RoundOutcome>) -> Result<Resolution> {
        let pending = self.pending.take();
        if pending.is_none() && self.submitted > 0 {
            warn!(
                "Round resolved with no move outstanding ({} rounds so far), ignoring",
                self.history.len()
            );
            return Err(Error::StateInconsistency(
                "round resolved with no pending prediction".to_string(),
            ));
        }

        let actual = outcome.as_ref().and_then(|o| o.opponent_move);
        let appended = match outcome {
            Some(outcome) => {
                self.history.append(outcome);
                self.stats.update(&self.history);
                true
            }
            None => false,
        };

        let feedback = match pending {
            Some(decision) => self.scores.apply(decision.prediction(), actual),
            None => Feedback::Unscored,
        };
        debug!(
            "Round {} resolved, opponent {:?}, feedback {:?}",
            self.history.len(),
            actual,
            feedback
        );
        Ok(Resolution { appended, feedback })
    }

    /// Pick the move for the upcoming round. Never fails: with no usable
    /// prediction the configured fallback stands in.
    pub fn decide(&mut self) -> Decision {
        if let Some(decision) = self.pending {
            warn!(
                "Move {} already outstanding, resubmitting it",
                decision.submitted
            );
            return decision;
        }

        let prediction =
            self.selector
                .select(&self.predictors, &self.scores, &self.history, &self.stats);
        let choice = self.chooser.choose(prediction.predicted, &mut self.rng);
        let decision = Decision {
            source: prediction.source,
            predicted: prediction.predicted,
            counter: choice.counter,
            submitted: choice.submitted,
            deviated: choice.deviated,
        };
        debug!(
            "{} predicts {}, playing {}{}",
            decision.source,
            decision.predicted,
            decision.submitted,
            if decision.deviated { " (deviated)" } else { "" }
        );
        self.pending = Some(decision);
        self.submitted += 1;
        decision
    }

    pub fn choose_next_move(&mut self) -> Move {
        self.decide().submitted
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn stats(&self) -> &TransitionStats {
        &self.stats
    }

    pub fn scores(&self) -> &PredictorScores {
        &self.scores
    }

    pub fn pending(&self) -> Option<PendingPrediction> {
        self.pending.map(|decision| decision.prediction())
    }

    pub fn predictor_kinds(&self) -> Vec<PredictorKind> {
        self.predictors.iter().map(|p| p.kind()).collect()
    }
}

#[cfg(test)]
mod tests {
    use common::model::game::Outcome;

    use super::*;

    fn engine(config: EngineConfig) -> Engine {
        Engine::new(config.with_deviation_probability(0.0).with_seed(3)).unwrap()
    }

    fn opponent(m: Move) -> Option<RoundOutcome> {
        Some(RoundOutcome::played(Move::Rock, m))
    }

    #[test]
    fn invalid_config_refuses_to_start() {
        let config = EngineConfig {
            suffix_max_length: 0,
            ..Default::default()
        };
        assert!(matches!(
            Engine::new(config),
            Err(Error::InvalidConfiguration {
                field: "suffix_max_length",
                ..
            })
        ));
    }

    #[test]
    fn empty_history_uses_fallback() {
        let mut engine = engine(EngineConfig::default().with_fallback_move(Move::Scissors));
        let decision = engine.decide();
        assert_eq!(decision.source, Source::Fallback);
        assert_eq!(decision.predicted, Move::Scissors);
        assert_eq!(decision.submitted, Move::Rock);
    }

    #[test]
    fn plays_counter_to_first_order_guess() {
        let mut engine =
            engine(EngineConfig::default().with_predictors([PredictorKind::FirstOrder]));
        for m in [Move::Rock, Move::Rock, Move::Paper, Move::Rock, Move::Rock] {
            engine.choose_next_move();
            engine.on_round_resolved(opponent(m)).unwrap();
        }
        let decision = engine.decide();
        assert_eq!(decision.source, Source::Predictor(PredictorKind::FirstOrder));
        assert_eq!(decision.predicted, Move::Rock);
        assert_eq!(decision.submitted, Move::Paper);
    }

    #[test]
    fn fallback_rounds_are_not_scored() {
        let mut engine = engine(EngineConfig::default());
        engine.choose_next_move();
        let resolution = engine.on_round_resolved(opponent(Move::Paper)).unwrap();
        assert_eq!(resolution.feedback, Feedback::Unscored);
        assert!(engine.scores().iter().all(|(_, r)| r.score == 1.0));
    }

    #[test]
    fn outcome_without_pending_move_is_rejected() {
        let mut engine = engine(EngineConfig::default());
        engine.choose_next_move();
        engine.on_round_resolved(opponent(Move::Rock)).unwrap();
        let err = engine.on_round_resolved(opponent(Move::Rock)).unwrap_err();
        assert!(matches!(err, Error::StateInconsistency(_)));
        assert_eq!(engine.history().len(), 1);
        assert!(engine.scores().iter().all(|(_, r)| r.score == 1.0));
    }

    #[test]
    fn warm_up_outcomes_are_accepted() {
        let mut engine = engine(EngineConfig::default());
        engine.on_round_resolved(opponent(Move::Scissors)).unwrap();
        engine.on_round_resolved(opponent(Move::Scissors)).unwrap();
        assert_eq!(engine.history().len(), 2);
        assert_eq!(engine.choose_next_move(), Move::Rock);
    }

    #[test]
    fn repeated_choice_resubmits_outstanding_move() {
        let mut engine = engine(EngineConfig::default().with_deviation_probability(1.0));
        let first = engine.decide();
        let second = engine.decide();
        assert_eq!(first, second);
    }

    #[test]
    fn missing_outcome_consumes_pending() {
        let mut engine = engine(EngineConfig::default());
        engine.on_round_resolved(opponent(Move::Paper)).unwrap();
        engine.choose_next_move();
        assert!(engine.pending().is_some());

        let resolution = engine.on_round_resolved(None).unwrap();
        assert!(!resolution.appended);
        assert_eq!(resolution.feedback, Feedback::Unscored);
        assert!(engine.pending().is_none());
        assert_eq!(engine.history().len(), 1);
    }

    #[test]
    fn timed_out_opponent_is_recorded_but_unscored() {
        let mut engine = engine(EngineConfig::default());
        engine.on_round_resolved(opponent(Move::Paper)).unwrap();
        engine.choose_next_move();
        let resolution = engine
            .on_round_resolved(Some(RoundOutcome {
                own_move: Some(Move::Scissors),
                opponent_move: None,
                result: Outcome::Win,
            }))
            .unwrap();
        assert!(resolution.appended);
        assert_eq!(resolution.feedback, Feedback::Unscored);
        assert_eq!(engine.stats().first_order().increments(), 0);
    }

    #[test]
    fn reset_starts_a_new_session() {
        let mut engine = engine(EngineConfig::default());
        for m in [Move::Rock, Move::Paper, Move::Rock] {
            engine.choose_next_move();
            engine.on_round_resolved(opponent(m)).unwrap();
        }
        engine.choose_next_move();
        engine.reset();
        assert!(engine.history().is_empty());
        assert!(engine.pending().is_none());
        assert_eq!(engine.stats().first_order().increments(), 0);
        // nothing submitted since the reset, so outcomes count as warm-up again
        engine.on_round_resolved(opponent(Move::Rock)).unwrap();
    }
}
