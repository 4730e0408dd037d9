//! Local matches between an [`Engine`] and a scripted [`Strategy`].

use std::collections::BTreeMap;

use common::model::game::RoundOutcome;
use rand::Rng;
use serde::Serialize;
use tracing::info;

use crate::{
    engine::Engine,
    error::Result,
    predictor::PredictorKind,
    scorer::PredictorRecord,
    strategy::{Round, Strategy},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub rounds: usize,
    pub wins: usize,
    pub losses: usize,
    pub draws: usize,
    pub predictors: BTreeMap<PredictorKind, PredictorRecord>,
}

/// Play `rounds` rounds. Tallies are from the engine's side and cover the
/// engine's whole history, including anything played before this call.
pub fn simulate<R: Rng>(
    engine: &mut Engine<R>,
    opponent: &mut dyn Strategy,
    rounds: usize,
) -> Result<Summary> {
    // the opponent sees the rounds from its own side
    let mut their_history: Vec<Round> = Vec::with_capacity(rounds);
    for _ in 0..rounds {
        let ours = engine.choose_next_move();
        let theirs = opponent.make_move(&their_history);
        their_history.push(Round::new(theirs, ours));
        engine.on_round_resolved(Some(RoundOutcome::played(ours, theirs)))?;
    }

    let tally = engine.history().tally();
    let summary = Summary {
        rounds: engine.history().len(),
        wins: tally.wins,
        losses: tally.losses,
        draws: tally.draws,
        predictors: engine
            .scores()
            .iter()
            .map(|(kind, record)| (kind, *record))
            .collect(),
    };
    info!(
        "Simulated {} rounds: {} wins, {} losses, {} draws",
        summary.rounds, summary.wins, summary.losses, summary.draws
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use common::model::game::Move;

    use super::*;
    use crate::{
        config::EngineConfig,
        strategy::{Constant, Cycle, RandomMove},
    };

    fn engine() -> Engine {
        Engine::new(
            EngineConfig::default()
                .with_deviation_probability(0.0)
                .with_seed(11),
        )
        .unwrap()
    }

    #[test]
    fn beats_a_constant_opponent_every_round() {
        let mut engine = engine();
        let summary = simulate(&mut engine, &mut Constant(Move::Rock), 50).unwrap();
        assert_eq!(summary.rounds, 50);
        assert_eq!(summary.wins, 50);
    }

    #[test]
    fn learns_a_cycle() {
        let mut engine = engine();
        let summary = simulate(&mut engine, &mut Cycle, 300).unwrap();
        assert!(summary.wins > 150, "{:?}", summary);
    }

    #[test]
    fn summary_covers_registered_predictors() {
        let mut engine = engine();
        let summary = simulate(&mut engine, &mut RandomMove::new(1), 100).unwrap();
        assert_eq!(summary.wins + summary.losses + summary.draws, 100);
        assert_eq!(
            summary.predictors.keys().copied().collect::<Vec<_>>(),
            vec![
                PredictorKind::FirstOrder,
                PredictorKind::Frequency,
                PredictorKind::SecondOrder,
                PredictorKind::Suffix,
            ]
        );
        let json = serde_json::to_value(&summary).unwrap();
        assert!(json["predictors"]["first_order"]["score"].is_number());
    }
}
