use common::model::game::Move;

use crate::{
    history::HistoryLog,
    predictor::Predictor,
    scorer::{PendingPrediction, PredictorScores, Source},
    stats::TransitionStats,
};

/// Picks the highest-ranked predictor that has an opinion.
///
/// Ranking is score descending, then predictor name ascending, so equal
/// scores always resolve the same way. No randomness is involved.
#[derive(Debug, Clone, Copy)]
pub struct MetaSelector {
    fallback: Move,
}

impl MetaSelector {
    pub fn new(fallback: Move) -> Self {
        MetaSelector { fallback }
    }

    /// Indices into `predictors` in the order they should be consulted.
    pub fn rank(&self, predictors: &[Box<dyn Predictor>], scores: &PredictorScores) -> Vec<usize> {
        let score = |i: usize| scores.score(predictors[i].kind()).unwrap_or(f64::MIN);
        let mut order: Vec<usize> = (0..predictors.len()).collect();
        order.sort_by(|&a, &b| {
            score(b)
                .total_cmp(&score(a))
                .then_with(|| predictors[a].kind().cmp(&predictors[b].kind()))
        });
        order
    }

    pub fn select(
        &self,
        predictors: &[Box<dyn Predictor>],
        scores: &PredictorScores,
        history: &HistoryLog,
        stats: &TransitionStats,
    ) -> PendingPrediction {
        self.rank(predictors, scores)
            .into_iter()
            .find_map(|i| {
                let predictor = &predictors[i];
                predictor
                    .predict(history, stats)
                    .map(|predicted| PendingPrediction {
                        source: Source::Predictor(predictor.kind()),
                        predicted,
                    })
            })
            .unwrap_or(PendingPrediction {
                source: Source::Fallback,
                predicted: self.fallback,
            })
    }
}
