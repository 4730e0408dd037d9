use common::model::game::Move;
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice {
    pub counter: Move,
    pub submitted: Move,
    pub deviated: bool,
}

/// Plays the counter to the predicted opponent move, except that with
/// `deviation_probability` it plays a uniformly random move instead.
#[derive(Debug, Clone, Copy)]
pub struct MoveChooser {
    deviation_probability: f64,
}

impl MoveChooser {
    pub fn new(deviation_probability: f64) -> Self {
        MoveChooser {
            deviation_probability,
        }
    }

    pub fn choose<R: Rng>(&self, predicted: Move, rng: &mut R) -> Choice {
        let counter = predicted.counter();
        if self.deviation_probability > 0.0 && rng.random_bool(self.deviation_probability) {
            let submitted = Move::ALL[rng.random_range(0..Move::ALL.len())];
            return Choice {
                counter,
                submitted,
                deviated: true,
            };
        }
        Choice {
            counter,
            submitted: counter,
            deviated: false,
        }
    }
}
