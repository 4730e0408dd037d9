use common::model::game::{Move, Outcome};
use rand::{rngs::SmallRng, Rng, SeedableRng};

/// One round from the point of view of the strategy that played it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Round {
    pub my_move: Move,
    pub their_move: Move,
    pub outcome: Outcome,
}

impl Round {
    pub fn new(my_move: Move, their_move: Move) -> Self {
        Round {
            my_move,
            their_move,
            outcome: Outcome::of(my_move, their_move),
        }
    }
}

pub trait Strategy {
    fn make_move(&mut self, history: &[Round]) -> Move;
}

// Trivial strategies
pub struct Constant(pub Move);
impl Strategy for Constant {
    fn make_move(&mut self, _: &[Round]) -> Move {
        self.0
    }
}

/// ROCK, PAPER, SCISSORS, ROCK, ...
pub struct Cycle;
impl Strategy for Cycle {
    fn make_move(&mut self, history: &[Round]) -> Move {
        Move::ALL[history.len() % Move::ALL.len()]
    }
}

// Reactive
/// Plays whatever beats the opponent's previous move.
pub struct BeatLast;
impl Strategy for BeatLast {
    fn make_move(&mut self, history: &[Round]) -> Move {
        history
            .last()
            .map(|round| round.their_move.counter())
            .unwrap_or(Move::Rock)
    }
}

/// Repeats the opponent's previous move.
pub struct CopyLast;
impl Strategy for CopyLast {
    fn make_move(&mut self, history: &[Round]) -> Move {
        history
            .last()
            .map(|round| round.their_move)
            .unwrap_or(Move::Rock)
    }
}

// Random
pub struct RandomMove {
    rng: SmallRng,
}

impl RandomMove {
    pub fn new(seed: u64) -> Self {
        RandomMove {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl Strategy for RandomMove {
    fn make_move(&mut self, _: &[Round]) -> Move {
        Move::ALL[self.rng.random_range(0..Move::ALL.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play(strategy: &mut dyn Strategy, their_moves: &[Move]) -> Vec<Move> {
        let mut history = Vec::new();
        let mut mine = Vec::new();
        for their_move in their_moves {
            let my_move = strategy.make_move(&history);
            mine.push(my_move);
            history.push(Round::new(my_move, *their_move));
        }
        mine
    }

    #[test]
    fn cycle_walks_canonical_order() {
        let moves = play(&mut Cycle, &[Move::Rock; 4]);
        assert_eq!(
            moves,
            vec![Move::Rock, Move::Paper, Move::Scissors, Move::Rock]
        );
    }

    #[test]
    fn reactive_strategies_follow_last_move() {
        let theirs = [Move::Scissors, Move::Paper, Move::Rock];
        assert_eq!(
            play(&mut BeatLast, &theirs),
            vec![Move::Rock, Move::Rock, Move::Scissors]
        );
        assert_eq!(
            play(&mut CopyLast, &theirs),
            vec![Move::Rock, Move::Scissors, Move::Paper]
        );
    }

    #[test]
    fn random_is_reproducible() {
        let theirs = [Move::Rock; 30];
        assert_eq!(
            play(&mut RandomMove::new(5), &theirs),
            play(&mut RandomMove::new(5), &theirs)
        );
    }

    #[test]
    fn round_outcome_is_from_my_side() {
        assert_eq!(Round::new(Move::Paper, Move::Rock).outcome, Outcome::Win);
    }
}
