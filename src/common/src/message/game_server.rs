use crate::model::game::{Move, Outcome, RoundOutcome};
use serde::{Deserialize, Serialize};

// Client types
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum ClientRequest {
    JoinGame,
    Move { value: Move },
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type")]
pub enum ClientResponse {
    GameJoined,
    PendingMove,
    RoundResult(RoundOutcome),
    /// The round closed without data, e.g. both sides timed out.
    RoundSkipped,
    MatchResult {
        result: Outcome,
        wins: u8,
        total: u8,
    },
}
