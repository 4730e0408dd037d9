use common::{
    message::game_server::{ClientRequest, ClientResponse},
    model::game::{Move, RoundOutcome},
};
use rand::{rngs::SmallRng, Rng};
use tracing::{debug, info, warn};

use crate::engine::Engine;

/// Drives an [`Engine`] from game server messages.
pub struct Client<R = SmallRng> {
    engine: Engine<R>,
    last_move: Option<Move>,
}

impl<R: Rng> Client<R> {
    pub fn new(engine: Engine<R>) -> Self {
        Client {
            engine,
            last_move: None,
        }
    }

    /// React to one server message, returning the reply if one is due.
    /// Engine errors are logged and the message dropped.
    pub fn handle(&mut self, response: ClientResponse) -> Option<ClientRequest> {
        match response {
            ClientResponse::GameJoined => {
                info!("Joined game");
                None
            }
            ClientResponse::PendingMove => Some(ClientRequest::Move { value: self.play() }),
            ClientResponse::RoundResult(outcome) => {
                debug!("Round result: {:?}", outcome);
                self.resolve(Some(outcome));
                None
            }
            ClientResponse::RoundSkipped => {
                debug!("Round skipped");
                self.resolve(None);
                None
            }
            ClientResponse::MatchResult {
                result,
                wins,
                total,
            } => {
                info!("Match over: {:?}, won {} of {}", result, wins, total);
                None
            }
        }
    }

    fn play(&mut self) -> Move {
        let next_move = self.engine.choose_next_move();
        self.last_move = Some(next_move);
        next_move
    }

    fn resolve(&mut self, outcome: Option<RoundOutcome>) {
        if let Err(e) = self.engine.on_round_resolved(outcome) {
            warn!("Dropping round message: {}", e);
        }
    }

    pub fn last_move(&self) -> Option<Move> {
        self.last_move
    }

    pub fn engine(&self) -> &Engine<R> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut Engine<R> {
        &mut self.engine
    }
}
