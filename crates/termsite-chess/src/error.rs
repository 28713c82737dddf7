//! Error types for chess rooms and the engine client

use std::time::Duration;

use termsite_store::StoreError;

/// Chess room errors
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// Room code already taken
    #[error("room already exists: {0}")]
    RoomExists(String),

    /// No room under that code
    #[error("room not found: {0}")]
    RoomNotFound(String),

    /// Both seats taken by other players
    #[error("room is full: {0}")]
    RoomFull(String),

    /// Game over; no more joins or moves
    #[error("game in room {0} is finished")]
    RoomFinished(String),

    /// Still waiting for an opponent
    #[error("game has not started")]
    NotActive,

    /// Move attempted by the side not on turn
    #[error("not your turn")]
    NotYourTurn,

    /// Player holds no seat in this room
    #[error("not seated in this room")]
    NotSeated,

    /// Local move proposed while another one is in flight
    #[error("a move is already pending")]
    MovePending,

    /// Underlying store failure
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl RoomError {
    /// Unwrap a store error coming out of a room transaction
    ///
    /// Room rules abort transactions with a `RoomError` (or a `StoreError`
    /// when the stored document cannot be decoded); anything else is a plain
    /// store failure.
    #[must_use]
    pub fn from_transaction(err: StoreError) -> Self {
        match err.downcast_abort::<RoomError>() {
            Ok(room) => room,
            Err(err) => match err.downcast_abort::<StoreError>() {
                Ok(inner) => Self::Store(inner),
                Err(err) => Self::Store(err),
            },
        }
    }
}

/// Engine client errors
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Engine stopped talking
    #[error("engine closed the connection")]
    Closed,

    /// No expected reply within the deadline
    #[error("engine did not answer within {0:?}")]
    Timeout(Duration),

    /// Engine found nothing to play
    #[error("engine has no legal move")]
    NoLegalMove,

    /// Transport I/O failure
    #[error("engine io error: {0}")]
    Io(#[from] std::io::Error),
}
