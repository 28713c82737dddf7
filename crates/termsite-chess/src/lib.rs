//! termsite chess
//!
//! Multiplayer rooms synced through the document store, and a client for
//! UCI engines.
//!
//! # Core Concepts
//!
//! - [`RoomClient`]: create, join, move, resign, watch and delete rooms
//! - [`RoomView`]: one player's snapshot plus a single optimistic move
//! - [`EngineClient`]: `uci`/`isready` handshakes and paced best moves over
//!   any [`EngineTransport`]

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod engine;
mod error;
pub mod room;
mod view;

pub use engine::{
    BestMove, EngineClient, EngineTransport, GoParams, UciCommand, UciResponse, MAX_SKILL_LEVEL,
    SKILL_LEVEL_OPTION,
};
pub use error::{EngineError, RoomError};
pub use room::{
    random_room_code, Color, FinishReason, GameResult, LastMove, MoveOutcome, MoveSubmission,
    Players, RoomClient, RoomDoc, RoomStatus, RoomSubscription, ROOMS_COLLECTION, START_FEN,
};
pub use view::RoomView;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
