//! Two-browser chess rooms
//!
//! A room is a versioned document in the `rooms` collection. Every write goes
//! through a store transaction and increments `version` by exactly one.
//! Moves carry the version their author last saw; if the room has moved on
//! the move is dropped and the author's next snapshot is the truth. There is
//! no merge and no retry.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use termsite_chess::{MoveOutcome, MoveSubmission, RoomClient};
//! use termsite_store::InMemoryDocumentStore;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let rooms = RoomClient::new(Arc::new(InMemoryDocumentStore::new()));
//! rooms.create_room("K3Q9ZP", "alice").await.unwrap();
//! let (_, room) = rooms.join_room("K3Q9ZP", "bob").await.unwrap();
//!
//! let mv = MoveSubmission::new(room.version, "e2", "e4", "fen-after-e4");
//! let outcome = rooms.submit_move("K3Q9ZP", "alice", mv).await.unwrap();
//! assert!(matches!(outcome, MoveOutcome::Applied(_)));
//! # });
//! ```

use std::fmt;
use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};
use termsite_store::{decode, encode, AbortReason, DocumentStore, Mutation, StoreError, Subscription};

use crate::error::RoomError;

/// Collection holding rooms
pub const ROOMS_COLLECTION: &str = "rooms";

/// Standard starting position
pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Characters used in generated room codes (no 0/O or 1/I)
pub const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Side of the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Black,
}

impl Color {
    #[inline]
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::White => "white",
            Self::Black => "black",
        })
    }
}

/// Room lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    /// Creator seated, waiting for an opponent
    Waiting,
    /// Both seats taken
    Active,
    /// Game over
    Finished,
}

/// Seat assignments
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Players {
    pub white: Option<String>,
    pub black: Option<String>,
}

impl Players {
    /// Seat held by `player`
    #[must_use]
    pub fn seat_of(&self, player: &str) -> Option<Color> {
        if self.white.as_deref() == Some(player) {
            Some(Color::White)
        } else if self.black.as_deref() == Some(player) {
            Some(Color::Black)
        } else {
            None
        }
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.white.is_some() && self.black.is_some()
    }
}

/// Most recent move, for highlighting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastMove {
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion: Option<String>,
}

/// How a game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FinishReason {
    Checkmate,
    Stalemate,
    Draw,
    Resignation,
}

/// Final result of a room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    /// `None` for drawn games
    pub winner: Option<Color>,
    pub reason: FinishReason,
}

/// Stored room document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomDoc {
    pub fen: String,
    pub turn: Color,
    pub players: Players,
    pub status: RoomStatus,
    #[serde(default)]
    pub last_move: Option<LastMove>,
    pub version: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<GameResult>,
}

impl RoomDoc {
    /// Fresh room with `creator` playing white
    #[must_use]
    pub fn new(creator: &str) -> Self {
        Self {
            fen: START_FEN.to_string(),
            turn: Color::White,
            players: Players {
                white: Some(creator.to_string()),
                black: None,
            },
            status: RoomStatus::Waiting,
            last_move: None,
            version: 0,
            result: None,
        }
    }

    /// Whether `player` holds the seat on turn in an active game
    #[must_use]
    pub fn is_turn_of(&self, player: &str) -> bool {
        self.status == RoomStatus::Active && self.players.seat_of(player) == Some(self.turn)
    }
}

/// A move as sent by a client
///
/// The client owns the chess rules: it sends the position after the move
/// and, if the move ends the game, the result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveSubmission {
    /// Room version the client based this move on
    pub expected_version: u64,
    pub from: String,
    pub to: String,
    pub promotion: Option<String>,
    pub fen_after: String,
    /// Set when the move ends the game
    pub outcome: Option<GameResult>,
}

impl MoveSubmission {
    #[must_use]
    pub fn new(
        expected_version: u64,
        from: impl Into<String>,
        to: impl Into<String>,
        fen_after: impl Into<String>,
    ) -> Self {
        Self {
            expected_version,
            from: from.into(),
            to: to.into(),
            promotion: None,
            fen_after: fen_after.into(),
            outcome: None,
        }
    }

    #[must_use]
    pub fn with_promotion(mut self, piece: impl Into<String>) -> Self {
        self.promotion = Some(piece.into());
        self
    }

    #[must_use]
    pub fn with_outcome(mut self, outcome: GameResult) -> Self {
        self.outcome = Some(outcome);
        self
    }
}

/// What happened to a submitted move
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Stored; carries the room after the move
    Applied(RoomDoc),
    /// Room had moved past the expected version; nothing was written
    Stale { current_version: u64 },
}

#[derive(Debug, thiserror::Error)]
#[error("expected version {expected}, room is at {actual}")]
struct StaleMove {
    expected: u64,
    actual: u64,
}

/// Typed view of one room's snapshots
#[derive(Debug, Clone)]
pub struct RoomSubscription {
    inner: Subscription,
}

impl RoomSubscription {
    /// Room right now (`None` if absent or unreadable)
    #[must_use]
    pub fn current(&self) -> Option<RoomDoc> {
        self.inner.current().and_then(decode_snapshot)
    }

    /// Next snapshot; `Some(None)` means the room was deleted
    ///
    /// Returns `None` once the store has gone away.
    pub async fn next(&mut self) -> Option<Option<RoomDoc>> {
        let doc = self.inner.next().await?;
        Some(doc.and_then(decode_snapshot))
    }
}

fn decode_snapshot(doc: termsite_store::Document) -> Option<RoomDoc> {
    match decode(doc) {
        Ok(room) => Some(room),
        Err(e) => {
            tracing::warn!("ignoring unreadable room snapshot: {e}");
            None
        }
    }
}

/// Random room code of `len` characters from [`ROOM_CODE_ALPHABET`]
#[must_use]
pub fn random_room_code(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| char::from(ROOM_CODE_ALPHABET[rng.random_range(0..ROOM_CODE_ALPHABET.len())]))
        .collect()
}

/// Room operations against a document store
#[derive(Debug, Clone)]
pub struct RoomClient {
    store: Arc<dyn DocumentStore>,
    code_len: usize,
    create_attempts: usize,
}

impl RoomClient {
    /// Client with 6-character codes and 5 creation attempts
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            code_len: 6,
            create_attempts: 5,
        }
    }

    /// With generated code length
    #[inline]
    #[must_use]
    pub fn with_code_len(mut self, len: usize) -> Self {
        self.code_len = len.max(1);
        self
    }

    /// With attempts for random-code creation
    #[inline]
    #[must_use]
    pub fn with_create_attempts(mut self, attempts: usize) -> Self {
        self.create_attempts = attempts.max(1);
        self
    }

    /// Open a room under `code` with `creator` as white
    ///
    /// # Errors
    /// `RoomError::RoomExists` if the code is taken.
    pub async fn create_room(&self, code: &str, creator: &str) -> Result<RoomDoc, RoomError> {
        let room = RoomDoc::new(creator);
        match self.store.create(ROOMS_COLLECTION, code, encode(&room)?).await {
            Ok(()) => {
                tracing::info!("room {code} created by {creator}");
                Ok(room)
            }
            Err(StoreError::AlreadyExists { .. }) => Err(RoomError::RoomExists(code.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    /// Open a room under a fresh random code
    ///
    /// # Errors
    /// `RoomError::RoomExists` if every attempt collided; store failures.
    pub async fn create_room_with_random_code(
        &self,
        creator: &str,
    ) -> Result<(String, RoomDoc), RoomError> {
        let mut last = None;
        for _ in 0..self.create_attempts {
            let code = random_room_code(self.code_len);
            match self.create_room(&code, creator).await {
                Ok(room) => return Ok((code, room)),
                Err(RoomError::RoomExists(code)) => {
                    tracing::debug!("room code {code} taken, retrying");
                    last = Some(code);
                }
                Err(e) => return Err(e),
            }
        }
        Err(RoomError::RoomExists(last.unwrap_or_default()))
    }

    /// Current room document
    ///
    /// # Errors
    /// Store failures.
    pub async fn get_room(&self, code: &str) -> Result<Option<RoomDoc>, RoomError> {
        self.store
            .get(ROOMS_COLLECTION, code)
            .await?
            .map(|doc| decode(doc).map_err(RoomError::from))
            .transpose()
    }

    /// Take the free seat, or rejoin the one already held
    ///
    /// Filling the second seat starts the game.
    ///
    /// # Errors
    /// `RoomNotFound`, `RoomFinished`, `RoomFull`; store failures.
    pub async fn join_room(&self, code: &str, player: &str) -> Result<(Color, RoomDoc), RoomError> {
        let player_owned = player.to_string();
        let room_code = code.to_string();
        let room = self
            .update(code, move |mut room| {
                if room.players.seat_of(&player_owned).is_some() {
                    return Ok(None);
                }
                if room.status == RoomStatus::Finished {
                    return Err(RoomError::RoomFinished(room_code).into());
                }
                if room.players.is_full() {
                    return Err(RoomError::RoomFull(room_code).into());
                }
                if room.players.white.is_none() {
                    room.players.white = Some(player_owned);
                } else {
                    room.players.black = Some(player_owned);
                }
                if room.players.is_full() {
                    room.status = RoomStatus::Active;
                }
                Ok(Some(room))
            })
            .await
            .map_err(RoomError::from_transaction)?;

        let seat = room.players.seat_of(player).ok_or(RoomError::NotSeated)?;
        tracing::info!("{player} seated as {seat} in room {code}");
        Ok((seat, room))
    }

    /// Submit a move based on `submission.expected_version`
    ///
    /// A stale version is not an error: the move is dropped and
    /// [`MoveOutcome::Stale`] returned.
    ///
    /// # Errors
    /// `RoomNotFound`, `RoomFinished`, `NotActive`, `NotSeated`,
    /// `NotYourTurn`; store failures.
    pub async fn submit_move(
        &self,
        code: &str,
        player: &str,
        submission: MoveSubmission,
    ) -> Result<MoveOutcome, RoomError> {
        let player_owned = player.to_string();
        let room_code = code.to_string();
        let expected = submission.expected_version;
        let result = self
            .update(code, move |mut room| {
                if room.version != expected {
                    return Err(StaleMove {
                        expected,
                        actual: room.version,
                    }
                    .into());
                }
                match room.status {
                    RoomStatus::Active => {}
                    RoomStatus::Waiting => return Err(RoomError::NotActive.into()),
                    RoomStatus::Finished => return Err(RoomError::RoomFinished(room_code).into()),
                }
                let seat = room
                    .players
                    .seat_of(&player_owned)
                    .ok_or(RoomError::NotSeated)?;
                if seat != room.turn {
                    return Err(RoomError::NotYourTurn.into());
                }

                room.fen = submission.fen_after;
                room.turn = seat.opposite();
                room.last_move = Some(LastMove {
                    from: submission.from,
                    to: submission.to,
                    promotion: submission.promotion,
                });
                if let Some(outcome) = submission.outcome {
                    room.status = RoomStatus::Finished;
                    room.result = Some(outcome);
                }
                Ok(Some(room))
            })
            .await;

        match result {
            Ok(room) => Ok(MoveOutcome::Applied(room)),
            Err(err) => match err.downcast_abort::<StaleMove>() {
                Ok(stale) => {
                    tracing::debug!("dropped stale move in room {code}: {stale}");
                    Ok(MoveOutcome::Stale {
                        current_version: stale.actual,
                    })
                }
                Err(err) => Err(RoomError::from_transaction(err)),
            },
        }
    }

    /// Concede; the opponent wins
    ///
    /// # Errors
    /// `RoomNotFound`, `RoomFinished`, `NotActive`, `NotSeated`; store
    /// failures.
    pub async fn resign(&self, code: &str, player: &str) -> Result<RoomDoc, RoomError> {
        let player_owned = player.to_string();
        let room_code = code.to_string();
        let room = self
            .update(code, move |mut room| {
                match room.status {
                    RoomStatus::Active => {}
                    RoomStatus::Waiting => return Err(RoomError::NotActive.into()),
                    RoomStatus::Finished => return Err(RoomError::RoomFinished(room_code).into()),
                }
                let seat = room
                    .players
                    .seat_of(&player_owned)
                    .ok_or(RoomError::NotSeated)?;
                room.status = RoomStatus::Finished;
                room.result = Some(GameResult {
                    winner: Some(seat.opposite()),
                    reason: FinishReason::Resignation,
                });
                Ok(Some(room))
            })
            .await
            .map_err(RoomError::from_transaction)?;
        tracing::info!("{player} resigned in room {code}");
        Ok(room)
    }

    /// Watch a room
    ///
    /// # Errors
    /// Store failures.
    pub async fn subscribe(&self, code: &str) -> Result<RoomSubscription, RoomError> {
        let inner = self.store.subscribe(ROOMS_COLLECTION, code).await?;
        Ok(RoomSubscription { inner })
    }

    /// Remove a room; subscribers see `None`
    ///
    /// # Errors
    /// `RoomNotFound` if there is no such room; store failures.
    pub async fn delete_room(&self, code: &str) -> Result<(), RoomError> {
        match self.store.delete(ROOMS_COLLECTION, code).await {
            Ok(()) => Ok(()),
            Err(StoreError::NotFound { .. }) => Err(RoomError::RoomNotFound(code.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    /// Transactionally rewrite a room
    ///
    /// `apply` returns the new room (its version is bumped here) or `None` to
    /// leave it unchanged. Errors come back as the raw store error so callers
    /// can pick out their own abort reasons.
    async fn update<F>(&self, code: &str, apply: F) -> Result<RoomDoc, StoreError>
    where
        F: FnOnce(RoomDoc) -> Result<Option<RoomDoc>, AbortReason> + Send + 'static,
    {
        let room_code = code.to_string();
        let after = self
            .store
            .transact(
                ROOMS_COLLECTION,
                code,
                Box::new(move |doc| {
                    let Some(doc) = doc else {
                        return Err(RoomError::RoomNotFound(room_code).into());
                    };
                    let room: RoomDoc = decode(doc.clone())?;
                    match apply(room)? {
                        Some(mut next) => {
                            next.version += 1;
                            Ok(Mutation::Write(encode(&next)?))
                        }
                        None => Ok(Mutation::Keep),
                    }
                }),
            )
            .await?;
        let doc = after.ok_or_else(|| {
            StoreError::Aborted(RoomError::RoomNotFound(code.to_string()).into())
        })?;
        decode(doc)
    }
}
