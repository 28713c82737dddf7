//! Testing utilities for the termsite workspace
//!
//! Shared fixtures: quiet shell sessions, a store that is always down, a
//! comment sink that remembers, and a scripted UCI engine.

#![allow(missing_docs)]

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use termsite_chess::{EngineError, EngineTransport, RoomClient, UciCommand};
use termsite_shell::{CommentRecord, CommentSink, ShellConfig, ShellSession};
use termsite_store::{
    Document, DocumentStore, InMemoryDocumentStore, Mutator, StoreError, Subscription,
};

/// Shell config without welcome lines
pub fn quiet_config() -> ShellConfig {
    ShellConfig::new().with_welcome(Vec::new())
}

/// Session for `nickname` with an empty display log
pub fn seeded_session(nickname: &str) -> ShellSession {
    ShellSession::new(nickname, quiet_config()).unwrap()
}

/// Session whose comments land in the returned sink
pub fn recording_session(nickname: &str) -> (ShellSession, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::default());
    let session = seeded_session(nickname).with_comment_sink(sink.clone());
    (session, sink)
}

/// Comment sink that keeps every record
#[derive(Debug, Default)]
pub struct RecordingSink {
    records: Mutex<Vec<CommentRecord>>,
}

impl RecordingSink {
    pub fn records(&self) -> Vec<CommentRecord> {
        self.records.lock().clone()
    }
}

impl CommentSink for RecordingSink {
    fn publish(&self, record: CommentRecord) {
        self.records.lock().push(record);
    }
}

/// Store whose every operation fails with `StoreError::Unavailable`
#[derive(Debug, Default)]
pub struct FailingStore;

fn down() -> StoreError {
    StoreError::Unavailable("test store is down".into())
}

#[async_trait]
impl DocumentStore for FailingStore {
    async fn get(&self, _collection: &str, _key: &str) -> Result<Option<Document>, StoreError> {
        Err(down())
    }

    async fn list(&self, _collection: &str) -> Result<Vec<(String, Document)>, StoreError> {
        Err(down())
    }

    async fn create(&self, _collection: &str, _key: &str, _doc: Document) -> Result<(), StoreError> {
        Err(down())
    }

    async fn upsert(
        &self,
        _collection: &str,
        _key: &str,
        _fields: Document,
    ) -> Result<Document, StoreError> {
        Err(down())
    }

    async fn transact(
        &self,
        _collection: &str,
        _key: &str,
        _mutator: Mutator,
    ) -> Result<Option<Document>, StoreError> {
        Err(down())
    }

    async fn subscribe(&self, _collection: &str, _key: &str) -> Result<Subscription, StoreError> {
        Err(down())
    }

    async fn delete(&self, _collection: &str, _key: &str) -> Result<(), StoreError> {
        Err(down())
    }
}

/// Fresh in-memory store behind the trait object
pub fn memory_store() -> Arc<dyn DocumentStore> {
    Arc::new(InMemoryDocumentStore::new())
}

/// Room `code` with alice as white and bob as black
pub async fn active_room(store: Arc<dyn DocumentStore>, code: &str) -> RoomClient {
    let rooms = RoomClient::new(store);
    rooms.create_room(code, "alice").await.unwrap();
    rooms.join_room(code, "bob").await.unwrap();
    rooms
}

/// Engine that answers `uci`, `isready` and `go` from a script
#[derive(Debug, Default)]
pub struct ScriptedEngine {
    sent: Arc<Mutex<Vec<String>>>,
    queued: VecDeque<String>,
    best_moves: VecDeque<String>,
    options: Vec<String>,
}

impl ScriptedEngine {
    /// Engine that plays `moves` in order, one per `go`
    pub fn playing(moves: &[&str]) -> Self {
        Self {
            best_moves: moves.iter().map(|m| (*m).to_string()).collect(),
            options: vec!["Skill Level".to_string()],
            ..Self::default()
        }
    }

    /// Shared log of every command line sent
    pub fn sent_log(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.sent)
    }
}

#[async_trait]
impl EngineTransport for ScriptedEngine {
    async fn send(&mut self, command: &UciCommand) -> Result<(), EngineError> {
        self.sent.lock().push(command.to_string());
        match command {
            UciCommand::Uci => {
                self.queued.push_back("id name Scripted".to_string());
                for name in &self.options {
                    self.queued
                        .push_back(format!("option name {name} type spin default 20 min 0 max 20"));
                }
                self.queued.push_back("uciok".to_string());
            }
            UciCommand::IsReady => self.queued.push_back("readyok".to_string()),
            UciCommand::Go(_) => {
                let mv = self
                    .best_moves
                    .pop_front()
                    .unwrap_or_else(|| "(none)".to_string());
                self.queued.push_back(format!("bestmove {mv}"));
            }
            _ => {}
        }
        Ok(())
    }

    async fn recv(&mut self) -> Result<String, EngineError> {
        self.queued.pop_front().ok_or(EngineError::Closed)
    }
}
