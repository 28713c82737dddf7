//! Best-effort replication of visitor comments
//!
//! The shell hands every saved comment to a [`CommentSink`] and moves on.
//! Sinks must not block, and whatever happens downstream stays invisible to
//! the shell.

use std::fmt::Debug;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A comment as replicated to the hosted store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentRecord {
    /// Author nickname (the upsert key)
    pub nickname: String,
    /// Comment text
    pub content: String,
    /// When the shell saved it
    pub updated_at: DateTime<Utc>,
}

/// Fire-and-forget destination for comments
pub trait CommentSink: Send + Sync + Debug {
    /// Hand off a record; must return without waiting on I/O
    fn publish(&self, record: CommentRecord);
}

/// Sink that drops everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCommentSink;

impl CommentSink for NoopCommentSink {
    fn publish(&self, record: CommentRecord) {
        tracing::debug!("comment from {} not replicated (no sink)", record.nickname);
    }
}
