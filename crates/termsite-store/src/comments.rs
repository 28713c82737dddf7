//! Shared comment board
//!
//! One comment per nickname; posting again overwrites it.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::document::{decode, encode, DocumentStore};
use crate::error::StoreError;

/// Collection holding one comment per nickname
pub const COMMENTS_COLLECTION: &str = "comments";

/// Stored comment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredComment {
    pub nickname: String,
    pub content: String,
    pub updated_at: DateTime<Utc>,
}

/// Comments visible to the site owner
#[derive(Debug, Clone)]
pub struct CommentBoard {
    store: Arc<dyn DocumentStore>,
}

impl CommentBoard {
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Upsert the comment keyed by its nickname
    ///
    /// # Errors
    /// Store failures.
    pub async fn post(&self, comment: &StoredComment) -> Result<(), StoreError> {
        self.store
            .upsert(COMMENTS_COLLECTION, &comment.nickname, encode(comment)?)
            .await?;
        Ok(())
    }

    /// All comments, newest first
    ///
    /// # Errors
    /// Store failures, or `StoreError::Codec` for a malformed record.
    pub async fn list(&self) -> Result<Vec<StoredComment>, StoreError> {
        let mut comments = self
            .store
            .list(COMMENTS_COLLECTION)
            .await?
            .into_iter()
            .map(|(_, doc)| decode::<StoredComment>(doc))
            .collect::<Result<Vec<_>, _>>()?;
        comments.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(comments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryDocumentStore;
    use chrono::TimeZone;

    fn comment(nickname: &str, content: &str, minute: u32) -> StoredComment {
        StoredComment {
            nickname: nickname.into(),
            content: content.into(),
            updated_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, minute, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn posting_twice_keeps_one_comment() {
        let board = CommentBoard::new(Arc::new(InMemoryDocumentStore::new()));
        board.post(&comment("alice", "first", 0)).await.unwrap();
        board.post(&comment("alice", "second", 1)).await.unwrap();

        let all = board.list().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].content, "second");
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let board = CommentBoard::new(Arc::new(InMemoryDocumentStore::new()));
        board.post(&comment("alice", "a", 5)).await.unwrap();
        board.post(&comment("bob", "b", 9)).await.unwrap();
        board.post(&comment("carol", "c", 1)).await.unwrap();

        let order: Vec<String> = board
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.nickname)
            .collect();
        assert_eq!(order, vec!["bob", "alice", "carol"]);
    }
}
