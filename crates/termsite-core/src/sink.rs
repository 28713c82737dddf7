//! Store-backed comment replication

use termsite_shell::{CommentRecord, CommentSink};
use termsite_store::{CommentBoard, StoredComment};
use tokio::runtime::Handle;

/// Posts shell comments to the shared board in the background
///
/// `publish` spawns onto the runtime and returns at once; failures are
/// logged and dropped.
#[derive(Debug, Clone)]
pub struct StoreCommentSink {
    board: CommentBoard,
    runtime: Handle,
}

impl StoreCommentSink {
    #[must_use]
    pub fn new(board: CommentBoard, runtime: Handle) -> Self {
        Self { board, runtime }
    }
}

impl CommentSink for StoreCommentSink {
    fn publish(&self, record: CommentRecord) {
        let board = self.board.clone();
        self.runtime.spawn(async move {
            let comment = StoredComment {
                nickname: record.nickname,
                content: record.content,
                updated_at: record.updated_at,
            };
            match board.post(&comment).await {
                Ok(()) => tracing::debug!("comment from {} replicated", comment.nickname),
                Err(e) => tracing::warn!("comment from {} not replicated: {e}", comment.nickname),
            }
        });
    }
}
