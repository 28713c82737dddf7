//! Error types for the document store and device identity

/// Reason a transaction mutator gave for aborting
pub type AbortReason = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Document store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// `create` on a key that already holds a document
    #[error("document already exists: {collection}/{key}")]
    AlreadyExists { collection: String, key: String },

    /// Operation needs a document that is not there
    #[error("document not found: {collection}/{key}")]
    NotFound { collection: String, key: String },

    /// Transaction mutator refused to write
    #[error("transaction aborted: {0}")]
    Aborted(AbortReason),

    /// Backend cannot be reached
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Document does not match the expected shape
    #[error("codec error: {0}")]
    Codec(#[from] serde_json::Error),

    /// Persisted collection could not be read or written
    #[error("store io error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Already-exists error for a document address
    #[must_use]
    pub fn already_exists(collection: &str, key: &str) -> Self {
        Self::AlreadyExists {
            collection: collection.to_string(),
            key: key.to_string(),
        }
    }

    /// Not-found error for a document address
    #[must_use]
    pub fn not_found(collection: &str, key: &str) -> Self {
        Self::NotFound {
            collection: collection.to_string(),
            key: key.to_string(),
        }
    }

    /// Recover the typed reason of an aborted transaction
    ///
    /// # Errors
    /// Returns `self` unchanged if this is not an abort or the reason has
    /// another type.
    pub fn downcast_abort<E>(self) -> Result<E, Self>
    where
        E: std::error::Error + 'static,
    {
        match self {
            Self::Aborted(reason) => reason
                .downcast::<E>()
                .map(|typed| *typed)
                .map_err(Self::Aborted),
            other => Err(other),
        }
    }
}

/// Device identity persistence errors
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// Reading or writing the id file failed
    #[error("device id io error: {0}")]
    Io(#[from] std::io::Error),

    /// Storage refuses access (disabled, private mode, ...)
    #[error("device id storage unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error, PartialEq)]
    #[error("seat taken")]
    struct SeatTaken;

    #[test]
    fn downcast_recovers_typed_reason() {
        let err = StoreError::Aborted(Box::new(SeatTaken));
        assert_eq!(err.downcast_abort::<SeatTaken>().unwrap(), SeatTaken);
    }

    #[test]
    fn downcast_leaves_other_errors() {
        let err = StoreError::not_found("rooms", "abc");
        assert!(matches!(
            err.downcast_abort::<SeatTaken>(),
            Err(StoreError::NotFound { .. })
        ));

        let err = StoreError::Aborted("plain".into());
        assert!(matches!(
            err.downcast_abort::<SeatTaken>(),
            Err(StoreError::Aborted(_))
        ));
    }

    #[test]
    fn messages_name_the_document() {
        assert_eq!(
            StoreError::already_exists("rooms", "K3Q9ZP").to_string(),
            "document already exists: rooms/K3Q9ZP"
        );
    }
}
