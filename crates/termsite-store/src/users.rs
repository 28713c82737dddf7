//! Nickname registry keyed by device id

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::document::{decode, encode, DocumentStore};
use crate::error::StoreError;
use crate::identity::DeviceId;

/// Collection holding one record per device
pub const USERS_COLLECTION: &str = "users";

/// Stored user record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub nickname: String,
    pub device_id: DeviceId,
    pub updated_at: DateTime<Utc>,
}

/// Remembers which nickname a device chose
#[derive(Debug, Clone)]
pub struct NicknameRegistry {
    store: Arc<dyn DocumentStore>,
}

impl NicknameRegistry {
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Record registered for a device, if any
    ///
    /// # Errors
    /// Store failures, or `StoreError::Codec` for a malformed record.
    pub async fn lookup(&self, device: &DeviceId) -> Result<Option<UserRecord>, StoreError> {
        self.store
            .get(USERS_COLLECTION, device.as_str())
            .await?
            .map(decode)
            .transpose()
    }

    /// Associate a nickname with a device, replacing any previous one
    ///
    /// Callers validate the nickname first.
    ///
    /// # Errors
    /// Store failures.
    pub async fn register(
        &self,
        device: &DeviceId,
        nickname: &str,
    ) -> Result<UserRecord, StoreError> {
        let record = UserRecord {
            nickname: nickname.to_string(),
            device_id: device.clone(),
            updated_at: Utc::now(),
        };
        self.store
            .upsert(USERS_COLLECTION, device.as_str(), encode(&record)?)
            .await?;
        tracing::info!("registered nickname {nickname} for device {device}");
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryDocumentStore;

    #[tokio::test]
    async fn unknown_device_has_no_record() {
        let registry = NicknameRegistry::new(Arc::new(InMemoryDocumentStore::new()));
        assert_eq!(registry.lookup(&DeviceId::new("d1")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn register_then_lookup() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let registry = NicknameRegistry::new(store.clone());
        let device = DeviceId::new("d1");

        registry.register(&device, "alice").await.unwrap();
        registry.register(&device, "alice2").await.unwrap();

        let record = registry.lookup(&device).await.unwrap().unwrap();
        assert_eq!(record.nickname, "alice2");
        assert_eq!(record.device_id, device);
        assert_eq!(store.len(), 1);
    }
}
