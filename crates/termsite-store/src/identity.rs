//! Device identity
//!
//! A returning visitor is recognised by an opaque id persisted on their side.
//! When nothing can be persisted the id degrades to a fingerprint of the
//! client metadata, which is stable but not unique.

use std::fmt::{self, Debug};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::IdentityError;

/// File name of the persisted id inside a state directory
pub const DEVICE_ID_FILE: &str = "device_id";

/// What the client tells us about itself
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientMetadata {
    pub user_agent: String,
    pub platform: String,
    pub language: String,
    pub timezone: String,
}

impl ClientMetadata {
    /// Metadata describing this process
    ///
    /// Language and timezone come from `LANG` and `TZ` when set.
    #[must_use]
    pub fn detect() -> Self {
        Self {
            user_agent: format!("termsite/{}", env!("CARGO_PKG_VERSION")),
            platform: format!("{}-{}", std::env::consts::OS, std::env::consts::ARCH),
            language: std::env::var("LANG").unwrap_or_else(|_| "C".to_string()),
            timezone: std::env::var("TZ").unwrap_or_else(|_| "UTC".to_string()),
        }
    }

    /// Hex SHA-256 over all fields
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for field in [
            &self.user_agent,
            &self.platform,
            &self.language,
            &self.timezone,
        ] {
            hasher.update(field.as_bytes());
            hasher.update([0u8]);
        }
        hex::encode(hasher.finalize())
    }
}

/// Client-side slot holding the device id
pub trait DeviceStorage: Send + Sync + Debug {
    /// Stored id, if any
    ///
    /// # Errors
    /// `IdentityError` if the storage cannot be read.
    fn load(&self) -> Result<Option<String>, IdentityError>;

    /// Persist an id
    ///
    /// # Errors
    /// `IdentityError` if the storage cannot be written.
    fn store(&self, id: &str) -> Result<(), IdentityError>;
}

/// Id kept in a file
#[derive(Debug, Clone)]
pub struct FileDeviceStorage {
    path: PathBuf,
}

impl FileDeviceStorage {
    /// Storage at an explicit file path
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Storage at [`DEVICE_ID_FILE`] inside `dir`
    #[must_use]
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(DEVICE_ID_FILE))
    }

    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DeviceStorage for FileDeviceStorage {
    fn load(&self) -> Result<Option<String>, IdentityError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => {
                let id = raw.trim();
                Ok((!id.is_empty()).then(|| id.to_string()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn store(&self, id: &str) -> Result<(), IdentityError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, id)?;
        Ok(())
    }
}

/// Id kept in memory; can simulate a storage that refuses access
#[derive(Debug, Default)]
pub struct MemoryDeviceStorage {
    slot: Mutex<Option<String>>,
    disabled: bool,
}

impl MemoryDeviceStorage {
    /// Empty, working storage
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that already holds `id`
    #[must_use]
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(id.into())),
            disabled: false,
        }
    }

    /// Storage whose every access fails
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            slot: Mutex::new(None),
            disabled: true,
        }
    }
}

impl DeviceStorage for MemoryDeviceStorage {
    fn load(&self) -> Result<Option<String>, IdentityError> {
        if self.disabled {
            return Err(IdentityError::Unavailable("storage disabled".into()));
        }
        Ok(self.slot.lock().clone())
    }

    fn store(&self, id: &str) -> Result<(), IdentityError> {
        if self.disabled {
            return Err(IdentityError::Unavailable("storage disabled".into()));
        }
        *self.slot.lock() = Some(id.to_string());
        Ok(())
    }
}

/// Opaque, stable identifier of a visitor's device
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    /// Wrap an existing id
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Find or mint the id for this device
    ///
    /// Order: the stored id; a fresh UUID v4 that gets stored; the metadata
    /// fingerprint when the storage cannot be read or written. Never fails.
    pub fn resolve(storage: &dyn DeviceStorage, metadata: &ClientMetadata) -> Self {
        match storage.load() {
            Ok(Some(id)) => return Self(id),
            Ok(None) => {}
            Err(e) => {
                tracing::warn!("device id unreadable, falling back to fingerprint: {e}");
                return Self(metadata.fingerprint());
            }
        }

        let id = Uuid::new_v4().to_string();
        match storage.store(&id) {
            Ok(()) => {
                tracing::info!("minted device id {id}");
                Self(id)
            }
            Err(e) => {
                tracing::warn!("device id not persisted, falling back to fingerprint: {e}");
                Self(metadata.fingerprint())
            }
        }
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata() -> ClientMetadata {
        ClientMetadata {
            user_agent: "Mozilla/5.0".into(),
            platform: "Linux x86_64".into(),
            language: "en-US".into(),
            timezone: "Europe/Berlin".into(),
        }
    }

    #[test]
    fn fingerprint_is_stable_hex() {
        let a = metadata().fingerprint();
        assert_eq!(a, metadata().fingerprint());
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn fingerprint_separates_fields() {
        let mut shifted = metadata();
        shifted.user_agent.push_str("Linux");
        shifted.platform = " x86_64".into();
        assert_ne!(shifted.fingerprint(), metadata().fingerprint());
    }

    #[test]
    fn resolve_prefers_stored_id() {
        let storage = MemoryDeviceStorage::with_id("known-device");
        assert_eq!(DeviceId::resolve(&storage, &metadata()).as_str(), "known-device");
    }

    #[test]
    fn resolve_mints_and_persists() {
        let storage = MemoryDeviceStorage::new();
        let first = DeviceId::resolve(&storage, &metadata());
        assert!(Uuid::parse_str(first.as_str()).is_ok());
        assert_eq!(DeviceId::resolve(&storage, &metadata()), first);
    }

    #[test]
    fn resolve_falls_back_to_fingerprint() {
        let id = DeviceId::resolve(&MemoryDeviceStorage::disabled(), &metadata());
        assert_eq!(id.as_str(), metadata().fingerprint());
    }

    #[test]
    fn file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileDeviceStorage::in_dir(&dir.path().join("state"));
        assert_eq!(storage.load().unwrap(), None);

        let id = DeviceId::resolve(&storage, &metadata());
        assert_eq!(storage.load().unwrap().as_deref(), Some(id.as_str()));

        let again = DeviceId::resolve(&FileDeviceStorage::new(storage.path()), &metadata());
        assert_eq!(again, id);
    }

    #[test]
    fn blank_file_counts_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileDeviceStorage::in_dir(dir.path());
        std::fs::write(storage.path(), "  \n").unwrap();
        assert_eq!(storage.load().unwrap(), None);
    }
}
