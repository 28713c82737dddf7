//! Error types for the site session

use termsite_shell::ShellError;

use crate::config::ConfigError;

/// Site session errors
#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    /// Gate not passed yet
    #[error("site is locked")]
    Locked,

    /// Shell needs a nickname first
    #[error("choose a nickname first")]
    NicknameRequired,

    /// Shell could not be built
    #[error("shell error: {0}")]
    Shell(#[from] ShellError),

    /// Configuration problem
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}
