//! Password gate
//!
//! A fixed shared password in front of the shell. It keeps casual visitors
//! out of an unfinished site and is not a security boundary.

/// Compares input against the configured password
#[derive(Debug, Clone)]
pub struct PasswordGate {
    password: String,
}

impl PasswordGate {
    #[must_use]
    pub fn new(password: impl Into<String>) -> Self {
        Self {
            password: password.into(),
        }
    }

    /// Whether `input` (surrounding whitespace ignored) opens the gate
    #[must_use]
    pub fn check(&self, input: &str) -> bool {
        let ok = input.trim() == self.password;
        if !ok {
            tracing::debug!("gate refused a password attempt");
        }
        ok
    }
}
