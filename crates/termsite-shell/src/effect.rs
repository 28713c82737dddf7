//! Command results and the state transitions they request
//!
//! Handlers never mutate the session. They describe the change as an
//! [`Effect`] and the session applies it after a successful run.

/// State transition requested by a command
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Effect {
    /// Nothing to apply
    #[default]
    None,
    /// Move to an absolute directory path (already validated)
    ChangeDirectory(String),
    /// Create directory `name` inside `parent`
    CreateDirectory { parent: String, name: String },
    /// Create or update the visitor's comment file, then replicate it
    WriteComment {
        parent: String,
        file_name: String,
        content: String,
    },
    /// Wipe the display log
    ClearLog,
}

/// Outcome of one command
///
/// At most one of `output_lines` and `error` is meaningful; both may be
/// empty for a silent success.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandResult {
    /// Lines to append to the log
    pub output_lines: Vec<String>,
    /// Error line to append instead of output
    pub error: Option<String>,
    /// Transition for the session to apply
    pub effect: Effect,
}

impl CommandResult {
    /// Silent success
    #[inline]
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Success with output lines
    #[inline]
    #[must_use]
    pub fn output<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            output_lines: lines.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Success with a single output line
    #[inline]
    #[must_use]
    pub fn line(text: impl Into<String>) -> Self {
        Self::output([text.into()])
    }

    /// Failure with one error line
    #[inline]
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }

    /// Attach a transition
    #[inline]
    #[must_use]
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effect = effect;
        self
    }

    /// Whether the command failed
    #[inline]
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}
