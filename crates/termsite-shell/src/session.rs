//! Shell session state
//!
//! [`ShellSession`] owns everything mutable: current directory, filesystem,
//! history and the display log. Each submitted line goes through
//! record → echo → interpret → apply effect → append output.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use termsite_vfs::{build_tree, FsError, PathResolver, SeedEntry, VirtualFileSystem};

use crate::effect::{CommandResult, Effect};
use crate::interpreter::{CommandContext, CommandInterpreter};
use crate::replication::{CommentRecord, CommentSink, NoopCommentSink};

/// Longest accepted nickname
pub const MAX_NICKNAME_LEN: usize = 20;

/// Placeholder replaced by the nickname in welcome lines
const NICKNAME_PLACEHOLDER: &str = "{nickname}";

/// Errors building or rebuilding a session
#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    /// Nickname cannot name a home directory
    #[error("invalid nickname: {0:?} (1-20 letters, digits, '_' or '-')")]
    InvalidNickname(String),

    /// Configured seed entries could not be applied
    #[error("seed failed: {0}")]
    Seed(#[from] FsError),
}

/// Check nickname rules: 1-20 ASCII letters, digits, `_` or `-`
#[must_use]
pub fn is_valid_nickname(nickname: &str) -> bool {
    (1..=MAX_NICKNAME_LEN).contains(&nickname.len())
        && nickname
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Shell settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Maximum remembered commands (oldest dropped first)
    pub history_limit: usize,
    /// Lines shown when a session starts; `{nickname}` is substituted
    pub welcome: Vec<String>,
    /// Extra entries created on top of the default tree
    pub seed: Vec<SeedEntry>,
}

impl ShellConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With history limit
    #[inline]
    #[must_use]
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// With welcome lines
    #[inline]
    #[must_use]
    pub fn with_welcome(mut self, lines: Vec<String>) -> Self {
        self.welcome = lines;
        self
    }

    /// With an extra seed entry
    #[inline]
    #[must_use]
    pub fn with_seed(mut self, entry: SeedEntry) -> Self {
        self.seed.push(entry);
        self
    }
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            history_limit: 500,
            welcome: vec![format!(
                "Welcome, {NICKNAME_PLACEHOLDER}! Type `help` to see what you can do."
            )],
            seed: Vec::new(),
        }
    }
}

/// Kind of a display line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    /// Echo of a submitted command
    Command,
    /// Regular output
    Output,
    /// Error message
    Error,
}

/// One entry of the display log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayLine {
    pub kind: LineKind,
    pub text: String,
    /// Directory the command was typed in (command lines only)
    pub origin_directory: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl DisplayLine {
    fn new(kind: LineKind, text: impl Into<String>, origin_directory: Option<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            origin_directory,
            created_at: Utc::now(),
        }
    }
}

/// A visitor's shell
#[derive(Debug)]
pub struct ShellSession {
    config: ShellConfig,
    nickname: String,
    resolver: PathResolver,
    fs: VirtualFileSystem,
    cwd: String,
    previous_dir: Option<String>,
    history: VecDeque<String>,
    lines: Vec<DisplayLine>,
    interpreter: CommandInterpreter,
    comments: Arc<dyn CommentSink>,
}

impl ShellSession {
    /// Start a session in the visitor's home directory
    ///
    /// # Errors
    /// - `ShellError::InvalidNickname` if the nickname fails [`is_valid_nickname`]
    /// - `ShellError::Seed` if a configured seed entry is unusable
    pub fn new(nickname: &str, config: ShellConfig) -> Result<Self, ShellError> {
        let (resolver, fs) = Self::build(nickname, &config)?;
        let mut session = Self {
            cwd: resolver.home().to_string(),
            nickname: nickname.to_string(),
            resolver,
            fs,
            config,
            previous_dir: None,
            history: VecDeque::new(),
            lines: Vec::new(),
            interpreter: CommandInterpreter::new(),
            comments: Arc::new(NoopCommentSink),
        };
        session.push_welcome();
        Ok(session)
    }

    /// Replicate comments through `sink`
    #[inline]
    #[must_use]
    pub fn with_comment_sink(mut self, sink: Arc<dyn CommentSink>) -> Self {
        self.comments = sink;
        self
    }

    fn build(
        nickname: &str,
        config: &ShellConfig,
    ) -> Result<(PathResolver, VirtualFileSystem), ShellError> {
        if !is_valid_nickname(nickname) {
            return Err(ShellError::InvalidNickname(nickname.to_string()));
        }
        let fs = build_tree(nickname, &config.seed)?;
        Ok((PathResolver::for_nickname(nickname), fs))
    }

    /// Switch to another nickname
    ///
    /// The tree is rebuilt for the new home, the display log cleared and the
    /// current directory reset. On error the session is left untouched.
    ///
    /// # Errors
    /// Same as [`Self::new`].
    pub fn set_nickname(&mut self, nickname: &str) -> Result<(), ShellError> {
        let (resolver, fs) = Self::build(nickname, &self.config)?;
        tracing::info!("nickname changed from {} to {}", self.nickname, nickname);
        self.nickname = nickname.to_string();
        self.cwd = resolver.home().to_string();
        self.resolver = resolver;
        self.fs = fs;
        self.previous_dir = None;
        self.lines.clear();
        self.push_welcome();
        Ok(())
    }

    /// Run one submitted line
    ///
    /// Blank lines are ignored entirely. Otherwise the line is recorded in
    /// history and echoed even if the command fails; state only changes
    /// after the interpreter reports success.
    pub fn execute_command_line(&mut self, raw: &str) -> CommandResult {
        if raw.trim().is_empty() {
            return CommandResult::empty();
        }
        self.record_history(raw);
        self.lines.push(DisplayLine::new(
            LineKind::Command,
            raw,
            Some(self.cwd.clone()),
        ));

        let ctx = CommandContext {
            fs: &self.fs,
            resolver: &self.resolver,
            cwd: &self.cwd,
            nickname: &self.nickname,
            previous_dir: self.previous_dir.as_deref(),
        };
        let mut result = self.interpreter.execute(raw, &ctx);

        if !result.is_error() {
            if let Err(message) = self.apply(&result.effect) {
                result = CommandResult::error(message);
            }
        }
        if result.effect == Effect::ClearLog && !result.is_error() {
            return result;
        }

        if let Some(error) = &result.error {
            self.lines
                .push(DisplayLine::new(LineKind::Error, error.as_str(), None));
        }
        self.lines.extend(
            result
                .output_lines
                .iter()
                .map(|line| DisplayLine::new(LineKind::Output, line.as_str(), None)),
        );
        result
    }

    fn apply(&mut self, effect: &Effect) -> Result<(), String> {
        match effect {
            Effect::None => {}
            Effect::ChangeDirectory(path) => {
                let previous = std::mem::replace(&mut self.cwd, path.clone());
                self.previous_dir = Some(previous);
            }
            Effect::CreateDirectory { parent, name } => {
                self.fs
                    .create_directory(parent, name)
                    .map_err(|e| format!("mkdir: cannot create directory '{name}': {e}"))?;
            }
            Effect::WriteComment {
                parent,
                file_name,
                content,
            } => {
                self.fs
                    .write_file(parent, file_name, content.as_str())
                    .map_err(|e| format!("comment: cannot write '{file_name}': {e}"))?;
                self.comments.publish(CommentRecord {
                    nickname: self.nickname.clone(),
                    content: content.clone(),
                    updated_at: Utc::now(),
                });
            }
            Effect::ClearLog => self.lines.clear(),
        }
        Ok(())
    }

    fn record_history(&mut self, raw: &str) {
        if self.config.history_limit == 0 {
            return;
        }
        while self.history.len() >= self.config.history_limit {
            self.history.pop_front();
        }
        self.history.push_back(raw.to_string());
    }

    fn push_welcome(&mut self) {
        let lines: Vec<DisplayLine> = self
            .config
            .welcome
            .iter()
            .map(|line| {
                DisplayLine::new(
                    LineKind::Output,
                    line.replace(NICKNAME_PLACEHOLDER, &self.nickname),
                    None,
                )
            })
            .collect();
        self.lines.extend(lines);
    }

    /// Prompt text, with the home prefix shown as `~`
    #[must_use]
    pub fn prompt(&self) -> String {
        format!("{}@site:{}$ ", self.nickname, self.display_cwd())
    }

    /// Current directory with the home prefix shown as `~`
    #[must_use]
    pub fn display_cwd(&self) -> String {
        let home = self.resolver.home();
        match self.cwd.strip_prefix(home) {
            Some("") => "~".to_string(),
            Some(rest) if rest.starts_with('/') => format!("~{rest}"),
            _ => self.cwd.clone(),
        }
    }

    /// Visitor nickname
    #[inline]
    #[must_use]
    pub fn nickname(&self) -> &str {
        &self.nickname
    }

    /// Current directory (absolute)
    #[inline]
    #[must_use]
    pub fn cwd(&self) -> &str {
        &self.cwd
    }

    /// Directory before the last successful `cd`
    #[inline]
    #[must_use]
    pub fn previous_directory(&self) -> Option<&str> {
        self.previous_dir.as_deref()
    }

    /// Home directory
    #[inline]
    #[must_use]
    pub fn home(&self) -> &str {
        self.resolver.home()
    }

    /// Resolver bound to this session's home
    #[inline]
    #[must_use]
    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// Session filesystem
    #[inline]
    #[must_use]
    pub fn fs(&self) -> &VirtualFileSystem {
        &self.fs
    }

    /// Submitted commands, oldest first
    #[inline]
    #[must_use]
    pub fn history(&self) -> &VecDeque<String> {
        &self.history
    }

    /// Display log
    #[inline]
    #[must_use]
    pub fn lines(&self) -> &[DisplayLine] {
        &self.lines
    }

    /// Session configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ShellConfig {
        &self.config
    }
}
