//! Visitor session: gate, nickname, shell
//!
//! A [`SiteSession`] walks through three stages. It starts `Locked`; the
//! right password moves it to `ChoosingNickname`, unless the registry
//! already knows the device, in which case the shell opens straight away.
//! Registry and comment replication are best effort: when the store fails
//! the visitor still gets a working shell.

use std::sync::Arc;

use termsite_chess::RoomClient;
use termsite_shell::{is_valid_nickname, CommandResult, CommentSink, ShellError, ShellSession};
use termsite_store::{CommentBoard, DeviceId, DocumentStore, NicknameRegistry};
use tokio::runtime::Handle;

use crate::config::SiteConfig;
use crate::error::SiteError;
use crate::gate::PasswordGate;
use crate::sink::StoreCommentSink;

/// Where a visitor is in the flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Locked,
    ChoosingNickname,
    Shell,
}

/// One visitor's session
#[derive(Debug)]
pub struct SiteSession {
    config: SiteConfig,
    gate: PasswordGate,
    device: DeviceId,
    registry: NicknameRegistry,
    rooms: RoomClient,
    comments: Arc<dyn CommentSink>,
    unlocked: bool,
    shell: Option<ShellSession>,
}

impl SiteSession {
    /// Session bound to the current Tokio runtime
    ///
    /// Comments are replicated to the store's comment board.
    ///
    /// # Errors
    /// `SiteError::Config` if the configuration does not validate.
    ///
    /// # Panics
    /// Panics when called outside a Tokio runtime; use
    /// [`Self::with_comment_sink`] there.
    pub fn open(
        config: SiteConfig,
        store: Arc<dyn DocumentStore>,
        device: DeviceId,
    ) -> Result<Self, SiteError> {
        let sink = StoreCommentSink::new(CommentBoard::new(Arc::clone(&store)), Handle::current());
        Self::with_comment_sink(config, store, device, Arc::new(sink))
    }

    /// Session replicating comments through `comments`
    ///
    /// # Errors
    /// `SiteError::Config` if the configuration does not validate.
    pub fn with_comment_sink(
        config: SiteConfig,
        store: Arc<dyn DocumentStore>,
        device: DeviceId,
        comments: Arc<dyn CommentSink>,
    ) -> Result<Self, SiteError> {
        config.validate()?;
        Ok(Self {
            gate: PasswordGate::new(config.password.clone()),
            registry: NicknameRegistry::new(Arc::clone(&store)),
            rooms: config.chess.room_client(store),
            config,
            device,
            comments,
            unlocked: false,
            shell: None,
        })
    }

    #[must_use]
    pub fn stage(&self) -> Stage {
        match (self.unlocked, &self.shell) {
            (false, _) => Stage::Locked,
            (true, None) => Stage::ChoosingNickname,
            (true, Some(_)) => Stage::Shell,
        }
    }

    /// Try the password; returns whether the gate opened
    pub fn unlock(&mut self, input: &str) -> bool {
        if self.gate.check(input) {
            self.unlocked = true;
            tracing::info!("device {} unlocked the site", self.device);
        }
        self.unlocked
    }

    /// Open the shell under the nickname the registry remembers
    ///
    /// Returns `false` when there is nothing usable on record (or the
    /// registry cannot be reached); the visitor then chooses a nickname.
    ///
    /// # Errors
    /// `SiteError::Locked` before [`Self::unlock`] succeeded.
    pub async fn restore(&mut self) -> Result<bool, SiteError> {
        if !self.unlocked {
            return Err(SiteError::Locked);
        }
        let record = match self.registry.lookup(&self.device).await {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!("nickname lookup failed for {}: {e}", self.device);
                return Ok(false);
            }
        };
        let Some(record) = record.filter(|r| is_valid_nickname(&r.nickname)) else {
            return Ok(false);
        };
        self.start_shell(&record.nickname)?;
        Ok(true)
    }

    /// Set or change the nickname and (re)build the shell
    ///
    /// Registration is best effort.
    ///
    /// # Errors
    /// - `SiteError::Locked` before [`Self::unlock`] succeeded
    /// - `SiteError::Shell` for an invalid nickname; nothing changes then
    pub async fn choose_nickname(&mut self, nickname: &str) -> Result<(), SiteError> {
        if !self.unlocked {
            return Err(SiteError::Locked);
        }
        if !is_valid_nickname(nickname) {
            return Err(ShellError::InvalidNickname(nickname.to_string()).into());
        }
        self.start_shell(nickname)?;
        if let Err(e) = self.registry.register(&self.device, nickname).await {
            tracing::warn!("nickname {nickname} not registered: {e}");
        }
        Ok(())
    }

    /// Run one shell line
    ///
    /// # Errors
    /// `SiteError::Locked` or `SiteError::NicknameRequired` before the shell
    /// is open.
    pub fn execute(&mut self, line: &str) -> Result<CommandResult, SiteError> {
        if !self.unlocked {
            return Err(SiteError::Locked);
        }
        let shell = self.shell.as_mut().ok_or(SiteError::NicknameRequired)?;
        Ok(shell.execute_command_line(line))
    }

    fn start_shell(&mut self, nickname: &str) -> Result<(), SiteError> {
        match &mut self.shell {
            Some(shell) => shell.set_nickname(nickname)?,
            None => {
                let shell = ShellSession::new(nickname, self.config.shell.clone())?
                    .with_comment_sink(Arc::clone(&self.comments));
                self.shell = Some(shell);
            }
        }
        Ok(())
    }

    #[inline]
    #[must_use]
    pub fn shell(&self) -> Option<&ShellSession> {
        self.shell.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn shell_mut(&mut self) -> Option<&mut ShellSession> {
        self.shell.as_mut()
    }

    #[inline]
    #[must_use]
    pub fn device(&self) -> &DeviceId {
        &self.device
    }

    /// Chess rooms on the same store
    #[inline]
    #[must_use]
    pub fn rooms(&self) -> &RoomClient {
        &self.rooms
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &SiteConfig {
        &self.config
    }
}
