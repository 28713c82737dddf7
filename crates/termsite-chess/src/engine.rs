//! UCI engine client
//!
//! The engine is a line-based peer behind an [`EngineTransport`]. The client
//! performs the `uci` and `isready` handshakes, forwards options and asks for
//! best moves. Answers never arrive faster than the configured think delay,
//! so an instant engine still looks like it is thinking.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{sleep, timeout, Instant};

use crate::error::EngineError;

/// UCI option controlling engine strength
pub const SKILL_LEVEL_OPTION: &str = "Skill Level";

/// Highest skill level the engine accepts
pub const MAX_SKILL_LEVEL: u8 = 20;

/// Search limits for `go`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GoParams {
    pub depth: Option<u32>,
    pub movetime_ms: Option<u64>,
}

impl GoParams {
    #[must_use]
    pub fn depth(depth: u32) -> Self {
        Self {
            depth: Some(depth),
            movetime_ms: None,
        }
    }

    #[must_use]
    pub fn movetime(ms: u64) -> Self {
        Self {
            depth: None,
            movetime_ms: Some(ms),
        }
    }
}

/// Commands sent to the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UciCommand {
    Uci,
    IsReady,
    UciNewGame,
    Position { fen: String, moves: Vec<String> },
    Go(GoParams),
    SetOption { name: String, value: String },
    Stop,
    Quit,
}

impl fmt::Display for UciCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uci => f.write_str("uci"),
            Self::IsReady => f.write_str("isready"),
            Self::UciNewGame => f.write_str("ucinewgame"),
            Self::Position { fen, moves } => {
                write!(f, "position fen {fen}")?;
                if !moves.is_empty() {
                    write!(f, " moves {}", moves.join(" "))?;
                }
                Ok(())
            }
            Self::Go(params) => {
                f.write_str("go")?;
                if let Some(depth) = params.depth {
                    write!(f, " depth {depth}")?;
                }
                if let Some(ms) = params.movetime_ms {
                    write!(f, " movetime {ms}")?;
                }
                Ok(())
            }
            Self::SetOption { name, value } => write!(f, "setoption name {name} value {value}"),
            Self::Stop => f.write_str("stop"),
            Self::Quit => f.write_str("quit"),
        }
    }
}

/// Lines received from the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UciResponse {
    UciOk,
    ReadyOk,
    /// `option name <name> type ...`; `name` may contain spaces
    Option { name: String, definition: String },
    /// `bestmove <mv> [ponder <mv>]`
    BestMove { mv: String, ponder: Option<String> },
    /// Anything else (`id`, `info`, ...)
    Other(String),
}

impl FromStr for UciResponse {
    type Err = std::convert::Infallible;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let mut tokens = line.split_whitespace();
        Ok(match tokens.next() {
            Some("uciok") => Self::UciOk,
            Some("readyok") => Self::ReadyOk,
            Some("bestmove") => match tokens.next() {
                Some(mv) => Self::BestMove {
                    mv: mv.to_string(),
                    ponder: match (tokens.next(), tokens.next()) {
                        (Some("ponder"), Some(p)) => Some(p.to_string()),
                        _ => None,
                    },
                },
                None => Self::Other(line.to_string()),
            },
            Some("option") => parse_option(line),
            _ => Self::Other(line.to_string()),
        })
    }
}

fn parse_option(line: &str) -> UciResponse {
    let Some(rest) = line.strip_prefix("option").map(str::trim_start) else {
        return UciResponse::Other(line.to_string());
    };
    let Some(rest) = rest.strip_prefix("name ") else {
        return UciResponse::Other(line.to_string());
    };
    match rest.find(" type ") {
        Some(idx) => UciResponse::Option {
            name: rest[..idx].trim().to_string(),
            definition: rest[idx + 1..].to_string(),
        },
        None => UciResponse::Option {
            name: rest.trim().to_string(),
            definition: String::new(),
        },
    }
}

/// Engine's answer to `go`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BestMove {
    /// Move in UCI notation (`e2e4`, `e7e8q`)
    pub mv: String,
    pub ponder: Option<String>,
}

/// Line channel to an engine
#[async_trait]
pub trait EngineTransport: Send {
    /// Send one command
    async fn send(&mut self, command: &UciCommand) -> Result<(), EngineError>;

    /// Next line from the engine; `EngineError::Closed` at end of stream
    async fn recv(&mut self) -> Result<String, EngineError>;
}

/// Handshaking UCI client
#[derive(Debug)]
pub struct EngineClient<T> {
    transport: T,
    think_delay: Duration,
    reply_timeout: Duration,
    options: Vec<String>,
    ready: bool,
}

impl<T: EngineTransport> EngineClient<T> {
    /// Client with a 500 ms think delay and a 30 s reply timeout
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            think_delay: Duration::from_millis(500),
            reply_timeout: Duration::from_secs(30),
            options: Vec::new(),
            ready: false,
        }
    }

    /// With minimum time before a best move is returned
    #[inline]
    #[must_use]
    pub fn with_think_delay(mut self, delay: Duration) -> Self {
        self.think_delay = delay;
        self
    }

    /// With per-reply deadline
    #[inline]
    #[must_use]
    pub fn with_reply_timeout(mut self, limit: Duration) -> Self {
        self.reply_timeout = limit;
        self
    }

    /// `uci` → `uciok`, then `isready` → `readyok`
    ///
    /// Collects the option names the engine advertises.
    ///
    /// # Errors
    /// Transport failures and timeouts.
    pub async fn handshake(&mut self) -> Result<(), EngineError> {
        self.transport.send(&UciCommand::Uci).await?;
        loop {
            match self.next_response().await? {
                UciResponse::UciOk => break,
                UciResponse::Option { name, .. } => self.options.push(name),
                _ => {}
            }
        }
        self.sync().await?;
        self.ready = true;
        tracing::debug!("engine ready, {} options", self.options.len());
        Ok(())
    }

    /// Set an option and wait until the engine has taken it
    ///
    /// # Errors
    /// Transport failures and timeouts.
    pub async fn set_option(&mut self, name: &str, value: &str) -> Result<(), EngineError> {
        if self.ready && !self.options.iter().any(|o| o == name) {
            tracing::warn!("engine did not advertise option {name}");
        }
        self.transport
            .send(&UciCommand::SetOption {
                name: name.to_string(),
                value: value.to_string(),
            })
            .await?;
        self.sync().await
    }

    /// Set playing strength, clamped to `0..=20`
    ///
    /// # Errors
    /// Transport failures and timeouts.
    pub async fn set_skill_level(&mut self, level: u8) -> Result<(), EngineError> {
        let level = level.min(MAX_SKILL_LEVEL);
        self.set_option(SKILL_LEVEL_OPTION, &level.to_string()).await
    }

    /// Tell the engine a new game starts
    ///
    /// # Errors
    /// Transport failures and timeouts.
    pub async fn new_game(&mut self) -> Result<(), EngineError> {
        self.transport.send(&UciCommand::UciNewGame).await?;
        self.sync().await
    }

    /// Search `fen` and return the engine's move
    ///
    /// Takes at least the think delay.
    ///
    /// # Errors
    /// `EngineError::NoLegalMove` when the engine answers `(none)`;
    /// transport failures and timeouts.
    pub async fn best_move(&mut self, fen: &str, go: GoParams) -> Result<BestMove, EngineError> {
        let started = Instant::now();
        self.transport
            .send(&UciCommand::Position {
                fen: fen.to_string(),
                moves: Vec::new(),
            })
            .await?;
        self.transport.send(&UciCommand::Go(go)).await?;

        let best = loop {
            if let UciResponse::BestMove { mv, ponder } = self.next_response().await? {
                break BestMove { mv, ponder };
            }
        };

        let elapsed = started.elapsed();
        if elapsed < self.think_delay {
            sleep(self.think_delay - elapsed).await;
        }
        if best.mv == "(none)" || best.mv == "0000" {
            return Err(EngineError::NoLegalMove);
        }
        Ok(best)
    }

    /// Ask the engine to exit
    ///
    /// # Errors
    /// Transport failures.
    pub async fn quit(mut self) -> Result<(), EngineError> {
        self.transport.send(&UciCommand::Quit).await
    }

    /// Options advertised during the handshake
    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[inline]
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    async fn sync(&mut self) -> Result<(), EngineError> {
        self.transport.send(&UciCommand::IsReady).await?;
        while self.next_response().await? != UciResponse::ReadyOk {}
        Ok(())
    }

    async fn next_response(&mut self) -> Result<UciResponse, EngineError> {
        let limit = self.reply_timeout;
        let line = timeout(limit, self.transport.recv())
            .await
            .map_err(|_| EngineError::Timeout(limit))??;
        Ok(line
            .parse::<UciResponse>()
            .unwrap_or_else(|never| match never {}))
    }
}
