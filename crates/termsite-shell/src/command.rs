//! Command-line parsing
//!
//! A line is split on whitespace: the first token names the command, the
//! rest are positional arguments. There is no quoting.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Commands the shell understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandName {
    Cd,
    Ls,
    Mkdir,
    Pwd,
    Whoami,
    Open,
    Comment,
    Clear,
    Help,
}

impl CommandName {
    /// All commands in help order
    #[must_use]
    pub const fn all() -> [Self; 9] {
        [
            Self::Cd,
            Self::Ls,
            Self::Mkdir,
            Self::Pwd,
            Self::Whoami,
            Self::Open,
            Self::Comment,
            Self::Clear,
            Self::Help,
        ]
    }

    /// Name as typed
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cd => "cd",
            Self::Ls => "ls",
            Self::Mkdir => "mkdir",
            Self::Pwd => "pwd",
            Self::Whoami => "whoami",
            Self::Open => "open",
            Self::Comment => "comment",
            Self::Clear => "clear",
            Self::Help => "help",
        }
    }

    /// Synopsis shown by `help`
    #[must_use]
    pub const fn usage(self) -> &'static str {
        match self {
            Self::Cd => "cd [path]",
            Self::Ls => "ls [path]",
            Self::Mkdir => "mkdir <name>",
            Self::Pwd => "pwd",
            Self::Whoami => "whoami",
            Self::Open => "open <file>",
            Self::Comment => "comment <text>",
            Self::Clear => "clear",
            Self::Help => "help",
        }
    }

    /// One-line description shown by `help`
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Cd => "change directory (~ home, - previous, .. parent)",
            Self::Ls => "list directory contents",
            Self::Mkdir => "create a directory",
            Self::Pwd => "print the current directory",
            Self::Whoami => "print your nickname",
            Self::Open => "print the content of a file",
            Self::Comment => "leave a comment for the site owner",
            Self::Clear => "clear the screen",
            Self::Help => "show this help",
        }
    }
}

impl Display for CommandName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognised command name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("command not found: {0}")]
pub struct UnknownCommand(pub String);

impl FromStr for CommandName {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .into_iter()
            .find(|cmd| cmd.as_str() == s)
            .ok_or_else(|| UnknownCommand(s.to_string()))
    }
}

/// A split command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine<'a> {
    /// First token, case-sensitive
    pub name: &'a str,
    /// Remaining tokens
    pub args: Vec<&'a str>,
}

/// Split a raw line; `None` for blank input
#[must_use]
pub fn parse_line(raw: &str) -> Option<ParsedLine<'_>> {
    let mut tokens = raw.split_whitespace();
    let name = tokens.next()?;
    Some(ParsedLine {
        name,
        args: tokens.collect(),
    })
}
