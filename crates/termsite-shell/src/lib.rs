//! termsite shell
//!
//! Command interpreter, session state and line editor for the simulated
//! terminal.
//!
//! # Core Concepts
//!
//! - [`CommandInterpreter`]: pure dispatch from a raw line to a [`CommandResult`]
//! - [`Effect`]: the state transition a command asks for
//! - [`ShellSession`]: owns cwd, filesystem, history and display log; applies effects
//! - [`InputEditor`]: edit buffer with history browsing and [`TabCompletion`]
//! - [`CommentSink`]: best-effort replication seam for `comment`
//!
//! # Example
//!
//! ```rust
//! use termsite_shell::{ShellConfig, ShellSession};
//!
//! let mut session = ShellSession::new("alice", ShellConfig::new()).unwrap();
//! session.execute_command_line("mkdir notes");
//! session.execute_command_line("cd notes");
//! let result = session.execute_command_line("pwd");
//! assert_eq!(result.output_lines, vec!["/home/alice/notes"]);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod command;
pub mod completion;
mod editor;
mod effect;
pub mod interpreter;
mod replication;
mod session;

pub use command::{parse_line, CommandName, ParsedLine, UnknownCommand};
pub use completion::TabCompletion;
pub use editor::{EditorEvent, EditorKey, InputEditor};
pub use effect::{CommandResult, Effect};
pub use interpreter::{comment_file_name, CommandContext, CommandInterpreter};
pub use replication::{CommentRecord, CommentSink, NoopCommentSink};
pub use session::{
    is_valid_nickname, DisplayLine, LineKind, ShellConfig, ShellError, ShellSession,
    MAX_NICKNAME_LEN,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
