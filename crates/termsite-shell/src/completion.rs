//! Tab completion
//!
//! [`TabCompletion`] is a two-state machine. `Idle` becomes `Cycling` on the
//! first Tab that finds candidates; further Tabs advance through them while
//! the word in the buffer still equals the current candidate. Any edit that
//! moves the word away from the candidate drops back to `Idle`.

use termsite_vfs::path::SEPARATOR;
use termsite_vfs::VirtualFileSystem;

use crate::command::CommandName;
use crate::session::ShellSession;

/// Completion state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TabCompletion {
    /// Not completing
    #[default]
    Idle,
    /// Stepping through candidates for the word starting at `word_start`
    Cycling {
        candidates: Vec<String>,
        index: usize,
        word_start: usize,
    },
}

impl TabCompletion {
    /// Candidate currently shown, if cycling
    #[must_use]
    pub fn current(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::Cycling {
                candidates, index, ..
            } => candidates.get(*index).map(String::as_str),
        }
    }

    /// Whether a Tab press would advance instead of recomputing
    #[must_use]
    pub fn is_cycling(&self) -> bool {
        matches!(self, Self::Cycling { .. })
    }

    /// Handle a Tab press on `word` (which starts at byte `word_start`)
    ///
    /// Returns the replacement for the word, or `None` if nothing matches.
    /// `compute` is only called when a fresh candidate list is needed.
    pub fn advance(
        &mut self,
        word_start: usize,
        word: &str,
        compute: impl FnOnce() -> Vec<String>,
    ) -> Option<String> {
        if let Self::Cycling {
            candidates,
            index,
            word_start: start,
        } = self
        {
            if *start == word_start && candidates[*index] == word {
                *index = (*index + 1) % candidates.len();
                return Some(candidates[*index].clone());
            }
        }

        let candidates = compute();
        if candidates.is_empty() {
            *self = Self::Idle;
            return None;
        }
        let first = candidates[0].clone();
        *self = Self::Cycling {
            candidates,
            index: 0,
            word_start,
        };
        Some(first)
    }

    /// Note a non-Tab edit; stays cycling only if the word still matches
    pub fn on_edit(&mut self, word_start: usize, word: &str) {
        let keep = matches!(
            self,
            Self::Cycling { candidates, index, word_start: start }
                if *start == word_start && candidates[*index] == word
        );
        if !keep {
            *self = Self::Idle;
        }
    }

    /// Drop to idle
    pub fn reset(&mut self) {
        *self = Self::Idle;
    }
}

/// Entries of `dir` whose names start with `prefix`, in listed order
#[must_use]
pub fn directory_candidates(
    fs: &VirtualFileSystem,
    dir: &str,
    prefix: &str,
    directories_only: bool,
) -> Vec<String> {
    fs.node_at(dir)
        .map(|node| {
            node.children()
                .iter()
                .filter(|child| !directories_only || child.is_directory())
                .filter(|child| child.name().starts_with(prefix))
                .map(|child| child.name().to_string())
                .collect()
        })
        .unwrap_or_default()
}

/// Command names starting with `prefix`
#[must_use]
pub fn command_candidates(prefix: &str) -> Vec<String> {
    CommandName::all()
        .iter()
        .map(|cmd| cmd.as_str())
        .filter(|name| name.starts_with(prefix))
        .map(str::to_string)
        .collect()
}

/// Candidates for the last word of `line` (the text before the cursor)
///
/// The first word completes command names. Later words complete entries of
/// the directory named by the word's directory part; after `cd` only
/// directories qualify. Candidates carry the directory part, so they can
/// replace the whole word.
#[must_use]
pub fn line_candidates(session: &ShellSession, line: &str) -> Vec<String> {
    let start = word_start(line);
    let word = &line[start..];
    let mut preceding = line[..start].split_whitespace();
    let Some(command) = preceding.next() else {
        return command_candidates(word);
    };

    let (dir_part, prefix) = match word.rfind(SEPARATOR) {
        Some(idx) => word.split_at(idx + 1),
        None => ("", word),
    };
    let dir = if dir_part.is_empty() {
        session.cwd().to_string()
    } else {
        session.resolver().resolve(session.cwd(), dir_part)
    };
    let directories_only = command == CommandName::Cd.as_str();

    directory_candidates(session.fs(), &dir, prefix, directories_only)
        .into_iter()
        .map(|name| format!("{dir_part}{name}"))
        .collect()
}

/// Byte offset where the last whitespace-separated word of `line` starts
#[must_use]
pub fn word_start(line: &str) -> usize {
    line.char_indices()
        .rev()
        .find(|(_, c)| c.is_whitespace())
        .map_or(0, |(idx, c)| idx + c.len_utf8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::ShellConfig;
    use termsite_vfs::SeedEntry;

    fn desktop_session() -> ShellSession {
        let config = ShellConfig::new()
            .with_welcome(Vec::new())
            .with_seed(SeedEntry::directory("~/Documents"))
            .with_seed(SeedEntry::directory("~/Downloads"))
            .with_seed(SeedEntry::directory("~/Desktop"));
        ShellSession::new("alice", config).unwrap()
    }

    #[test]
    fn cycles_in_listed_order_and_wraps() {
        let session = desktop_session();
        let mut state = TabCompletion::default();
        let compute = || directory_candidates(session.fs(), "/home/alice", "D", false);

        let mut word = "D".to_string();
        let mut seen = Vec::new();
        for _ in 0..4 {
            word = state.advance(0, &word, compute).unwrap();
            seen.push(word.clone());
        }
        assert_eq!(seen, vec!["Documents", "Downloads", "Desktop", "Documents"]);
    }

    #[test]
    fn divergent_edit_drops_to_idle() {
        let mut state = TabCompletion::default();
        state.advance(3, "D", || vec!["Documents".into(), "Downloads".into()]);
        state.on_edit(3, "Documents");
        assert!(state.is_cycling());
        state.on_edit(3, "Documentsx");
        assert_eq!(state, TabCompletion::Idle);
    }

    #[test]
    fn no_candidates_stays_idle() {
        let mut state = TabCompletion::default();
        assert_eq!(state.advance(0, "zz", Vec::new), None);
        assert!(!state.is_cycling());
    }

    #[test]
    fn first_word_completes_commands() {
        let session = desktop_session();
        assert_eq!(line_candidates(&session, "c"), vec!["cd", "comment", "clear"]);
        assert_eq!(line_candidates(&session, "  wh"), vec!["whoami"]);
    }

    #[test]
    fn later_words_complete_paths() {
        let session = desktop_session();
        assert_eq!(
            line_candidates(&session, "ls pro"),
            vec!["projects"]
        );
        assert_eq!(
            line_candidates(&session, "open projects/RE"),
            vec!["projects/README.txt"]
        );
        assert_eq!(line_candidates(&session, "ls /ho"), vec!["/home"]);
        assert_eq!(line_candidates(&session, "ls ~/De"), vec!["~/Desktop"]);
    }

    #[test]
    fn cd_only_offers_directories() {
        let session = desktop_session();
        assert_eq!(line_candidates(&session, "open a"), vec!["about.txt"]);
        assert!(line_candidates(&session, "cd a").is_empty());
    }

    #[test]
    fn word_start_offsets() {
        assert_eq!(word_start("ls"), 0);
        assert_eq!(word_start("ls "), 3);
        assert_eq!(word_start("cd pro"), 3);
    }
}
