//! Line editor
//!
//! Edit buffer with a character cursor, history browsing and tab completion,
//! driven one key at a time. Submitting hands the line to the session.

use crate::completion::{line_candidates, word_start, TabCompletion};
use crate::effect::CommandResult;
use crate::session::ShellSession;

/// Keys the editor reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorKey {
    Char(char),
    Backspace,
    Delete,
    Left,
    Right,
    Home,
    End,
    Up,
    Down,
    Tab,
    Enter,
}

/// What the caller should do after a key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorEvent {
    /// Buffer or cursor changed; redraw the input line
    Redraw,
    /// Nothing to do (e.g. Tab without candidates); ring the bell
    Bell,
    /// A line was submitted and executed
    Submitted(CommandResult),
}

/// Input line state
#[derive(Debug, Clone, Default)]
pub struct InputEditor {
    buffer: String,
    /// Cursor position in characters
    cursor: usize,
    /// `None` when not browsing; otherwise steps back from the newest entry
    history_cursor: Option<usize>,
    /// Line being typed before history browsing started
    draft: Option<String>,
    completion: TabCompletion,
}

impl InputEditor {
    /// Empty editor
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current buffer
    #[inline]
    #[must_use]
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Cursor position in characters
    #[inline]
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// History position (`None` when not browsing)
    #[inline]
    #[must_use]
    pub fn history_cursor(&self) -> Option<usize> {
        self.history_cursor
    }

    /// Completion state
    #[inline]
    #[must_use]
    pub fn completion(&self) -> &TabCompletion {
        &self.completion
    }

    /// Feed one key
    pub fn handle_key(&mut self, key: EditorKey, session: &mut ShellSession) -> EditorEvent {
        match key {
            EditorKey::Tab => return self.complete(session),
            EditorKey::Enter => return EditorEvent::Submitted(self.submit(session)),
            EditorKey::Up => return self.history_back(session),
            EditorKey::Down => return self.history_forward(session),
            EditorKey::Char(c) => {
                let at = self.byte_at(self.cursor);
                self.buffer.insert(at, c);
                self.cursor += 1;
            }
            EditorKey::Backspace => {
                if self.cursor == 0 {
                    return EditorEvent::Bell;
                }
                self.cursor -= 1;
                let at = self.byte_at(self.cursor);
                self.buffer.remove(at);
            }
            EditorKey::Delete => {
                if self.cursor >= self.char_len() {
                    return EditorEvent::Bell;
                }
                let at = self.byte_at(self.cursor);
                self.buffer.remove(at);
            }
            EditorKey::Left => self.cursor = self.cursor.saturating_sub(1),
            EditorKey::Right => self.cursor = (self.cursor + 1).min(self.char_len()),
            EditorKey::Home => self.cursor = 0,
            EditorKey::End => self.cursor = self.char_len(),
        }
        self.note_edit();
        EditorEvent::Redraw
    }

    /// Replace the whole buffer and move the cursor to its end
    pub fn set_buffer(&mut self, text: impl Into<String>) {
        self.buffer = text.into();
        self.cursor = self.char_len();
        self.completion.reset();
    }

    fn submit(&mut self, session: &mut ShellSession) -> CommandResult {
        let line = std::mem::take(&mut self.buffer);
        self.cursor = 0;
        self.history_cursor = None;
        self.draft = None;
        self.completion.reset();
        session.execute_command_line(&line)
    }

    fn complete(&mut self, session: &ShellSession) -> EditorEvent {
        let end = self.byte_at(self.cursor);
        let start = word_start(&self.buffer[..end]);
        let line = &self.buffer[..end];
        let word = &line[start..];

        let Some(replacement) = self
            .completion
            .advance(start, word, || line_candidates(session, line))
        else {
            return EditorEvent::Bell;
        };
        self.buffer.replace_range(start..end, &replacement);
        self.cursor = self.buffer[..start + replacement.len()].chars().count();
        EditorEvent::Redraw
    }

    fn history_back(&mut self, session: &ShellSession) -> EditorEvent {
        let history = session.history();
        let next = match self.history_cursor {
            None if history.is_empty() => return EditorEvent::Bell,
            None => 0,
            Some(i) if i + 1 < history.len() => i + 1,
            Some(_) => return EditorEvent::Bell,
        };
        if self.history_cursor.is_none() {
            self.draft = Some(self.buffer.clone());
        }
        self.history_cursor = Some(next);
        let entry = history[history.len() - 1 - next].clone();
        self.set_buffer(entry);
        EditorEvent::Redraw
    }

    fn history_forward(&mut self, session: &ShellSession) -> EditorEvent {
        let history = session.history();
        match self.history_cursor {
            None => EditorEvent::Bell,
            Some(0) => {
                self.history_cursor = None;
                let draft = self.draft.take().unwrap_or_default();
                self.set_buffer(draft);
                EditorEvent::Redraw
            }
            Some(i) => {
                self.history_cursor = Some(i - 1);
                let entry = history[history.len() - i].clone();
                self.set_buffer(entry);
                EditorEvent::Redraw
            }
        }
    }

    fn note_edit(&mut self) {
        let end = self.byte_at(self.cursor);
        let start = word_start(&self.buffer[..end]);
        self.completion.on_edit(start, &self.buffer[start..end]);
    }

    fn char_len(&self) -> usize {
        self.buffer.chars().count()
    }

    fn byte_at(&self, char_idx: usize) -> usize {
        self.buffer
            .char_indices()
            .nth(char_idx)
            .map_or(self.buffer.len(), |(idx, _)| idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::ShellConfig;

    fn session() -> ShellSession {
        ShellSession::new("alice", ShellConfig::new().with_welcome(Vec::new())).unwrap()
    }

    fn type_str(editor: &mut InputEditor, session: &mut ShellSession, text: &str) {
        for c in text.chars() {
            editor.handle_key(EditorKey::Char(c), session);
        }
    }

    #[test]
    fn typing_and_cursor_moves() {
        let mut s = session();
        let mut editor = InputEditor::new();
        type_str(&mut editor, &mut s, "pd");
        editor.handle_key(EditorKey::Left, &mut s);
        editor.handle_key(EditorKey::Char('w'), &mut s);
        assert_eq!(editor.buffer(), "pwd");
        assert_eq!(editor.cursor(), 2);

        editor.handle_key(EditorKey::Home, &mut s);
        assert_eq!(editor.handle_key(EditorKey::Backspace, &mut s), EditorEvent::Bell);
        editor.handle_key(EditorKey::Delete, &mut s);
        assert_eq!(editor.buffer(), "wd");
        editor.handle_key(EditorKey::End, &mut s);
        assert_eq!(editor.cursor(), 2);
    }

    #[test]
    fn multibyte_characters() {
        let mut s = session();
        let mut editor = InputEditor::new();
        type_str(&mut editor, &mut s, "héé");
        editor.handle_key(EditorKey::Backspace, &mut s);
        assert_eq!(editor.buffer(), "hé");
        assert_eq!(editor.cursor(), 2);
    }

    #[test]
    fn enter_submits_and_clears() {
        let mut s = session();
        let mut editor = InputEditor::new();
        type_str(&mut editor, &mut s, "whoami");
        let event = editor.handle_key(EditorKey::Enter, &mut s);
        assert_eq!(
            event,
            EditorEvent::Submitted(CommandResult::line("alice"))
        );
        assert_eq!(editor.buffer(), "");
        assert_eq!(s.history().len(), 1);
    }

    #[test]
    fn history_browsing_restores_draft() {
        let mut s = session();
        s.execute_command_line("pwd");
        s.execute_command_line("whoami");
        let mut editor = InputEditor::new();
        type_str(&mut editor, &mut s, "ls");

        editor.handle_key(EditorKey::Up, &mut s);
        assert_eq!(editor.buffer(), "whoami");
        assert_eq!(editor.history_cursor(), Some(0));
        editor.handle_key(EditorKey::Up, &mut s);
        assert_eq!(editor.buffer(), "pwd");
        assert_eq!(editor.handle_key(EditorKey::Up, &mut s), EditorEvent::Bell);

        editor.handle_key(EditorKey::Down, &mut s);
        assert_eq!(editor.buffer(), "whoami");
        editor.handle_key(EditorKey::Down, &mut s);
        assert_eq!(editor.buffer(), "ls");
        assert_eq!(editor.history_cursor(), None);
        assert_eq!(editor.handle_key(EditorKey::Down, &mut s), EditorEvent::Bell);
    }

    #[test]
    fn tab_completes_and_cycles() {
        let mut s = session();
        s.execute_command_line("mkdir pics");
        let mut editor = InputEditor::new();
        type_str(&mut editor, &mut s, "cd p");

        editor.handle_key(EditorKey::Tab, &mut s);
        assert_eq!(editor.buffer(), "cd projects");
        editor.handle_key(EditorKey::Tab, &mut s);
        assert_eq!(editor.buffer(), "cd pics");
        editor.handle_key(EditorKey::Tab, &mut s);
        assert_eq!(editor.buffer(), "cd projects");
        assert_eq!(editor.cursor(), "cd projects".len());
    }

    #[test]
    fn typing_after_completion_restarts() {
        let mut s = session();
        let mut editor = InputEditor::new();
        type_str(&mut editor, &mut s, "open a");
        editor.handle_key(EditorKey::Tab, &mut s);
        assert_eq!(editor.buffer(), "open about.txt");
        editor.handle_key(EditorKey::Char('x'), &mut s);
        assert!(!editor.completion().is_cycling());
    }

    #[test]
    fn tab_without_candidates_rings() {
        let mut s = session();
        let mut editor = InputEditor::new();
        type_str(&mut editor, &mut s, "ls zz");
        assert_eq!(editor.handle_key(EditorKey::Tab, &mut s), EditorEvent::Bell);
        assert_eq!(editor.buffer(), "ls zz");
    }
}
