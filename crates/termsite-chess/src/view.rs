//! Client-side room state
//!
//! A [`RoomView`] shows the last authoritative snapshot plus at most one
//! optimistic move of our own. Every snapshot replaces the pending move,
//! whether or not the store accepted it, so a rejected move simply vanishes.

use crate::error::RoomError;
use crate::room::{Color, MoveSubmission, RoomDoc, RoomStatus};

/// One player's view of a room
#[derive(Debug, Clone)]
pub struct RoomView {
    code: String,
    player: String,
    room: Option<RoomDoc>,
    pending: Option<MoveSubmission>,
    deleted: bool,
}

impl RoomView {
    /// View of room `code` for `player`, before any snapshot arrived
    #[must_use]
    pub fn new(code: impl Into<String>, player: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            player: player.into(),
            room: None,
            pending: None,
            deleted: false,
        }
    }

    /// Take an authoritative snapshot (`None` = room deleted)
    pub fn apply_snapshot(&mut self, snapshot: Option<RoomDoc>) {
        if let Some(pending) = self.pending.take() {
            let accepted = snapshot.as_ref().is_some_and(|room| {
                room.version == pending.expected_version + 1 && room.fen == pending.fen_after
            });
            if !accepted {
                tracing::debug!(
                    "room {}: {} discarding local move {}{}",
                    self.code,
                    self.player,
                    pending.from,
                    pending.to
                );
            }
        }
        self.deleted = snapshot.is_none();
        self.room = snapshot;
    }

    /// Stage a local move and build its submission
    ///
    /// # Errors
    /// - `RoomError::MovePending` while an earlier move is unconfirmed
    /// - `RoomError::NotActive` / `RoomFinished` when the game is not running
    /// - `RoomError::NotSeated` / `NotYourTurn` for the wrong player
    pub fn propose(
        &mut self,
        from: &str,
        to: &str,
        promotion: Option<&str>,
        fen_after: &str,
    ) -> Result<MoveSubmission, RoomError> {
        if self.pending.is_some() {
            return Err(RoomError::MovePending);
        }
        let room = self.room.as_ref().ok_or(RoomError::NotActive)?;
        match room.status {
            RoomStatus::Active => {}
            RoomStatus::Waiting => return Err(RoomError::NotActive),
            RoomStatus::Finished => return Err(RoomError::RoomFinished(self.code.clone())),
        }
        let seat = room.players.seat_of(&self.player).ok_or(RoomError::NotSeated)?;
        if seat != room.turn {
            return Err(RoomError::NotYourTurn);
        }

        let mut submission = MoveSubmission::new(room.version, from, to, fen_after);
        submission.promotion = promotion.map(str::to_string);
        self.pending = Some(submission.clone());
        Ok(submission)
    }

    /// Position to draw: the pending move's result if any
    #[must_use]
    pub fn displayed_fen(&self) -> Option<&str> {
        self.pending
            .as_ref()
            .map(|mv| mv.fen_after.as_str())
            .or_else(|| self.room.as_ref().map(|room| room.fen.as_str()))
    }

    /// Side on turn as displayed
    #[must_use]
    pub fn displayed_turn(&self) -> Option<Color> {
        let room = self.room.as_ref()?;
        Some(if self.pending.is_some() {
            room.turn.opposite()
        } else {
            room.turn
        })
    }

    #[inline]
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    #[inline]
    #[must_use]
    pub fn seat(&self) -> Option<Color> {
        self.room.as_ref()?.players.seat_of(&self.player)
    }

    #[inline]
    #[must_use]
    pub fn room(&self) -> Option<&RoomDoc> {
        self.room.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn pending(&self) -> Option<&MoveSubmission> {
        self.pending.as_ref()
    }

    /// Whether the last snapshot said the room is gone
    #[inline]
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.deleted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::room::Players;

    fn active(version: u64, turn: Color) -> RoomDoc {
        RoomDoc {
            turn,
            version,
            status: RoomStatus::Active,
            players: Players {
                white: Some("alice".into()),
                black: Some("bob".into()),
            },
            ..RoomDoc::new("alice")
        }
    }

    #[test]
    fn pending_move_is_shown_until_snapshot() {
        let mut view = RoomView::new("ROOM01", "alice");
        view.apply_snapshot(Some(active(1, Color::White)));

        let mv = view.propose("e2", "e4", None, "after-e4").unwrap();
        assert_eq!(mv.expected_version, 1);
        assert_eq!(view.displayed_fen(), Some("after-e4"));
        assert_eq!(view.displayed_turn(), Some(Color::Black));
        assert!(matches!(
            view.propose("d2", "d4", None, "x"),
            Err(RoomError::MovePending)
        ));
    }

    #[test]
    fn snapshot_replaces_rejected_move() {
        let mut view = RoomView::new("ROOM01", "alice");
        view.apply_snapshot(Some(active(1, Color::White)));
        view.propose("e2", "e4", None, "mine").unwrap();

        let mut theirs = active(2, Color::Black);
        theirs.fen = "theirs".into();
        view.apply_snapshot(Some(theirs));

        assert!(view.pending().is_none());
        assert_eq!(view.displayed_fen(), Some("theirs"));
    }

    #[test]
    fn wrong_turn_or_seat_is_refused_locally() {
        let mut view = RoomView::new("ROOM01", "bob");
        view.apply_snapshot(Some(active(1, Color::White)));
        assert!(matches!(
            view.propose("e7", "e5", None, "x"),
            Err(RoomError::NotYourTurn)
        ));

        let mut spectator = RoomView::new("ROOM01", "carol");
        spectator.apply_snapshot(Some(active(1, Color::White)));
        assert!(matches!(
            spectator.propose("e2", "e4", None, "x"),
            Err(RoomError::NotSeated)
        ));
        assert_eq!(spectator.seat(), None);
    }

    #[test]
    fn deletion_is_tracked() {
        let mut view = RoomView::new("ROOM01", "alice");
        view.apply_snapshot(Some(RoomDoc::new("alice")));
        assert!(!view.is_deleted());
        view.apply_snapshot(None);
        assert!(view.is_deleted());
        assert_eq!(view.displayed_fen(), None);
    }
}
