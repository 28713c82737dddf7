use std::sync::Arc;

use pretty_assertions::assert_eq;
use termsite_chess::{MoveOutcome, RoomClient, RoomStatus, RoomView};
use termsite_store::InMemoryDocumentStore;

async fn started_room() -> RoomClient {
    let rooms = RoomClient::new(Arc::new(InMemoryDocumentStore::new()));
    rooms.create_room("ROOM01", "alice").await.unwrap();
    rooms.join_room("ROOM01", "bob").await.unwrap();
    rooms
}

#[tokio::test]
async fn conflicting_moves_exactly_one_wins() {
    let rooms = started_room().await;
    let mut sub = rooms.subscribe("ROOM01").await.unwrap();
    let base = sub.current().unwrap();

    // Same player, two tabs, both on version 1.
    let mut tab_a = RoomView::new("ROOM01", "alice");
    let mut tab_b = RoomView::new("ROOM01", "alice");
    tab_a.apply_snapshot(Some(base.clone()));
    tab_b.apply_snapshot(Some(base.clone()));
    let move_a = tab_a.propose("e2", "e4", None, "after-e4").unwrap();
    let move_b = tab_b.propose("d2", "d4", None, "after-d4").unwrap();

    let (a, b) = tokio::join!(
        rooms.submit_move("ROOM01", "alice", move_a),
        rooms.submit_move("ROOM01", "alice", move_b),
    );
    let outcomes = [a.unwrap(), b.unwrap()];
    let applied: Vec<_> = outcomes
        .iter()
        .filter(|o| matches!(o, MoveOutcome::Applied(_)))
        .collect();
    let stale: Vec<_> = outcomes
        .iter()
        .filter(|o| matches!(o, MoveOutcome::Stale { current_version: 2 }))
        .collect();
    assert_eq!(applied.len(), 1);
    assert_eq!(stale.len(), 1);

    let snapshot = sub.next().await.unwrap().unwrap();
    assert_eq!(snapshot.version, base.version + 1);

    tab_a.apply_snapshot(Some(snapshot.clone()));
    tab_b.apply_snapshot(Some(snapshot.clone()));
    assert!(tab_a.pending().is_none());
    assert!(tab_b.pending().is_none());
    assert_eq!(tab_a.displayed_fen(), Some(snapshot.fen.as_str()));
    assert_eq!(tab_b.displayed_fen(), Some(snapshot.fen.as_str()));
    assert!(snapshot.fen == "after-e4" || snapshot.fen == "after-d4");
}

#[tokio::test]
async fn full_exchange_through_views() {
    let rooms = started_room().await;
    let mut white = RoomView::new("ROOM01", "alice");
    let mut black = RoomView::new("ROOM01", "bob");
    let room = rooms.get_room("ROOM01").await.unwrap();
    white.apply_snapshot(room.clone());
    black.apply_snapshot(room);

    let mv = white.propose("e2", "e4", None, "fen-1").unwrap();
    let MoveOutcome::Applied(after) = rooms.submit_move("ROOM01", "alice", mv).await.unwrap()
    else {
        panic!("white's move should apply");
    };
    white.apply_snapshot(Some(after.clone()));
    black.apply_snapshot(Some(after));

    let mv = black.propose("e7", "e5", None, "fen-2").unwrap();
    rooms.submit_move("ROOM01", "bob", mv).await.unwrap();
    let room = rooms.resign("ROOM01", "alice").await.unwrap();

    assert_eq!(room.status, RoomStatus::Finished);
    assert_eq!(room.version, 4);
    assert_eq!(room.fen, "fen-2");
}
