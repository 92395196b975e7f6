use askroom::model::{question_path, room_path};
use askroom::projection::project;
use askroom::rooms::{
    close_room, create_room, delete_question, highlight_question, mark_answered, send_question,
    toggle_like,
};
use askroom::session::Viewer;
use askroom::store::Store;
use serde_json::Value;

fn viewer(id: &str, name: &str) -> Viewer {
    Viewer {
        id: id.to_owned(),
        name: name.to_owned(),
        avatar: format!("https://example.com/{id}.png"),
    }
}

#[test]
fn create_room_writes_title_and_author() {
    let store = Store::new();
    let owner = viewer("u1", "Ada");

    let room_id = create_room(&store, &owner, "Demo").unwrap().unwrap();
    let snapshot = store.read_once(&room_path(&room_id));
    assert_eq!(snapshot["title"], "Demo");
    assert_eq!(snapshot["authorId"], "u1");

    let view = project(&snapshot, Some("u1")).unwrap();
    assert_eq!(view.title, "Demo");
    assert_eq!(view.author_id, "u1");
    assert!(view.questions.is_empty());
}

#[test]
fn blank_titles_and_questions_issue_no_write() {
    let store = Store::new();
    let owner = viewer("u1", "Ada");

    assert_eq!(create_room(&store, &owner, "   ").unwrap(), None);
    assert_eq!(store.read_once("rooms"), Value::Null);

    let room_id = create_room(&store, &owner, "Demo").unwrap().unwrap();
    let asker = viewer("u2", "Grace");
    assert_eq!(send_question(&store, &room_id, &asker, "").unwrap(), None);
    assert_eq!(send_question(&store, &room_id, &asker, " \n\t ").unwrap(), None);
    assert_eq!(
        store.read_once(&format!("{}/questions", room_path(&room_id))),
        Value::Null
    );
}

#[test]
fn question_carries_denormalized_author() {
    let store = Store::new();
    let owner = viewer("u1", "Ada");
    let room_id = create_room(&store, &owner, "Demo").unwrap().unwrap();

    let mut asker = viewer("u2", "Grace");
    let question_id = send_question(&store, &room_id, &asker, "why rust?")
        .unwrap()
        .unwrap();

    // later profile changes must not touch the stored author
    asker.name = "Renamed".to_owned();

    let snapshot = store.read_once(&question_path(&room_id, &question_id));
    assert_eq!(snapshot["content"], "why rust?");
    assert_eq!(snapshot["author"]["name"], "Grace");
    assert_eq!(snapshot["isAnswered"], false);
    assert_eq!(snapshot["isHighlighted"], false);
}

#[test]
fn like_toggle_round_trip() {
    let store = Store::new();
    let owner = viewer("u1", "Ada");
    let room_id = create_room(&store, &owner, "Demo").unwrap().unwrap();
    let asker = viewer("u2", "Grace");
    let question_id = send_question(&store, &room_id, &asker, "why?").unwrap().unwrap();

    let fan = viewer("u3", "Linus");
    let like_id = toggle_like(&store, &room_id, &question_id, &fan, None)
        .unwrap()
        .unwrap();

    let snapshot = store.read_once(&room_path(&room_id));
    let view = project(&snapshot, Some("u3")).unwrap();
    assert_eq!(view.questions[0].like_count, 1);
    assert_eq!(view.questions[0].like_id.as_deref(), Some(like_id.as_str()));

    // someone else's like never shows up as ours
    let other_view = project(&snapshot, Some("u4")).unwrap();
    assert_eq!(other_view.questions[0].like_count, 1);
    assert_eq!(other_view.questions[0].like_id, None);

    let _ = toggle_like(&store, &room_id, &question_id, &fan, Some(&like_id)).unwrap();
    let snapshot = store.read_once(&room_path(&room_id));
    let view = project(&snapshot, Some("u3")).unwrap();
    assert_eq!(view.questions[0].like_count, 0);
    assert_eq!(view.questions[0].like_id, None);
}

#[test]
fn owner_flags_move_to_true_and_stay() {
    let store = Store::new();
    let owner = viewer("u1", "Ada");
    let room_id = create_room(&store, &owner, "Demo").unwrap().unwrap();
    let asker = viewer("u2", "Grace");
    let question_id = send_question(&store, &room_id, &asker, "why?").unwrap().unwrap();

    mark_answered(&store, &room_id, &question_id);
    highlight_question(&store, &room_id, &question_id);

    // marking twice is the same as marking once
    let before = store.read_once(&room_path(&room_id));
    mark_answered(&store, &room_id, &question_id);
    assert_eq!(store.read_once(&room_path(&room_id)), before);

    let view = project(&before, None).unwrap();
    assert!(view.questions[0].is_answered);
    assert!(view.questions[0].is_highlighted);
    // the flags merged in without clobbering the record
    assert_eq!(view.questions[0].content, "why?");
}

#[tokio::test]
async fn deleted_question_disappears_from_the_next_snapshot() {
    let store = Store::new();
    let owner = viewer("u1", "Ada");
    let room_id = create_room(&store, &owner, "Demo").unwrap().unwrap();
    let asker = viewer("u2", "Grace");
    let q1 = send_question(&store, &room_id, &asker, "first?").unwrap().unwrap();
    let q2 = send_question(&store, &room_id, &asker, "second?").unwrap().unwrap();

    let mut sub = store.subscribe(&room_path(&room_id));
    let initial = sub.changed().await.unwrap();
    let ids: Vec<String> = project(&initial, None)
        .unwrap()
        .questions
        .into_iter()
        .map(|q| q.id)
        .collect();
    assert!(ids.contains(&q1) && ids.contains(&q2));

    delete_question(&store, &room_id, &q1);
    let updated = sub.changed().await.unwrap();
    let ids: Vec<String> = project(&updated, None)
        .unwrap()
        .questions
        .into_iter()
        .map(|q| q.id)
        .collect();
    assert!(!ids.contains(&q1));
    assert!(ids.contains(&q2));
}

#[tokio::test]
async fn closing_a_room_reaches_subscribers() {
    let store = Store::new();
    let owner = viewer("u1", "Ada");
    let room_id = create_room(&store, &owner, "Demo").unwrap().unwrap();

    let mut sub = store.subscribe(&room_path(&room_id));
    let initial = sub.changed().await.unwrap();
    assert_eq!(project(&initial, None).unwrap().closed_at, None);

    close_room(&store, &room_id).unwrap();
    let closed = sub.changed().await.unwrap();
    let view = project(&closed, None).unwrap();
    assert!(view.closed_at.is_some());
    // closing merges, the rest of the room record is untouched
    assert_eq!(view.title, "Demo");
}

#[tokio::test]
async fn each_write_pushes_a_snapshot_in_order() {
    let store = Store::new();
    let owner = viewer("u1", "Ada");
    let room_id = create_room(&store, &owner, "Demo").unwrap().unwrap();
    let asker = viewer("u2", "Grace");

    let mut sub = store.subscribe(&room_path(&room_id));
    let _ = sub.changed().await;

    let _ = send_question(&store, &room_id, &asker, "one?").unwrap();
    let _ = send_question(&store, &room_id, &asker, "two?").unwrap();

    let first = project(&sub.changed().await.unwrap(), None).unwrap();
    let second = project(&sub.changed().await.unwrap(), None).unwrap();
    assert_eq!(first.questions.len(), 1);
    assert_eq!(second.questions.len(), 2);
}
