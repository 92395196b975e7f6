mod admin;
mod new;
mod question;
mod room;
mod ws;

pub use admin::{close_room, delete_question, highlight_question, mark_answered};
pub use new::create_room;
pub use question::{send_question, toggle_like};

use axum::{routing::{get, post}, Router};
use serde_json::Value;

use crate::{model::room_path, store::Store, AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/new", get(new::new_room_page).post(new::new_room))
        .route("/{room_id}", get(room::room))
        .route("/{room_id}/admin", get(room::admin))
        .route("/{room_id}/ws", get(ws::room_ws))
        .route("/{room_id}/close", post(admin::close))
        .route("/{room_id}/questions", post(question::ask))
        .route("/{room_id}/questions/{question_id}/like", post(question::like))
        .route("/{room_id}/questions/{question_id}/answered", post(admin::answered))
        .route("/{room_id}/questions/{question_id}/highlight", post(admin::highlight))
        .route("/{room_id}/questions/{question_id}/delete", post(admin::delete))
}

pub(crate) fn owner_id(store: &Store, room_id: &str) -> Option<String> {
    let snapshot = store.read_once(&room_path(room_id));
    snapshot
        .get("authorId")
        .and_then(Value::as_str)
        .map(str::to_owned)
}
