use axum::{debug_handler, extract::State, response::{Html, IntoResponse, Redirect, Response}, Form};
use serde::Deserialize;
use tower_sessions::Session;

use crate::{include_res, model::{room_path, short_id, Room}, session::{self, Viewer}, store::Store, AppResult};

#[derive(Debug, Deserialize)]
pub(crate) struct NewRoomForm {
    title: String,
}

/// Write `rooms/{id}` with the title and the creator's identity. Blank or
/// whitespace-only titles abort locally without touching the store.
pub fn create_room(store: &Store, viewer: &Viewer, title: &str) -> AppResult<Option<String>> {
    if title.trim().is_empty() {
        return Ok(None);
    }

    let room_id = short_id();
    let room = Room {
        title: title.to_owned(),
        author_id: viewer.id.clone(),
    };
    store.write(&room_path(&room_id), serde_json::to_value(room)?);
    Ok(Some(room_id))
}

#[debug_handler]
pub(crate) async fn new_room_page(session: Session) -> AppResult<Response> {
    if session::viewer(&session).await?.is_none() {
        return Ok(Redirect::to("/login?return_url=/r/new").into_response());
    }

    Ok(Html(include_res!(str, "/pages/new_room.html")).into_response())
}

#[debug_handler]
pub(crate) async fn new_room(
    State(store): State<Store>,
    session: Session,

    Form(NewRoomForm { title }): Form<NewRoomForm>,
) -> AppResult<Response> {
    let Some(viewer) = session::viewer(&session).await? else {
        return Err("must be signed in to create a room")?;
    };

    let Some(room_id) = create_room(&store, &viewer, &title)? else {
        return Ok(Redirect::to("/r/new").into_response());
    };

    tracing::info!(%room_id, viewer = %viewer.id, "room created");
    Ok(Redirect::to(&format!("/r/{room_id}/admin")).into_response())
}
