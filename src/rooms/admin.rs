use axum::{debug_handler, extract::{Path, State}, response::{IntoResponse, Response}};
use serde_json::json;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use tower_sessions::Session;

use crate::{
    model::{question_path, room_path},
    res,
    session::{self, Viewer},
    store::Store,
    AppResult,
};

// The owner-only operations. Flags only ever move to true and closedAt is
// written once; nothing here checks a version, the last writer wins.

pub fn mark_answered(store: &Store, room_id: &str, question_id: &str) {
    store.patch(&question_path(room_id, question_id), json!({"isAnswered": true}));
}

pub fn highlight_question(store: &Store, room_id: &str, question_id: &str) {
    store.patch(&question_path(room_id, question_id), json!({"isHighlighted": true}));
}

pub fn delete_question(store: &Store, room_id: &str, question_id: &str) {
    store.remove(&question_path(room_id, question_id));
}

pub fn close_room(store: &Store, room_id: &str) -> AppResult<()> {
    let closed_at = OffsetDateTime::now_utc().format(&Rfc3339)?;
    store.patch(&room_path(room_id), json!({"closedAt": closed_at}));
    Ok(())
}

// The original delegated ownership to the store's security rules; here the
// service is the enforcement point.
async fn check_owner(
    store: &Store,
    session: &Session,
    room_id: &str,
) -> AppResult<Result<Viewer, Response>> {
    let Some(viewer) = session::viewer(session).await? else {
        return Err("must be signed in to manage a room")?;
    };

    let Some(owner) = super::owner_id(store, room_id) else {
        return Ok(Err(res::sorry("room")?));
    };

    if owner != viewer.id {
        return Err("only the room owner can do that")?;
    }

    Ok(Ok(viewer))
}

#[debug_handler]
pub(crate) async fn answered(
    Path((room_id, question_id)): Path<(String, String)>,
    State(store): State<Store>,
    session: Session,
) -> AppResult<Response> {
    if let Err(response) = check_owner(&store, &session, &room_id).await? {
        return Ok(response);
    }

    mark_answered(&store, &room_id, &question_id);
    Ok(().into_response())
}

#[debug_handler]
pub(crate) async fn highlight(
    Path((room_id, question_id)): Path<(String, String)>,
    State(store): State<Store>,
    session: Session,
) -> AppResult<Response> {
    if let Err(response) = check_owner(&store, &session, &room_id).await? {
        return Ok(response);
    }

    highlight_question(&store, &room_id, &question_id);
    Ok(().into_response())
}

#[debug_handler]
pub(crate) async fn delete(
    Path((room_id, question_id)): Path<(String, String)>,
    State(store): State<Store>,
    session: Session,
) -> AppResult<Response> {
    if let Err(response) = check_owner(&store, &session, &room_id).await? {
        return Ok(response);
    }

    delete_question(&store, &room_id, &question_id);
    Ok(().into_response())
}

#[debug_handler]
pub(crate) async fn close(
    Path(room_id): Path<String>,
    State(store): State<Store>,
    session: Session,
) -> AppResult<Response> {
    let viewer = match check_owner(&store, &session, &room_id).await? {
        Ok(viewer) => viewer,
        Err(response) => return Ok(response),
    };

    close_room(&store, &room_id)?;
    tracing::info!(%room_id, viewer = %viewer.id, "room closed");
    Ok(().into_response())
}
