use axum::{debug_handler, extract::{Path, State, WebSocketUpgrade}, response::{IntoResponse, Response}};
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tower_sessions::Session;

use crate::{model::room_path, projection::{project, RoomView}, res, session, store::Store, AppResult};

use super::room::questions_html;

/// Live view of one room. The socket owns a store subscription for its
/// lifetime; every pushed snapshot is re-projected for this viewer and
/// re-rendered in full. The subscription drops with the socket.
#[debug_handler(state = crate::AppState)]
pub(crate) async fn room_ws(
    Path(room_id): Path<String>,
    State(store): State<Store>,
    session: Session,

    ws: WebSocketUpgrade,
) -> AppResult<Response> {
    let viewer = session::viewer(&session).await?;

    let snapshot = store.read_once(&room_path(&room_id));
    if snapshot.is_null() {
        return res::sorry("room");
    }
    let is_owner = match (&viewer, snapshot.get("authorId").and_then(Value::as_str)) {
        (Some(viewer), Some(author_id)) => viewer.id == author_id,
        _ => false,
    };

    Ok(ws.on_upgrade(async move |socket| {
        let mut sub = store.subscribe(&room_path(&room_id));
        let (mut sender, mut receiver) = socket.split();
        let viewer_id = viewer.map(|v| v.id);

        loop {
            tokio::select! {
                snapshot = sub.changed() => {
                    let Some(snapshot) = snapshot else { break };
                    let Ok(view) = project(&snapshot, viewer_id.as_deref()) else {
                        continue;
                    };
                    let Ok(update) = render_update(&view, is_owner) else {
                        continue;
                    };
                    if sender.send(update.into()).await.is_err() {
                        break;
                    }
                }
                inbound = receiver.next() => {
                    // nothing meaningful comes in; a close or error tears
                    // the loop (and the subscription) down
                    if !matches!(inbound, Some(Ok(_))) {
                        break;
                    }
                }
            }
        }
    }))
}

fn render_update(view: &RoomView, admin: bool) -> AppResult<String> {
    Ok(serde_json::to_string(&json!({
        "title": view.title,
        "closed": view.closed_at.is_some(),
        "count": view.questions.len(),
        "html": questions_html(view, admin),
    }))?)
}
