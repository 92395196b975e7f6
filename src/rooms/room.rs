use axum::{debug_handler, extract::{Path, State}, response::{Html, IntoResponse, Response}};
use tower_sessions::Session;

use crate::{
    include_res,
    model::room_path,
    projection::{project, RoomView},
    res::{self, escape_html},
    session::{self, Viewer},
    store::Store,
    AppResult,
};

use super::question;

#[debug_handler]
pub(crate) async fn room(
    State(store): State<Store>,
    session: Session,
    Path(room_id): Path<String>,
) -> AppResult<Response> {
    let viewer = session::viewer(&session).await?;

    let snapshot = store.read_once(&room_path(&room_id));
    if snapshot.is_null() {
        return res::sorry("room");
    }
    let view = project(&snapshot, viewer.as_ref().map(|v| v.id.as_str()))?;

    let user_info = match &viewer {
        Some(Viewer { name, avatar, .. }) => format!(
            r#"<div class="user-info"><img src="{}" alt=""><span>{}</span></div>"#,
            escape_html(avatar),
            escape_html(name),
        ),
        None => r#"<span>To send a question, <a href="/login">sign in</a>.</span>"#.to_owned(),
    };
    let form_disabled = viewer.is_none() || view.closed_at.is_some();

    let body = include_res!(str, "/pages/rooms/room.html")
        .replace("{room_id}", &escape_html(&room_id))
        .replace("{room_title}", &escape_html(&view.title))
        .replace("{question_count}", &view.questions.len().to_string())
        .replace("{questions}", &questions_html(&view, false))
        .replace("{user_info}", &user_info)
        .replace("{form_disabled}", if form_disabled { "disabled" } else { "" });

    Ok(Html(body).into_response())
}

#[debug_handler]
pub(crate) async fn admin(
    State(store): State<Store>,
    session: Session,
    Path(room_id): Path<String>,
) -> AppResult<Response> {
    let sorry = res::sorry("room");

    let Some(viewer) = session::viewer(&session).await? else {
        return Ok(
            axum::response::Redirect::to(&format!("/login?return_url=/r/{room_id}/admin"))
                .into_response(),
        );
    };

    let snapshot = store.read_once(&room_path(&room_id));
    if snapshot.is_null() {
        return sorry;
    }
    let view = project(&snapshot, Some(viewer.id.as_str()))?;
    if view.author_id != viewer.id {
        return sorry;
    }

    let body = include_res!(str, "/pages/rooms/admin.html")
        .replace("{room_id}", &escape_html(&room_id))
        .replace("{room_title}", &escape_html(&view.title))
        .replace("{question_count}", &view.questions.len().to_string())
        .replace("{questions}", &questions_html(&view, true));

    Ok(Html(body).into_response())
}

pub(crate) fn questions_html(view: &RoomView, admin: bool) -> String {
    let mut html = String::new();
    for question in &view.questions {
        html += &question::question_to_html(question, admin);
    }
    html
}
