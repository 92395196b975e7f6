use axum::{debug_handler, extract::{Path, State}, response::{IntoResponse, Response}, Form};
use serde::Deserialize;
use tower_sessions::Session;

use crate::{
    include_res,
    model::{like_path, question_path, short_id, Author, Like, Question},
    projection::QuestionView,
    res::escape_html,
    session::{self, Viewer},
    store::Store,
    AppResult,
};

/// Write one question record under the room, carrying a by-value copy of the
/// author's name and avatar. Blank content aborts locally, no write.
pub fn send_question(
    store: &Store,
    room_id: &str,
    viewer: &Viewer,
    content: &str,
) -> AppResult<Option<String>> {
    if content.trim().is_empty() {
        return Ok(None);
    }

    let question_id = short_id();
    let question = Question {
        content: content.to_owned(),
        author: Author {
            name: viewer.name.clone(),
            avatar: viewer.avatar.clone(),
        },
        is_highlighted: false,
        is_answered: false,
    };
    store.write(
        &question_path(room_id, &question_id),
        serde_json::to_value(question)?,
    );
    Ok(Some(question_id))
}

/// One like record per toggle: no current like id writes a fresh one, a
/// known like id removes that record. Returns the new like id when liking.
pub fn toggle_like(
    store: &Store,
    room_id: &str,
    question_id: &str,
    viewer: &Viewer,
    like_id: Option<&str>,
) -> AppResult<Option<String>> {
    match like_id {
        Some(like_id) => {
            store.remove(&like_path(room_id, question_id, like_id));
            Ok(None)
        }
        None => {
            let like_id = short_id();
            let like = Like { author_id: viewer.id.clone() };
            store.write(
                &like_path(room_id, question_id, &like_id),
                serde_json::to_value(like)?,
            );
            Ok(Some(like_id))
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct AskForm {
    content: String,
}

#[debug_handler]
pub(crate) async fn ask(
    Path(room_id): Path<String>,
    State(store): State<Store>,
    session: Session,

    Form(AskForm { content }): Form<AskForm>,
) -> AppResult<Response> {
    let Some(viewer) = session::viewer(&session).await? else {
        return Err("must be signed in to send a question")?;
    };

    send_question(&store, &room_id, &viewer, &content)?;
    Ok(().into_response())
}

#[derive(Debug, Deserialize)]
pub(crate) struct LikeForm {
    like_id: Option<String>,
}

#[debug_handler]
pub(crate) async fn like(
    Path((room_id, question_id)): Path<(String, String)>,
    State(store): State<Store>,
    session: Session,

    Form(LikeForm { like_id }): Form<LikeForm>,
) -> AppResult<Response> {
    let Some(viewer) = session::viewer(&session).await? else {
        return Err("must be signed in to like a question")?;
    };

    toggle_like(&store, &room_id, &question_id, &viewer, like_id.as_deref())?;
    Ok(().into_response())
}

pub(crate) fn question_to_html(question: &QuestionView, admin: bool) -> String {
    let mut content_html = String::new();
    pulldown_cmark::html::push_html(
        &mut content_html,
        pulldown_cmark::Parser::new(&question.content),
    );

    let mut classes = String::new();
    if question.is_answered {
        classes += " answered";
    } else if question.is_highlighted {
        classes += " highlighted";
    }

    let id = escape_html(&question.id);
    let mut actions = String::new();
    if admin {
        if !question.is_answered {
            actions += &format!(
                r#"<button type="button" onclick="markAnswered('{id}')" title="Mark as answered">&#10003;</button>"#
            );
            actions += &format!(
                r#"<button type="button" onclick="highlightQuestion('{id}')" title="Highlight">&#9733;</button>"#
            );
        }
        actions += &format!(
            r#"<button type="button" onclick="deleteQuestion('{id}')" title="Delete">&#10005;</button>"#
        );
    } else {
        let liked = if question.like_id.is_some() { " liked" } else { "" };
        let like_id = question.like_id.as_deref().map(escape_html).unwrap_or_default();
        actions += &format!(
            r#"<button type="button" class="like-button{liked}" onclick="toggleLike('{id}', '{like_id}')"><span>{count}</span> &#128077;</button>"#,
            count = question.like_count,
        );
    }

    include_res!(str, "/pages/rooms/question.html")
        .replace("{id}", &id)
        .replace("{classes}", &classes)
        .replace("{content}", &content_html)
        .replace("{author_name}", &escape_html(&question.author.name))
        .replace("{author_avatar}", &escape_html(&question.author.avatar))
        .replace("{actions}", &actions)
}
