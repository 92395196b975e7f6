use serde::Serialize;
use serde_json::{Map, Value};

use crate::{model::Author, AppResult, GetField};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
    pub id: String,
    pub content: String,
    pub author: Author,
    pub is_highlighted: bool,
    pub is_answered: bool,
    pub like_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub like_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomView {
    pub title: String,
    pub author_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<String>,
    pub questions: Vec<QuestionView>,
}

/// Derive the display state of a room from its raw tree snapshot. Pure and
/// side-effect-free; the websocket loop re-runs it in full on every snapshot
/// and the last run wins. Question order is the store's enumeration order,
/// never re-sorted here.
pub fn project(snapshot: &Value, viewer_id: Option<&str>) -> AppResult<RoomView> {
    let title = snapshot.get_str_field("title")?;
    let author_id = snapshot.get_str_field("authorId")?;
    let closed_at = snapshot
        .get("closedAt")
        .and_then(Value::as_str)
        .map(str::to_owned);

    let mut questions = Vec::new();
    if let Some(map) = snapshot.get("questions").and_then(Value::as_object) {
        for (id, question) in map {
            let likes = question.get("likes").and_then(Value::as_object);
            let like_count = likes.map_or(0, Map::len);
            let like_id = match (viewer_id, likes) {
                (Some(viewer_id), Some(likes)) => likes
                    .iter()
                    .find(|(_, like)| {
                        like.get("authorId").and_then(Value::as_str) == Some(viewer_id)
                    })
                    .map(|(key, _)| key.clone()),
                _ => None,
            };

            questions.push(QuestionView {
                id: id.clone(),
                content: question.get_str_field("content")?,
                author: serde_json::from_value(question.get_obj_field("author")?.clone())?,
                is_highlighted: question
                    .get("isHighlighted")
                    .and_then(Value::as_bool)
                    .unwrap_or(false),
                is_answered: question
                    .get("isAnswered")
                    .and_then(Value::as_bool)
                    .unwrap_or(false),
                like_count,
                like_id,
            });
        }
    }

    Ok(RoomView { title, author_id, closed_at, questions })
}
