use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Displayed author of a question, denormalized from the viewer's identity
/// at submit time. A later profile change never updates old questions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    pub avatar: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub title: String,
    pub author_id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub content: String,
    pub author: Author,
    pub is_highlighted: bool,
    pub is_answered: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Like {
    pub author_id: String,
}

// Room, question and like ids are the first 8 hex chars of a random uuid.
// Not globally unique, but collisions are lottery odds at this scale.
pub fn short_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(8);
    id
}

pub fn room_path(room_id: &str) -> String {
    format!("rooms/{room_id}")
}

pub fn question_path(room_id: &str, question_id: &str) -> String {
    format!("rooms/{room_id}/questions/{question_id}")
}

pub fn like_path(room_id: &str, question_id: &str, like_id: &str) -> String {
    format!("rooms/{room_id}/questions/{question_id}/likes/{like_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_ids_are_eight_hex_chars() {
        let id = short_id();
        assert_eq!(id.len(), 8);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn paths_follow_the_tree_schema() {
        assert_eq!(room_path("r1"), "rooms/r1");
        assert_eq!(question_path("r1", "q1"), "rooms/r1/questions/q1");
        assert_eq!(like_path("r1", "q1", "l1"), "rooms/r1/questions/q1/likes/l1");
    }
}
