use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::AppResult;

pub const VIEWER: &str = "viewer";
pub const CSRF_STATE: &str = "csrf_state";
pub const PKCE_VERIFIER: &str = "pkce_verifier";
pub const RETURN_URL: &str = "return_url";

/// The signed-in identity, as the identity collaborator reported it.
/// Created on sign-in, cleared on sign-out, read-only everywhere else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewer {
    pub id: String,
    pub name: String,
    pub avatar: String,
}

pub async fn viewer(session: &Session) -> AppResult<Option<Viewer>> {
    Ok(session.get(VIEWER).await?)
}
