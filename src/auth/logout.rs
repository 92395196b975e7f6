use axum::{debug_handler, extract::Query, response::Redirect};
use tower_sessions::Session;

use crate::AppResult;

use super::{local_return_url, login::LoginQuery};

#[debug_handler]
pub(crate) async fn logout(
    Query(LoginQuery { return_url }): Query<LoginQuery>,
    session: Session,
) -> AppResult<Redirect> {
    // drops the viewer identity along with everything else in the session
    session.clear().await;

    let back_to = local_return_url(return_url).unwrap_or_else(|| "/".to_owned());
    Ok(Redirect::to(&back_to))
}
