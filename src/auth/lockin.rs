use axum::{debug_handler, extract::{Path, Query, State}, response::{IntoResponse, Redirect}};
use oauth2::{AuthorizationCode, CsrfToken, PkceCodeVerifier, TokenResponse};
use serde::Deserialize;
use serde_json::Value;
use tower_sessions::Session;

use crate::{session::{Viewer, CSRF_STATE, PKCE_VERIFIER, RETURN_URL, VIEWER}, AppResult, AppState, GetField};

use super::clients::{ClientProvider, Clients};

#[derive(Deserialize)]
pub struct LockinQuery {
    pub state: Option<String>,
    pub code: Option<String>,
}

#[debug_handler(state = AppState)]
pub(crate) async fn lockin(
    Path(provider): Path<ClientProvider>,
    Query(LockinQuery { state, code }): Query<LockinQuery>,
    State(clients): State<Clients>,
    session: Session,
) -> AppResult<impl IntoResponse> {
    let state = CsrfToken::new(state.ok_or("OAuth: without state")?);
    let code = AuthorizationCode::new(code.ok_or("OAuth: without code")?);

    let Some(stored_state) = session.get::<String>(CSRF_STATE).await? else {
        return Err("no csrf_state")?;
    };

    if state.secret().as_str() != stored_state.as_str() {
        return Err("csrf tokens don't match")?;
    }

    let Some(pkce_verifier) = session.get::<String>(PKCE_VERIFIER).await? else {
        return Err("no pkce_verifier")?;
    };

    let client = clients.get_client(provider)?;
    let http_client = reqwest::ClientBuilder::new()
        .redirect(reqwest::redirect::Policy::none())
        .build()?;
    let token_result = client
        .exchange_code(code)
        .set_pkce_verifier(PkceCodeVerifier::new(pkce_verifier))
        .request_async(&http_client)
        .await?;

    let access_token = token_result.access_token().secret();
    let viewer = fetch_viewer(provider, &http_client, access_token).await?;

    tracing::info!(viewer = %viewer.id, %provider, "signed in");
    session.insert(VIEWER, &viewer).await?;

    let return_url: String = session
        .get(RETURN_URL)
        .await?
        .unwrap_or_else(|| "/".to_owned());
    Ok(Redirect::to(return_url.as_str()))
}

// The whole identity contract: whatever the provider knows about the viewer,
// reduced to { id, name, avatar }.
async fn fetch_viewer(
    provider: ClientProvider,
    http_client: &reqwest::Client,
    access_token: &str,
) -> AppResult<Viewer> {
    let body: Value = http_client
        .get(provider.userinfo_url())
        .bearer_auth(access_token)
        .header(reqwest::header::USER_AGENT, "askroom")
        .send()
        .await?
        .json()
        .await?;

    match provider {
        ClientProvider::Google => Ok(Viewer {
            id: body.get_str_field("id")?,
            name: body.get_str_field("name")?,
            avatar: body.get_str_field("picture")?,
        }),
        ClientProvider::Github => {
            let login = body.get_str_field("login")?;
            let name = body
                .get("name")
                .and_then(Value::as_str)
                .map(str::to_owned)
                .unwrap_or_else(|| login.clone());
            Ok(Viewer {
                id: body
                    .get("id")
                    .and_then(Value::as_i64)
                    .ok_or(format!("expected numeric id in {body}"))?
                    .to_string(),
                name,
                avatar: body.get_str_field("avatar_url")?,
            })
        }
    }
}
