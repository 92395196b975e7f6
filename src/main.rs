use askroom::{auth, include_res, res::escape_html, rooms, session, store::Store, AppResult, AppState};
use axum::{
    debug_handler, response::{Html, IntoResponse, Redirect, Response}, routing::get, Router
};
use tower_http::cors::CorsLayer;
use tower_sessions::{cookie::SameSite, Expiry, MemoryStore, Session, SessionManagerLayer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::hours(12)));

    let public_url = dotenv::var("PUBLIC_URL").unwrap_or_else(|_| "http://localhost:8080".to_owned());
    let clients = auth::Clients::load(&public_url).unwrap();
    let app_state = AppState {
        store: Store::new(),
        clients,
    };

    let app = Router::new()
        .route("/", get(index))

        .merge(auth::router())
        .nest("/r", rooms::router())

        .with_state(app_state)
        .layer(session_layer)
        .layer(CorsLayer::permissive());

    let addr = dotenv::var("ASKROOM_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_owned());
    tracing::info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

#[debug_handler]
async fn index(session: Session) -> AppResult<Response> {
    let Some(viewer) = session::viewer(&session).await? else {
        return Ok(Redirect::to("/login").into_response());
    };

    Ok(Html(
        include_res!(str, "/pages/index.html")
            .replace("{viewer_name}", &escape_html(&viewer.name)),
    )
    .into_response())
}
