mod clients;
mod lockin;
mod login;
mod logout;

pub use clients::{ClientProvider, Clients};

use axum::{routing::get, Router};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", get(login::login_page))
        .route("/login/{provider}", get(login::login))
        .route("/lockin/{provider}", get(lockin::lockin))
        .route("/logout", get(logout::logout))
}

// Only same-site paths may round-trip through the sign-in flow; anything
// absolute could bounce the browser to a foreign site afterwards.
pub(crate) fn local_return_url(url: Option<String>) -> Option<String> {
    url.filter(|url| url.starts_with('/') && !url.starts_with("//"))
}

#[cfg(test)]
mod tests {
    use super::local_return_url;

    #[test]
    fn only_local_paths_survive() {
        assert_eq!(local_return_url(Some("/r/abc123".into())).as_deref(), Some("/r/abc123"));
        assert_eq!(local_return_url(Some("https://evil.example".into())), None);
        assert_eq!(local_return_url(Some("//evil.example".into())), None);
        assert_eq!(local_return_url(None), None);
    }
}
