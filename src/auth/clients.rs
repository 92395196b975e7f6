use std::fmt;

use oauth2::{basic::BasicClient, AuthUrl, Client, ClientId, ClientSecret, RedirectUrl, TokenUrl};
use serde::Deserialize;
use serde_json::Value;

use crate::{AppResult, GetField};

type HappyClient = Client<oauth2::StandardErrorResponse<oauth2::basic::BasicErrorResponseType>, oauth2::StandardTokenResponse<oauth2::EmptyExtraTokenFields, oauth2::basic::BasicTokenType>, oauth2::StandardTokenIntrospectionResponse<oauth2::EmptyExtraTokenFields, oauth2::basic::BasicTokenType>, oauth2::StandardRevocableToken, oauth2::StandardErrorResponse<oauth2::RevocationErrorResponseType>, oauth2::EndpointSet, oauth2::EndpointNotSet, oauth2::EndpointNotSet, oauth2::EndpointNotSet, oauth2::EndpointSet>;

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum ClientProvider {
    Google,
    Github,
}

impl ClientProvider {
    fn key(&self) -> &'static str {
        use ClientProvider::*;
        match self {
            Google => "google",
            Github => "github",
        }
    }

    fn auth_url(&self) -> &'static str {
        use ClientProvider::*;
        match self {
            Google => "https://accounts.google.com/o/oauth2/auth",
            Github => "https://github.com/login/oauth/authorize",
        }
    }

    fn token_url(&self) -> &'static str {
        use ClientProvider::*;
        match self {
            Google => "https://oauth2.googleapis.com/token",
            Github => "https://github.com/login/oauth/access_token",
        }
    }

    pub(crate) fn userinfo_url(&self) -> &'static str {
        use ClientProvider::*;
        match self {
            Google => "https://www.googleapis.com/oauth2/v2/userinfo",
            Github => "https://api.github.com/user",
        }
    }

    pub(crate) fn scopes(&self) -> &'static [&'static str] {
        use ClientProvider::*;
        match self {
            Google => &["openid", "profile"],
            Github => &["read:user"],
        }
    }
}

impl fmt::Display for ClientProvider {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

#[derive(Clone, Default)]
pub struct Clients {
    google_client: Option<HappyClient>,
    github_client: Option<HappyClient>,
}

impl Clients {
    /// Reads OAuth client credentials from `CLIENT_SECRET_PATH` (default
    /// `client_secret.json`). A missing file means sign-in stays disabled;
    /// the rest of the app still works for signed-out viewers.
    pub fn load(public_url: &str) -> AppResult<Clients> {
        let path = dotenv::var("CLIENT_SECRET_PATH")
            .unwrap_or_else(|_| "client_secret.json".to_owned());
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(_) => {
                tracing::warn!(%path, "no oauth client secrets found, sign-in disabled");
                return Ok(Clients::default());
            }
        };

        Self::from_json(serde_json::from_str(&raw)?, public_url)
    }

    pub fn from_json(json: Value, public_url: &str) -> AppResult<Clients> {
        Ok(Clients {
            google_client: build_client(&json, ClientProvider::Google, public_url)?,
            github_client: build_client(&json, ClientProvider::Github, public_url)?,
        })
    }

    pub fn get_client(&self, provider: ClientProvider) -> AppResult<HappyClient> {
        use ClientProvider::*;
        match provider {
            Google => self.google_client.clone(),
            Github => self.github_client.clone(),
        }.ok_or(format!("OAuth provider {provider} keys not supplied").into())
    }
}

fn build_client(
    json: &Value,
    provider: ClientProvider,
    public_url: &str,
) -> AppResult<Option<HappyClient>> {
    let Some(json) = json.get(provider.key()) else {
        return Ok(None);
    };

    let auth_url = AuthUrl::new(provider.auth_url().to_owned()).unwrap();
    let token_url = TokenUrl::new(provider.token_url().to_owned()).unwrap();
    let redirect_url = RedirectUrl::new(format!("{public_url}/lockin/{provider}")).unwrap();

    Ok(Some(
        BasicClient::new(ClientId::new(json.get_str_field("client_id")?))
            .set_client_secret(ClientSecret::new(json.get_str_field("client_secret")?))
            .set_auth_uri(auth_url)
            .set_token_uri(token_url)
            .set_redirect_uri(redirect_url),
    ))
}
