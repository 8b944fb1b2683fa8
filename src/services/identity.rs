use std::future::Future;

use color_eyre::{eyre::eyre, Result};
use oauth2::{
    basic::BasicClient, reqwest::async_http_client, AuthUrl, AuthorizationCode, ClientId,
    ClientSecret, CsrfToken, RedirectUrl, Scope, TokenResponse, TokenUrl,
};
use serde::Deserialize;

use crate::db::models::UserProfile;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";
const SCOPES: &[&str] = &[
    "openid",
    "https://www.googleapis.com/auth/userinfo.email",
    "https://www.googleapis.com/auth/userinfo.profile",
];

/// Authorization-code identity provider. The protocol work is delegated; this
/// only hands back a redirect and, later, the verified profile.
#[cfg_attr(test, mockall::automock)]
pub trait IdentityProvider: Send + Sync {
    /// Returns `(authorization_url, csrf_state)`.
    fn authorize_url(&self) -> (String, String);

    fn fetch_profile(&self, code: &str) -> impl Future<Output = Result<UserProfile>> + Send;
}

#[derive(Clone, Debug)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_url: String,
}

#[derive(Deserialize)]
struct GoogleUserInfo {
    email: Option<String>,
    given_name: Option<String>,
    family_name: Option<String>,
}

#[derive(Clone)]
pub struct GoogleIdentity {
    oauth: BasicClient,
    http: reqwest::Client,
}

impl GoogleIdentity {
    pub fn new(config: GoogleConfig) -> Result<Self> {
        let oauth = BasicClient::new(
            ClientId::new(config.client_id),
            Some(ClientSecret::new(config.client_secret)),
            AuthUrl::new(GOOGLE_AUTH_URL.to_string())?,
            Some(TokenUrl::new(GOOGLE_TOKEN_URL.to_string())?),
        )
        .set_redirect_uri(RedirectUrl::new(config.redirect_url)?);

        Ok(Self {
            oauth,
            http: reqwest::Client::new(),
        })
    }
}

impl IdentityProvider for GoogleIdentity {
    fn authorize_url(&self) -> (String, String) {
        let (url, state) = SCOPES
            .iter()
            .fold(
                self.oauth.authorize_url(CsrfToken::new_random),
                |req, scope| req.add_scope(Scope::new(scope.to_string())),
            )
            .url();
        (url.to_string(), state.secret().clone())
    }

    async fn fetch_profile(&self, code: &str) -> Result<UserProfile> {
        let token = self
            .oauth
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(async_http_client)
            .await
            .map_err(|e| eyre!("token exchange failed: {e}"))?;

        let resp = self
            .http
            .get(GOOGLE_USERINFO_URL)
            .bearer_auth(token.access_token().secret())
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            color_eyre::eyre::bail!("userinfo endpoint returned {status}");
        }

        let info: GoogleUserInfo = resp.json().await?;

        Ok(UserProfile {
            email: info.email.unwrap_or_default(),
            first_name: info.given_name.unwrap_or_default(),
            last_name: info.family_name.unwrap_or_default(),
        })
    }
}
