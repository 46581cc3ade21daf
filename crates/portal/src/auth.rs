//! Account API client: email/password login, registration, email
//! verification, profile lookup and OAuth entry URLs.

use proto::PortalError;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::http::{network, read_json};

/// Default base URL of the account API.
pub const DEFAULT_AUTH_API: &str = "http://localhost:5000/api";

// ── Types ──────────────────────────────────────────────────────────────────────

/// Signed-in user profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(alias = "_id")]
    pub id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
}

impl User {
    /// Name when known, otherwise the email.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().filter(|n| !n.is_empty()).unwrap_or(&self.email)
    }
}

/// Token plus profile returned by a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

/// Registration form.
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Third-party identity providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OAuthProvider {
    Google,
    Github,
}

impl OAuthProvider {
    pub fn as_str(self) -> &'static str {
        match self {
            OAuthProvider::Google => "google",
            OAuthProvider::Github => "github",
        }
    }
}

impl std::str::FromStr for OAuthProvider {
    type Err = PortalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "google" => Ok(OAuthProvider::Google),
            "github" => Ok(OAuthProvider::Github),
            other => Err(PortalError::Validation(format!(
                "Unsupported OAuth provider: {other}"
            ))),
        }
    }
}

/// Whether an OAuth round-trip signs in or creates an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OAuthIntent {
    Login,
    Register,
}

#[derive(Deserialize)]
struct ProfileResponse {
    user: User,
}

#[derive(Deserialize)]
struct MessageResponse {
    #[serde(default)]
    message: Option<String>,
}

// ── Client ─────────────────────────────────────────────────────────────────────

pub struct AuthClient {
    client: reqwest::Client,
    base_url: String,
}

impl AuthClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_AUTH_API)
    }

    /// Creates a client targeting a custom base URL (useful for tests).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: proto::trim_base_url(base_url),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `POST /auth/login`.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, PortalError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(PortalError::Validation(
                "Please enter your email and password.".to_string(),
            ));
        }
        let url = format!("{}/auth/login", self.base_url);
        debug!(url = %url, "Logging in");
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "email": email.trim(), "password": password }))
            .send()
            .await
            .map_err(network)?;
        let login: LoginResponse =
            read_json(response, "Login failed. Please check your credentials.").await?;
        info!(user = %login.user.id, "Logged in");
        Ok(login)
    }

    /// `POST /local-auth/register`. Returns the server's confirmation text.
    pub async fn register(&self, registration: &Registration) -> Result<String, PortalError> {
        if registration.name.trim().is_empty()
            || registration.email.trim().is_empty()
            || registration.password.is_empty()
        {
            return Err(PortalError::Validation(
                "Name, email and password are required.".to_string(),
            ));
        }
        let url = format!("{}/local-auth/register", self.base_url);
        debug!(url = %url, "Registering account");
        let response = self
            .client
            .post(&url)
            .json(registration)
            .send()
            .await
            .map_err(network)?;
        let body: MessageResponse = read_json(response, "Registration failed").await?;
        Ok(body.message.unwrap_or_else(|| {
            "Registration successful! Please check your email to verify your account.".to_string()
        }))
    }

    /// `GET /local-auth/verify/{token}`.
    pub async fn verify_email(&self, token: &str) -> Result<String, PortalError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(PortalError::Validation("Invalid verification link".to_string()));
        }
        let url = format!("{}/local-auth/verify/{token}", self.base_url);
        let response = self.client.get(&url).send().await.map_err(network)?;
        let body: MessageResponse = read_json(response, "Email verification failed").await?;
        Ok(body
            .message
            .unwrap_or_else(|| "Email verified successfully!".to_string()))
    }

    /// `GET /auth/me` with a bearer token. An unauthorized answer means the
    /// token is no longer usable.
    pub async fn fetch_profile(&self, token: &str) -> Result<User, PortalError> {
        let url = format!("{}/auth/me", self.base_url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(network)?;
        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(PortalError::Unauthorized);
        }
        let profile: ProfileResponse =
            read_json(response, "Failed to fetch user profile").await?;
        Ok(profile.user)
    }

    /// Browser entry point of an OAuth flow.
    pub fn oauth_url(&self, provider: OAuthProvider, intent: OAuthIntent) -> String {
        let action = match intent {
            OAuthIntent::Login => "login",
            OAuthIntent::Register => "register",
        };
        format!("{}/auth/{action}/{}", self.base_url, provider.as_str())
    }
}

impl Default for AuthClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Pulls the token out of an OAuth success redirect (`...?token=...`) or
/// returns the input when it is already a bare token.
pub fn token_from_redirect(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    let Some((_, query)) = input.split_once('?') else {
        return Some(input.to_string());
    };
    query
        .split(['&', '#'])
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == "token")
        .map(|(_, v)| v.to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn oauth_urls_follow_intent_and_provider() {
        let client = AuthClient::with_base_url("http://accounts.local/api/");
        assert_eq!(
            client.oauth_url(OAuthProvider::Google, OAuthIntent::Login),
            "http://accounts.local/api/auth/login/google"
        );
        assert_eq!(
            client.oauth_url(OAuthProvider::Github, OAuthIntent::Register),
            "http://accounts.local/api/auth/register/github"
        );
    }

    #[test]
    fn provider_parse_rejects_unknown() {
        assert_eq!(
            OAuthProvider::from_str("GitHub").expect("parse"),
            OAuthProvider::Github
        );
        assert!(matches!(
            OAuthProvider::from_str("gitlab"),
            Err(PortalError::Validation(_))
        ));
    }

    #[test]
    fn user_accepts_mongo_style_id() {
        let user: User =
            serde_json::from_str(r#"{"_id":"u1","email":"a@b.c"}"#).expect("parse user");
        assert_eq!(user.id, "u1");
        assert_eq!(user.display_name(), "a@b.c");
    }

    #[test]
    fn token_is_extracted_from_redirect_url() {
        assert_eq!(
            token_from_redirect("http://localhost:3000/auth/success?token=abc.def&x=1").as_deref(),
            Some("abc.def")
        );
        assert_eq!(token_from_redirect("  raw-token ").as_deref(), Some("raw-token"));
        assert_eq!(token_from_redirect("http://x/auth/success?error=denied"), None);
        assert_eq!(token_from_redirect(""), None);
    }

    #[tokio::test]
    async fn blank_login_is_rejected_locally() {
        let client = AuthClient::with_base_url("http://127.0.0.1:1");
        let err = client.login(" ", "pw").await.expect_err("blank email");
        assert!(matches!(err, PortalError::Validation(_)));
    }

    #[tokio::test]
    async fn empty_verification_token_is_rejected_locally() {
        let client = AuthClient::with_base_url("http://127.0.0.1:1");
        let err = client.verify_email("").await.expect_err("empty token");
        assert_eq!(err.to_string(), "Invalid verification link");
    }
}
