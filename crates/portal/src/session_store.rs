//! Signed-in state persisted between runs, backed by `~/.genai/session.toml`.

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::auth::{LoginResponse, User};

/// Bearer token and profile of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub token: String,
    pub saved_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

impl AuthSession {
    pub fn new(token: impl Into<String>, user: Option<User>) -> Self {
        Self {
            token: token.into(),
            saved_at: Utc::now(),
            user,
        }
    }
}

impl From<LoginResponse> for AuthSession {
    fn from(login: LoginResponse) -> Self {
        Self::new(login.token, Some(login.user))
    }
}

/// File holding at most one [`AuthSession`].
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `{dir}/session.toml`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join("session.toml"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the stored session. Missing or unreadable files mean signed out.
    pub fn load(&self) -> Option<AuthSession> {
        trace!(path = %self.path.display(), exists = %self.path.exists(), "Loading auth session");
        if !self.path.exists() {
            return None;
        }
        std::fs::read_to_string(&self.path)
            .ok()
            .and_then(|s| toml::from_str::<AuthSession>(&s).ok())
            .filter(|s| !s.token.is_empty())
    }

    /// Persists `session`, creating parent directories as needed.
    pub fn save(&self, session: &AuthSession) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string(session).context("failed to serialize auth session")?;
        std::fs::write(&self.path, content)?;
        debug!(path = %self.path.display(), "Auth session saved");
        Ok(())
    }

    /// Removes the stored session. Returns `true` if one existed.
    pub fn clear(&self) -> anyhow::Result<bool> {
        if !self.path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(&self.path)
            .with_context(|| format!("failed to remove {}", self.path.display()))?;
        Ok(true)
    }
}
