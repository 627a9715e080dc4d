//! Token verification against the identity provider.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use uuid::Uuid;

const VERIFY_TIMEOUT_SECS: u64 = 10;

/// A verified caller.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: Option<String>,
}

/// Resolves bearer tokens to users.
///
/// `Ok(None)` means the token is invalid, expired, or unknown; `Err` means
/// the provider itself could not be consulted. The two map to different
/// HTTP statuses.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn verify(&self, token: &str) -> anyhow::Result<Option<AuthUser>>;
}

/// User payload returned by the Supabase auth endpoint.
#[derive(Debug, Deserialize)]
struct GoTrueUser {
    id: Uuid,
    #[serde(default)]
    email: Option<String>,
}

/// Verifies tokens against Supabase GoTrue (`GET /auth/v1/user`).
pub struct GoTrueIdentity {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl GoTrueIdentity {
    /// `base_url` is the project root, e.g. `https://abc.supabase.co`.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(VERIFY_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        })
    }
}

#[async_trait]
impl IdentityProvider for GoTrueIdentity {
    async fn verify(&self, token: &str) -> anyhow::Result<Option<AuthUser>> {
        let url = format!("{}/auth/v1/user", self.base_url);
        let res = self
            .client
            .get(&url)
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await?;

        let status = res.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Ok(None);
        }
        if !status.is_success() {
            anyhow::bail!("identity provider returned {}", status);
        }

        let user: GoTrueUser = res.json().await?;
        Ok(Some(AuthUser {
            id: user.id,
            email: user.email,
        }))
    }
}

/// Fixed identity for the auth-disabled development mode.
///
/// Every token, including the empty one, resolves to the same user.
pub struct StaticIdentity {
    user: AuthUser,
}

impl StaticIdentity {
    pub fn new(user: AuthUser) -> Self {
        Self { user }
    }

    /// The identity every request assumes when verification is disabled.
    pub fn dev() -> Self {
        Self::new(AuthUser {
            id: Uuid::nil(),
            email: Some("dev@localhost".to_string()),
        })
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentity {
    async fn verify(&self, _token: &str) -> anyhow::Result<Option<AuthUser>> {
        Ok(Some(self.user.clone()))
    }
}
