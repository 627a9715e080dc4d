//! Rust client for the briefly briefing service.
//!
//! Thin wrapper over the JSON API. Every call carries the caller's bearer
//! token; the server decides what that token may see.
//!
//! # Example
//! ```rust,no_run
//! use briefly_client::BrieflyClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = BrieflyClient::new("http://localhost:8080", "user-token");
//!
//!     let outcome = client
//!         .generate("Cliente: preciso de um logo até sexta, orçamento 500")
//!         .await?;
//!     println!("objetivo: {}", outcome.briefing.objetivo);
//!
//!     for briefing in client.list().await? {
//!         println!("#{}: {}", briefing.id, briefing.titulo);
//!     }
//!     Ok(())
//! }
//! ```

use anyhow::{anyhow, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use briefly_core::{BriefingRecord, StoredBriefing};

/// Wire shape of every server response.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    error: Option<String>,
}

/// Result of a generation call.
#[derive(Debug, Deserialize)]
pub struct GenerateOutcome {
    pub briefing: BriefingRecord,
    /// Whether the generated briefing was also persisted.
    pub saved: bool,
    pub save_error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SavedData {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct HealthData {
    healthy: bool,
}

/// Client for the briefly HTTP API.
pub struct BrieflyClient {
    base_url: String,
    token: String,
    client: reqwest::Client,
}

impl BrieflyClient {
    /// Creates a client for the server at `base_url`, authenticating as the
    /// owner of `token`.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Generates and saves a briefing from a conversation transcript.
    pub async fn generate(&self, conversation: &str) -> Result<GenerateOutcome> {
        let res = self
            .client
            .post(self.url("/api/briefings/generate"))
            .bearer_auth(&self.token)
            .json(&serde_json::json!({ "conversation": conversation }))
            .send()
            .await?;
        Self::unwrap_response(res).await
    }

    /// Saves an already-generated briefing. Returns the assigned id.
    pub async fn save(&self, input_text: &str, briefing_result: &BriefingRecord) -> Result<i64> {
        let res = self
            .client
            .post(self.url("/api/briefings"))
            .bearer_auth(&self.token)
            .json(&serde_json::json!({
                "input_text": input_text,
                "briefing_result": briefing_result,
            }))
            .send()
            .await?;
        let saved: SavedData = Self::unwrap_response(res).await?;
        Ok(saved.id)
    }

    /// All of the caller's briefings, most recent first.
    pub async fn list(&self) -> Result<Vec<StoredBriefing>> {
        let res = self
            .client
            .get(self.url("/api/briefings"))
            .bearer_auth(&self.token)
            .send()
            .await?;
        Self::unwrap_response(res).await
    }

    /// One briefing by id.
    pub async fn get(&self, id: i64) -> Result<StoredBriefing> {
        let res = self
            .client
            .get(self.url(&format!("/api/briefings/{}", id)))
            .bearer_auth(&self.token)
            .send()
            .await?;
        Self::unwrap_response(res).await
    }

    /// Deletes one briefing.
    pub async fn delete(&self, id: i64) -> Result<()> {
        let res = self
            .client
            .delete(self.url(&format!("/api/briefings/{}", id)))
            .bearer_auth(&self.token)
            .send()
            .await?;
        Self::unwrap_response::<serde_json::Value>(res).await?;
        Ok(())
    }

    /// Server liveness. The only call that needs no token.
    pub async fn health(&self) -> Result<bool> {
        let res = self.client.get(self.url("/health")).send().await?;
        let health: HealthData = Self::unwrap_response(res).await?;
        Ok(health.healthy)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn unwrap_response<T: DeserializeOwned>(res: reqwest::Response) -> Result<T> {
        let status = res.status();
        let body: ApiResponse<T> = res
            .json()
            .await
            .map_err(|e| anyhow!("undecodable response ({}): {}", status, e))?;

        if !body.success {
            return Err(anyhow!(
                "request failed with {}: {}",
                status,
                body.error.unwrap_or_else(|| "unknown error".to_string())
            ));
        }
        body.data
            .ok_or_else(|| anyhow!("response carried no data ({})", status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_normalized() {
        let client = BrieflyClient::new("http://localhost:8080/", "t");

        assert_eq!(client.url("/health"), "http://localhost:8080/health");
        assert_eq!(
            client.url("/api/briefings/7"),
            "http://localhost:8080/api/briefings/7"
        );
    }

    #[test]
    fn test_error_responses_surface_the_server_message() {
        let raw = r#"{"success":false,"error":"Invalid or expired token"}"#;
        let body: ApiResponse<serde_json::Value> = serde_json::from_str(raw).unwrap();

        assert!(!body.success);
        assert_eq!(body.error.as_deref(), Some("Invalid or expired token"));
        assert!(body.data.is_none());
    }

    #[test]
    fn test_generate_outcome_deserializes_without_save_error() {
        let raw = r#"{"briefing":{"objetivo":"Criar um logo"},"saved":true}"#;
        let outcome: GenerateOutcome = serde_json::from_str(raw).unwrap();

        assert!(outcome.saved);
        assert!(outcome.save_error.is_none());
        assert_eq!(outcome.briefing.objetivo, "Criar um logo");
    }
}
