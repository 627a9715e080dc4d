//! Hosted store adapter speaking PostgREST.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decode::MaybeEncoded;
use crate::error::{BriefingError, Result};
use crate::types::{BriefingRecord, EnvelopeContent, StoredBriefing, UserContext};

use super::{decode_row, BriefingStore};

const TABLE: &str = "briefings";
const STORE_TIMEOUT_SECS: u64 = 30;

/// Row shape returned by the briefings table.
#[derive(Debug, Deserialize)]
struct BriefingRow {
    id: i64,
    user_id: Uuid,
    #[serde(default)]
    titulo: Option<String>,
    conteudo: MaybeEncoded<EnvelopeContent>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct InsertRow {
    user_id: Uuid,
    titulo: String,
    conteudo: EnvelopeContent,
}

/// PostgREST-backed store for the hosted briefings table.
///
/// The table carries a row-level ownership policy keyed on `user_id`; the
/// explicit filters here are the application-layer check in front of it.
/// New rows always get structured `conteudo`; reads stay tolerant of the
/// string-encoded shapes older revisions wrote.
pub struct SupabaseStore {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl SupabaseStore {
    /// `base_url` is the project root, e.g. `https://abc.supabase.co`.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(STORE_TIMEOUT_SECS))
            .build()
            .map_err(|e| BriefingError::Persistence(e.to_string()))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        })
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, TABLE)
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    async fn fetch_rows(&self, url: &str) -> Result<Vec<BriefingRow>> {
        let res = self
            .request(reqwest::Method::GET, url)
            .send()
            .await
            .map_err(|e| BriefingError::Persistence(e.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(BriefingError::Persistence(format!(
                "select failed with {}: {}",
                status, body
            )));
        }

        res.json()
            .await
            .map_err(|e| BriefingError::Persistence(e.to_string()))
    }

    /// Ownership check used before deletes. Selects only the id column.
    async fn row_exists(&self, ctx: &UserContext, id: i64) -> Result<bool> {
        let url = format!(
            "{}?id=eq.{}&user_id=eq.{}&select=id",
            self.table_url(),
            id,
            ctx.user_id
        );

        let res = self
            .request(reqwest::Method::GET, &url)
            .send()
            .await
            .map_err(|e| BriefingError::Persistence(e.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(BriefingError::Persistence(format!(
                "ownership check failed with {}: {}",
                status, body
            )));
        }

        let rows: Vec<serde_json::Value> = res
            .json()
            .await
            .map_err(|e| BriefingError::Persistence(e.to_string()))?;
        Ok(!rows.is_empty())
    }
}

#[async_trait]
impl BriefingStore for SupabaseStore {
    async fn save(
        &self,
        ctx: &UserContext,
        titulo: &str,
        input_text: &str,
        record: &BriefingRecord,
    ) -> Result<i64> {
        let row = InsertRow {
            user_id: ctx.user_id,
            titulo: titulo.to_string(),
            conteudo: EnvelopeContent {
                input_text: input_text.to_string(),
                briefing_result: MaybeEncoded::Decoded(record.clone()),
            },
        };

        let res = self
            .request(reqwest::Method::POST, &self.table_url())
            .header("Prefer", "return=representation")
            .json(&row)
            .send()
            .await
            .map_err(|e| BriefingError::Persistence(e.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(BriefingError::Persistence(format!(
                "insert failed with {}: {}",
                status, body
            )));
        }

        let rows: Vec<BriefingRow> = res
            .json()
            .await
            .map_err(|e| BriefingError::Persistence(e.to_string()))?;
        rows.first()
            .map(|r| r.id)
            .ok_or_else(|| BriefingError::Persistence("insert returned no rows".to_string()))
    }

    async fn load(&self, ctx: &UserContext, id: i64) -> Result<StoredBriefing> {
        let url = format!(
            "{}?id=eq.{}&user_id=eq.{}",
            self.table_url(),
            id,
            ctx.user_id
        );

        let row = self
            .fetch_rows(&url)
            .await?
            .into_iter()
            .next()
            .ok_or(BriefingError::NotFound)?;

        Ok(decode_row(
            row.id,
            row.user_id,
            row.titulo,
            row.conteudo,
            row.created_at,
        ))
    }

    async fn list(&self, ctx: &UserContext) -> Result<Vec<StoredBriefing>> {
        let url = format!(
            "{}?user_id=eq.{}&order=created_at.desc",
            self.table_url(),
            ctx.user_id
        );

        let rows = self.fetch_rows(&url).await?;
        Ok(rows
            .into_iter()
            .map(|row| decode_row(row.id, row.user_id, row.titulo, row.conteudo, row.created_at))
            .collect())
    }

    async fn delete(&self, ctx: &UserContext, id: i64) -> Result<()> {
        // A filtered DELETE reports success even when nothing matched, so
        // ownership has to be established first.
        if !self.row_exists(ctx, id).await? {
            return Err(BriefingError::NotFound);
        }

        let url = format!(
            "{}?id=eq.{}&user_id=eq.{}",
            self.table_url(),
            id,
            ctx.user_id
        );

        let res = self
            .request(reqwest::Method::DELETE, &url)
            .send()
            .await
            .map_err(|e| BriefingError::Persistence(e.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(BriefingError::Persistence(format!(
                "delete failed with {}: {}",
                status, body
            )));
        }
        Ok(())
    }
}
