//! In-process store for development and tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::decode::MaybeEncoded;
use crate::error::{BriefingError, Result};
use crate::types::{BriefingRecord, EnvelopeContent, StoredBriefing, UserContext};

use super::{decode_row, BriefingStore};

#[derive(Debug, Clone)]
struct Row {
    user_id: Uuid,
    titulo: Option<String>,
    conteudo: MaybeEncoded<EnvelopeContent>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Inner {
    next_id: i64,
    rows: HashMap<i64, Row>,
}

/// Keeps envelopes in a process-local map.
///
/// Same contract as the hosted store, including ownership filtering,
/// newest-first listing, and tolerance of string-encoded content. Rows
/// vanish when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    /// Inserts a pre-built `conteudo` value as-is, bypassing the structured
    /// write path. This is how historical row shapes (string-encoded or
    /// otherwise degenerate content) are reproduced locally.
    pub fn insert_raw(
        &self,
        user_id: Uuid,
        titulo: Option<&str>,
        conteudo: serde_json::Value,
    ) -> Result<i64> {
        let conteudo: MaybeEncoded<EnvelopeContent> = serde_json::from_value(conteudo)
            .map_err(|e| BriefingError::Persistence(e.to_string()))?;

        let mut inner = self.lock()?;
        inner.next_id += 1;
        let id = inner.next_id;
        inner.rows.insert(
            id,
            Row {
                user_id,
                titulo: titulo.map(str::to_string),
                conteudo,
                created_at: Utc::now(),
            },
        );
        Ok(id)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| BriefingError::Persistence("store lock poisoned".to_string()))
    }
}

#[async_trait]
impl BriefingStore for MemoryStore {
    async fn save(
        &self,
        ctx: &UserContext,
        titulo: &str,
        input_text: &str,
        record: &BriefingRecord,
    ) -> Result<i64> {
        let conteudo = MaybeEncoded::Decoded(EnvelopeContent {
            input_text: input_text.to_string(),
            briefing_result: MaybeEncoded::Decoded(record.clone()),
        });

        let mut inner = self.lock()?;
        inner.next_id += 1;
        let id = inner.next_id;
        inner.rows.insert(
            id,
            Row {
                user_id: ctx.user_id,
                titulo: Some(titulo.to_string()),
                conteudo,
                created_at: Utc::now(),
            },
        );
        Ok(id)
    }

    async fn load(&self, ctx: &UserContext, id: i64) -> Result<StoredBriefing> {
        let inner = self.lock()?;
        let row = inner
            .rows
            .get(&id)
            .filter(|row| row.user_id == ctx.user_id)
            .cloned()
            .ok_or(BriefingError::NotFound)?;
        drop(inner);

        Ok(decode_row(id, row.user_id, row.titulo, row.conteudo, row.created_at))
    }

    async fn list(&self, ctx: &UserContext) -> Result<Vec<StoredBriefing>> {
        let inner = self.lock()?;
        let mut rows: Vec<(i64, Row)> = inner
            .rows
            .iter()
            .filter(|(_, row)| row.user_id == ctx.user_id)
            .map(|(id, row)| (*id, row.clone()))
            .collect();
        drop(inner);

        // Newest first; id breaks ties for rows created in the same instant.
        rows.sort_by(|(a_id, a), (b_id, b)| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b_id.cmp(a_id))
        });

        Ok(rows
            .into_iter()
            .map(|(id, row)| decode_row(id, row.user_id, row.titulo, row.conteudo, row.created_at))
            .collect())
    }

    async fn delete(&self, ctx: &UserContext, id: i64) -> Result<()> {
        let mut inner = self.lock()?;
        let owned = inner
            .rows
            .get(&id)
            .map(|row| row.user_id == ctx.user_id)
            .unwrap_or(false);
        if !owned {
            return Err(BriefingError::NotFound);
        }
        inner.rows.remove(&id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn make_ctx() -> UserContext {
        UserContext::new(Uuid::now_v7())
    }

    fn make_record(objetivo: &str) -> BriefingRecord {
        BriefingRecord {
            objetivo: objetivo.to_string(),
            publico_alvo: "agências".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_save_then_load_round_trips() {
        let store = MemoryStore::default();
        let ctx = make_ctx();
        let record = make_record("Criar um logo");

        let id = store
            .save(&ctx, "Criar um logo", "conversa original", &record)
            .await
            .unwrap();
        let stored = store.load(&ctx, id).await.unwrap();

        assert_eq!(stored.id, id);
        assert_eq!(stored.user_id, ctx.user_id);
        assert_eq!(stored.titulo, "Criar um logo");
        assert_eq!(stored.input_text, "conversa original");
        assert_eq!(stored.briefing_result, record.resolve_sections());
    }

    #[tokio::test]
    async fn test_load_rejects_other_users_rows() {
        let store = MemoryStore::default();
        let owner = make_ctx();
        let intruder = make_ctx();

        let id = store
            .save(&owner, "t", "texto", &make_record("x"))
            .await
            .unwrap();

        assert!(matches!(
            store.load(&intruder, id).await,
            Err(BriefingError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_list_is_scoped_and_newest_first() {
        let store = MemoryStore::default();
        let ctx = make_ctx();
        let other = make_ctx();

        let first = store.save(&ctx, "a", "texto a", &make_record("a")).await.unwrap();
        let second = store.save(&ctx, "b", "texto b", &make_record("b")).await.unwrap();
        store.save(&other, "c", "texto c", &make_record("c")).await.unwrap();

        let listed = store.list(&ctx).await.unwrap();

        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, second);
        assert_eq!(listed[1].id, first);
    }

    #[tokio::test]
    async fn test_delete_requires_ownership() {
        let store = MemoryStore::default();
        let owner = make_ctx();
        let intruder = make_ctx();

        let id = store
            .save(&owner, "t", "texto", &make_record("x"))
            .await
            .unwrap();

        assert!(matches!(
            store.delete(&intruder, id).await,
            Err(BriefingError::NotFound)
        ));
        store.delete(&owner, id).await.unwrap();
        assert!(matches!(
            store.load(&owner, id).await,
            Err(BriefingError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_delete_missing_row_reports_not_found() {
        let store = MemoryStore::default();

        assert!(matches!(
            store.delete(&make_ctx(), 99).await,
            Err(BriefingError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_raw_rows_with_encoded_content_decode_on_read() {
        let store = MemoryStore::default();
        let ctx = make_ctx();

        let conteudo = json!({
            "input_text": "conversa antiga",
            "briefing_result": json!({ "objetivo": "Migrar o site" }).to_string()
        });
        let id = store.insert_raw(ctx.user_id, None, conteudo).unwrap();

        let stored = store.load(&ctx, id).await.unwrap();

        assert_eq!(stored.briefing_result.objetivo, "Migrar o site");
        assert_eq!(stored.titulo, "Migrar o site");
    }

    #[tokio::test]
    async fn test_blank_titled_rows_fall_back_to_default_title() {
        let store = MemoryStore::default();
        let ctx = make_ctx();

        let conteudo = json!({ "input_text": "", "briefing_result": {} });
        let id = store.insert_raw(ctx.user_id, Some(""), conteudo).unwrap();

        let stored = store.load(&ctx, id).await.unwrap();

        assert_eq!(stored.titulo, crate::store::DEFAULT_TITLE);
    }
}
