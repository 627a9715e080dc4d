//! User-scoped persistence for briefing envelopes.

mod memory;
mod supabase;

pub use memory::MemoryStore;
pub use supabase::SupabaseStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::decode::MaybeEncoded;
use crate::error::Result;
use crate::types::{BriefingRecord, EnvelopeContent, StoredBriefing, UserContext};

/// Display title when neither the stored title nor the extraction goal is
/// usable.
pub const DEFAULT_TITLE: &str = "Novo Briefing";

/// Characters of input text used for a derived title.
const TITLE_PREFIX_CHARS: usize = 50;

/// Persistence contract for briefing envelopes.
///
/// Every operation is scoped to the calling user. A row owned by someone
/// else is indistinguishable from a missing one.
#[async_trait]
pub trait BriefingStore: Send + Sync {
    /// Inserts a new envelope and returns the assigned row id.
    async fn save(
        &self,
        ctx: &UserContext,
        titulo: &str,
        input_text: &str,
        record: &BriefingRecord,
    ) -> Result<i64>;

    /// Fetches one envelope by id, decoded for presentation.
    async fn load(&self, ctx: &UserContext, id: i64) -> Result<StoredBriefing>;

    /// All of the user's envelopes, most recent first.
    async fn list(&self, ctx: &UserContext) -> Result<Vec<StoredBriefing>>;

    /// Deletes one envelope after re-verifying ownership.
    async fn delete(&self, ctx: &UserContext, id: i64) -> Result<()>;
}

/// Title for a new envelope: the extraction goal verbatim when present,
/// otherwise the start of the input text. Applied identically at every
/// write site.
pub fn derive_title(record: &BriefingRecord, input_text: &str) -> String {
    if !record.objetivo.trim().is_empty() {
        return record.objetivo.clone();
    }
    truncate_chars(input_text, TITLE_PREFIX_CHARS)
}

/// Display title fallback chain, recomputed on every read so older rows
/// with blank titles still render. Total: never yields a blank string.
pub fn display_title(stored: Option<&str>, record: &BriefingRecord) -> String {
    if let Some(titulo) = stored {
        if !titulo.trim().is_empty() {
            return titulo.to_string();
        }
    }
    if !record.objetivo.trim().is_empty() {
        return record.objetivo.clone();
    }
    DEFAULT_TITLE.to_string()
}

// Truncation counts characters, not bytes, so multi-byte input cannot split
// a code point.
fn truncate_chars(text: &str, limit: usize) -> String {
    if text.chars().count() > limit {
        let prefix: String = text.chars().take(limit).collect();
        format!("{}...", prefix)
    } else {
        text.to_string()
    }
}

/// Decodes one stored row into the presentation shape shared by both
/// backends: defensive decode of `conteudo` and the nested
/// `briefing_result`, then the display title chain.
fn decode_row(
    id: i64,
    user_id: Uuid,
    titulo: Option<String>,
    conteudo: MaybeEncoded<EnvelopeContent>,
    created_at: DateTime<Utc>,
) -> StoredBriefing {
    let content = conteudo.resolve("conteudo");
    let record = content
        .briefing_result
        .resolve("briefing_result")
        .resolve_sections();
    let titulo = display_title(titulo.as_deref(), &record);

    StoredBriefing {
        id,
        user_id,
        titulo,
        input_text: content.input_text,
        briefing_result: record,
        created_at,
    }
}
