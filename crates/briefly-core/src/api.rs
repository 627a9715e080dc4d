//! High-level briefing pipeline.

use std::sync::Arc;

use crate::completion::{CompletionClient, Sampling};
use crate::error::{BriefingError, Result};
use crate::normalize::normalize_completion;
use crate::prompt::build_prompt;
use crate::store::{derive_title, BriefingStore};
use crate::types::{BriefingRecord, StoredBriefing, UserContext};

/// Outcome of one generation request.
///
/// Generation and persistence succeed or fail independently: a failed save
/// still hands the record back so the model's work is not lost.
#[derive(Debug)]
pub struct GenerationOutcome {
    /// The extracted record. `id` is filled in when the save went through.
    pub record: BriefingRecord,
    /// The save failure, when there was one.
    pub save_error: Option<BriefingError>,
}

/// Orchestrates prompt construction, the completion call, normalization,
/// and the storage round-trip. One conversation in, one briefing out.
///
/// # Example
/// ```rust,no_run
/// use std::sync::Arc;
/// use std::time::Duration;
/// use briefly_core::{BriefingService, GroqClient, MemoryStore, UserContext};
/// use briefly_core::completion::DEFAULT_MODEL;
///
/// # async fn run() -> briefly_core::Result<()> {
/// let completion = Arc::new(GroqClient::new(
///     "groq-api-key",
///     DEFAULT_MODEL,
///     Duration::from_secs(60),
/// )?);
/// let store = Arc::new(MemoryStore::default());
/// let service = BriefingService::new(completion, store);
///
/// let ctx = UserContext::new(uuid::Uuid::now_v7());
/// let outcome = service
///     .generate(&ctx, "Cliente: preciso de um logo até sexta, orçamento 500")
///     .await?;
/// println!("objetivo: {}", outcome.record.objetivo);
/// # Ok(())
/// # }
/// ```
pub struct BriefingService {
    completion: Arc<dyn CompletionClient>,
    store: Arc<dyn BriefingStore>,
    sampling: Sampling,
}

impl BriefingService {
    pub fn new(completion: Arc<dyn CompletionClient>, store: Arc<dyn BriefingStore>) -> Self {
        Self {
            completion,
            store,
            sampling: Sampling::default(),
        }
    }

    /// Runs the full pipeline for one conversation transcript.
    ///
    /// Completion and normalization failures fail the whole call. A save
    /// failure does not; see [`GenerationOutcome`].
    pub async fn generate(
        &self,
        ctx: &UserContext,
        conversation: &str,
    ) -> Result<GenerationOutcome> {
        let prompt = build_prompt(conversation);
        let raw = self.completion.complete(&prompt, &self.sampling).await?;
        let mut record = normalize_completion(&raw, conversation)?;

        let titulo = derive_title(&record, conversation);
        match self.store.save(ctx, &titulo, conversation, &record).await {
            Ok(id) => {
                record.id = Some(id);
                Ok(GenerationOutcome {
                    record,
                    save_error: None,
                })
            }
            Err(e) => {
                log::warn!("Generated briefing could not be saved: {}", e);
                Ok(GenerationOutcome {
                    record,
                    save_error: Some(e),
                })
            }
        }
    }

    /// Persists a record that was generated earlier, deriving the title the
    /// same way the generation path does.
    pub async fn save_raw(
        &self,
        ctx: &UserContext,
        input_text: &str,
        record: &BriefingRecord,
    ) -> Result<i64> {
        let titulo = derive_title(record, input_text);
        self.store.save(ctx, &titulo, input_text, record).await
    }

    /// The caller's briefings, most recent first.
    pub async fn list(&self, ctx: &UserContext) -> Result<Vec<StoredBriefing>> {
        self.store.list(ctx).await
    }

    /// One briefing by id.
    pub async fn load(&self, ctx: &UserContext, id: i64) -> Result<StoredBriefing> {
        self.store.load(ctx, id).await
    }

    /// Deletes one briefing.
    pub async fn delete(&self, ctx: &UserContext, id: i64) -> Result<()> {
        self.store.delete(ctx, id).await
    }
}
