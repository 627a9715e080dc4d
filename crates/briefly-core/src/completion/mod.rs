//! Completion service seam.

mod groq;

pub use groq::{GroqClient, DEFAULT_MODEL};

use async_trait::async_trait;

use crate::error::Result;
use crate::prompt::Prompt;

/// Sampling parameters for one completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct Sampling {
    pub temperature: f64,
    pub max_tokens: u32,
    pub top_p: f64,
}

impl Default for Sampling {
    /// Extraction defaults: moderate randomness, bounded output length.
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 2000,
            top_p: 1.0,
        }
    }
}

/// One non-streaming completion call against an external text-generation
/// service.
///
/// Implementations surface failures immediately; retry policy belongs to the
/// caller. One request maps to exactly one upstream call.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Sends the prompt and returns the completion text in full.
    async fn complete(&self, prompt: &Prompt, sampling: &Sampling) -> Result<String>;
}
