pub mod api;
pub mod completion;
pub mod decode;
pub mod error;
pub mod normalize;
pub mod prompt;
pub mod store;
pub mod types;

pub use error::{BriefingError, Result};
pub use types::*;
pub use api::{BriefingService, GenerationOutcome};
pub use completion::{CompletionClient, GroqClient, Sampling};
pub use decode::MaybeEncoded;
pub use normalize::normalize_completion;
pub use prompt::{build_prompt, Prompt, EXTRACTION_SYSTEM_PROMPT};
pub use store::{
    derive_title, display_title, BriefingStore, MemoryStore, SupabaseStore, DEFAULT_TITLE,
};
