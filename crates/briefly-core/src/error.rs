use thiserror::Error;

pub type Result<T> = std::result::Result<T, BriefingError>;

/// Every way the briefing pipeline can fail.
///
/// The surface is closed: callers match on kinds, they never parse messages.
#[derive(Debug, Error)]
pub enum BriefingError {
    /// Never expected in practice; prompt assembly is pure construction.
    #[error("Prompt construction failed: {0}")]
    PromptConstruction(String),

    #[error("Completion service rejected credentials: {0}")]
    CompletionAuth(String),

    #[error("Completion service rate limit exceeded: {0}")]
    CompletionRateLimit(String),

    #[error("Completion service unreachable: {0}")]
    CompletionNetwork(String),

    #[error("Completion service returned {status}: {body}")]
    CompletionUpstream { status: u16, body: String },

    #[error("Completion call exceeded the {0}s deadline")]
    CompletionTimeout(u64),

    /// The model ignored the pure-JSON contract. The raw text is kept for
    /// diagnostics and must never be echoed to end users.
    #[error("Completion output is not valid briefing JSON")]
    MalformedCompletion { raw: String },

    #[error("Store operation failed: {0}")]
    Persistence(String),

    #[error("Briefing not found")]
    NotFound,
}
