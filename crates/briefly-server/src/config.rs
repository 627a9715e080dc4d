use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;

use briefly_core::completion::DEFAULT_MODEL;

/// Server configuration, from CLI flags or environment variables.
#[derive(Parser, Debug, Clone)]
#[command(name = "briefly")]
#[command(about = "Briefing extraction API server", long_about = None)]
pub struct Config {
    /// HTTP listen address
    #[arg(long, env = "BRIEFLY_HTTP_ADDR", default_value = "0.0.0.0:8080")]
    pub http_addr: SocketAddr,

    /// Supabase project URL, e.g. https://abc.supabase.co
    #[arg(long, env = "SUPABASE_URL", default_value = "")]
    pub supabase_url: String,

    /// Supabase service key, used for the store and token verification
    #[arg(long, env = "SUPABASE_KEY", default_value = "")]
    pub supabase_key: String,

    /// Groq API key for the completion service
    #[arg(long, env = "GROQ_API_KEY", default_value = "")]
    pub groq_api_key: String,

    /// Completion model identifier
    #[arg(long, env = "BRIEFLY_COMPLETION_MODEL", default_value = DEFAULT_MODEL)]
    pub completion_model: String,

    /// Deadline for one completion call, in seconds
    #[arg(long, env = "BRIEFLY_COMPLETION_TIMEOUT_SECS", default_value = "60")]
    pub completion_timeout_secs: u64,

    /// Store backend: "supabase" or "memory" (memory is for development)
    #[arg(long, env = "BRIEFLY_STORE", default_value = "supabase")]
    pub store: String,

    /// Skip token verification and run every request as a fixed local user
    #[arg(long, env = "BRIEFLY_AUTH_DISABLED", default_value = "false")]
    pub auth_disabled: bool,
}

impl Config {
    pub fn completion_timeout(&self) -> Duration {
        Duration::from_secs(self.completion_timeout_secs)
    }

    pub fn needs_supabase(&self) -> bool {
        self.store == "supabase" || !self.auth_disabled
    }

    /// Validates the configuration before startup.
    pub fn validate(&self) -> anyhow::Result<()> {
        match self.store.as_str() {
            "supabase" | "memory" => {}
            other => anyhow::bail!(
                "Unknown store backend '{}' (expected 'supabase' or 'memory')",
                other
            ),
        }

        if self.needs_supabase() && (self.supabase_url.is_empty() || self.supabase_key.is_empty()) {
            anyhow::bail!(
                "SUPABASE_URL and SUPABASE_KEY must be set (or pick the memory store and disable auth for local development)"
            );
        }

        if self.groq_api_key.is_empty() {
            anyhow::bail!("GROQ_API_KEY must be set");
        }

        if self.completion_timeout_secs == 0 {
            anyhow::bail!("Completion timeout must be at least 1 second");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            supabase_url: String::new(),
            supabase_key: String::new(),
            groq_api_key: String::new(),
            completion_model: DEFAULT_MODEL.to_string(),
            completion_timeout_secs: 60,
            store: "supabase".to_string(),
            auth_disabled: false,
        }
    }
}
