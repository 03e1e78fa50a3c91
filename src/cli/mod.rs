use clap::Parser;
use url::Url;

use crate::config::generation::{ DEFAULT_BASE_URL, DEFAULT_MODEL };

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Relay between a chat front-end and a generative-text service", long_about = None)]
pub struct Args {
    // --- Server Args ---
    /// Host address for the relay to listen on.
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port for the relay to listen on.
    #[arg(long, env = "PORT", default_value = "3000")]
    pub port: u16,

    /// Maximum `/api/ask` requests per second across all clients. 0 disables the limit.
    #[arg(long, env = "RATE_LIMIT_PER_SECOND", default_value = "0")]
    pub rate_limit_per_second: u32,

    // --- Generative Service Args ---
    /// API key for the generative-text service.
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Model name (e.g., gemini-1.5-flash, gemini-1.5-pro)
    #[arg(long, env = "GEMINI_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Base URL of the generative-text API.
    #[arg(long, env = "GEMINI_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Persona / system instruction sent with every request. Defaults to the built-in finance teacher.
    #[arg(long, env = "SYSTEM_INSTRUCTION")]
    pub system_instruction: Option<String>,

    /// Path to a text file holding the system instruction. Takes precedence over --system-instruction.
    #[arg(long, env = "SYSTEM_INSTRUCTION_PATH")]
    pub system_instruction_path: Option<String>,

    /// Output length cap, in tokens.
    #[arg(long, env = "MAX_OUTPUT_TOKENS", default_value = "1000")]
    pub max_output_tokens: u32,

    /// Sampling temperature (0.0 to 2.0).
    #[arg(long, env = "TEMPERATURE", default_value = "0.7")]
    pub temperature: f32,

    /// Harm category the safety threshold applies to.
    #[arg(long, env = "SAFETY_CATEGORY", default_value = "HARM_CATEGORY_DANGEROUS_CONTENT")]
    pub safety_category: String,

    /// Content-safety filter threshold (BLOCK_NONE, BLOCK_ONLY_HIGH, BLOCK_MEDIUM_AND_ABOVE, BLOCK_LOW_AND_ABOVE)
    #[arg(long, env = "SAFETY_THRESHOLD", default_value = "BLOCK_ONLY_HIGH")]
    pub safety_threshold: String,

    /// Timeout for each call to the generative service, in seconds. 0 means no timeout.
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value = "60")]
    pub request_timeout_secs: u64,

    // --- General App Args ---
    /// Enable debug logging/output
    #[arg(long, env = "DEBUG", default_value = "false")]
    pub debug: bool,

    /// Optional path to the TLS certificate file (PEM format). Requires --tls-key-path.
    #[arg(long, env = "TLS_CERT_PATH")]
    pub tls_cert_path: Option<String>,

    /// Optional path to the TLS private key file (PEM format). Requires --tls-cert-path.
    #[arg(long, env = "TLS_KEY_PATH")]
    pub tls_key_path: Option<String>,

    #[arg(long, env = "ENABLE_TLS", default_value = "false")]
    pub enable_tls: bool,
}

impl Args {
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The configured key, if it is not blank.
    pub fn api_key(&self) -> Option<String> {
        self.api_key.clone().filter(|k| !k.trim().is_empty())
    }
}

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Terminal chat front-end for the ask relay", long_about = None)]
pub struct ChatArgs {
    /// Full URL of the relay's ask endpoint.
    #[arg(long, env = "RELAY_URL", default_value = "http://127.0.0.1:3000/api/ask")]
    pub relay_url: Url,

    /// Enable debug logging/output
    #[arg(long, env = "DEBUG", default_value = "false")]
    pub debug: bool,
}
