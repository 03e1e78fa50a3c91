use std::fmt;
use thiserror::Error;

/// Finish/block reasons that mean the safety filters stopped the answer.
const SAFETY_BLOCK_REASONS: &[&str] = &["SAFETY", "BLOCKLIST", "PROHIBITED_CONTENT", "SPII"];

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("no API key configured for the generative service (API_KEY missing)")]
    MissingCredential,

    #[error(
        "[{status} {}] {message}{}",
        .code.as_deref().unwrap_or("UNKNOWN"),
        format_reasons(.reasons)
    )]
    Api {
        status: u16,
        code: Option<String>,
        reasons: Vec<String>,
        message: String,
    },

    #[error("Text not available. Response was blocked due to {reason}")]
    Blocked {
        reason: String,
    },

    #[error("Candidate was stopped early due to {reason}")]
    Incomplete {
        reason: String,
    },

    #[error("Error fetching from generative service: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to parse generative service response: {0}")]
    Decode(String),

    #[error("{0}")]
    Other(String),
}

fn format_reasons(reasons: &[String]) -> String {
    if reasons.is_empty() { String::new() } else { format!(" ({})", reasons.join(", ")) }
}

/// Closed set of failure kinds surfaced to callers of the relay.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    SafetyBlocked,
    Credential,
    Generic,
}

impl FailureKind {
    /// Classification of free-form error text, used when no upstream code matched.
    pub fn from_message(message: &str) -> Self {
        if message.contains("SAFETY") {
            FailureKind::SafetyBlocked
        } else if message.contains("API_KEY") {
            FailureKind::Credential
        } else {
            FailureKind::Generic
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            FailureKind::SafetyBlocked => "The question was blocked by the safety filters",
            FailureKind::Credential => "There is a problem with the API key",
            FailureKind::Generic => "Failed to generate a response",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::SafetyBlocked => "safety_blocked",
            FailureKind::Credential => "credential",
            FailureKind::Generic => "generic",
        };
        f.write_str(name)
    }
}

impl LlmError {
    pub fn kind(&self) -> FailureKind {
        match self {
            LlmError::MissingCredential => FailureKind::Credential,
            LlmError::Blocked { reason } if SAFETY_BLOCK_REASONS.contains(&reason.as_str()) => {
                FailureKind::SafetyBlocked
            }
            LlmError::Api { code, reasons, .. } if
                reasons.iter().any(|r| r.starts_with("API_KEY")) ||
                code.as_deref() == Some("UNAUTHENTICATED")
            => {
                FailureKind::Credential
            }
            other => FailureKind::from_message(&other.to_string()),
        }
    }

    pub(crate) fn is_safety_reason(reason: &str) -> bool {
        SAFETY_BLOCK_REASONS.contains(&reason)
    }
}
