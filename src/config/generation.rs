use std::error::Error;
use std::fmt;
use std::fs;
use std::time::Duration;
use log::info;

use crate::cli::Args;

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

pub const DEFAULT_SYSTEM_INSTRUCTION: &str =
    "You are a finance teacher and you only talk about finance. Your answers are warm and \
     caring, and you explain things in an extremely playful way. You must not talk about \
     anything that is not finance.";

#[derive(Debug)]
pub enum ConfigError {
    InvalidTemperature(f32),
    InvalidMaxOutputTokens(u32),
    EmptySystemInstruction,
    IoError(String, std::io::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidTemperature(t) =>
                write!(f, "Temperature must be between 0.0 and 2.0, got {}", t),
            ConfigError::InvalidMaxOutputTokens(n) =>
                write!(f, "Max output tokens must be greater than zero, got {}", n),
            ConfigError::EmptySystemInstruction => write!(f, "System instruction is empty"),
            ConfigError::IoError(path, e) =>
                write!(f, "Failed to read system instruction file '{}': {}", path, e),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ConfigError::IoError(_, e) => Some(e),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SafetySetting {
    pub category: String,
    pub threshold: String,
}

/// Everything the generative service is called with besides the conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    pub model: String,
    pub base_url: String,
    pub system_instruction: String,
    pub max_output_tokens: u32,
    pub temperature: f32,
    pub safety_settings: Vec<SafetySetting>,
    pub request_timeout: Option<Duration>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            system_instruction: DEFAULT_SYSTEM_INSTRUCTION.to_string(),
            max_output_tokens: 1000,
            temperature: 0.7,
            safety_settings: vec![SafetySetting {
                category: "HARM_CATEGORY_DANGEROUS_CONTENT".to_string(),
                threshold: "BLOCK_ONLY_HIGH".to_string(),
            }],
            request_timeout: Some(Duration::from_secs(60)),
        }
    }
}

impl GenerationConfig {
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        let system_instruction = match &args.system_instruction_path {
            Some(path) => {
                info!("Loading system instruction from '{}'", path);
                fs::read_to_string(path).map_err(|e| ConfigError::IoError(path.clone(), e))?
            }
            None =>
                args.system_instruction
                    .clone()
                    .unwrap_or_else(|| DEFAULT_SYSTEM_INSTRUCTION.to_string()),
        };

        let config = Self {
            model: args.model.clone(),
            base_url: args.base_url.trim_end_matches('/').to_string(),
            system_instruction: system_instruction.trim().to_string(),
            max_output_tokens: args.max_output_tokens,
            temperature: args.temperature,
            safety_settings: vec![SafetySetting {
                category: args.safety_category.clone(),
                threshold: args.safety_threshold.clone(),
            }],
            request_timeout: match args.request_timeout_secs {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            },
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::InvalidTemperature(self.temperature));
        }
        if self.max_output_tokens == 0 {
            return Err(ConfigError::InvalidMaxOutputTokens(self.max_output_tokens));
        }
        if self.system_instruction.trim().is_empty() {
            return Err(ConfigError::EmptySystemInstruction);
        }
        Ok(())
    }
}
