use async_trait::async_trait;
use log::{ debug, info };
use reqwest::Client as HttpClient;
use serde::{ Deserialize, Serialize };

use super::{ GenerativeClient, LlmError };
use crate::config::generation::{ GenerationConfig, SafetySetting };
use crate::models::chat::{ Role, Turn };

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Finish reasons that mean the candidate text is not usable.
const INCOMPLETE_FINISH_REASONS: &[&str] = &["RECITATION", "LANGUAGE"];

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<GeminiContent>,
    system_instruction: GeminiContent,
    generation_config: GeminiGenerationConfig,
    safety_settings: Vec<GeminiSafetySetting<'a>>,
}

#[derive(Serialize, Deserialize, Debug)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Serialize, Deserialize, Debug)]
struct GeminiPart {
    #[serde(default)]
    text: Option<String>,
}

impl GeminiContent {
    fn text(role: &str, text: &str) -> Self {
        Self {
            role: Some(role.to_string()),
            parts: vec![GeminiPart { text: Some(text.to_string()) }],
        }
    }
}

impl From<&Turn> for GeminiContent {
    fn from(turn: &Turn) -> Self {
        GeminiContent::text(turn.role.as_str(), &turn.content)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct GeminiSafetySetting<'a> {
    category: &'a str,
    threshold: &'a str,
}

impl<'a> From<&'a SafetySetting> for GeminiSafetySetting<'a> {
    fn from(setting: &'a SafetySetting) -> Self {
        Self { category: &setting.category, threshold: &setting.threshold }
    }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Deserialize)]
struct GoogleErrorEnvelope {
    error: GoogleError,
}

#[derive(Deserialize)]
struct GoogleError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    details: Vec<GoogleErrorDetail>,
}

#[derive(Deserialize)]
struct GoogleErrorDetail {
    #[serde(default)]
    reason: Option<String>,
}

impl GenerateContentResponse {
    fn into_text(self) -> Result<String, LlmError> {
        if let Some(candidate) = self.candidates.into_iter().next() {
            if let Some(reason) = candidate.finish_reason.as_deref() {
                if LlmError::is_safety_reason(reason) {
                    return Err(LlmError::Blocked { reason: reason.to_string() });
                }
                if INCOMPLETE_FINISH_REASONS.contains(&reason) {
                    return Err(LlmError::Incomplete { reason: reason.to_string() });
                }
            }
            let text = candidate.content
                .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect::<String>())
                .unwrap_or_default();
            return Ok(text);
        }

        match self.prompt_feedback.and_then(|f| f.block_reason) {
            Some(reason) => Err(LlmError::Blocked { reason }),
            None => Ok(String::new()),
        }
    }
}

pub struct GeminiClient {
    http: HttpClient,
    api_key: Option<String>,
    config: GenerationConfig,
}

impl GeminiClient {
    pub fn new(api_key: Option<String>, config: GenerationConfig) -> Result<Self, LlmError> {
        let mut builder = HttpClient::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;
        let api_key = api_key.filter(|k| !k.trim().is_empty());

        info!(
            "Gemini client configured: model={} base_url={} timeout={:?}",
            config.model,
            config.base_url,
            config.request_timeout
        );

        Ok(Self { http, api_key, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    async fn generate_content(&self, contents: Vec<GeminiContent>) -> Result<String, LlmError> {
        let api_key = self.api_key.as_deref().ok_or(LlmError::MissingCredential)?;

        let payload = GenerateContentRequest {
            contents,
            system_instruction: GeminiContent::text("system", &self.config.system_instruction),
            generation_config: GeminiGenerationConfig {
                max_output_tokens: self.config.max_output_tokens,
                temperature: self.config.temperature,
            },
            safety_settings: self.config.safety_settings.iter().map(Into::into).collect(),
        };

        debug!("GeminiClient::generate_content() → {} ({} contents)", self.endpoint(), payload.contents.len());

        let resp = self.http
            .post(self.endpoint())
            .header(API_KEY_HEADER, api_key)
            .json(&payload)
            .send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(parse_error_body(status.as_u16(), &body));
        }

        let body = resp.text().await?;
        let data: GenerateContentResponse = serde_json
            ::from_str(&body)
            .map_err(|e| LlmError::Decode(e.to_string()))?;
        data.into_text()
    }
}

fn parse_error_body(status: u16, body: &str) -> LlmError {
    match serde_json::from_str::<GoogleErrorEnvelope>(body) {
        Ok(envelope) =>
            LlmError::Api {
                status,
                code: envelope.error.status,
                reasons: envelope.error.details
                    .into_iter()
                    .filter_map(|d| d.reason)
                    .collect(),
                message: envelope.error.message,
            },
        Err(_) =>
            LlmError::Api {
                status,
                code: None,
                reasons: Vec::new(),
                message: body.trim().to_string(),
            },
    }
}

#[async_trait]
impl GenerativeClient for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.generate_content(vec![GeminiContent::text(Role::User.as_str(), prompt)]).await
    }

    async fn chat(&self, history: &[Turn], message: &str) -> Result<String, LlmError> {
        let mut contents: Vec<GeminiContent> = history.iter().map(GeminiContent::from).collect();
        contents.push(GeminiContent::text(Role::User.as_str(), message));
        self.generate_content(contents).await
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}
