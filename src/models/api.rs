use serde::{ Deserialize, Serialize };
use serde_json::Value as JsonValue;

use super::chat::Turn;

/// Body of `POST /api/ask` as it arrives, before validation.
#[derive(Debug, Default)]
pub struct AskPayload {
    pub question: Option<JsonValue>,
    pub history: Option<JsonValue>,
}

#[derive(Debug)]
pub enum HistoryField {
    Absent,
    Valid(Vec<Turn>),
    Invalid(String),
}

impl AskPayload {
    /// Only a JSON object carries fields; any other body has neither question nor history.
    pub fn from_value(body: JsonValue) -> Self {
        match body {
            JsonValue::Object(mut fields) =>
                Self {
                    question: fields.remove("question"),
                    history: fields.remove("history"),
                },
            _ => Self::default(),
        }
    }

    /// The question, when it is a non-empty string.
    pub fn question(&self) -> Option<&str> {
        match &self.question {
            Some(JsonValue::String(q)) if !q.is_empty() => Some(q.as_str()),
            _ => None,
        }
    }

    pub fn history(&self) -> HistoryField {
        match &self.history {
            None | Some(JsonValue::Null) => HistoryField::Absent,
            Some(value @ JsonValue::Array(_)) => {
                match serde_json::from_value::<Vec<Turn>>(value.clone()) {
                    Ok(turns) => HistoryField::Valid(turns),
                    Err(e) => HistoryField::Invalid(e.to_string()),
                }
            }
            Some(_) => HistoryField::Invalid("history is not an array".to_string()),
        }
    }
}

/// A validated question, ready to be relayed.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AskRequest {
    pub question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<Turn>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AskResponse {
    #[serde(default)]
    pub answer: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ErrorResponse {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}
