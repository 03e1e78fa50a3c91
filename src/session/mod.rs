//! Client side of the chat: one [`ChatSession`] per open conversation.
//!
//! The session owns its history window and drives a [`ChatView`] through
//! each request. Input stays disabled while a request is in flight and is
//! re-enabled by [`InFlight`] on every exit path.

pub mod history;
pub mod relay_client;
pub mod terminal;

use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::{ Deref, DerefMut };

use crate::models::chat::Turn;
pub use self::history::{ HistoryWindow, HISTORY_LIMIT };
pub use self::relay_client::{ HttpRelayClient, RelayClient, RelayError };
pub use self::terminal::TerminalView;

pub const LOADING_MESSAGE: &str = "Thinking... 🤔";
pub const CONNECTIVITY_MESSAGE: &str =
    "Oh no! I'm having trouble connecting right now. 🔌 Please try again in a minute!";
const REJECTED_PREFIX: &str = "Oops! I had a little trouble answering: ";

static LINE_BREAK_TAG: Lazy<Regex> = Lazy::new(||
    Regex::new(r"(?i)<br\s*/?>").expect("line-break pattern is a valid regex")
);

/// Replaces `<br>`, `<br/>` and `<br />` (any case) with plain newlines.
pub fn normalize_line_breaks(text: &str) -> String {
    LINE_BREAK_TAG.replace_all(text, "\n").into_owned()
}

/// User-facing text for a failed request.
pub fn error_message(err: &RelayError) -> String {
    match err {
        RelayError::Connectivity(_) => CONNECTIVITY_MESSAGE.to_string(),
        RelayError::Rejected { message, .. } => format!("{}{}", REJECTED_PREFIX, message),
    }
}

/// Rendering surface of a chat front-end.
pub trait ChatView {
    fn show_user(&mut self, text: &str);
    fn show_loading(&mut self, text: &str);
    fn clear_loading(&mut self);
    /// `markdown` has already had its line-break tags normalized.
    fn show_answer(&mut self, markdown: &str);
    /// Rendered distinctly from normal answers.
    fn show_error(&mut self, message: &str);
    fn set_input_enabled(&mut self, enabled: bool);
}

/// Loading indicator and disabled input for the lifetime of one request.
pub struct InFlight<'a, V: ChatView> {
    view: &'a mut V,
    loading: bool,
}

impl<'a, V: ChatView> InFlight<'a, V> {
    pub fn begin(view: &'a mut V) -> Self {
        view.show_loading(LOADING_MESSAGE);
        view.set_input_enabled(false);
        Self { view, loading: true }
    }

    pub fn clear_loading(&mut self) {
        if self.loading {
            self.view.clear_loading();
            self.loading = false;
        }
    }
}

impl<V: ChatView> Deref for InFlight<'_, V> {
    type Target = V;

    fn deref(&self) -> &V {
        self.view
    }
}

impl<V: ChatView> DerefMut for InFlight<'_, V> {
    fn deref_mut(&mut self) -> &mut V {
        self.view
    }
}

impl<V: ChatView> Drop for InFlight<'_, V> {
    fn drop(&mut self) {
        self.clear_loading();
        self.view.set_input_enabled(true);
    }
}

#[derive(Debug)]
pub enum SubmitOutcome {
    /// Blank input; nothing was sent.
    Ignored,
    Answered(String),
    /// The relay succeeded but returned no text.
    NoAnswer,
    Failed(RelayError),
}

pub struct ChatSession<C: RelayClient, V: ChatView> {
    relay: C,
    view: V,
    history: HistoryWindow,
}

impl<C: RelayClient, V: ChatView> ChatSession<C, V> {
    pub fn new(relay: C, view: V) -> Self {
        Self { relay, view, history: HistoryWindow::new() }
    }

    pub fn history(&self) -> &HistoryWindow {
        &self.history
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub async fn submit_question(&mut self, text: &str) -> SubmitOutcome {
        let question = text.trim();
        if question.is_empty() {
            return SubmitOutcome::Ignored;
        }

        self.view.show_user(question);
        self.history.push(Turn::user(question));
        let snapshot = self.history.to_vec();

        let mut busy = InFlight::begin(&mut self.view);
        let result = self.relay.ask(question, &snapshot).await;
        busy.clear_loading();

        match result {
            Ok(answer) if answer.is_empty() => {
                warn!("Relay returned an empty answer");
                SubmitOutcome::NoAnswer
            }
            Ok(answer) => {
                busy.show_answer(&normalize_line_breaks(&answer));
                self.history.push(Turn::model(answer.clone()));
                SubmitOutcome::Answered(answer)
            }
            Err(err) => {
                busy.show_error(&error_message(&err));
                SubmitOutcome::Failed(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_every_line_break_spelling() {
        assert_eq!(normalize_line_breaks("a<br>b<BR/>c<br />d<Br   />e"), "a\nb\nc\nd\ne");
        assert_eq!(normalize_line_breaks("no tags"), "no tags");
    }

    #[test]
    fn leaves_other_tags_alone() {
        assert_eq!(normalize_line_breaks("<b>bold</b><br>"), "<b>bold</b>\n");
    }

    #[test]
    fn rejected_message_uses_server_text() {
        let err = RelayError::Rejected { status: 500, message: "Failed to generate a response".into() };
        assert_eq!(error_message(&err), "Oops! I had a little trouble answering: Failed to generate a response");
        assert_eq!(error_message(&RelayError::Connectivity("refused".into())), CONNECTIVITY_MESSAGE);
    }
}
