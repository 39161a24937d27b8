use crate::message::Message;
use crate::view_model::{AppViewModel, MessageView};

pub type SubmissionId = u64;

pub const WELCOME_MESSAGE: &str =
    "Hi there! 👋 I'm your AI video assistant. Give me a topic, and I'll create a short video for you.";

/// Outcome of one webhook dispatch as seen by the chat state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookResult {
    /// An endpoint answered with a success status.
    Delivered {
        status: u16,
        video_url: Option<String>,
        /// JSON-stringified response payload.
        raw: String,
    },
    /// Every endpoint failed, the request timed out, or it was cancelled.
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    messages: Vec<Message>,
    input: String,
    in_flight: Option<SubmissionId>,
    next_submission_id: SubmissionId,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            messages: vec![Message::bot(WELCOME_MESSAGE)],
            input: String::new(),
            in_flight: None,
            next_submission_id: 1,
            dirty: false,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            messages: self
                .messages
                .iter()
                .enumerate()
                .map(|(index, message)| MessageView {
                    index,
                    message: message.clone(),
                })
                .collect(),
            input: self.input.clone(),
            busy: self.is_busy(),
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Returns whether a render is pending and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn set_input(&mut self, text: String) {
        if self.input != text {
            self.input = text;
            self.dirty = true;
        }
    }

    pub(crate) fn take_input(&mut self) -> String {
        self.dirty = true;
        std::mem::take(&mut self.input)
    }

    pub(crate) fn push_message(&mut self, message: Message) {
        self.messages.push(message);
        self.dirty = true;
    }

    pub(crate) fn begin_submission(&mut self) -> SubmissionId {
        let id = self.next_submission_id;
        self.next_submission_id += 1;
        self.in_flight = Some(id);
        self.dirty = true;
        id
    }

    pub(crate) fn is_current(&self, submission_id: SubmissionId) -> bool {
        self.in_flight == Some(submission_id)
    }

    pub(crate) fn finish_submission(&mut self) {
        self.in_flight = None;
        self.dirty = true;
    }
}
