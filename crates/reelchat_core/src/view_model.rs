use crate::message::Message;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub messages: Vec<MessageView>,
    pub input: String,
    pub busy: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageView {
    /// Position in the transcript; stable because the log is append-only.
    pub index: usize,
    pub message: Message,
}
