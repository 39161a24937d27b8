/// Who produced a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    User,
    Bot,
    Error,
}

/// One entry of the append-only transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub text: String,
    pub kind: MessageKind,
    /// Text is raw markup and should not be escaped by the renderer.
    pub is_markup: bool,
    /// Video source to embed instead of (or next to) the text.
    pub media_src: Option<String>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self::plain(text, MessageKind::User)
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self::plain(text, MessageKind::Bot)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::plain(text, MessageKind::Error)
    }

    pub fn media(src: impl Into<String>) -> Self {
        Self {
            text: String::new(),
            kind: MessageKind::Bot,
            is_markup: false,
            media_src: Some(src.into()),
        }
    }

    fn plain(text: impl Into<String>, kind: MessageKind) -> Self {
        Self {
            text: text.into(),
            kind,
            is_markup: false,
            media_src: None,
        }
    }
}
