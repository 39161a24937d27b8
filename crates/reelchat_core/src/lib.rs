//! Reelchat core: pure chat state machine, narration script and particle field.
mod effect;
mod message;
mod msg;
mod narration;
mod outcome;
pub mod plexus;
mod state;
mod update;
mod view_model;

pub use effect::{Effect, NarrationLine};
pub use message::{Message, MessageKind};
pub use msg::Msg;
pub use narration::narration_script;
pub use outcome::{final_messages, truncate_raw_payload, RAW_PAYLOAD_PREVIEW_CHARS, VIDEO_READY};
pub use state::{AppState, SubmissionId, WebhookResult, WELCOME_MESSAGE};
pub use update::update;
pub use view_model::{AppViewModel, MessageView};
