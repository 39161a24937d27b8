//! Reelchat engine: webhook dispatch, response decoding and submission runtime.
mod dispatch;
mod engine;
mod extract;
mod narration;
mod payload;
mod submission;
mod types;

pub use dispatch::{Clock, DispatchSettings, ReqwestDispatcher, WebhookDispatcher};
pub use engine::EngineHandle;
pub use extract::extract_video_url;
pub use narration::{run_narration, ChannelEventSink, EventSink};
pub use payload::{decode_payload, Payload, WebhookRequest};
pub use submission::run_submission;
pub use types::{
    Delivery, DispatchError, EndpointFailure, EngineEvent, EngineStopped, FailureKind, NarrationStep,
    Submission, SubmissionId,
};
