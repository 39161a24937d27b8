use std::time::Duration;

use crate::SubmissionId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Run the narration script and the webhook dispatch for `topic`
    /// concurrently, then report one settled result.
    StartSubmission {
        submission_id: SubmissionId,
        topic: String,
        narration: Vec<NarrationLine>,
    },
}

/// A narration step: post `text`, then wait `delay` before the next one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NarrationLine {
    pub text: String,
    pub delay: Duration,
}
