#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User edited the topic input.
    InputChanged(String),
    /// User submitted the current input.
    Submitted,
    /// Engine posted a narration line for a submission.
    NarrationPosted {
        submission_id: crate::SubmissionId,
        text: String,
    },
    /// Narration and webhook dispatch have both finished.
    SubmissionSettled {
        submission_id: crate::SubmissionId,
        result: crate::WebhookResult,
    },
    /// The submission task died before it could settle.
    SubmissionCrashed {
        submission_id: crate::SubmissionId,
        error: String,
    },
    /// UI/render tick to coalesce rendering.
    Tick,
}
