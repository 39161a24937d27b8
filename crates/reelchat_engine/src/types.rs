use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::payload::Payload;

pub type SubmissionId = u64;

/// One line of progress narration and the pause that follows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NarrationStep {
    pub text: String,
    pub delay: Duration,
}

/// Work for one chat submission: dispatch `topic` while narrating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub id: SubmissionId,
    pub topic: String,
    pub narration: Vec<NarrationStep>,
}

/// Successful answer from a webhook endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub endpoint: String,
    pub status: u16,
    pub payload: Payload,
    pub video_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    NarrationPosted {
        submission_id: SubmissionId,
        text: String,
    },
    SubmissionSettled {
        submission_id: SubmissionId,
        result: Result<Delivery, DispatchError>,
    },
    /// The submission task panicked or was torn down before settling.
    SubmissionCrashed {
        submission_id: SubmissionId,
        error: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("Request timeout")]
    Timeout,
    #[error("Request cancelled")]
    Cancelled,
    #[error("No webhook URLs configured")]
    NoEndpoints,
    #[error("All webhook URLs failed ({})", summarize(.0))]
    AllEndpointsFailed(Vec<EndpointFailure>),
    #[error("HTTP client setup failed: {0}")]
    ClientSetup(String),
}

/// The engine's command worker is gone, so the submission never started.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("engine stopped before submission {0} could start")]
pub struct EngineStopped(pub SubmissionId);

fn summarize(failures: &[EndpointFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Why a single endpoint was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointFailure {
    pub url: String,
    pub kind: FailureKind,
    pub message: String,
}

impl EndpointFailure {
    pub(crate) fn new(url: &str, kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            url: url.to_string(),
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for EndpointFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.url, self.kind)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Network => write!(f, "network error"),
        }
    }
}
