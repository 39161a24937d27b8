use reelchat_logging::reel_trace;

use crate::{EngineEvent, NarrationStep, SubmissionId};

pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: std::sync::mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: std::sync::mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

/// Posts each narration line, then sleeps its delay. Runs to the end of the
/// script regardless of how the dispatch is doing.
pub async fn run_narration(
    submission_id: SubmissionId,
    steps: &[NarrationStep],
    sink: &dyn EventSink,
) {
    for (index, step) in steps.iter().enumerate() {
        reel_trace!("Narration step {} for submission {}", index, submission_id);
        sink.emit(EngineEvent::NarrationPosted {
            submission_id,
            text: step.text.clone(),
        });
        tokio::time::sleep(step.delay).await;
    }
}
