use std::io;
use std::sync::mpsc;
use std::thread;

use reelchat_core::{Effect, Msg, NarrationLine, WebhookResult};
use reelchat_engine::{
    Delivery, DispatchError, DispatchSettings, EngineEvent, EngineHandle, EngineStopped,
    NarrationStep, Submission,
};
use reelchat_logging::{reel_info, reel_warn};

use super::app::AppEvent;

/// Executes core effects on the engine and feeds engine events back as [`Msg`]s.
pub struct EffectRunner {
    engine: EngineHandle,
    app_tx: mpsc::Sender<AppEvent>,
}

impl EffectRunner {
    pub fn new(settings: DispatchSettings, app_tx: mpsc::Sender<AppEvent>) -> io::Result<Self> {
        let (event_tx, event_rx) = mpsc::channel();
        let engine = EngineHandle::spawn(settings, event_tx)?;
        let forward_tx = app_tx.clone();
        thread::Builder::new()
            .name("reelchat-engine-events".to_string())
            .spawn(move || {
                for event in event_rx {
                    if forward_tx.send(AppEvent::Msg(map_event(event))).is_err() {
                        break;
                    }
                }
            })?;
        Ok(Self { engine, app_tx })
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::StartSubmission {
                    submission_id,
                    topic,
                    narration,
                } => {
                    reel_info!(
                        "StartSubmission id={} topic_len={}",
                        submission_id,
                        topic.len()
                    );
                    let started = self.engine.start_submission(Submission {
                        id: submission_id,
                        topic,
                        narration: narration.into_iter().map(map_line).collect(),
                    });
                    if let Err(stopped) = started {
                        let _ = self.app_tx.send(AppEvent::Msg(unstarted(stopped)));
                    }
                }
            }
        }
    }
}

/// A submission the engine refused still has to settle the chat.
fn unstarted(stopped: EngineStopped) -> Msg {
    reel_warn!("{}", stopped);
    Msg::SubmissionCrashed {
        submission_id: stopped.0,
        error: stopped.to_string(),
    }
}

fn map_line(line: NarrationLine) -> NarrationStep {
    NarrationStep {
        text: line.text,
        delay: line.delay,
    }
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::NarrationPosted {
            submission_id,
            text,
        } => Msg::NarrationPosted {
            submission_id,
            text,
        },
        EngineEvent::SubmissionSettled {
            submission_id,
            result,
        } => Msg::SubmissionSettled {
            submission_id,
            result: map_result(result),
        },
        EngineEvent::SubmissionCrashed {
            submission_id,
            error,
        } => Msg::SubmissionCrashed {
            submission_id,
            error,
        },
    }
}

fn map_result(result: Result<Delivery, DispatchError>) -> WebhookResult {
    match result {
        Ok(delivery) => WebhookResult::Delivered {
            status: delivery.status,
            raw: delivery.payload.to_json_string(),
            video_url: delivery.video_url,
        },
        Err(err) => {
            reel_warn!("Submission failed: {}", err);
            WebhookResult::Failed {
                error: err.to_string(),
            }
        }
    }
}
