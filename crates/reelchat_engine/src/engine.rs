use std::io;
use std::sync::{mpsc, Arc};
use std::thread;

use reelchat_logging::{reel_debug, reel_error, reel_info};
use tokio_util::sync::CancellationToken;

use crate::dispatch::{DispatchSettings, ReqwestDispatcher, WebhookDispatcher};
use crate::narration::ChannelEventSink;
use crate::submission::run_submission;
use crate::{EngineEvent, EngineStopped, Submission};

enum EngineCommand {
    Start(Submission),
}

/// Owns the async runtime on a background thread. Dropping the handle stops
/// the worker and cancels outstanding dispatches.
pub struct EngineHandle {
    cmd_tx: Option<mpsc::Sender<EngineCommand>>,
    shutdown: CancellationToken,
    worker: Option<thread::JoinHandle<()>>,
}

impl EngineHandle {
    pub fn spawn(settings: DispatchSettings, event_tx: mpsc::Sender<EngineEvent>) -> io::Result<Self> {
        Self::with_dispatcher(Arc::new(ReqwestDispatcher::new(settings)), event_tx)
    }

    pub fn with_dispatcher(
        dispatcher: Arc<dyn WebhookDispatcher>,
        event_tx: mpsc::Sender<EngineEvent>,
    ) -> io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("reelchat-engine")
            .enable_all()
            .build()?;
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let shutdown = CancellationToken::new();
        let worker_shutdown = shutdown.clone();

        let worker = thread::Builder::new()
            .name("reelchat-engine-commands".to_string())
            .spawn(move || {
                while let Ok(command) = cmd_rx.recv() {
                    match command {
                        EngineCommand::Start(submission) => spawn_submission(
                            &runtime,
                            dispatcher.clone(),
                            submission,
                            event_tx.clone(),
                            worker_shutdown.child_token(),
                        ),
                    }
                }
                reel_debug!("Engine command channel closed; shutting down runtime");
            })?;

        Ok(Self {
            cmd_tx: Some(cmd_tx),
            shutdown,
            worker: Some(worker),
        })
    }

    pub fn start_submission(&self, submission: Submission) -> Result<(), EngineStopped> {
        let id = submission.id;
        reel_info!(
            "Starting submission {} ({} narration steps)",
            id,
            submission.narration.len()
        );
        let tx = self.cmd_tx.as_ref().ok_or(EngineStopped(id))?;
        tx.send(EngineCommand::Start(submission)).map_err(|_| {
            reel_error!("Engine worker is gone; dropping submission {}", id);
            EngineStopped(id)
        })
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.shutdown.cancel();
        self.cmd_tx.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn spawn_submission(
    runtime: &tokio::runtime::Runtime,
    dispatcher: Arc<dyn WebhookDispatcher>,
    submission: Submission,
    event_tx: mpsc::Sender<EngineEvent>,
    cancel: CancellationToken,
) {
    let submission_id = submission.id;
    let sink = ChannelEventSink::new(event_tx.clone());
    let job = runtime.spawn(async move {
        run_submission(dispatcher.as_ref(), &sink, &submission, &cancel).await
    });

    // Supervisor: whatever happens to the job, exactly one terminal event is sent.
    runtime.spawn(async move {
        let event = match job.await {
            Ok(result) => EngineEvent::SubmissionSettled {
                submission_id,
                result,
            },
            Err(err) => {
                reel_error!("Submission {} task failed: {}", submission_id, err);
                EngineEvent::SubmissionCrashed {
                    submission_id,
                    error: err.to_string(),
                }
            }
        };
        let _ = event_tx.send(event);
    });
}
