use tokio_util::sync::CancellationToken;

use crate::dispatch::WebhookDispatcher;
use crate::narration::{run_narration, EventSink};
use crate::{Delivery, DispatchError, Submission};

/// Runs the webhook dispatch and the narration side by side and waits for
/// both. A fast dispatch still sits out the remaining narration.
pub async fn run_submission(
    dispatcher: &dyn WebhookDispatcher,
    sink: &dyn EventSink,
    submission: &Submission,
    cancel: &CancellationToken,
) -> Result<Delivery, DispatchError> {
    let (result, ()) = tokio::join!(
        dispatcher.dispatch(&submission.topic, cancel),
        run_narration(submission.id, &submission.narration, sink),
    );
    result
}
