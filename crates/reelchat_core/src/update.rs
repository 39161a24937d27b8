use crate::message::Message;
use crate::narration::narration_script;
use crate::outcome::{crash_message, final_messages};
use crate::{AppState, Effect, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::InputChanged(text) => {
            // Input is frozen while a submission is outstanding.
            if !state.is_busy() {
                state.set_input(text);
            }
            Vec::new()
        }
        Msg::Submitted => {
            if state.is_busy() || state.input().trim().is_empty() {
                return (state, Vec::new());
            }
            let topic = state.take_input();
            state.push_message(Message::user(topic.clone()));
            let submission_id = state.begin_submission();
            let narration = narration_script(&topic);
            vec![Effect::StartSubmission {
                submission_id,
                topic,
                narration,
            }]
        }
        Msg::NarrationPosted {
            submission_id,
            text,
        } => {
            if state.is_current(submission_id) {
                state.push_message(Message::bot(text));
            }
            Vec::new()
        }
        Msg::SubmissionSettled {
            submission_id,
            result,
        } => {
            if state.is_current(submission_id) {
                for message in final_messages(&result) {
                    state.push_message(message);
                }
                state.finish_submission();
            }
            Vec::new()
        }
        Msg::SubmissionCrashed {
            submission_id,
            error,
        } => {
            if state.is_current(submission_id) {
                state.push_message(crash_message(&error));
                state.finish_submission();
            }
            Vec::new()
        }
        Msg::Tick => Vec::new(),
    };

    (state, effects)
}
