use pretty_assertions::assert_eq;
use reelchat_core::{
    update, AppState, Effect, Message, MessageKind, Msg, WebhookResult, VIDEO_READY,
};

fn submitted(topic: &str) -> AppState {
    let (state, _) = update(AppState::new(), Msg::InputChanged(topic.to_string()));
    let (state, effects) = update(state, Msg::Submitted);
    assert_eq!(effects.len(), 1);
    state
}

fn settle(state: AppState, result: WebhookResult) -> AppState {
    let (state, effects) = update(
        state,
        Msg::SubmissionSettled {
            submission_id: 1,
            result,
        },
    );
    assert!(effects.is_empty());
    state
}

#[test]
fn narration_lines_are_appended_in_arrival_order() {
    let state = submitted("tides");
    let (state, _) = update(
        state,
        Msg::NarrationPosted {
            submission_id: 1,
            text: "one".to_string(),
        },
    );
    let (state, _) = update(
        state,
        Msg::NarrationPosted {
            submission_id: 1,
            text: "two".to_string(),
        },
    );
    let texts: Vec<_> = state.messages()[2..].iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, vec!["one", "two"]);
    assert!(state.is_busy());
}

#[test]
fn delivered_video_appends_ready_and_media() {
    let state = settle(
        submitted("tides"),
        WebhookResult::Delivered {
            status: 200,
            video_url: Some("https://x/a.mp4".to_string()),
            raw: "{}".to_string(),
        },
    );

    assert!(!state.is_busy());
    assert_eq!(
        &state.messages()[2..],
        &[Message::bot(VIDEO_READY), Message::media("https://x/a.mp4")]
    );
    assert_eq!(state.messages()[3].media_src.as_deref(), Some("https://x/a.mp4"));
}

#[test]
fn delivered_without_url_shows_truncated_raw_payload() {
    let raw = format!("{{\"note\":\"{}\"}}", "z".repeat(800));
    let state = settle(
        submitted("tides"),
        WebhookResult::Delivered {
            status: 200,
            video_url: None,
            raw: raw.clone(),
        },
    );

    assert!(!state.is_busy());
    let last = state.messages().last().unwrap();
    assert_eq!(last.kind, MessageKind::Error);
    let expected = format!(
        "Video processing completed, but couldn't extract the video URL. Raw response: {}",
        &raw[..500]
    );
    assert_eq!(last.text, expected);
}

#[test]
fn failure_appends_error_and_clears_busy() {
    let state = settle(
        submitted("tides"),
        WebhookResult::Failed {
            error: "All webhook URLs failed".to_string(),
        },
    );

    assert!(!state.is_busy());
    assert_eq!(
        state.messages().last().unwrap(),
        &Message::error("Sorry, there was an issue generating your video: All webhook URLs failed")
    );
}

#[test]
fn crash_appends_generic_error_and_clears_busy() {
    let (state, _) = update(
        submitted("tides"),
        Msg::SubmissionCrashed {
            submission_id: 1,
            error: "task panicked".to_string(),
        },
    );
    assert!(!state.is_busy());
    assert_eq!(
        state.messages().last().unwrap(),
        &Message::error("An unexpected error occurred: task panicked")
    );
}

#[test]
fn stale_events_are_ignored() {
    let state = submitted("tides");
    let before = state.clone();

    let (state, _) = update(
        state,
        Msg::NarrationPosted {
            submission_id: 7,
            text: "late".to_string(),
        },
    );
    let (state, effects) = update(
        state,
        Msg::SubmissionSettled {
            submission_id: 7,
            result: WebhookResult::Failed {
                error: "x".to_string(),
            },
        },
    );

    assert_eq!(state, before);
    assert!(effects.is_empty());
}

#[test]
fn form_is_usable_again_after_settling() {
    let state = settle(
        submitted("tides"),
        WebhookResult::Failed {
            error: "Request timeout".to_string(),
        },
    );
    let (state, _) = update(state, Msg::InputChanged("again".to_string()));
    let (state, effects) = update(state, Msg::Submitted);
    assert!(state.is_busy());
    assert!(matches!(
        effects.as_slice(),
        [Effect::StartSubmission { submission_id: 2, .. }]
    ));
}
