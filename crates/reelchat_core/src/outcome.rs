use crate::message::Message;
use crate::WebhookResult;

/// Characters of the raw payload kept in the degraded-success message.
pub const RAW_PAYLOAD_PREVIEW_CHARS: usize = 500;

pub const VIDEO_READY: &str = "🎉 Your video is ready!";

/// Maps a settled webhook result to the transcript entries that close a submission.
pub fn final_messages(result: &WebhookResult) -> Vec<Message> {
    match result {
        WebhookResult::Delivered {
            video_url: Some(url),
            ..
        } => vec![Message::bot(VIDEO_READY), Message::media(url.clone())],
        WebhookResult::Delivered {
            video_url: None,
            raw,
            ..
        } => vec![Message::error(format!(
            "Video processing completed, but couldn't extract the video URL. Raw response: {}",
            truncate_raw_payload(raw)
        ))],
        WebhookResult::Failed { error } => {
            let detail = if error.is_empty() {
                "Unknown error"
            } else {
                error.as_str()
            };
            vec![Message::error(format!(
                "Sorry, there was an issue generating your video: {detail}"
            ))]
        }
    }
}

pub fn crash_message(error: &str) -> Message {
    Message::error(format!("An unexpected error occurred: {error}"))
}

/// Keeps the first [`RAW_PAYLOAD_PREVIEW_CHARS`] characters (not bytes).
pub fn truncate_raw_payload(raw: &str) -> &str {
    match raw.char_indices().nth(RAW_PAYLOAD_PREVIEW_CHARS) {
        Some((end, _)) => &raw[..end],
        None => raw,
    }
}
