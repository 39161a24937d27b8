use std::sync::LazyLock;

use regex::Regex;
use reelchat_logging::reel_debug;
use serde_json::Value;

use crate::payload::Payload;

type ExtractFn = fn(&Payload) -> Option<String>;

/// Tried in order; the first extractor that yields a URL wins.
/// New response shapes are supported by adding an entry here.
const EXTRACTORS: &[(&str, ExtractFn)] = &[
    ("publicUrl", top_level_public_url),
    ("url", top_level_url),
    ("response.publicUrl", nested_public_url),
    ("response.url", nested_url),
    ("videoBase64", base64_video),
    ("azure blob", azure_blob_url),
    ("video file", video_file_url),
];

static AZURE_BLOB: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)https://[^"\s]*\.blob\.core\.windows\.net/[^"\s]*"#)
        .expect("azure blob pattern is valid")
});

static VIDEO_FILE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)https?://[^\s)"']+\.(?:mp4|mov|m3u8)[^\s)"']*"#)
        .expect("video file pattern is valid")
});

/// Best-effort video URL lookup; `None` means the payload carried no usable URL.
pub fn extract_video_url(payload: &Payload) -> Option<String> {
    EXTRACTORS.iter().find_map(|(name, extract)| {
        let url = extract(payload)?;
        reel_debug!("Video URL found by extractor '{}'", name);
        Some(url)
    })
}

fn non_empty_str<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
}

fn top_level(payload: &Payload, key: &str) -> Option<String> {
    let object = payload.as_object()?;
    object
        .get(key)
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
        .map(ToOwned::to_owned)
}

fn nested(payload: &Payload, key: &str) -> Option<String> {
    let response = payload.as_object()?.get("response")?;
    if !response.is_object() {
        return None;
    }
    non_empty_str(response, key).map(ToOwned::to_owned)
}

fn top_level_public_url(payload: &Payload) -> Option<String> {
    top_level(payload, "publicUrl")
}

fn top_level_url(payload: &Payload) -> Option<String> {
    top_level(payload, "url")
}

fn nested_public_url(payload: &Payload) -> Option<String> {
    nested(payload, "publicUrl")
}

fn nested_url(payload: &Payload) -> Option<String> {
    nested(payload, "url")
}

fn base64_video(payload: &Payload) -> Option<String> {
    top_level(payload, "videoBase64").map(|data| format!("data:video/mp4;base64,{data}"))
}

fn azure_blob_url(payload: &Payload) -> Option<String> {
    AZURE_BLOB
        .find(&payload.search_text())
        .map(|found| found.as_str().to_string())
}

fn video_file_url(payload: &Payload) -> Option<String> {
    VIDEO_FILE
        .find(&payload.search_text())
        .map(|found| found.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn json(value: Value) -> Payload {
        Payload::Json(value)
    }

    #[test]
    fn non_string_fields_are_skipped() {
        let payload = json(json!({"publicUrl": 42, "url": "https://x/real.mp4"}));
        assert_eq!(extract_video_url(&payload).as_deref(), Some("https://x/real.mp4"));
    }

    #[test]
    fn string_response_is_not_treated_as_object() {
        let payload = json(json!({"response": "https://cdn.example.com/out.m3u8"}));
        assert_eq!(
            extract_video_url(&payload).as_deref(),
            Some("https://cdn.example.com/out.m3u8")
        );
    }

    #[test]
    fn video_file_keeps_query_suffix() {
        let payload = Payload::Text("see https://x.io/v/clip.MOV?sig=abc&t=1 (expires)".into());
        assert_eq!(
            extract_video_url(&payload).as_deref(),
            Some("https://x.io/v/clip.MOV?sig=abc&t=1")
        );
    }
}
