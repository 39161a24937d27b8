use reelchat_core::{AppViewModel, Message, MessageKind, MessageView};
use scraper::Html;

const MEDIA_INDENT: &str = "      ";

/// Lines for every transcript entry at or after `from`.
pub fn render_transcript(view: &AppViewModel, from: usize, now_millis: i64) -> Vec<String> {
    view.messages
        .iter()
        .filter(|entry| entry.index >= from)
        .flat_map(|entry| render_entry(entry, now_millis))
        .collect()
}

pub fn prompt(view: &AppViewModel) -> &'static str {
    if view.busy {
        "(working on your video, please wait)"
    } else {
        "topic> "
    }
}

fn render_entry(entry: &MessageView, now_millis: i64) -> Vec<String> {
    let message = &entry.message;
    let label = kind_label(message.kind);
    match &message.media_src {
        Some(src) => render_media(label, src, now_millis),
        None => vec![format!("{label} {}", display_text(message))],
    }
}

fn render_media(label: &str, src: &str, now_millis: i64) -> Vec<String> {
    let mut lines = Vec::with_capacity(3);
    if let Some(encoded) = src.strip_prefix("data:video/mp4;base64,") {
        lines.push(format!(
            "{label} 🎬 inline video ({} base64 chars)",
            encoded.len()
        ));
    } else {
        lines.push(format!("{label} 🎬 {src}"));
        lines.push(format!("{MEDIA_INDENT}View in new tab: {src}"));
    }
    lines.push(format!("{MEDIA_INDENT}Download as: video_{now_millis}.mp4"));
    lines
}

fn kind_label(kind: MessageKind) -> &'static str {
    match kind {
        MessageKind::User => "you  ›",
        MessageKind::Bot => "bot  ›",
        MessageKind::Error => "error›",
    }
}

fn display_text(message: &Message) -> String {
    if message.is_markup {
        strip_tags(&message.text)
    } else {
        message.text.clone()
    }
}

fn strip_tags(markup: &str) -> String {
    let fragment = Html::parse_fragment(markup);
    fragment.root_element().text().collect()
}
