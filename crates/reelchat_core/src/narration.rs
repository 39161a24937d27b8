use std::time::Duration;

use crate::effect::NarrationLine;

enum Template {
    Topic(fn(&str) -> String),
    Fixed(&'static str),
}

struct Step {
    template: Template,
    delay: Duration,
}

const SCRIPT: [Step; 4] = [
    Step {
        template: Template::Topic(topic_line),
        delay: Duration::from_millis(1_500),
    },
    Step {
        template: Template::Fixed(
            "Script complete! Generating voiceovers and finding the perfect background clip.",
        ),
        delay: Duration::from_millis(4_000),
    },
    Step {
        template: Template::Fixed(
            "All assets are ready. Rendering the final video now. This might take a moment!",
        ),
        delay: Duration::from_millis(8_000),
    },
    Step {
        template: Template::Fixed("Finishing up and uploading your video..."),
        delay: Duration::from_millis(4_000),
    },
];

fn topic_line(topic: &str) -> String {
    format!("Excellent topic: \"{topic}\"! I'm now writing a script...")
}

/// Renders the progress narration shown while a submission is outstanding.
pub fn narration_script(topic: &str) -> Vec<NarrationLine> {
    SCRIPT
        .iter()
        .map(|step| NarrationLine {
            text: match step.template {
                Template::Topic(render) => render(topic),
                Template::Fixed(text) => text.to_string(),
            },
            delay: step.delay,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_line_mentions_topic() {
        let script = narration_script("deep sea vents");
        assert_eq!(
            script[0].text,
            "Excellent topic: \"deep sea vents\"! I'm now writing a script..."
        );
    }

    #[test]
    fn delays_follow_script_order() {
        let delays: Vec<u64> = narration_script("x")
            .iter()
            .map(|line| line.delay.as_millis() as u64)
            .collect();
        assert_eq!(delays, vec![1_500, 4_000, 8_000, 4_000]);
    }
}
