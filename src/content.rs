//! Promotional script/caption templating. Deterministic string
//! interpolation; identical inputs always produce identical output.

pub fn render_script(topic: &str, offer: &str) -> String {
    format!(
        "Hook: {topic} is exploding. 3 reasons it matters → [benefit 1], [benefit 2], [benefit 3]. Try {offer} today."
    )
}

pub fn render_caption(topic: &str) -> String {
    format!("Quick breakdown of {topic}. Link in bio. #ai #tools #trending")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_contains_topic_and_offer() {
        let script = render_script("fitness gadgets", "FitBand Pro");

        assert!(script.contains("fitness gadgets"));
        assert!(script.contains("Try FitBand Pro today."));
    }

    #[test]
    fn test_caption_carries_hashtags() {
        let caption = render_caption("fitness gadgets");

        assert!(caption.contains("fitness gadgets"));
        assert!(caption.contains("#ai #tools #trending"));
    }

    #[test]
    fn test_rendering_is_deterministic() {
        assert_eq!(
            render_script("AI tool", "Example Offer"),
            render_script("AI tool", "Example Offer")
        );
    }
}
