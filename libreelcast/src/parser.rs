//! Caption and hashtag extraction
//!
//! The annotation step asks the model for a fixed two-line output contract:
//!
//! ```text
//! CAPTION: [one caption line]
//! HASHTAGS: [tag1, tag2, tag3, ...]
//! ```
//!
//! Parsing is purely textual. It never fails: a missing `CAPTION:` marker
//! falls back to the supplied caption (the topic), and a missing
//! `HASHTAGS:` marker yields an empty tag list.

const CAPTION_MARKER: &str = "CAPTION:";
const HASHTAGS_MARKER: &str = "HASHTAGS:";

/// Extract a caption and hashtag list from a loosely formatted text block.
///
/// The caption is the text following `CAPTION:` up to (not including) a
/// line starting with `HASHTAGS:` or end of input, trimmed. Hashtags are
/// the comma-separated tokens following `HASHTAGS:`, each trimmed and
/// stripped of a leading `#`; empty tokens are discarded.
pub fn parse_annotation(raw: &str, fallback_caption: &str) -> (String, Vec<String>) {
    let caption = match raw.find(CAPTION_MARKER) {
        Some(idx) => {
            let after = &raw[idx + CAPTION_MARKER.len()..];
            let end = after
                .find(&format!("\n{}", HASHTAGS_MARKER))
                .unwrap_or(after.len());
            after[..end].trim().to_string()
        }
        None => fallback_caption.trim().to_string(),
    };

    let hashtags = match raw.find(HASHTAGS_MARKER) {
        Some(idx) => raw[idx + HASHTAGS_MARKER.len()..]
            .split(',')
            .map(|token| {
                let token = token.trim();
                token.strip_prefix('#').unwrap_or(token).trim().to_string()
            })
            .filter(|token| !token.is_empty())
            .collect(),
        None => Vec::new(),
    };

    (caption, hashtags)
}
