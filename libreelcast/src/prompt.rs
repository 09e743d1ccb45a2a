//! Prompt construction for the two generation steps

use crate::types::ContentRequest;

/// System persona for the script-writing exchange
pub const SCRIPT_PERSONA: &str =
    "You are an expert social media content creator specializing in viral short-form videos.";

/// System persona for the caption/hashtag exchange
pub const ANNOTATION_PERSONA: &str =
    "You are a social media expert who creates viral captions and hashtags.";

/// Build the script-writing prompt for a content request.
///
/// Asks for hook-first, vertical-format, CTA-terminated spoken/on-screen
/// text only, with no stage directions.
pub fn script_prompt(request: &ContentRequest) -> String {
    format!(
        "Create a {duration}-second {style} video script about: {topic}\n\
         \n\
         The script should be:\n\
         - Engaging and hook-driven (grab attention in first 3 seconds)\n\
         - Suitable for {platforms}\n\
         - Optimized for vertical video format (9:16)\n\
         - Include clear call-to-action at the end\n\
         - Written in a conversational, energetic tone\n\
         \n\
         Format: Provide ONLY the script text that will be spoken/shown in the video. \
         Keep it concise and impactful.",
        duration = request.duration,
        style = request.style,
        topic = request.topic,
        platforms = request.platforms.join(" and "),
    )
}

/// Build the caption/hashtag prompt for a finished script.
///
/// The fixed two-line output contract here is what `parser::parse_annotation`
/// expects on the way back.
pub fn annotation_prompt(script: &str) -> String {
    format!(
        "Based on this video script, create:\n\
         1. An engaging caption (max 150 characters)\n\
         2. 8-12 relevant trending hashtags\n\
         \n\
         Script: {script}\n\
         \n\
         Format your response as:\n\
         CAPTION: [your caption]\n\
         HASHTAGS: [hashtag1, hashtag2, hashtag3, ...]",
    )
}
