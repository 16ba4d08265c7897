//! Raw AI response parsing.
//!
//! Transforms the raw text a model returns into structured
//! [`TopicContent`]: the prose with all recognized URLs stripped out,
//! plus up to 3 image URLs and up to 2 canonicalized YouTube links.
//! Pure and deterministic; malformed input simply yields empty
//! extraction lists.

use once_cell::sync::Lazy;
use regex::Regex;

use tinytutor_core::content::{TopicContent, MAX_IMAGE_URLS, MAX_YOUTUBE_LINKS};

/// Generic URL: scheme, no whitespace/angle/quote characters, at
/// least one dot.
static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"https?://[^\s<>"]+?(?:\.[^\s<>"]+)+"#).unwrap());

/// YouTube reference in either `watch?v=` or `youtu.be` form, with
/// optional scheme and `www.` prefix. Capture group 1 is the video id.
static YOUTUBE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:https?://)?(?:www\.)?(?:youtube\.com/watch\?v=|youtu\.be/)([^&\s]+)").unwrap()
});

/// Image URL filter: path ends in an accepted image extension.
static IMAGE_EXT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^.*\.(jpg|jpeg|png|gif)$").unwrap());

/// Runs of 2+ blank lines left behind by URL removal.
static BLANK_LINES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n+").unwrap());

/// Parse a raw model response into structured topic content.
pub fn parse(raw: &str) -> TopicContent {
    let image_urls: Vec<String> = URL_RE
        .find_iter(raw)
        .map(|m| m.as_str().to_string())
        .filter(|url| IMAGE_EXT_RE.is_match(url))
        .take(MAX_IMAGE_URLS)
        .collect();

    let youtube_links: Vec<String> = YOUTUBE_RE
        .captures_iter(raw)
        .map(|caps| format!("https://www.youtube.com/watch?v={}", &caps[1]))
        .take(MAX_YOUTUBE_LINKS)
        .collect();

    // Remove the full matches of both patterns, then tidy the gaps
    // they leave behind.
    let without_urls = URL_RE.replace_all(raw, "");
    let without_videos = YOUTUBE_RE.replace_all(&without_urls, "");
    let content = BLANK_LINES_RE
        .replace_all(&without_videos, "\n\n")
        .trim()
        .to_string();

    TopicContent::new(content, image_urls, youtube_links)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn squash_whitespace(s: &str) -> String {
        s.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_extracts_image_and_video() {
        let raw = "Learn about cats! See https://example.com/cat.jpg and \
                   https://youtube.com/watch?v=abc123 for more.";
        let parsed = parse(raw);

        assert_eq!(
            squash_whitespace(&parsed.content),
            "Learn about cats! See and for more."
        );
        assert_eq!(parsed.image_urls, vec!["https://example.com/cat.jpg"]);
        assert_eq!(
            parsed.youtube_links,
            vec!["https://www.youtube.com/watch?v=abc123"]
        );
    }

    #[test]
    fn test_image_caps_at_three() {
        let raw = "a https://e.com/1.jpg b https://e.com/2.png c \
                   https://e.com/3.gif d https://e.com/4.jpeg e";
        let parsed = parse(raw);
        assert_eq!(parsed.image_urls.len(), 3);
        // First three by order of appearance.
        assert_eq!(parsed.image_urls[0], "https://e.com/1.jpg");
        assert_eq!(parsed.image_urls[2], "https://e.com/3.gif");
    }

    #[test]
    fn test_video_caps_at_two() {
        let raw = "https://youtube.com/watch?v=one then youtu.be/two then \
                   www.youtube.com/watch?v=three";
        let parsed = parse(raw);
        assert_eq!(
            parsed.youtube_links,
            vec![
                "https://www.youtube.com/watch?v=one",
                "https://www.youtube.com/watch?v=two",
            ]
        );
    }

    #[test]
    fn test_schemeless_youtube_normalized() {
        let parsed = parse("watch youtu.be/xyz789 tonight");
        assert_eq!(
            parsed.youtube_links,
            vec!["https://www.youtube.com/watch?v=xyz789"]
        );
        assert!(!parsed.content.contains("youtu.be"));
    }

    #[test]
    fn test_query_params_stripped_from_video_id() {
        let parsed = parse("https://www.youtube.com/watch?v=abc123&t=42s");
        assert_eq!(
            parsed.youtube_links,
            vec!["https://www.youtube.com/watch?v=abc123"]
        );
    }

    #[test]
    fn test_non_image_urls_not_extracted_but_removed() {
        let parsed = parse("Read https://example.com/article.html for details.");
        assert!(parsed.image_urls.is_empty());
        assert!(parsed.youtube_links.is_empty());
        assert!(!parsed.content.contains("example.com"));
    }

    #[test]
    fn test_extension_match_is_case_insensitive() {
        let parsed = parse("Look: https://example.com/photo.JPG here");
        assert_eq!(parsed.image_urls, vec!["https://example.com/photo.JPG"]);
    }

    #[test]
    fn test_blank_line_runs_collapse() {
        let raw = "Intro.\n\nhttps://e.com/a.jpg\n\n\n\nKey points.";
        let parsed = parse(raw);
        assert_eq!(parsed.content, "Intro.\n\nKey points.");
    }

    #[test]
    fn test_plain_text_passes_through() {
        let raw = "Dogs are loyal.\n\nThey love to play.";
        let parsed = parse(raw);
        assert_eq!(parsed.content, raw);
        assert!(parsed.image_urls.is_empty());
        assert!(parsed.youtube_links.is_empty());
    }

    #[test]
    fn test_idempotent_on_cleaned_content() {
        let raw = "Stars twinkle.\n\nSee https://e.com/star.png and \
                   https://youtu.be/star1 for more.\n\n\nThe end.";
        let first = parse(raw);
        let second = parse(&first.content);

        assert_eq!(second.content, first.content);
        assert!(second.image_urls.is_empty());
        assert!(second.youtube_links.is_empty());
    }

    #[test]
    fn test_empty_input() {
        let parsed = parse("");
        assert!(parsed.content.is_empty());
        assert!(parsed.image_urls.is_empty());
        assert!(parsed.youtube_links.is_empty());
    }
}
