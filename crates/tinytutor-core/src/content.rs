//! Generated topic content.

use serde::{Deserialize, Serialize};

/// Maximum number of image URLs kept per tutorial.
pub const MAX_IMAGE_URLS: usize = 3;

/// Maximum number of video links kept per tutorial.
pub const MAX_YOUTUBE_LINKS: usize = 2;

/// Structured content produced for one tutorial topic.
///
/// Ephemeral value object: never persisted on its own, only used to
/// populate a [`crate::TutorSession`]. Keeping the prose and the two
/// URL lists in one struct means a session either has all three or
/// none of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicContent {
    /// Cleaned tutorial prose, with extracted URLs removed.
    pub content: String,
    /// Candidate illustration URLs, in order of first appearance. At most 3.
    pub image_urls: Vec<String>,
    /// Canonicalized YouTube links, in order of first appearance. At most 2.
    pub youtube_links: Vec<String>,
}

impl TopicContent {
    /// Create content with the lists capped at their limits.
    pub fn new(
        content: impl Into<String>,
        mut image_urls: Vec<String>,
        mut youtube_links: Vec<String>,
    ) -> Self {
        image_urls.truncate(MAX_IMAGE_URLS);
        youtube_links.truncate(MAX_YOUTUBE_LINKS);
        Self {
            content: content.into(),
            image_urls,
            youtube_links,
        }
    }

    /// Content with no extracted media.
    pub fn text_only(content: impl Into<String>) -> Self {
        Self::new(content, vec![], vec![])
    }
}
