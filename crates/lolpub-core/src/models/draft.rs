//! Target-specific drafts handed to the payload builder

use serde::{Deserialize, Serialize};

/// Long-form entry assembled from a document and its front-matter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeblogDraft {
    pub title: String,
    pub slug: String,
    /// Publication date as written in the front-matter, or an ISO-8601 timestamp
    pub date: String,
    /// Entry type; only sent when it is not the default `post`
    pub entry_type: Option<String>,
    pub status: Option<String>,
    pub tags: Vec<String>,
    pub body: String,
}

/// Pastebin entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasteDraft {
    /// Slugified title, doubles as the remote id
    pub slug: String,
    pub content: String,
    pub listed: bool,
}

/// Picture metadata sent after an upload or on edit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PicMetadata {
    pub description: String,
    pub alt_text: String,
    pub tags: String,
    /// Hidden from the public gallery unless explicitly set
    pub public: bool,
}
