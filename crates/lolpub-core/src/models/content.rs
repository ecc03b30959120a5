//! Content item model

use serde::{Deserialize, Serialize};

use super::TargetKind;

/// A piece of content prepared for a single publish attempt.
///
/// Built fresh per attempt and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    /// Text exactly as the user supplied it
    pub raw_text: String,
    /// Where the content is going
    pub kind: TargetKind,
    /// Leading marker (status emoji), when the target uses one
    pub prefix: Option<String>,
    /// Text to transmit
    pub body: String,
}
