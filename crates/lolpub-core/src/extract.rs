//! Leading-emoji extraction for status posts.

use std::sync::OnceLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

use crate::models::{ContentItem, TargetKind};

const ZERO_WIDTH_JOINER: &str = "\u{200d}";

static PICTOGRAPHIC: OnceLock<Regex> = OnceLock::new();

fn pictographic() -> &'static Regex {
    PICTOGRAPHIC.get_or_init(|| Regex::new(r"\p{Extended_Pictographic}").expect("Invalid regex"))
}

/// Whether a grapheme cluster belongs to a leading emoji run.
pub fn is_pictographic_cluster(cluster: &str) -> bool {
    cluster == ZERO_WIDTH_JOINER || pictographic().is_match(cluster)
}

/// Split status text into its leading emoji run and the remaining body.
///
/// Without a leading run, `default_prefix` is used and the whole trimmed text
/// becomes the body. Both parts are NFC-normalized.
///
/// # Examples
///
/// ```
/// use lolpub_core::extract::extract_status;
///
/// let item = extract_status("🎉🎉 hello world", "📣");
/// assert_eq!(item.prefix.as_deref(), Some("🎉🎉"));
/// assert_eq!(item.body, "hello world");
/// ```
pub fn extract_status(raw_text: &str, default_prefix: &str) -> ContentItem {
    let normalized = separate_glued_prefix(raw_text.trim());

    let prefix_len: usize = normalized
        .graphemes(true)
        .take_while(|cluster| is_pictographic_cluster(cluster))
        .map(str::len)
        .sum();

    let (prefix, body) = if prefix_len == 0 {
        (default_prefix.trim(), normalized.as_str())
    } else {
        let (prefix, rest) = normalized.split_at(prefix_len);
        (prefix, rest.trim_start())
    };

    ContentItem {
        raw_text: raw_text.to_string(),
        kind: TargetKind::Status,
        prefix: Some(prefix.nfc().collect()),
        body: body.nfc().collect(),
    }
}

/// Insert one space after a single leading pictograph that is glued to text.
///
/// Nothing changes when the second cluster is whitespace, `.,!?`, or another
/// pictograph.
fn separate_glued_prefix(text: &str) -> String {
    let mut clusters = text.graphemes(true);
    let (Some(first), Some(second)) = (clusters.next(), clusters.next()) else {
        return text.to_string();
    };

    let glued = is_pictographic_cluster(first)
        && !is_pictographic_cluster(second)
        && !second.chars().all(char::is_whitespace)
        && !matches!(second, "." | "," | "!" | "?");

    if glued {
        format!("{first} {}", &text[first.len()..])
    } else {
        text.to_string()
    }
}
