//! Slug generation for weblog entries and pastes.

use std::sync::OnceLock;

use regex::Regex;

use crate::frontmatter::split_document;
use crate::util::file_stem;

/// Maximum length of a pastebin slug.
pub const PASTE_SLUG_MAX_LEN: usize = 32;

static MARKDOWN_LINK: OnceLock<Regex> = OnceLock::new();
static WIKI_LINK: OnceLock<Regex> = OnceLock::new();
static AUTOLINK: OnceLock<Regex> = OnceLock::new();
static BARE_URL: OnceLock<Regex> = OnceLock::new();
static PASTE_SEPARATORS: OnceLock<Regex> = OnceLock::new();
static REUSABLE_PASTE_SLUG: OnceLock<Regex> = OnceLock::new();

fn markdown_link() -> &'static Regex {
    MARKDOWN_LINK.get_or_init(|| Regex::new(r"!?\[([^\]]*)\]\([^)]*\)").expect("Invalid regex"))
}

fn wiki_link() -> &'static Regex {
    WIKI_LINK
        .get_or_init(|| Regex::new(r"!?\[\[([^\]|]*)(?:\|([^\]]*))?\]\]").expect("Invalid regex"))
}

fn autolink() -> &'static Regex {
    AUTOLINK.get_or_init(|| Regex::new(r"<https?://[^>]*>").expect("Invalid regex"))
}

fn bare_url() -> &'static Regex {
    BARE_URL.get_or_init(|| Regex::new(r"(?:https?://|www\.)\S+").expect("Invalid regex"))
}

fn paste_separators() -> &'static Regex {
    PASTE_SEPARATORS.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("Invalid regex"))
}

fn reusable_paste_slug() -> &'static Regex {
    REUSABLE_PASTE_SLUG.get_or_init(|| Regex::new(r"^[a-z0-9-]+$").expect("Invalid regex"))
}

/// Resolve the slug for a weblog entry.
///
/// Source precedence is the title, then the first non-blank body line (front-matter
/// stripped), then a name derived from `fallback_filename`. An empty return value
/// means "no identity" and is not an error.
///
/// # Examples
///
/// ```
/// use lolpub_core::slug::resolve_slug;
///
/// assert_eq!(resolve_slug("My Great Post, Today!", "", "note.md", 3), "my-great-post");
/// assert_eq!(resolve_slug("", "", "2024-05-01_spring cleaning.md", 5), "spring-cleaning");
/// ```
pub fn resolve_slug(title: &str, content: &str, fallback_filename: &str, word_count: usize) -> String {
    let title = title.trim();
    let source = if title.is_empty() {
        first_body_line(content)
            .map_or_else(|| title_from_filename(fallback_filename), ToString::to_string)
    } else {
        title.to_string()
    };

    slugify_words(&source, word_count)
}

/// Lowercase, hyphen-joined sequence of at most `word_count` `[a-z0-9]+` tokens.
pub fn slugify_words(input: &str, word_count: usize) -> String {
    let stripped = strip_links(input);
    let cleaned = stripped
        .chars()
        .filter(|c| !matches!(c, '\'' | '"' | '-' | '\u{2019}' | '\u{2018}'))
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .to_lowercase();

    cleaned
        .split_whitespace()
        .take(word_count.max(1))
        .collect::<Vec<_>>()
        .join("-")
}

/// Reduce link markup to its visible text and drop bare URLs.
pub fn strip_links(input: &str) -> String {
    let without_wiki = wiki_link().replace_all(input, |caps: &regex::Captures<'_>| {
        caps.get(2)
            .or_else(|| caps.get(1))
            .map_or_else(String::new, |m| m.as_str().to_string())
    });
    let without_markdown = markdown_link().replace_all(&without_wiki, "$1");
    let without_autolinks = autolink().replace_all(&without_markdown, "");
    bare_url().replace_all(&without_autolinks, "").into_owned()
}

/// Human name derived from a file name.
///
/// `2024-05-01_spring_cleaning.md` becomes `spring cleaning`; a name without an
/// underscore is kept whole.
pub fn title_from_filename(filename: &str) -> String {
    let name = file_stem(filename);
    match name.split_once('_') {
        Some((_, rest)) if !rest.trim().is_empty() => rest.replace('_', " "),
        _ => name.to_string(),
    }
}

fn first_body_line(content: &str) -> Option<&str> {
    let body = split_document(content).map_or(content, |parts| parts.body);
    body.lines().map(str::trim).find(|line| !line.is_empty())
}

/// Slugify a user-supplied pastebin title: `[a-z0-9-]`, at most 32 characters,
/// no leading or trailing hyphens.
///
/// # Examples
///
/// ```
/// use lolpub_core::slug::slugify_paste_title;
///
/// assert_eq!(slugify_paste_title("  Hello, World! "), "hello-world");
/// ```
pub fn slugify_paste_title(title: &str) -> String {
    let lowered = title.to_lowercase();
    let hyphenated = paste_separators().replace_all(&lowered, "-");
    let trimmed = hyphenated.trim_matches('-');
    let truncated: String = trimmed.chars().take(PASTE_SLUG_MAX_LEN).collect();
    truncated.trim_end_matches('-').to_string()
}

/// Whether an existing paste id may be reused for an in-place update.
pub fn is_reusable_paste_slug(slug: &str) -> bool {
    reusable_paste_slug().is_match(slug)
}
