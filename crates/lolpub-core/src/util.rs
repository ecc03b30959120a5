//! Small text and path helpers shared by the core and the CLI.

/// Longest response excerpt carried in an error.
const ERROR_EXCERPT_CHARS: usize = 180;

/// Trimmed text, or `None` when nothing but whitespace was given.
pub fn non_blank(value: Option<String>) -> Option<String> {
    let trimmed = value?.trim().to_string();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Whether `value` names an `http` or `https` URL.
pub fn is_http_url(value: &str) -> bool {
    value
        .split_once("://")
        .is_some_and(|(scheme, rest)| {
            !rest.is_empty()
                && (scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https"))
        })
}

/// Leading part of a response body, for error messages.
pub fn error_excerpt(body: &str) -> String {
    body.trim().chars().take(ERROR_EXCERPT_CHARS).collect()
}

/// File name without its final extension (`notes/2024-01-01_hello.md` -> `2024-01-01_hello`).
pub fn file_stem(path: &str) -> &str {
    let name = path.rsplit(['/', '\\']).next().unwrap_or(path);
    match name.rfind('.') {
        Some(index) if index > 0 => &name[..index],
        _ => name,
    }
}
