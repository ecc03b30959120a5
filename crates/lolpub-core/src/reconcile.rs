//! Writes a successful publish back into the local document.
//!
//! Only the keys a target owns are replaced; everything else in the
//! front-matter keeps its value and position. A block that fails to parse
//! aborts the write and leaves the file as it was.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde_yaml::Value;
use tracing::{debug, info};

use crate::config::WeblogSettings;
use crate::frontmatter::Document;
use crate::models::RemoteIdentity;
use crate::store::DocumentStore;
use crate::Result;

/// Front-matter keys written after a weblog publish.
pub const WEBLOG_OWNED_KEYS: [&str; 3] = ["entry", "slug", "date"];

/// Front-matter keys written after a paste publish.
pub const PASTE_OWNED_KEYS: [&str; 4] = ["paste_id", "paste_url", "listed", "date"];

/// Keys removed when a paste is deleted.
pub const PASTE_IDENTITY_KEYS: [&str; 3] = ["paste_id", "paste_url", "listed"];

const PAGE_TYPE: &str = "page";

/// Merge `updates` into the front-matter of `content`, replacing `owned` keys.
pub fn merge_owned_keys(content: &str, owned: &[&str], updates: &[(&str, Value)]) -> Result<String> {
    let mut document = Document::parse(content)?;
    document.frontmatter.merge_owned(owned, updates)?;
    document.render()
}

/// Record the entry id, canonical slug and date of a weblog entry.
pub fn reconcile_weblog<S: DocumentStore + ?Sized>(
    store: &S,
    path: &Path,
    identity: &RemoteIdentity,
    date: &str,
) -> Result<()> {
    let mut updates = Vec::with_capacity(WEBLOG_OWNED_KEYS.len());
    if let Some(entry) = &identity.remote_id {
        updates.push(("entry", Value::String(entry.clone())));
    }
    if !identity.slug.is_empty() {
        updates.push(("slug", Value::String(identity.slug.clone())));
    }
    updates.push(("date", Value::String(date.to_string())));

    let content = store.read(path)?;
    let updated = merge_owned_keys(&content, &WEBLOG_OWNED_KEYS, &updates)?;
    store.write(path, &updated)?;
    debug!(path = %path.display(), "Weblog front-matter reconciled");
    Ok(())
}

/// Record the paste id, URL, visibility and publish time.
pub fn reconcile_paste<S: DocumentStore + ?Sized>(
    store: &S,
    path: &Path,
    identity: &RemoteIdentity,
    listed: bool,
    now: DateTime<Local>,
) -> Result<()> {
    let mut updates = Vec::with_capacity(PASTE_OWNED_KEYS.len());
    if let Some(id) = &identity.remote_id {
        updates.push(("paste_id", Value::String(id.clone())));
    }
    if let Some(url) = &identity.url {
        updates.push(("paste_url", Value::String(url.clone())));
    }
    updates.push(("listed", Value::Bool(listed)));
    updates.push(("date", Value::String(now.to_rfc3339())));

    let content = store.read(path)?;
    let updated = merge_owned_keys(&content, &PASTE_OWNED_KEYS, &updates)?;
    store.write(path, &updated)?;
    debug!(path = %path.display(), "Paste front-matter reconciled");
    Ok(())
}

/// Drop the paste identity keys. An emptied block is removed entirely.
pub fn clear_paste<S: DocumentStore + ?Sized>(store: &S, path: &Path) -> Result<()> {
    let content = store.read(path)?;
    let mut document = Document::parse(&content)?;
    document.frontmatter.remove_keys(&PASTE_IDENTITY_KEYS);
    store.write(path, &document.render()?)
}

/// Whether a published weblog document should be renamed.
pub fn should_rename(settings: &WeblogSettings, entry_type: Option<&str>) -> bool {
    if !settings.enable_renaming {
        return false;
    }
    let is_page = entry_type.is_some_and(|value| value.trim().eq_ignore_ascii_case(PAGE_TYPE));
    !is_page || settings.rename_pages
}

/// Compute `{safe_date}_{safe_slug}.{ext}` next to `path`.
///
/// Returns `None` when the slug is empty or the name would not change.
pub fn renamed_path(path: &Path, date: &str, slug: &str, today: DateTime<Local>) -> Option<PathBuf> {
    let slug = safe_slug(slug);
    if slug.is_empty() {
        return None;
    }

    let extension = path
        .extension()
        .and_then(|extension| extension.to_str())
        .unwrap_or("md");
    let name = format!("{}_{slug}.{extension}", safe_date(date, today));
    let candidate = path.with_file_name(name);
    (candidate != path).then_some(candidate)
}

/// Rename a published document after its front-matter has been written.
///
/// Returns the new path, or `None` when no rename was needed. A failure here
/// never touches the already reconciled front-matter.
pub fn rename_after_publish<S: DocumentStore + ?Sized>(
    store: &S,
    path: &Path,
    date: &str,
    slug: &str,
    today: DateTime<Local>,
) -> Result<Option<PathBuf>> {
    let Some(target) = renamed_path(path, date, slug, today) else {
        return Ok(None);
    };
    store.rename(path, &target)?;
    info!(from = %path.display(), to = %target.display(), "Renamed published document");
    Ok(Some(target))
}

/// Date portion only: up to the first space or `T`, at most ten characters,
/// path separators and colons removed. Today when nothing is left.
pub fn safe_date(date: &str, today: DateTime<Local>) -> String {
    let head = date.trim().split([' ', 'T']).next().unwrap_or_default();
    let cleaned: String = head
        .chars()
        .filter(|c| !matches!(c, ':' | '/' | '\\'))
        .take(10)
        .collect();
    if cleaned.is_empty() {
        today.format("%Y-%m-%d").to_string()
    } else {
        cleaned
    }
}

/// Slug with path-unsafe characters replaced by `-`.
pub fn safe_slug(slug: &str) -> String {
    slug.trim()
        .chars()
        .map(|c| {
            if matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|') || c.is_control() {
                '-'
            } else {
                c
            }
        })
        .collect::<String>()
        .trim_matches('-')
        .to_string()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use super::*;
    use crate::frontmatter::Frontmatter;
    use crate::frontmatter::split_document;
    use crate::store::FsDocumentStore;
    use crate::Error;

    fn today() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 6, 15, 9, 30, 0).unwrap()
    }

    fn frontmatter_of(content: &str) -> Frontmatter {
        Frontmatter::parse(split_document(content).unwrap().yaml).unwrap()
    }

    #[test]
    fn weblog_reconcile_round_trips_and_keeps_unrelated_keys() {
        let dir = tempdir().unwrap();
        let store = FsDocumentStore::new(dir.path());
        let path = Path::new("post.md");
        store
            .write(
                path,
                "---\ntitle: Hello\nentry: old\ntags:\n- rust\nstatus: published\n---\nBody\n",
            )
            .unwrap();

        let identity = RemoteIdentity::new(Some("abc123".to_string()), "hello", None);
        reconcile_weblog(&store, path, &identity, "2024-05-01").unwrap();

        let content = store.read(path).unwrap();
        let fm = frontmatter_of(&content);
        assert_eq!(fm.get_str("entry").as_deref(), Some("abc123"));
        assert_eq!(fm.get_str("slug").as_deref(), Some("hello"));
        assert_eq!(fm.get_str("date").as_deref(), Some("2024-05-01"));
        assert_eq!(fm.get_str("title").as_deref(), Some("Hello"));
        assert_eq!(fm.string_list("tags"), vec!["rust"]);
        assert_eq!(fm.get_str("status").as_deref(), Some("published"));
        assert_eq!(fm.keys(), vec!["title", "tags", "status", "entry", "slug", "date"]);
        assert!(content.ends_with("---\n\nBody\n"));
    }

    #[test]
    fn weblog_reconcile_keeps_unrelated_source_text() {
        let dir = tempdir().unwrap();
        let store = FsDocumentStore::new(dir.path());
        let path = Path::new("post.md");
        store
            .write(
                path,
                "---\nversion: 1.10\ncolor: 0x1F\n# keep me\nstatus: published\n---\nBody\n",
            )
            .unwrap();

        let identity = RemoteIdentity::new(Some("e1".to_string()), "hello", None);
        reconcile_weblog(&store, path, &identity, "2024-05-01").unwrap();

        let content = store.read(path).unwrap();
        assert!(content.starts_with(
            "---\nversion: 1.10\ncolor: 0x1F\n# keep me\nstatus: published\nentry: e1\nslug: hello\n"
        ));
        assert_eq!(frontmatter_of(&content).get_str("date").as_deref(), Some("2024-05-01"));
        assert!(content.ends_with("---\n\nBody\n"));
    }

    #[test]
    fn unparsable_frontmatter_leaves_document_untouched() {
        let dir = tempdir().unwrap();
        let store = FsDocumentStore::new(dir.path());
        let path = Path::new("broken.md");
        let original = "---\ntitle: [unclosed\n---\nBody\n";
        store.write(path, original).unwrap();

        let identity = RemoteIdentity::new(Some("1".to_string()), "x", None);
        let error = reconcile_weblog(&store, path, &identity, "2024-05-01").unwrap_err();
        assert!(matches!(error, Error::Frontmatter(_)));
        assert_eq!(store.read(path).unwrap(), original);
    }

    #[test]
    fn paste_reconcile_writes_identity_and_visibility() {
        let dir = tempdir().unwrap();
        let store = FsDocumentStore::new(dir.path());
        let path = Path::new("snippet.md");
        store.write(path, "echo hi\n").unwrap();

        let identity = RemoteIdentity::new(
            Some("snippet".to_string()),
            "snippet",
            Some("https://foobar.paste.lol/snippet".to_string()),
        );
        reconcile_paste(&store, path, &identity, false, today()).unwrap();

        let content = store.read(path).unwrap();
        let fm = frontmatter_of(&content);
        assert_eq!(fm.get_str("paste_id").as_deref(), Some("snippet"));
        assert_eq!(
            fm.get_str("paste_url").as_deref(),
            Some("https://foobar.paste.lol/snippet")
        );
        assert_eq!(fm.get_bool("listed"), Some(false));
        assert!(fm.get_str("date").is_some());
        assert!(content.ends_with("---\n\necho hi\n"));
    }

    #[test]
    fn clear_paste_removes_identity_and_empty_block() {
        let dir = tempdir().unwrap();
        let store = FsDocumentStore::new(dir.path());
        let path = Path::new("snippet.md");
        store
            .write(
                path,
                "---\npaste_id: snippet\npaste_url: https://foobar.paste.lol/snippet\nlisted: true\n---\n\necho hi\n",
            )
            .unwrap();

        clear_paste(&store, path).unwrap();
        assert_eq!(store.read(path).unwrap(), "echo hi\n");
    }

    #[test]
    fn clear_paste_keeps_other_keys() {
        let dir = tempdir().unwrap();
        let store = FsDocumentStore::new(dir.path());
        let path = Path::new("snippet.md");
        store
            .write(path, "---\nauthor: me\npaste_id: snippet\n---\n\necho hi\n")
            .unwrap();

        clear_paste(&store, path).unwrap();
        assert_eq!(store.read(path).unwrap(), "---\nauthor: me\n---\n\necho hi\n");
    }

    #[test]
    fn pages_are_not_renamed_unless_enabled() {
        let mut settings = WeblogSettings::default();
        assert!(should_rename(&settings, None));
        assert!(should_rename(&settings, Some("post")));
        assert!(!should_rename(&settings, Some("Page")));

        settings.rename_pages = true;
        assert!(should_rename(&settings, Some("page")));

        settings.enable_renaming = false;
        assert!(!should_rename(&settings, None));
    }

    #[test]
    fn renamed_path_uses_date_portion_and_safe_slug() {
        let path = Path::new("posts/draft.md");
        assert_eq!(
            renamed_path(path, "2024-05-01T10:00:00Z", "hello/world", today()),
            Some(PathBuf::from("posts/2024-05-01_hello-world.md"))
        );
        assert_eq!(
            renamed_path(path, "2024-05-01 10:00", "hello", today()),
            Some(PathBuf::from("posts/2024-05-01_hello.md"))
        );
        assert_eq!(
            renamed_path(path, "", "hello", today()),
            Some(PathBuf::from("posts/2024-06-15_hello.md"))
        );
        assert_eq!(renamed_path(path, "2024-05-01", "", today()), None);
        assert_eq!(
            renamed_path(Path::new("posts/2024-05-01_hello.md"), "2024-05-01", "hello", today()),
            None
        );
    }

    #[test]
    fn rename_failure_keeps_reconciled_frontmatter() {
        let dir = tempdir().unwrap();
        let store = FsDocumentStore::new(dir.path());
        let path = Path::new("draft.md");
        store.write(path, "---\nstatus: draft\n---\nBody").unwrap();
        store.write(Path::new("2024-05-01_hello.md"), "taken").unwrap();

        let identity = RemoteIdentity::new(Some("e1".to_string()), "hello", None);
        reconcile_weblog(&store, path, &identity, "2024-05-01").unwrap();
        assert!(rename_after_publish(&store, path, "2024-05-01", "hello", today()).is_err());

        let fm = frontmatter_of(&store.read(path).unwrap());
        assert_eq!(fm.get_str("entry").as_deref(), Some("e1"));
        assert_eq!(store.read(Path::new("2024-05-01_hello.md")).unwrap(), "taken");
    }
}
