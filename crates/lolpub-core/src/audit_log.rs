//! Append-only logs written after a successful publish.
//!
//! Status posts are logged as bullet lines in a note and optionally in the
//! daily note. Picture uploads go to a Markdown table, either one file or one
//! file per calendar month plus an index of the monthly files. Every log file
//! is created lazily, and its folder is created before the first write.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::config::{PicsSettings, StatusSettings, DEFAULT_PICS_LOG_PATH};
use crate::models::LogEntry;
use crate::store::{ensure_parent_dir, DocumentStore};
use crate::Result;

const TABLE_HEADER: &str = "| Edit | Web | Original Filename | Note | Uploaded On | Taken On |\n\
                            |------|-----|-------------------|------|-------------|----------|\n";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One status log line, with a leading newline.
pub fn status_log_line(text: &str, url: Option<&str>, now: DateTime<Local>) -> String {
    let escaped = text.replace('[', "\\[").replace(']', "\\]");
    format!(
        "\n- **{}**: (*[Link to status.lol]({})*) - {escaped}",
        now.format("%Y-%m-%d %H:%M"),
        url.filter(|url| !url.is_empty()).unwrap_or("#")
    )
}

/// Append a posted status to the configured log note and daily note.
///
/// Returns the notes written to.
pub fn append_status_log<S: DocumentStore + ?Sized>(
    store: &S,
    settings: &StatusSettings,
    text: &str,
    url: Option<&str>,
    now: DateTime<Local>,
) -> Result<Vec<PathBuf>> {
    let line = status_log_line(text, url, now);
    let mut written = Vec::new();

    if settings.save_to_note {
        if let Some(note) = settings
            .log_note_path
            .as_deref()
            .map(str::trim)
            .filter(|note| !note.is_empty())
        {
            let path = markdown_path(note);
            append_line(store, &path, &line)?;
            written.push(path);
        }
    }

    if settings.also_log_to_daily {
        let name = format!("{}.md", now.format("%Y-%m-%d"));
        let path = settings
            .daily_notes_folder
            .as_deref()
            .map(str::trim)
            .filter(|folder| !folder.is_empty())
            .map_or_else(|| PathBuf::from(&name), |folder| Path::new(folder).join(&name));
        append_line(store, &path, &line)?;
        written.push(path);
    }

    Ok(written)
}

fn append_line<S: DocumentStore + ?Sized>(store: &S, path: &Path, line: &str) -> Result<()> {
    ensure_parent_dir(store, path)?;
    store.append(path, line)?;
    debug!(path = %path.display(), "Appended status log line");
    Ok(())
}

fn markdown_path(note: &str) -> PathBuf {
    let note = note.strip_suffix(".md").unwrap_or(note);
    PathBuf::from(format!("{note}.md"))
}

/// Table row for one uploaded picture. A missing capture time leaves its cell blank.
pub fn pic_log_row(entry: &LogEntry) -> String {
    let url = entry.remote_url.as_str();
    let file_part = url.rsplit('/').next().unwrap_or_default();
    let pic_id = file_part.split('.').next().unwrap_or_default();
    let namespace = url.split('/').nth(3).unwrap_or_default();

    let note = if entry.source_document_label.is_empty() {
        String::new()
    } else {
        format!("[[{}]]", entry.source_document_label)
    };
    let taken = entry
        .captured_at
        .map(|taken| taken.format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_default();

    format!(
        "| [✏️](edit-somepics-{pic_id}) | [📷](https://some.pics/{namespace}/{pic_id}) | {} | {note} | [{}]({url}) | {taken} |\n",
        entry.original_label.replace('|', "\\|"),
        entry.published_at.format(TIMESTAMP_FORMAT),
    )
}

/// Append a picture upload to the log in the configured layout.
///
/// Returns the log file the row was written to.
pub fn append_pic_log<S: DocumentStore + ?Sized>(
    store: &S,
    settings: &PicsSettings,
    entry: &LogEntry,
) -> Result<PathBuf> {
    let base_path = match settings.log_path.trim() {
        "" => DEFAULT_PICS_LOG_PATH,
        path => path,
    };
    let base_name = base_path.strip_suffix(".md").unwrap_or(base_path);
    let row = pic_log_row(entry);

    if !settings.monthly_logs {
        let path = PathBuf::from(base_path);
        append_row(store, &path, &format!("# {base_name}\n\n"), &row)?;
        return Ok(path);
    }

    let month = entry.published_at.format("%Y-%m").to_string();
    let log_path = format!("{base_name}/{month}.md");
    let path = PathBuf::from(&log_path);
    append_row(store, &path, &format!("# {base_name} ({month})\n\n"), &row)?;
    ensure_index_entry(store, Path::new(base_path), base_name, &log_path)?;
    Ok(path)
}

fn append_row<S: DocumentStore + ?Sized>(
    store: &S,
    path: &Path,
    title: &str,
    row: &str,
) -> Result<()> {
    ensure_parent_dir(store, path)?;
    if existing_log(store, path)?.is_some() {
        store.append(path, row)
    } else {
        store.write(path, &format!("{title}{TABLE_HEADER}{row}"))
    }
}

/// Bytes of a log that exists and holds more than whitespace.
///
/// Read failures propagate: an unreadable log is never treated as missing.
fn existing_log<S: DocumentStore + ?Sized>(store: &S, path: &Path) -> Result<Option<Vec<u8>>> {
    if !store.exists(path) {
        return Ok(None);
    }
    let bytes = store.read_bytes(path)?;
    Ok((!bytes.iter().all(u8::is_ascii_whitespace)).then_some(bytes))
}

/// List `log_path` in the index exactly once.
fn ensure_index_entry<S: DocumentStore + ?Sized>(
    store: &S,
    index_path: &Path,
    base_name: &str,
    log_path: &str,
) -> Result<()> {
    let link = format!("- [[{log_path}]]\n");
    ensure_parent_dir(store, index_path)?;
    let Some(bytes) = existing_log(store, index_path)? else {
        return store.write(index_path, &format!("# {base_name} Index\n\n{link}"));
    };

    let index = String::from_utf8_lossy(&bytes);
    if index.contains(&format!("[[{log_path}]]")) {
        return Ok(());
    }
    let separator = if index.ends_with('\n') { "" } else { "\n" };
    store.append(index_path, &format!("{separator}{link}"))
}

/// `DateTimeOriginal` from the image's EXIF block, when it has one.
pub fn capture_time(bytes: &[u8]) -> Option<NaiveDateTime> {
    let exif = exif::Reader::new()
        .read_from_container(&mut Cursor::new(bytes))
        .ok()?;
    let field = exif.get_field(exif::Tag::DateTimeOriginal, exif::In::PRIMARY)?;
    let exif::Value::Ascii(values) = &field.value else {
        return None;
    };
    let taken = exif::DateTime::from_ascii(values.first()?).ok()?;

    NaiveDate::from_ymd_opt(
        i32::from(taken.year),
        u32::from(taken.month),
        u32::from(taken.day),
    )?
    .and_hms_opt(
        u32::from(taken.hour),
        u32::from(taken.minute),
        u32::from(taken.second),
    )
}
