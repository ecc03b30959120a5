//! Local safety copy of content whose publish failed.

use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::info;
use uuid::Uuid;

use crate::store::{ensure_parent_dir, DocumentStore};
use crate::{Error, Result};

const MAX_NAME_ATTEMPTS: usize = 8;

/// File name for a failed status: timestamp plus a random disambiguator.
pub fn fallback_file_name(now: DateTime<Local>) -> String {
    let disambiguator = Uuid::new_v4().simple().to_string();
    format!(
        "Failed Status - {}-{}.md",
        now.format("%Y-%m-%d %H-%M"),
        &disambiguator[..8]
    )
}

/// Contents of the fallback note.
pub fn fallback_contents(text: &str) -> String {
    format!("Failed to post:\n\n{text}")
}

/// Save `text` to a new note in `folder` (vault root when `None`).
///
/// Never overwrites: a name collision draws a new disambiguator.
pub fn write_fallback<S: DocumentStore + ?Sized>(
    store: &S,
    folder: Option<&str>,
    text: &str,
    now: DateTime<Local>,
) -> Result<PathBuf> {
    let folder = folder
        .map(str::trim)
        .filter(|folder| !folder.is_empty())
        .map_or_else(PathBuf::new, PathBuf::from);
    let contents = fallback_contents(text);

    for _ in 0..MAX_NAME_ATTEMPTS {
        let path = folder.join(fallback_file_name(now));
        ensure_parent_dir(store, &path)?;
        match store.create_new(&path, &contents) {
            Ok(()) => {
                info!(path = %path.display(), "Saved failed status locally");
                return Ok(path);
            }
            Err(Error::Io(error)) if error.kind() == io::ErrorKind::AlreadyExists => {}
            Err(error) => return Err(error),
        }
    }

    Err(Error::Io(io::Error::new(
        io::ErrorKind::AlreadyExists,
        format!(
            "no free fallback name in {}",
            display_folder(&folder)
        ),
    )))
}

fn display_folder(folder: &Path) -> String {
    if folder.as_os_str().is_empty() {
        "vault root".to_string()
    } else {
        folder.display().to_string()
    }
}
