//! Document store collaborator.
//!
//! Paths are vault-relative. The store is externally synchronized: nothing here
//! locks, and a concurrent edit between read and write may be lost.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

use crate::{Error, Result};

/// File-like resources the publisher reads, writes and renames.
pub trait DocumentStore {
    /// Read a text document.
    fn read(&self, path: &Path) -> Result<String>;

    /// Read raw bytes (pictures).
    fn read_bytes(&self, path: &Path) -> Result<Vec<u8>>;

    fn exists(&self, path: &Path) -> bool;

    /// Replace the contents of an existing or new document.
    fn write(&self, path: &Path, contents: &str) -> Result<()>;

    /// Create a document that must not exist yet.
    fn create_new(&self, path: &Path, contents: &str) -> Result<()>;

    /// Append to a document, creating it when missing.
    fn append(&self, path: &Path, contents: &str) -> Result<()>;

    /// Move a document in a single operation.
    fn rename(&self, from: &Path, to: &Path) -> Result<()>;

    fn remove(&self, path: &Path) -> Result<()>;

    fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Locate a file by name anywhere in the store, for bare embed names.
    fn find_by_name(&self, _name: &str) -> Option<PathBuf> {
        None
    }
}

/// Filesystem store rooted at a vault directory.
#[derive(Debug, Clone)]
pub struct FsDocumentStore {
    root: PathBuf,
}

impl FsDocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a vault-relative path, refusing to escape the vault root.
    pub fn resolve(&self, path: &Path) -> Result<PathBuf> {
        if path.is_absolute() {
            return if path.starts_with(&self.root) {
                Ok(path.to_path_buf())
            } else {
                Err(Error::InvalidInput(format!(
                    "{} is outside the vault {}",
                    path.display(),
                    self.root.display()
                )))
            };
        }

        if path
            .components()
            .any(|component| matches!(component, Component::ParentDir))
        {
            return Err(Error::InvalidInput(format!(
                "{} must not contain `..`",
                path.display()
            )));
        }

        Ok(self.root.join(path))
    }

    /// Vault-relative form of `path`, used for labels and links.
    pub fn relative(&self, path: &Path) -> PathBuf {
        path.strip_prefix(&self.root)
            .map_or_else(|_| path.to_path_buf(), Path::to_path_buf)
    }
}

impl DocumentStore for FsDocumentStore {
    fn read(&self, path: &Path) -> Result<String> {
        Ok(fs::read_to_string(self.resolve(path)?)?)
    }

    fn read_bytes(&self, path: &Path) -> Result<Vec<u8>> {
        Ok(fs::read(self.resolve(path)?)?)
    }

    fn exists(&self, path: &Path) -> bool {
        self.resolve(path).is_ok_and(|resolved| resolved.exists())
    }

    fn write(&self, path: &Path, contents: &str) -> Result<()> {
        Ok(fs::write(self.resolve(path)?, contents)?)
    }

    fn create_new(&self, path: &Path, contents: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(self.resolve(path)?)?;
        file.write_all(contents.as_bytes())?;
        Ok(())
    }

    fn append(&self, path: &Path, contents: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(self.resolve(path)?)?;
        file.write_all(contents.as_bytes())?;
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        let to = self.resolve(to)?;
        if to.exists() {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} already exists", to.display()),
            )));
        }
        Ok(fs::rename(self.resolve(from)?, to)?)
    }

    fn remove(&self, path: &Path) -> Result<()> {
        Ok(fs::remove_file(self.resolve(path)?)?)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        Ok(fs::create_dir_all(self.resolve(path)?)?)
    }

    fn find_by_name(&self, name: &str) -> Option<PathBuf> {
        let mut pending = vec![self.root.clone()];
        while let Some(dir) = pending.pop() {
            let Ok(entries) = fs::read_dir(&dir) else {
                continue;
            };
            let mut entries: Vec<_> = entries.filter_map(std::result::Result::ok).collect();
            entries.sort_by_key(fs::DirEntry::file_name);
            for entry in entries {
                let path = entry.path();
                let hidden = entry.file_name().to_string_lossy().starts_with('.');
                if path.is_dir() {
                    if !hidden {
                        pending.push(path);
                    }
                } else if entry.file_name() == name {
                    return Some(self.relative(&path));
                }
            }
        }
        None
    }
}

/// Make sure the parent folder of `path` exists before the first write into it.
pub fn ensure_parent_dir<S: DocumentStore + ?Sized>(store: &S, path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !store.exists(parent) => {
            store.create_dir_all(parent)
        }
        _ => Ok(()),
    }
}


#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn append_creates_missing_documents() {
        let dir = tempdir().unwrap();
        let store = FsDocumentStore::new(dir.path());
        let path = Path::new("log.md");

        store.append(path, "one\n").unwrap();
        store.append(path, "two\n").unwrap();
        assert_eq!(store.read(path).unwrap(), "one\ntwo\n");
    }

    #[test]
    fn create_new_refuses_to_overwrite() {
        let dir = tempdir().unwrap();
        let store = FsDocumentStore::new(dir.path());
        let path = Path::new("note.md");

        store.create_new(path, "first").unwrap();
        assert!(store.create_new(path, "second").is_err());
        assert_eq!(store.read(path).unwrap(), "first");
    }

    #[test]
    fn rename_refuses_existing_target() {
        let dir = tempdir().unwrap();
        let store = FsDocumentStore::new(dir.path());
        store.write(Path::new("a.md"), "a").unwrap();
        store.write(Path::new("b.md"), "b").unwrap();

        assert!(store.rename(Path::new("a.md"), Path::new("b.md")).is_err());
        store
            .rename(Path::new("a.md"), Path::new("c.md"))
            .unwrap();
        assert!(!store.exists(Path::new("a.md")));
        assert_eq!(store.read(Path::new("c.md")).unwrap(), "a");
    }

    #[test]
    fn resolve_rejects_paths_outside_the_vault() {
        let dir = tempdir().unwrap();
        let store = FsDocumentStore::new(dir.path());
        assert!(store.resolve(Path::new("../escape.md")).is_err());
        assert!(store.resolve(Path::new("/etc/passwd")).is_err());
        assert!(store.resolve(Path::new("notes/ok.md")).is_ok());
    }

    #[test]
    fn find_by_name_searches_nested_folders() {
        let dir = tempdir().unwrap();
        let store = FsDocumentStore::new(dir.path());
        store.create_dir_all(Path::new("attachments/2024")).unwrap();
        store
            .write(Path::new("attachments/2024/cat.png"), "png")
            .unwrap();

        assert_eq!(
            store.find_by_name("cat.png"),
            Some(PathBuf::from("attachments/2024/cat.png"))
        );
        assert_eq!(store.find_by_name("dog.png"), None);
    }

    #[test]
    fn ensure_parent_dir_creates_nested_folders() {
        let dir = tempdir().unwrap();
        let store = FsDocumentStore::new(dir.path());
        let path = Path::new("logs/2024/pics.md");

        ensure_parent_dir(&store, path).unwrap();
        assert!(dir.path().join("logs/2024").is_dir());
        store.write(path, "ok").unwrap();
    }
}
