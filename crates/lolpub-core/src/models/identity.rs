//! Remote identity model

use serde::{Deserialize, Serialize};

/// Where a piece of content lives remotely.
///
/// `remote_id == None` means "not yet published". The local front-matter copy
/// is a cache and is always overwritten by a fresh server response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteIdentity {
    pub remote_id: Option<String>,
    pub slug: String,
    pub url: Option<String>,
}

impl RemoteIdentity {
    #[must_use]
    pub fn new(remote_id: Option<String>, slug: impl Into<String>, url: Option<String>) -> Self {
        Self {
            remote_id: remote_id.filter(|id| !id.trim().is_empty()),
            slug: slug.into(),
            url: url.filter(|url| !url.trim().is_empty()),
        }
    }

    #[must_use]
    pub const fn is_published(&self) -> bool {
        self.remote_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_remote_id_counts_as_unpublished() {
        let identity = RemoteIdentity::new(Some("  ".to_string()), "hello", None);
        assert!(!identity.is_published());
        assert!(RemoteIdentity::new(Some("42".to_string()), "hello", None).is_published());
    }
}
