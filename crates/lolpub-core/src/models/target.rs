//! Remote collections a content item can be published to

use std::fmt;

use serde::{Deserialize, Serialize};

/// The remote collection a publish operation is aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    /// status.lol short posts
    Status,
    /// Long-form weblog entries
    Weblog,
    /// paste.lol pastebin
    Pastebin,
    /// some.pics picture gallery
    Pics,
}

impl TargetKind {
    /// Collection path below `/address/{address}/`.
    #[must_use]
    pub const fn collection_path(self) -> &'static str {
        match self {
            Self::Status => "statuses",
            Self::Weblog => "weblog/entry",
            Self::Pastebin => "pastebin",
            Self::Pics => "pics",
        }
    }

    /// Key under `response` that marks a successful call.
    #[must_use]
    pub const fn success_marker(self) -> &'static str {
        match self {
            Self::Status => "url",
            Self::Weblog => "entry",
            Self::Pastebin => "paste",
            Self::Pics => "id",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::Weblog => "weblog",
            Self::Pastebin => "pastebin",
            Self::Pics => "pics",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
