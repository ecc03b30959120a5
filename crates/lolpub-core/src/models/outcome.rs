//! Terminal outcome of a publish operation

use std::path::PathBuf;

use super::{RemoteIdentity, TargetKind};

/// What happened, reported once per user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// The remote call succeeded and local state was reconciled.
    Published {
        target: TargetKind,
        identity: RemoteIdentity,
        updated: bool,
    },
    /// The primary artifact is live but a secondary step failed.
    Degraded {
        target: TargetKind,
        identity: RemoteIdentity,
        caveat: String,
    },
    /// The remote call failed; the content is safe at `local_path`.
    SavedLocally {
        target: TargetKind,
        local_path: PathBuf,
        reason: String,
    },
    /// The user dismissed the prompt before anything was sent.
    Cancelled,
}

impl PublishOutcome {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Published { .. } | Self::Degraded { .. })
    }

    #[must_use]
    pub const fn identity(&self) -> Option<&RemoteIdentity> {
        match self {
            Self::Published { identity, .. } | Self::Degraded { identity, .. } => Some(identity),
            Self::SavedLocally { .. } | Self::Cancelled => None,
        }
    }
}
