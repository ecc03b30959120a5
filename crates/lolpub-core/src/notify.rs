//! User-facing capability consumed by the publisher.
//!
//! The publisher never renders anything itself. It reports through
//! [`Interaction`] and asks it for the few inputs it cannot derive.

use std::path::PathBuf;

use crate::models::TargetKind;

/// One user-visible message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Terminal success.
    Success(String),
    /// Terminal success with a caveat about a secondary step.
    Degraded { message: String, caveat: String },
    /// Terminal failure. `saved_to` names the local copy when one was written.
    Failure {
        target: TargetKind,
        message: String,
        saved_to: Option<PathBuf>,
    },
    /// Non-terminal information such as "nothing to do".
    Info(String),
}

impl Notice {
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Info(_))
    }
}

/// Title and visibility chosen for a new paste.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasteDetails {
    pub title: String,
    pub listed: bool,
}

/// Notification and input surface.
pub trait Interaction {
    fn notify(&self, notice: Notice);

    /// Monotonic progress for bulk operations, `done` of `total`.
    fn progress(&self, done: usize, total: usize, label: &str);

    /// Ask for a paste title and visibility. `None` cancels the operation.
    fn paste_details(&self, default_title: &str, default_listed: bool) -> Option<PasteDetails>;
}
