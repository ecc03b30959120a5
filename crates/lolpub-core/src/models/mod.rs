//! Data models for lolpub

mod content;
mod draft;
mod identity;
mod log_entry;
mod outcome;
mod target;

pub use content::ContentItem;
pub use draft::{PasteDraft, PicMetadata, WeblogDraft};
pub use identity::RemoteIdentity;
pub use log_entry::LogEntry;
pub use outcome::PublishOutcome;
pub use target::TargetKind;
