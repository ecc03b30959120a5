//! lolpub-core - Core library for lolpub
//!
//! Publishes local Markdown documents to omg.lol (status.lol, weblog.lol,
//! paste.lol and some.pics) and reconciles the service's answer back into the
//! document's front-matter, its file name and optional log notes.

pub mod alt_text;
pub mod audit_log;
pub mod client;
pub mod config;
pub mod error;
pub mod extract;
pub mod fallback;
pub mod frontmatter;
pub mod models;
pub mod notify;
pub mod payload;
pub mod publish;
pub mod reconcile;
pub mod slug;
pub mod store;
pub mod util;

pub use config::{Account, Settings};
pub use error::{Error, PublishError, PublishFailure, Result};
pub use models::{PublishOutcome, RemoteIdentity, TargetKind};
pub use publish::Publisher;
