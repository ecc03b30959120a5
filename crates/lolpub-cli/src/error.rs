use std::io;
use std::path::PathBuf;

use lolpub_core::TargetKind;
use thiserror::Error;

use crate::auth::AuthError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] lolpub_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("No status text provided")]
    EmptyContent,
    #[error("Editor command failed: {0}")]
    EditorFailed(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("{} is outside the vault {}", .path.display(), .vault.display())]
    OutsideVault { path: PathBuf, vault: PathBuf },
    #[error(
        "No API token for profile '{0}'. Run `lolpub auth login --token <TOKEN>` or set OMGLOL_API_TOKEN."
    )]
    MissingToken(String),
    #[error(
        "No omg.lol address for profile '{0}'. Run `lolpub config init --address <NAME>` or set OMGLOL_ADDRESS."
    )]
    MissingAddress(String),
    #[error("{0} was not published")]
    NotPublished(TargetKind),
}

impl CliError {
    /// Whether the user has already seen this failure as a terminal notice.
    pub const fn already_reported(&self) -> bool {
        matches!(self, Self::NotPublished(_))
    }
}
