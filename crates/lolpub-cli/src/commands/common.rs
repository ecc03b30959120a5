use std::env;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

use lolpub_core::client::ReqwestTransport;
use lolpub_core::store::FsDocumentStore;
use lolpub_core::util::non_blank;
use lolpub_core::{Account, PublishOutcome, Publisher, Settings};

use crate::auth::resolve_token;
use crate::config_profiles::CliProfilesConfig;
use crate::error::CliError;
use crate::terminal::TerminalInteraction;

pub const ADDRESS_ENV_VAR: &str = "OMGLOL_ADDRESS";
pub const VAULT_ENV_VAR: &str = "LOLPUB_VAULT";

/// Everything a publish command needs, resolved from flags, env and profile.
pub struct PublishContext {
    pub profile_name: String,
    pub account: Account,
    pub settings: Settings,
    pub store: FsDocumentStore,
    pub interaction: TerminalInteraction,
}

impl PublishContext {
    pub fn load(global_profile: Option<&str>, vault: Option<PathBuf>) -> Result<Self, CliError> {
        let config = CliProfilesConfig::load().map_err(CliError::Config)?;
        let profile_name = config.resolve_profile_name(global_profile);
        let profile = config.profile(&profile_name).cloned().unwrap_or_default();

        let address = non_blank(env::var(ADDRESS_ENV_VAR).ok())
            .map(|address| address.trim_start_matches('@').to_string())
            .or_else(|| profile.address())
            .ok_or_else(|| CliError::MissingAddress(profile_name.clone()))?;
        let (token, source) =
            resolve_token(&profile_name)?.ok_or_else(|| CliError::MissingToken(profile_name.clone()))?;
        tracing::debug!(profile = %profile_name, ?source, "Resolved API token");

        let account = Account::new(address, token).with_api_base_url(profile.api_base_url());
        let vault = resolve_vault(vault)?;
        tracing::debug!(vault = %vault.display(), "Using vault");

        Ok(Self {
            profile_name,
            account,
            settings: profile.settings,
            store: FsDocumentStore::new(vault),
            interaction: TerminalInteraction,
        })
    }

    pub fn publisher(
        &self,
    ) -> Result<Publisher<'_, ReqwestTransport, FsDocumentStore, TerminalInteraction>, CliError> {
        let transport = ReqwestTransport::new().map_err(CliError::Config)?;
        tracing::debug!(
            profile = %self.profile_name,
            address = %self.account.address,
            "Creating publisher"
        );
        Ok(Publisher::new(
            &self.account,
            &self.settings,
            transport,
            &self.store,
            &self.interaction,
        )?)
    }

    /// Vault-relative form of a path given on the command line.
    pub fn document_path(&self, path: &Path) -> Result<PathBuf, CliError> {
        vault_relative(self.store.root(), &env::current_dir()?, path)
    }
}

pub fn resolve_vault(cli_vault: Option<PathBuf>) -> Result<PathBuf, CliError> {
    let current_dir = env::current_dir()?;
    let vault = cli_vault
        .or_else(|| env::var_os(VAULT_ENV_VAR).map(PathBuf::from))
        .unwrap_or_else(|| current_dir.clone());
    if vault.is_absolute() {
        Ok(vault)
    } else {
        Ok(current_dir.join(vault))
    }
}

pub fn vault_relative(vault: &Path, current_dir: &Path, path: &Path) -> Result<PathBuf, CliError> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        current_dir.join(path)
    };
    absolute
        .strip_prefix(vault)
        .map(Path::to_path_buf)
        .map_err(|_| CliError::OutsideVault {
            path: path.to_path_buf(),
            vault: vault.to_path_buf(),
        })
}

/// Turn an outcome that kept nothing remote into a failing exit. The failure
/// notice has already been shown, so the error is not printed again.
pub fn ensure_published(outcome: &PublishOutcome) -> Result<(), CliError> {
    match outcome {
        PublishOutcome::SavedLocally { target, .. } => Err(CliError::NotPublished(*target)),
        PublishOutcome::Published { .. }
        | PublishOutcome::Degraded { .. }
        | PublishOutcome::Cancelled => Ok(()),
    }
}

pub fn resolve_status_text(content_parts: &[String]) -> Result<String, CliError> {
    if let Some(content) = normalize_content(&content_parts.join(" ")) {
        return Ok(content);
    }

    if let Some(content) = read_piped_stdin()? {
        return Ok(content);
    }

    if let Some(content) = capture_editor_input()? {
        return Ok(content);
    }

    Err(CliError::EmptyContent)
}

pub fn normalize_content(content: &str) -> Option<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn read_piped_stdin() -> Result<Option<String>, CliError> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut buffer = String::new();
    stdin.lock().read_to_string(&mut buffer)?;
    Ok(normalize_content(&buffer))
}

pub fn capture_editor_input() -> Result<Option<String>, CliError> {
    let editor = preferred_editor();
    let temp_file = create_temp_status_file_path();
    std::fs::write(&temp_file, "")?;

    let launch_result = launch_editor(&editor, &temp_file);
    let content = std::fs::read_to_string(&temp_file)?;
    let _ = std::fs::remove_file(&temp_file);

    launch_result?;
    Ok(normalize_content(&content))
}

pub fn launch_editor(editor: &str, file_path: &Path) -> Result<(), CliError> {
    match Command::new(editor).arg(file_path).status() {
        Ok(status) => {
            if status.success() {
                Ok(())
            } else {
                Err(CliError::EditorFailed(format!(
                    "`{editor}` exited with status {status}"
                )))
            }
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            let mut parts = editor.split_whitespace();
            let Some(program) = parts.next() else {
                return Err(CliError::EditorFailed("empty EDITOR command".into()));
            };

            let mut command = Command::new(program);
            command.args(parts).arg(file_path);

            let status = command.status()?;
            if status.success() {
                Ok(())
            } else {
                Err(CliError::EditorFailed(format!(
                    "`{editor}` exited with status {status}"
                )))
            }
        }
        Err(err) => Err(CliError::Io(err)),
    }
}

pub fn preferred_editor() -> String {
    env::var("VISUAL")
        .or_else(|_| env::var("EDITOR"))
        .unwrap_or_else(|_| default_editor().to_string())
}

pub const fn default_editor() -> &'static str {
    if cfg!(windows) {
        "notepad"
    } else {
        "vi"
    }
}

pub fn create_temp_status_file_path() -> PathBuf {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_nanos());
    env::temp_dir().join(format!("lolpub-status-{}-{now}.md", std::process::id()))
}
