//! Account and per-target settings.
//!
//! Both values are passed explicitly into every component; nothing here is
//! global. Defaults mirror what a fresh install starts with.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::util::{is_http_url, non_blank};
use crate::{Error, Result};

pub const DEFAULT_API_BASE_URL: &str = "https://api.omg.lol";
pub const DEFAULT_PICS_LOG_PATH: &str = "_pics-upload-log.md";

/// The omg.lol account every target publishes under.
#[derive(Clone, PartialEq, Eq)]
pub struct Account {
    pub address: String,
    pub token: String,
    pub api_base_url: String,
}

impl Account {
    #[must_use]
    pub fn new(address: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            token: token.into(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }

    #[must_use]
    pub fn with_api_base_url(mut self, api_base_url: impl Into<String>) -> Self {
        self.api_base_url = api_base_url.into();
        self
    }

    /// Fails fast when the address or token is missing so that no malformed
    /// URL or unauthenticated request is ever built.
    pub fn validate(&self) -> Result<()> {
        if non_blank(Some(self.address.clone())).is_none() {
            return Err(Error::Configuration(
                "omg.lol address is not configured".to_string(),
            ));
        }
        if non_blank(Some(self.token.clone())).is_none() {
            return Err(Error::Configuration(
                "omg.lol API token is not configured".to_string(),
            ));
        }
        if !is_http_url(self.api_base_url.trim()) {
            return Err(Error::Configuration(
                "API base URL must include http:// or https://".to_string(),
            ));
        }
        Ok(())
    }

    /// Address with surrounding whitespace and a leading `@` removed.
    #[must_use]
    pub fn normalized_address(&self) -> String {
        self.address.trim().trim_start_matches('@').to_string()
    }

    #[must_use]
    pub fn normalized_base_url(&self) -> String {
        self.api_base_url.trim().trim_end_matches('/').to_string()
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Account")
            .field("address", &self.address)
            .field("token", &"[REDACTED]")
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

/// Settings snapshot for all publish targets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub status: StatusSettings,
    pub weblog: WeblogSettings,
    pub pics: PicsSettings,
    pub paste: PasteSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct StatusSettings {
    pub enabled: bool,
    pub skip_mastodon_post: bool,
    /// Emoji used when the status text does not start with one
    pub default_emoji: String,
    pub save_to_note: bool,
    /// Log note path without the `.md` extension, e.g. `logs/status-log`
    pub log_note_path: Option<String>,
    pub also_log_to_daily: bool,
    /// Folder holding `YYYY-MM-DD.md` daily notes; vault root when unset
    pub daily_notes_folder: Option<String>,
    /// Folder for failed-status fallback notes; vault root when unset
    pub fallback_folder: Option<String>,
}

impl Default for StatusSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            skip_mastodon_post: true,
            default_emoji: "💬".to_string(),
            save_to_note: true,
            log_note_path: None,
            also_log_to_daily: false,
            daily_notes_folder: None,
            fallback_folder: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeblogSettings {
    pub enabled: bool,
    /// Rename the document to `{date}_{slug}.md` after publishing
    pub enable_renaming: bool,
    /// Also rename documents whose front-matter says `type: page`
    pub rename_pages: bool,
    pub slug_word_count: usize,
}

impl Default for WeblogSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            enable_renaming: true,
            rename_pages: false,
            slug_word_count: 5,
        }
    }
}

impl WeblogSettings {
    /// Word count clamped to at least one token.
    #[must_use]
    pub fn effective_slug_word_count(&self) -> usize {
        self.slug_word_count.max(1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct PicsSettings {
    pub enabled: bool,
    pub default_tags: String,
    /// Enables generated alt text when set
    pub openai_api_key: Option<String>,
    pub delete_after_upload: bool,
    pub maintain_log: bool,
    pub log_path: String,
    /// One log file per calendar month plus an index file
    pub monthly_logs: bool,
}

impl Default for PicsSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            default_tags: "omgPublish".to_string(),
            openai_api_key: None,
            delete_after_upload: false,
            maintain_log: false,
            log_path: DEFAULT_PICS_LOG_PATH.to_string(),
            monthly_logs: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PasteSettings {
    pub enabled: bool,
}

impl Default for PasteSettings {
    fn default() -> Self {
        Self { enabled: true }
    }
}
