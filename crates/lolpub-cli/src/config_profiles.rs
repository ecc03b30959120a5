//! Persistent CLI profile configuration.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use lolpub_core::config::DEFAULT_API_BASE_URL;
use lolpub_core::util::non_blank;
use lolpub_core::Settings;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const CONFIG_FILE_NAME: &str = "cli-config.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CliProfilesConfig {
    #[serde(default = "default_config_version")]
    pub version: u32,
    #[serde(default)]
    pub active_profile: Option<String>,
    #[serde(default)]
    pub profiles: BTreeMap<String, CliProfile>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CliProfile {
    /// omg.lol address without the leading `@`
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub api_base_url: Option<String>,
    #[serde(default)]
    pub settings: Settings,
}

const fn default_config_version() -> u32 {
    1
}

pub fn default_config_path() -> Result<PathBuf, String> {
    dirs::config_dir()
        .map(|dir| dir.join("lolpub").join(CONFIG_FILE_NAME))
        .ok_or_else(|| "Failed to resolve CLI config directory".to_string())
}

pub fn normalize_profile_name(value: Option<&str>) -> Option<String> {
    let value = value?;
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

impl CliProfilesConfig {
    pub fn load() -> Result<Self, String> {
        Self::load_from_path(&default_config_path()?)
    }

    pub fn load_from_path(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|error| format!("Failed to read config at {}: {}", path.display(), error))?;
        let mut config = serde_json::from_str::<Self>(&raw)
            .map_err(|error| format!("Failed to parse config at {}: {}", path.display(), error))?;
        config.normalize();
        Ok(config)
    }

    pub fn save(&self) -> Result<PathBuf, String> {
        let path = default_config_path()?;
        self.save_to_path(&path)?;
        Ok(path)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|error| {
                format!(
                    "Failed to create config directory {}: {}",
                    parent.display(),
                    error
                )
            })?;
        }

        let mut normalized = self.clone();
        normalized.normalize();
        let serialized = serde_json::to_string_pretty(&normalized)
            .map_err(|error| format!("Failed to serialize config: {error}"))?;
        std::fs::write(path, serialized)
            .map_err(|error| format!("Failed to write config at {}: {}", path.display(), error))
    }

    pub fn resolve_profile_name(&self, explicit: Option<&str>) -> String {
        if let Some(profile) = normalize_profile_name(explicit) {
            return profile;
        }
        if let Some(profile) =
            normalize_profile_name(std::env::var("LOLPUB_PROFILE").ok().as_deref())
        {
            return profile;
        }
        if let Some(profile) = normalize_profile_name(self.active_profile.as_deref()) {
            return profile;
        }
        "default".to_string()
    }

    pub fn profile(&self, name: &str) -> Option<&CliProfile> {
        self.profiles.get(name)
    }

    pub fn profile_mut_or_default(&mut self, name: &str) -> &mut CliProfile {
        self.profiles.entry(name.to_string()).or_default()
    }

    fn normalize(&mut self) {
        self.active_profile = normalize_profile_name(self.active_profile.as_deref());
        for profile in self.profiles.values_mut() {
            profile.normalize();
        }
    }
}

impl CliProfile {
    pub fn address(&self) -> Option<String> {
        non_blank(self.address.clone())
            .map(|address| address.trim_start_matches('@').to_string())
    }

    pub fn api_base_url(&self) -> String {
        non_blank(self.api_base_url.clone())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
    }

    /// Set the value at a dotted key such as `settings.pics.monthly_logs`.
    ///
    /// Text fields take `raw` verbatim; other fields parse it as JSON. The
    /// profile is left unchanged when the key is unknown or the value has the
    /// wrong type.
    pub fn set_value(&mut self, key: &str, raw: &str) -> Result<(), String> {
        let pointer = key_to_pointer(key)?;
        let mut document = serde_json::to_value(&*self)
            .map_err(|error| format!("Failed to serialize profile: {error}"))?;
        let slot = document
            .pointer_mut(&pointer)
            .ok_or_else(|| format!("Unknown config key `{key}`"))?;

        *slot = match &*slot {
            Value::String(_) | Value::Null => Value::String(raw.to_string()),
            _ => serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string())),
        };

        let mut updated = serde_json::from_value::<Self>(document)
            .map_err(|error| format!("Invalid value for `{key}`: {error}"))?;
        updated.normalize();
        *self = updated;
        Ok(())
    }

    fn normalize(&mut self) {
        self.address = non_blank(self.address.clone())
            .map(|address| address.trim_start_matches('@').to_string());
        self.api_base_url = non_blank(self.api_base_url.clone());
    }
}

fn key_to_pointer(key: &str) -> Result<String, String> {
    let segments = key.trim().split('.').collect::<Vec<_>>();
    if segments.iter().any(|segment| segment.trim().is_empty()) {
        return Err(format!("Invalid config key `{key}`"));
    }
    Ok(segments
        .iter()
        .map(|segment| format!("/{}", segment.trim()))
        .collect())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn normalize_profile_name_rejects_empty() {
        assert_eq!(normalize_profile_name(None), None);
        assert_eq!(normalize_profile_name(Some(" ")), None);
    }

    #[test]
    fn config_roundtrip_preserves_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);

        let mut config = CliProfilesConfig {
            version: 1,
            active_profile: Some(" default ".to_string()),
            profiles: BTreeMap::new(),
        };
        let mut profile = CliProfile {
            address: Some(" @foobar ".to_string()),
            api_base_url: Some("  ".to_string()),
            ..CliProfile::default()
        };
        profile.settings.pics.enabled = true;
        config.profiles.insert("default".to_string(), profile);

        config.save_to_path(&path).unwrap();
        let loaded = CliProfilesConfig::load_from_path(&path).unwrap();
        let profile = loaded.profile("default").unwrap();
        assert_eq!(loaded.active_profile.as_deref(), Some("default"));
        assert_eq!(profile.address.as_deref(), Some("foobar"));
        assert_eq!(profile.api_base_url, None);
        assert_eq!(profile.api_base_url(), DEFAULT_API_BASE_URL);
        assert!(profile.settings.pics.enabled);
    }

    #[test]
    fn missing_settings_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(
            &path,
            r#"{"profiles": {"work": {"address": "foobar", "settings": {"weblog": {"slug_word_count": 3}}}}}"#,
        )
        .unwrap();

        let loaded = CliProfilesConfig::load_from_path(&path).unwrap();
        let settings = &loaded.profile("work").unwrap().settings;
        assert_eq!(loaded.version, 1);
        assert_eq!(settings.weblog.slug_word_count, 3);
        assert!(settings.weblog.enable_renaming);
        assert!(settings.status.skip_mastodon_post);
    }

    #[test]
    fn resolve_profile_name_prefers_explicit_then_active() {
        let config = CliProfilesConfig {
            version: 1,
            active_profile: Some("work".to_string()),
            profiles: BTreeMap::new(),
        };
        assert_eq!(config.resolve_profile_name(Some("mobile")), "mobile");
        if std::env::var("LOLPUB_PROFILE").is_err() {
            assert_eq!(config.resolve_profile_name(None), "work");
        }
    }

    #[test]
    fn set_value_parses_by_field_type() {
        let mut profile = CliProfile::default();
        profile.set_value("settings.pics.monthly_logs", "true").unwrap();
        profile.set_value("settings.weblog.slug_word_count", "7").unwrap();
        profile
            .set_value("settings.status.log_note_path", "logs/status")
            .unwrap();
        profile.set_value("address", "@foobar").unwrap();
        profile.set_value("settings.pics.default_tags", "123").unwrap();

        assert!(profile.settings.pics.monthly_logs);
        assert_eq!(profile.settings.weblog.slug_word_count, 7);
        assert_eq!(
            profile.settings.status.log_note_path.as_deref(),
            Some("logs/status")
        );
        assert_eq!(profile.address.as_deref(), Some("foobar"));
        assert_eq!(profile.settings.pics.default_tags, "123");
    }

    #[test]
    fn set_value_rejects_unknown_keys_and_bad_types() {
        let mut profile = CliProfile::default();
        let before = profile.clone();

        assert!(profile.set_value("settings.pics.nope", "true").is_err());
        assert!(profile.set_value("settings..enabled", "true").is_err());
        assert!(profile
            .set_value("settings.weblog.slug_word_count", "many")
            .is_err());
        assert_eq!(profile, before);
    }
}
