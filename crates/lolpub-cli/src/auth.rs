//! CLI API token helpers with secure keychain persistence.

#[cfg(test)]
use std::collections::HashMap;
#[cfg(test)]
use std::sync::{Mutex, OnceLock};

#[cfg(not(test))]
use keyring::Entry;
use lolpub_core::util::non_blank;
use thiserror::Error;

#[cfg(not(test))]
const KEYRING_SERVICE_NAME: &str = "lolpub-cli";

pub const TOKEN_ENV_VAR: &str = "OMGLOL_API_TOKEN";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Secure storage error: {0}")]
    SecureStorage(String),
    #[error("API token cannot be empty")]
    EmptyToken,
}

pub type AuthResult<T> = Result<T, AuthError>;

/// Where the token in use came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    Environment,
    Keychain,
}

#[derive(Clone)]
struct TokenStore {
    username: String,
}

impl TokenStore {
    fn new(profile_name: &str) -> Self {
        Self {
            username: format!("api_token:{profile_name}"),
        }
    }

    #[cfg(test)]
    fn test_store() -> &'static Mutex<HashMap<String, String>> {
        static STORE: OnceLock<Mutex<HashMap<String, String>>> = OnceLock::new();
        STORE.get_or_init(|| Mutex::new(HashMap::new()))
    }

    #[cfg(not(test))]
    fn entry(&self) -> AuthResult<Entry> {
        Entry::new(KEYRING_SERVICE_NAME, &self.username)
            .map_err(|error| AuthError::SecureStorage(error.to_string()))
    }

    #[cfg(not(test))]
    fn load(&self) -> AuthResult<Option<String>> {
        match self.entry()?.get_password() {
            Ok(token) => Ok(non_blank(Some(token))),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(error) => Err(AuthError::SecureStorage(error.to_string())),
        }
    }

    #[cfg(test)]
    fn load(&self) -> AuthResult<Option<String>> {
        let guard = Self::test_store()
            .lock()
            .map_err(|error| AuthError::SecureStorage(error.to_string()))?;
        Ok(guard.get(&self.username).cloned())
    }

    #[cfg(not(test))]
    fn save(&self, token: &str) -> AuthResult<()> {
        self.entry()?
            .set_password(token)
            .map_err(|error| AuthError::SecureStorage(error.to_string()))
    }

    #[cfg(test)]
    fn save(&self, token: &str) -> AuthResult<()> {
        let mut guard = Self::test_store()
            .lock()
            .map_err(|error| AuthError::SecureStorage(error.to_string()))?;
        guard.insert(self.username.clone(), token.to_string());
        Ok(())
    }

    #[cfg(not(test))]
    fn clear(&self) -> AuthResult<()> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(error) => Err(AuthError::SecureStorage(error.to_string())),
        }
    }

    #[cfg(test)]
    fn clear(&self) -> AuthResult<()> {
        let mut guard = Self::test_store()
            .lock()
            .map_err(|error| AuthError::SecureStorage(error.to_string()))?;
        guard.remove(&self.username);
        Ok(())
    }
}

pub fn store_token(profile_name: &str, token: &str) -> AuthResult<()> {
    let token = non_blank(Some(token.to_string())).ok_or(AuthError::EmptyToken)?;
    TokenStore::new(profile_name).save(&token)
}

pub fn load_stored_token(profile_name: &str) -> AuthResult<Option<String>> {
    TokenStore::new(profile_name).load()
}

pub fn clear_stored_token(profile_name: &str) -> AuthResult<()> {
    TokenStore::new(profile_name).clear()
}

/// Token from `OMGLOL_API_TOKEN`, else from the profile's keychain entry.
pub fn resolve_token(profile_name: &str) -> AuthResult<Option<(String, TokenSource)>> {
    if let Some(token) = non_blank(std::env::var(TOKEN_ENV_VAR).ok()) {
        return Ok(Some((token, TokenSource::Environment)));
    }
    Ok(load_stored_token(profile_name)?.map(|token| (token, TokenSource::Keychain)))
}

/// Token shortened for display, e.g. `abcd…wxyz`.
pub fn mask_token(token: &str) -> String {
    let chars = token.chars().collect::<Vec<_>>();
    if chars.len() <= 8 {
        return "[REDACTED]".to_string();
    }
    let head = chars[..4].iter().collect::<String>();
    let tail = chars[chars.len() - 4..].iter().collect::<String>();
    format!("{head}…{tail}")
}
