//! Client-local persisted key/value state.
//!
//! Four keys survive between invocations: `username`, `userEmail`,
//! `userData` (the JSON-serialized profile) and `sessionToken`. They are
//! written at sign-in, read by every protected command, and removed together
//! at logout. The file lives in the platform config directory unless an
//! explicit state directory is given.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;

use crate::error::CliError;

pub const KEY_USERNAME: &str = "username";
pub const KEY_USER_EMAIL: &str = "userEmail";
pub const KEY_USER_DATA: &str = "userData";
pub const KEY_SESSION_TOKEN: &str = "sessionToken";

pub const SESSION_KEYS: [&str; 4] = [KEY_USERNAME, KEY_USER_EMAIL, KEY_USER_DATA, KEY_SESSION_TOKEN];

const STATE_FILE: &str = "session.json";

/// Resolve the directory holding the state file.
///
/// # Errors
///
/// [`CliError::NoStateDir`] when no override is given and the platform has no
/// usable home directory.
pub fn state_dir(override_dir: Option<&Path>) -> Result<PathBuf, CliError> {
    if let Some(dir) = override_dir {
        return Ok(dir.to_path_buf());
    }
    ProjectDirs::from("dev", "WorkshopPool", "pool")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or(CliError::NoStateDir)
}

#[derive(Debug)]
pub struct LocalStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl LocalStore {
    /// Open (or lazily create) the store in `dir`.
    ///
    /// # Errors
    ///
    /// Fails when an existing state file cannot be read or parsed.
    pub fn open(dir: &Path) -> Result<Self, CliError> {
        let path = dir.join(STATE_FILE);
        let values = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, values })
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// # Errors
    ///
    /// Fails when the state file cannot be written.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> Result<(), CliError> {
        self.values.insert(key.to_owned(), value.into());
        self.save()
    }

    /// Set several keys with a single write.
    ///
    /// # Errors
    ///
    /// Fails when the state file cannot be written.
    pub fn set_all<'a>(&mut self, pairs: impl IntoIterator<Item = (&'a str, String)>) -> Result<(), CliError> {
        for (key, value) in pairs {
            self.values.insert(key.to_owned(), value);
        }
        self.save()
    }

    /// Swap the whole session in one write: every session key is dropped,
    /// then `pairs` are stored. Keys absent from `pairs` stay unset.
    ///
    /// # Errors
    ///
    /// Fails when the state file cannot be written.
    pub fn replace_session<'a>(&mut self, pairs: impl IntoIterator<Item = (&'a str, String)>) -> Result<(), CliError> {
        for key in SESSION_KEYS {
            self.values.remove(key);
        }
        self.set_all(pairs)
    }

    /// Remove every session key. Irreversible.
    ///
    /// # Errors
    ///
    /// Fails when the state file cannot be written.
    pub fn clear(&mut self) -> Result<(), CliError> {
        for key in SESSION_KEYS {
            self.values.remove(key);
        }
        self.save()
    }

    fn save(&self) -> Result<(), CliError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let rendered = serde_json::to_string_pretty(&self.values)?;
        fs::write(&self.path, rendered)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
