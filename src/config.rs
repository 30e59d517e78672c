// Configuration file
//
// Lives at <config_dir>/ldapie/config.toml. Every key is optional; a missing
// file means defaults. A file that does not parse is an error rather than
// being silently ignored.

use crate::error::{LdapieError, Result};
use crate::intelligence::{DEFAULT_HISTORY_LIMIT, MAX_SUGGESTIONS};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "ldapie";
const DEFAULT_PROMPT: &str = "ldapie> ";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Entries kept in the session context
    pub limit: usize,
    /// Write finished commands to the history database
    pub persist: bool,
    /// Overrides ~/.ldapie/history.db
    pub database: Option<PathBuf>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_HISTORY_LIMIT,
            persist: true,
            database: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestionConfig {
    pub max: usize,
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self { max: MAX_SUGGESTIONS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    pub prompt: String,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub history: HistoryConfig,
    pub suggestions: SuggestionConfig,
    pub shell: ShellConfig,
}

impl Config {
    /// Default location of the config file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_NAME).join("config.toml"))
    }

    /// Load from the default location, or defaults when there is no file
    pub fn load() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// History database path, `~/.ldapie/history.db` unless configured
    pub fn database_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.history.database {
            return Ok(path.clone());
        }

        let home = dirs::home_dir().ok_or(LdapieError::HomeDirNotFound)?;
        Ok(home.join(".ldapie").join("history.db"))
    }

    /// Suggestions per request, between 1 and the engine maximum
    pub fn suggestion_limit(&self) -> usize {
        self.suggestions.max.clamp(1, MAX_SUGGESTIONS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.history.limit, 50);
        assert!(config.history.persist);
        assert_eq!(config.suggestion_limit(), 5);
        assert_eq!(config.shell.prompt, "ldapie> ");
    }

    #[test]
    fn test_partial_file() {
        let config: Config = toml::from_str("[history]\nlimit = 10\n").unwrap();
        assert_eq!(config.history.limit, 10);
        assert!(config.history.persist);
        assert_eq!(config.suggestions, SuggestionConfig::default());
    }

    #[test]
    fn test_suggestion_limit_is_clamped() {
        let mut config = Config::default();
        config.suggestions.max = 50;
        assert_eq!(config.suggestion_limit(), 5);
        config.suggestions.max = 0;
        assert_eq!(config.suggestion_limit(), 1);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ldapie").join("config.toml");

        let mut config = Config::default();
        config.history.database = Some(dir.path().join("h.db"));
        config.shell.prompt = "> ".to_string();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.database_path().unwrap(), dir.path().join("h.db"));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[history\nlimit = ").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(LdapieError::ConfigParse(_))
        ));
    }
}
