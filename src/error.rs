/// Error types for ldapie
///
/// Infrastructure failures only. Problems with a typed command are not errors:
/// they are reported as `intelligence::ErrorKind` values inside an analysis.

use thiserror::Error;

/// Main error type for ldapie operations
#[derive(Error, Debug)]
pub enum LdapieError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O errors (file operations, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file could not be parsed
    #[error("Invalid config file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Config could not be written
    #[error("Could not write config: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    /// Command exceeds maximum length
    #[error("Command exceeds maximum allowed length of {0} characters")]
    CommandTooLong(usize),

    /// Invalid command format or content
    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("Could not determine the home directory")]
    HomeDirNotFound,
}

/// Result type alias for ldapie operations
pub type Result<T> = std::result::Result<T, LdapieError>;

impl LdapieError {
    /// What the CLI prints when the error reaches the top level
    pub fn user_message(&self) -> String {
        match self {
            LdapieError::Database(e) => {
                format!("History database error. Please try again. Details: {}", e)
            }
            LdapieError::Io(e) => {
                format!("File system error. Check permissions. Details: {}", e)
            }
            LdapieError::ConfigParse(e) => {
                format!("Config file is not valid TOML: {}", e)
            }
            LdapieError::ConfigWrite(e) => {
                format!("Could not save configuration: {}", e)
            }
            LdapieError::CommandTooLong(max) => {
                format!("Command exceeds maximum length of {} characters", max)
            }
            LdapieError::InvalidCommand(reason) => {
                format!("Invalid command: {}", reason)
            }
            LdapieError::HomeDirNotFound => {
                "Could not find your home directory. Set history.database in the config file".to_string()
            }
        }
    }
}
