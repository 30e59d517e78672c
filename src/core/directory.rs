/// The directory collaborator
///
/// Everything that talks to an LDAP server sits behind [`Directory`]. The
/// engine only needs to know whether a command ran, and if not, whether the
/// server could not be reached or refused the operation.

use crate::intelligence::{AnalysisResult, Analyzer, ErrorKind};
use serde::Serialize;
use thiserror::Error;

// Well-known server messages and what they usually mean
const SERVER_MESSAGE_HINTS: &[(&str, &str)] = &[
    ("no such object", "The specified DN does not exist"),
    ("already exists", "Entry already exists"),
    ("invalid filter", "The LDAP filter syntax is incorrect"),
    (
        "insufficient access rights",
        "You don't have permission for this operation",
    ),
    (
        "invalid dn syntax",
        "The DN syntax is incorrect. Check for proper escaping and formatting",
    ),
    (
        "not allowed on non-leaf",
        "The entry has children. Use --recursive to delete the subtree",
    ),
];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    /// The server could not be reached or the bind failed
    #[error("connection failed: {0}")]
    Connection(String),

    /// The server rejected the operation
    #[error("operation failed: {0}")]
    Operation(String),
}

impl DirectoryError {
    /// The value stored in `Context::last_error` for this failure
    pub fn into_error_kind(self) -> ErrorKind {
        match self {
            DirectoryError::Connection(message) => ErrorKind::ConnectionError { message },
            DirectoryError::Operation(message) => {
                let hint = hint_for_server_message(&message).map(str::to_string);
                ErrorKind::OperationError { message, hint }
            }
        }
    }
}

/// Explanation for a server error message, matched case-insensitively
pub fn hint_for_server_message(message: &str) -> Option<&'static str> {
    let message = message.to_lowercase();
    SERVER_MESSAGE_HINTS
        .iter()
        .find(|(needle, _)| message.contains(needle))
        .map(|(_, hint)| *hint)
}

/// What a successful command produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryOutcome {
    pub summary: String,
    /// Result lines, already formatted by the directory
    pub entries: Vec<String>,
}

/// Executes classified commands against an LDAP server
pub trait Directory {
    fn execute(&mut self, command: &AnalysisResult) -> Result<DirectoryOutcome, DirectoryError>;
}

/// Runs nothing and reports what would have happened
#[derive(Debug, Default, Clone)]
pub struct DryRunDirectory;

impl Directory for DryRunDirectory {
    fn execute(&mut self, command: &AnalysisResult) -> Result<DirectoryOutcome, DirectoryError> {
        Ok(DirectoryOutcome {
            summary: Analyzer::preview(command),
            entries: Vec::new(),
        })
    }
}
