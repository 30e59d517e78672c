/// ldapie library
///
/// Command analysis, corrections, suggestions and progressive help for the
/// LDAPie shell.

pub mod config;
pub mod core;
pub mod db;
pub mod error;
pub mod intelligence;
pub mod shell;

// Re-exports for convenience
pub use config::Config;
pub use db::Database;
pub use error::{LdapieError, Result};
