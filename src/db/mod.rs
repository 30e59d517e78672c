/// Database module for ldapie
///
/// Persists command history and recently used hosts, base DNs and filters in
/// SQLite through sqlx.

pub mod connection;
pub mod models;
pub mod queries;

pub use connection::{Database, DatabaseStats};
pub use models::*;
pub use queries::MAX_VALUES_PER_KIND;
