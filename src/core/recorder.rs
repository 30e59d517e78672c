// Records finished turns to the database
//
// Passwords never hit the disk: -p/--password values and password= are masked
// before anything is written.

use crate::db::{CommandRecord, Database, ValueKind};
use crate::error::{LdapieError, Result};
use crate::intelligence::{AnalysisResult, TurnState};
use crate::intelligence::redact::redact_secrets;
use crate::intelligence::tokenizer::strip_help_marker;
use std::sync::Arc;

// Nobody types a 10KB LDAP command
const MAX_COMMAND_LENGTH: usize = 10_000;

// Shell built-ins are not LDAP commands
const BUILTINS: &[&str] = &["quit", "exit", "suggest", "history", "recent", "help", "validate"];

pub struct Recorder {
    db: Arc<Database>,
    session_id: String,
}

impl Recorder {
    pub fn new(db: Arc<Database>, session_id: impl Into<String>) -> Self {
        Self {
            db,
            session_id: session_id.into(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Persist a finished turn.
    ///
    /// Returns `Ok(None)` when the line is not worth keeping (built-ins and
    /// help queries). Hosts, base DNs and filters of commands that ran
    /// successfully are remembered for later sessions.
    pub async fn record(&self, analysis: &AnalysisResult, succeeded: bool) -> Result<Option<i64>> {
        if self.should_ignore(&analysis.input) {
            return Ok(None);
        }

        self.validate_command(&analysis.input)?;

        let sanitized = self.sanitize_command(&analysis.input);
        let redacted = self.redact(&sanitized);
        let classified = analysis.state == TurnState::Classified;

        let id = self
            .db
            .record_command(CommandRecord {
                session_id: self.session_id.clone(),
                raw_text: redacted,
                intent: classified.then_some(analysis.intent),
                succeeded: classified && succeeded,
            })
            .await?;

        if classified && succeeded {
            let values = [
                (
                    ValueKind::Host,
                    analysis.argument("host").or_else(|| analysis.flag_value("--host")),
                ),
                (
                    ValueKind::Base,
                    analysis.argument("base_dn").or_else(|| analysis.flag_value("--base")),
                ),
                (ValueKind::Filter, analysis.argument("filter")),
            ];
            for (kind, value) in values {
                if let Some(value) = value {
                    self.db.record_value(kind, value).await?;
                }
            }
        }

        tracing::debug!(id, intent = %analysis.intent, "recorded command");

        Ok(Some(id))
    }

    // Not empty, not huge
    fn validate_command(&self, command: &str) -> Result<()> {
        let trimmed = command.trim();
        if trimmed.is_empty() {
            return Err(LdapieError::InvalidCommand("empty command".to_string()));
        }

        if trimmed.len() > MAX_COMMAND_LENGTH {
            return Err(LdapieError::CommandTooLong(MAX_COMMAND_LENGTH));
        }

        Ok(())
    }

    /// Sanitize a command string
    ///
    /// - Removes null bytes
    /// - Trims whitespace
    /// - Normalizes whitespace (multiple spaces to single)
    fn sanitize_command(&self, command: &str) -> String {
        command
            .replace('\0', "")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Mask password values
    pub fn redact(&self, command: &str) -> String {
        redact_secrets(command)
    }

    /// Built-ins, help queries and blank lines are not recorded
    pub fn should_ignore(&self, command: &str) -> bool {
        let (partial, help) = strip_help_marker(command);
        if help || partial.is_empty() {
            return true;
        }

        let first = partial.split_whitespace().next().unwrap_or_default();
        BUILTINS.contains(&first.to_lowercase().as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intelligence::{Analyzer, Context, Intent};

    async fn create_test_recorder() -> (Recorder, Arc<Database>) {
        let db = Arc::new(Database::new_in_memory().await.unwrap());
        (Recorder::new(Arc::clone(&db), "test-session"), db)
    }

    fn analysis(line: &str) -> AnalysisResult {
        Analyzer::analyze(line, &Context::new())
    }

    #[tokio::test]
    async fn test_record_valid_command() {
        let (recorder, db) = create_test_recorder().await;

        let id = recorder
            .record(&analysis("search   ldap.example.com  dc=example,dc=com"), true)
            .await
            .unwrap();
        assert!(id.is_some());

        let stored = db.get_recent_commands(1).await.unwrap();
        assert_eq!(stored[0].raw_text, "search ldap.example.com dc=example,dc=com");
        assert_eq!(stored[0].intent(), Some(Intent::Search));
        assert_eq!(stored[0].session_id, "test-session");
    }

    #[tokio::test]
    async fn test_values_remembered_on_success() {
        let (recorder, db) = create_test_recorder().await;

        recorder
            .record(&analysis("search ldap.example.com dc=example,dc=com (cn=a)"), true)
            .await
            .unwrap();
        recorder
            .record(&analysis("search other.example.com dc=other,dc=com"), false)
            .await
            .unwrap();

        let hosts = db.get_values(ValueKind::Host, 10).await.unwrap();
        assert_eq!(hosts.len(), 1);
        assert_eq!(hosts[0].value, "ldap.example.com");
        assert_eq!(db.get_values(ValueKind::Filter, 10).await.unwrap()[0].value, "(cn=a)");
    }

    #[tokio::test]
    async fn test_failed_analysis_is_recorded_without_intent() {
        let (recorder, db) = create_test_recorder().await;

        recorder.record(&analysis("serch host"), false).await.unwrap();

        let stored = db.get_recent_commands(1).await.unwrap();
        assert_eq!(stored[0].intent, None);
        assert!(!stored[0].succeeded);
    }

    #[tokio::test]
    async fn test_redact_passwords() {
        let (recorder, _) = create_test_recorder().await;

        assert_eq!(
            recorder.redact("info host -u cn=admin -p s3cret"),
            "info host -u cn=admin -p ******"
        );
        assert_eq!(
            recorder.redact("info host --password \"two words\""),
            "info host --password ******"
        );
        assert_eq!(recorder.redact("info host --password=s3cret"), "info host --password=******");
        assert_eq!(recorder.redact("add host dn --attr userPassword=x"), "add host dn --attr userPassword=******");
        assert_eq!(recorder.redact("search host dc=x"), "search host dc=x");
    }

    #[tokio::test]
    async fn test_password_never_stored() {
        let (recorder, db) = create_test_recorder().await;

        recorder
            .record(&analysis("info ldap.example.com -p hunter2"), true)
            .await
            .unwrap();

        let stored = db.get_recent_commands(1).await.unwrap();
        assert!(!stored[0].raw_text.contains("hunter2"));
    }

    #[tokio::test]
    async fn test_should_ignore() {
        let (recorder, _) = create_test_recorder().await;

        assert!(recorder.should_ignore("quit"));
        assert!(recorder.should_ignore("history ldap"));
        assert!(recorder.should_ignore("search?"));
        assert!(recorder.should_ignore("   "));
        assert!(!recorder.should_ignore("search host dc=x"));

        let id = recorder.record(&analysis("suggest"), true).await.unwrap();
        assert_eq!(id, None);
    }

    #[tokio::test]
    async fn test_command_too_long() {
        let (recorder, _) = create_test_recorder().await;

        let long_cmd = format!("search {}", "a".repeat(MAX_COMMAND_LENGTH + 1));
        let result = recorder.record(&analysis(&long_cmd), true).await;

        match result {
            Err(LdapieError::CommandTooLong(_)) => {}
            _ => panic!("Expected CommandTooLong error"),
        }
    }
}
