/// Line-oriented interactive shell
///
/// Reads commands one line at a time and prints what the session made of
/// them. Only `quit`, `exit` or end of input stop it; a bad line never does.

use crate::core::Directory;
use crate::db::ValueKind;
use crate::error::Result;
use crate::shell::render;
use crate::shell::session::{Session, TurnOutcome};
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

const HISTORY_LIMIT: usize = 20;
const RECENT_LIMIT: usize = 10;

pub struct Repl<D: Directory> {
    session: Session<D>,
    prompt: String,
    suggestion_limit: usize,
}

impl<D: Directory> Repl<D> {
    pub fn new(session: Session<D>, prompt: impl Into<String>, suggestion_limit: usize) -> Self {
        Self {
            session,
            prompt: prompt.into(),
            suggestion_limit,
        }
    }

    pub fn session(&self) -> &Session<D> {
        &self.session
    }

    /// Run until `quit`/`exit` or end of input
    pub async fn run<R, W>(&mut self, mut input: R, output: &mut W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        writeln!(output, "LDAPie shell. Type ? for help, quit to leave.")?;

        let mut line = String::new();
        loop {
            write!(output, "{}", self.prompt)?;
            output.flush()?;

            line.clear();
            if input.read_line(&mut line).await? == 0 {
                writeln!(output)?;
                break;
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            if !self.dispatch(trimmed, output).await? {
                break;
            }
        }

        tracing::info!(turns = self.session.context().history().len(), "shell closed");
        Ok(())
    }

    /// Handle one line; `false` ends the loop
    async fn dispatch<W: Write>(&mut self, line: &str, output: &mut W) -> Result<bool> {
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word.to_lowercase().as_str() {
            "quit" | "exit" => return Ok(false),
            "suggest" => {
                let suggestions = self.session.suggestions(self.suggestion_limit);
                write!(output, "{}", render::render_suggestions(&suggestions))?;
            }
            "history" => {
                let query = (!rest.is_empty()).then_some(rest);
                let lines = self.session.history(query, HISTORY_LIMIT).await?;
                write!(output, "{}", render::render_history(&lines))?;
            }
            "recent" => {
                let kinds = match rest {
                    "" => ValueKind::ALL.to_vec(),
                    name => match ValueKind::from_name(name) {
                        Some(kind) => vec![kind],
                        None => {
                            writeln!(output, "recent: expected host, base or filter")?;
                            return Ok(true);
                        }
                    },
                };
                for kind in kinds {
                    let values = self.session.remembered(kind, RECENT_LIMIT).await?;
                    write!(output, "{}", render::render_remembered(kind, &values))?;
                }
            }
            "validate" => {
                let validation = self.session.validate(rest);
                write!(output, "{}", render::render_validation(&validation))?;
            }
            // `help x` is the same as `x ?`, so repeating it goes deeper too
            "help" => {
                let outcome = self.session.run_turn(&format!("{} ?", rest)).await;
                write!(output, "{}", render::render_outcome(&outcome))?;
            }
            _ => {
                let outcome = self.session.run_turn(line).await;
                write!(output, "{}", render::render_outcome(&outcome))?;

                if matches!(outcome, TurnOutcome::Rejected(_) | TurnOutcome::Failed { .. }) {
                    if let Some(first) = self.session.suggestions(1).first() {
                        writeln!(output, "Try: {}  ({})", first.text, first.rationale)?;
                    }
                }
            }
        }

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DryRunDirectory;
    use crate::intelligence::{Context, Intent};
    use std::io::Cursor;

    async fn run_script(script: &str) -> (String, Repl<DryRunDirectory>) {
        let session = Session::new(DryRunDirectory, Context::new());
        let mut repl = Repl::new(session, "> ", 5);
        let mut output = Vec::new();
        repl.run(Cursor::new(script.to_string()), &mut output).await.unwrap();
        (String::from_utf8(output).unwrap(), repl)
    }

    #[tokio::test]
    async fn test_quit_stops_the_loop() {
        let (_, repl) = run_script("info ldap.example.com\nquit\nsearch host dc=x\n").await;
        assert_eq!(repl.session().context().history().len(), 1);
    }

    #[tokio::test]
    async fn test_errors_do_not_end_the_session() {
        let (output, repl) = run_script("serch\n\"unterminated\ninfo ldap.example.com\n").await;
        assert!(output.contains("Did you mean 'search'?"));
        assert!(output.contains("Unterminated quote"));
        assert!(output.contains("Try: "));
        assert_eq!(repl.session().context().current_intent, Some(Intent::Info));
    }

    #[tokio::test]
    async fn test_recent_values() {
        let db = std::sync::Arc::new(crate::db::Database::new_in_memory().await.unwrap());
        let session = Session::new(DryRunDirectory, Context::new()).with_database(db, "repl");
        let mut repl = Repl::new(session, "> ", 5);
        let script = "search ldap.example.com dc=example,dc=com (cn=a)\nrecent hosts\nrecent filter\nrecent dn\n";
        let mut output = Vec::new();
        repl.run(Cursor::new(script.to_string()), &mut output).await.unwrap();
        let output = String::from_utf8(output).unwrap();

        assert!(output.contains("Recent hosts\n  ldap.example.com\n"));
        assert!(output.contains("Recent filters\n  (cn=a)\n"));
        assert!(output.contains("recent: expected host, base or filter"));
    }

    #[tokio::test]
    async fn test_builtins() {
        let script = "search ldap.example.com dc=example,dc=com\nsuggest\nhistory\nvalidate delete h cn=x\nhelp search\n";
        let (output, repl) = run_script(script).await;

        assert!(output.contains("1. show <index>"));
        assert!(output.contains("  1. search ldap.example.com dc=example,dc=com"));
        assert!(output.contains("--recursive"));
        assert!(output.contains("search - Search the directory for entries"));
        // built-ins besides help are not turns
        assert_eq!(repl.session().context().history().len(), 2);
    }
}
