/// One interactive session
///
/// Owns the session's [`Context`] and drives a single turn at a time:
/// analyze, then either render help, report the problems or hand the command
/// to the directory. Every turn is folded back into the context.

use crate::core::{Directory, DirectoryOutcome, Recorder, Searcher};
use crate::db::{Database, ValueKind};
use crate::error::Result;
use crate::intelligence::{
    AnalysisResult, Analyzer, Context, ErrorKind, FormattedHelp, HelpRenderer, Suggestion,
    SuggestionEngine, TurnState, Validation,
};
use std::sync::Arc;

/// How a turn ended
#[derive(Debug, Clone)]
pub enum TurnOutcome {
    /// The line ended with `?`
    Help {
        analysis: AnalysisResult,
        help: FormattedHelp,
    },
    /// The analyzer found problems; nothing was executed
    Rejected(AnalysisResult),
    Executed {
        analysis: AnalysisResult,
        outcome: DirectoryOutcome,
    },
    /// The directory could not run the command
    Failed {
        analysis: AnalysisResult,
        error: ErrorKind,
    },
}

impl TurnOutcome {
    pub fn analysis(&self) -> &AnalysisResult {
        match self {
            TurnOutcome::Help { analysis, .. }
            | TurnOutcome::Rejected(analysis)
            | TurnOutcome::Executed { analysis, .. }
            | TurnOutcome::Failed { analysis, .. } => analysis,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TurnOutcome::Executed { .. } | TurnOutcome::Help { .. })
    }
}

pub struct Session<D: Directory> {
    context: Context,
    directory: D,
    db: Option<Arc<Database>>,
    recorder: Option<Recorder>,
    state: TurnState,
}

impl<D: Directory> Session<D> {
    pub fn new(directory: D, context: Context) -> Self {
        Self {
            context,
            directory,
            db: None,
            recorder: None,
            state: TurnState::AwaitingInput,
        }
    }

    /// Persist finished turns to `db` under `session_id`
    pub fn with_database(mut self, db: Arc<Database>, session_id: impl Into<String>) -> Self {
        self.recorder = Some(Recorder::new(Arc::clone(&db), session_id));
        self.db = Some(db);
        self
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// State the last turn ended in
    pub fn state(&self) -> TurnState {
        self.state
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    /// Run one line of input. Never fails: problems end up in the outcome.
    pub async fn run_turn(&mut self, line: &str) -> TurnOutcome {
        self.state = TurnState::AwaitingInput;
        let analysis = Analyzer::analyze(line, &self.context);
        let state = analysis.state;

        let outcome = match state {
            TurnState::HelpOverlay => {
                let level = self.context.disclosure_level_for(&analysis.input);
                let help = HelpRenderer::render_help(analysis.partial_command(), level);
                self.context.record_analysis(&analysis, None);
                tracing::debug!(level = %level, "rendered help");
                TurnOutcome::Help { analysis, help }
            }
            TurnState::Classified => match self.directory.execute(&analysis) {
                Ok(outcome) => {
                    self.context.record_analysis(&analysis, None);
                    self.persist(&analysis, true).await;
                    TurnOutcome::Executed { analysis, outcome }
                }
                Err(err) => {
                    tracing::info!(error = %err, intent = %analysis.intent, "directory call failed");
                    let error = err.into_error_kind();
                    self.context.record_analysis(&analysis, Some(error.clone()));
                    self.persist(&analysis, false).await;
                    TurnOutcome::Failed { analysis, error }
                }
            },
            TurnState::ErrorDetected | TurnState::AwaitingInput => {
                self.context.record_analysis(&analysis, None);
                self.persist(&analysis, false).await;
                TurnOutcome::Rejected(analysis)
            }
        };

        self.state = state;
        outcome
    }

    /// Dry run against the current context; the context is not changed
    pub fn validate(&self, line: &str) -> Validation {
        Analyzer::validate(line, &self.context)
    }

    pub fn suggestions(&self, limit: usize) -> Vec<Suggestion> {
        SuggestionEngine::suggest_with_limit(&self.context, limit)
    }

    /// Earlier commands, most relevant first.
    ///
    /// Searches the database when there is one, otherwise this session's
    /// history.
    pub async fn history(&self, query: Option<&str>, limit: usize) -> Result<Vec<String>> {
        let Some(db) = &self.db else {
            let query = query.map(str::to_lowercase);
            return Ok(self
                .context
                .history()
                .rev()
                .map(|entry| entry.raw_text.clone())
                .filter(|text| match &query {
                    Some(q) => text.to_lowercase().contains(q),
                    None => true,
                })
                .take(limit)
                .collect());
        };

        let commands = match query {
            Some(query) => Searcher::new(Arc::clone(db))
                .search(query, limit)
                .await?
                .into_iter()
                .map(|result| result.command)
                .collect(),
            None => db.get_recent_commands(limit as i64).await?,
        };

        Ok(commands.into_iter().map(|c| c.raw_text).collect())
    }

    /// Take the host and base DN last used in an earlier session, unless the
    /// context already has them
    pub async fn restore_defaults(&mut self) -> Result<()> {
        let Some(db) = &self.db else {
            return Ok(());
        };

        if self.context.current_host.is_none() {
            self.context.current_host = latest_value(db, ValueKind::Host).await?;
        }
        if self.context.current_base_dn.is_none() {
            self.context.current_base_dn = latest_value(db, ValueKind::Base).await?;
        }

        tracing::debug!(
            host = ?self.context.current_host,
            base = ?self.context.current_base_dn,
            "restored defaults"
        );
        Ok(())
    }

    /// Remembered values of one kind, most recently used first. Empty without
    /// a database.
    pub async fn remembered(&self, kind: ValueKind, limit: usize) -> Result<Vec<String>> {
        let Some(db) = &self.db else {
            return Ok(Vec::new());
        };

        let values = db.get_values(kind, limit as i64).await?;
        Ok(values.into_iter().map(|v| v.value).collect())
    }

    async fn persist(&self, analysis: &AnalysisResult, succeeded: bool) {
        let Some(recorder) = &self.recorder else {
            return;
        };

        if let Err(e) = recorder.record(analysis, succeeded).await {
            tracing::warn!(error = %e, "could not record command");
        }
    }
}

async fn latest_value(db: &Database, kind: ValueKind) -> Result<Option<String>> {
    let values = db.get_values(kind, 1).await?;
    Ok(values.into_iter().next().map(|v| v.value))
}
