/// Session context
///
/// Everything the engine knows about the current session: the last intent that
/// classified, the host and base DN in use, the last error and a bounded window
/// of command history. One `Context` per session, passed explicitly.

use crate::intelligence::analyzer::{AnalysisResult, ErrorKind, TurnState};
use crate::intelligence::help_renderer::DisclosureLevel;
use crate::intelligence::intent::Intent;
use crate::intelligence::tokenizer::{strip_help_marker, tokenize};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Default number of history entries kept per session
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// One finished turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandHistoryEntry {
    pub raw_text: String,
    pub timestamp: DateTime<Utc>,
    /// Set only when the command classified cleanly
    pub resolved_intent: Option<Intent>,
    pub succeeded: bool,
}

impl CommandHistoryEntry {
    pub fn new(raw_text: impl Into<String>, resolved_intent: Option<Intent>, succeeded: bool) -> Self {
        Self {
            raw_text: raw_text.into(),
            timestamp: Utc::now(),
            resolved_intent,
            succeeded,
        }
    }

    pub fn is_help_query(&self) -> bool {
        strip_help_marker(&self.raw_text).1
    }
}

#[derive(Debug, Clone)]
pub struct Context {
    pub current_intent: Option<Intent>,
    pub current_base_dn: Option<String>,
    pub current_host: Option<String>,
    pub last_error: Option<ErrorKind>,
    history: VecDeque<CommandHistoryEntry>,
    history_limit: usize,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    pub fn new() -> Self {
        Self::with_history_limit(DEFAULT_HISTORY_LIMIT)
    }

    /// A limit of zero is treated as one
    pub fn with_history_limit(limit: usize) -> Self {
        Self {
            current_intent: None,
            current_base_dn: None,
            current_host: None,
            last_error: None,
            history: VecDeque::new(),
            history_limit: limit.max(1),
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.current_host = Some(host.into());
        self
    }

    pub fn with_base_dn(mut self, base_dn: impl Into<String>) -> Self {
        self.current_base_dn = Some(base_dn.into());
        self
    }

    /// History, oldest first
    pub fn history(&self) -> impl DoubleEndedIterator<Item = &CommandHistoryEntry> + ExactSizeIterator {
        self.history.iter()
    }

    pub fn history_limit(&self) -> usize {
        self.history_limit
    }

    /// Append an entry, dropping the oldest once the window is full
    pub fn record(&mut self, entry: CommandHistoryEntry) {
        if let Some(intent) = entry.resolved_intent.filter(|intent| intent.is_known()) {
            self.current_intent = Some(intent);
        }

        self.history.push_back(entry);
        while self.history.len() > self.history_limit {
            self.history.pop_front();
        }
    }

    /// Fold a finished turn into the context.
    ///
    /// `failure` is the error reported by the directory for a command that
    /// classified but could not be executed.
    pub fn record_analysis(&mut self, analysis: &AnalysisResult, failure: Option<ErrorKind>) {
        let help = analysis.state == TurnState::HelpOverlay;
        let classified = analysis.state == TurnState::Classified;
        let succeeded = help || (classified && failure.is_none());

        if classified {
            let host = analysis
                .argument("host")
                .or_else(|| analysis.flag_value("--host"));
            if let Some(host) = host {
                self.current_host = Some(host.to_string());
            }

            let base = analysis
                .argument("base_dn")
                .or_else(|| analysis.flag_value("--base"));
            if let Some(base) = base {
                self.current_base_dn = Some(base.to_string());
            }
        }

        if !help {
            self.last_error = failure.or_else(|| analysis.errors.first().cloned());
        }

        self.record(CommandHistoryEntry::new(
            analysis.input.clone(),
            classified.then_some(analysis.intent),
            succeeded,
        ));
    }

    /// Disclosure level for a help query on `partial`, based on how many
    /// identical help queries directly precede it
    pub fn disclosure_level_for(&self, partial: &str) -> DisclosureLevel {
        let wanted = normalize(strip_help_marker(partial).0);
        let repeats = self
            .history
            .iter()
            .rev()
            .take_while(|entry| {
                entry.is_help_query() && normalize(strip_help_marker(&entry.raw_text).0) == wanted
            })
            .count();

        DisclosureLevel::from_repeats(repeats)
    }

    /// How many turns ago `intent` last ran and whether it succeeded
    pub fn last_outcome_of(&self, intent: Intent) -> Option<(usize, bool)> {
        self.history
            .iter()
            .rev()
            .enumerate()
            .find(|(_, entry)| entry.resolved_intent == Some(intent))
            .map(|(turns_ago, entry)| (turns_ago, entry.succeeded))
    }

    /// Intents that succeeded in the window, most recent first, each once
    pub fn recent_successes(&self) -> Vec<(Intent, usize)> {
        let mut seen = Vec::new();
        for (turns_ago, entry) in self.history.iter().rev().enumerate() {
            if !entry.succeeded {
                continue;
            }
            if let Some(intent) = entry.resolved_intent {
                if !seen.iter().any(|(known, _)| *known == intent) {
                    seen.push((intent, turns_ago));
                }
            }
        }
        seen
    }

    /// The most recent command that ran, and how many turns ago
    pub fn last_success(&self) -> Option<(usize, &CommandHistoryEntry)> {
        self.history
            .iter()
            .rev()
            .enumerate()
            .find(|(_, entry)| entry.succeeded && entry.resolved_intent.is_some() && !entry.is_help_query())
    }

    /// Flags typed earlier in the session, most recent first, each once
    pub fn historical_flags(&self) -> Vec<String> {
        let mut flags: Vec<String> = Vec::new();
        for entry in self.history.iter().rev() {
            for token in tokenize(&entry.raw_text).tokens {
                if !token.is_flag() {
                    continue;
                }
                let name = match token.text.split_once('=') {
                    Some((name, _)) => name.to_string(),
                    None => token.text,
                };
                if !flags.contains(&name) {
                    flags.push(name);
                }
            }
        }
        flags
    }
}

fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
