/// Suggestion engine
///
/// Proposes likely next commands from the session context: fixes for the last
/// error first, then the follow-ups of the current intent, then follow-ups of
/// other intents that succeeded recently.

use crate::intelligence::analyzer::{Analyzer, ErrorKind};
use crate::intelligence::context::Context;
use crate::intelligence::intent::{Intent, OUTPUT_FORMAT_FLAGS};
use crate::intelligence::redact::redact_secrets;
use crate::intelligence::scorer::Scorer;
use crate::intelligence::tokenizer::{quote_if_needed, strip_help_marker};
use serde::Serialize;
use std::collections::HashSet;

/// Never return more than this many suggestions
pub const MAX_SUGGESTIONS: usize = 5;

/// Suggestion with reasoning
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub text: String,
    pub rationale: String,
    pub confidence: f64,
}

/// A row of the static follow-up table
struct FollowUp {
    /// `{host}`, `{base}` and `{format}` are filled from the context
    template: &'static str,
    rationale: &'static str,
    /// Lower ranks first
    priority: u8,
    /// Only offered when the source command succeeded
    needs_success: bool,
}

const fn follow_up(template: &'static str, rationale: &'static str, priority: u8, needs_success: bool) -> FollowUp {
    FollowUp {
        template,
        rationale,
        priority,
        needs_success,
    }
}

const GENERIC_HELP_PRIORITY: u8 = 90;
/// Session tips rank after everything else
const AUTH_TIP_PRIORITY: u8 = 95;
const SSL_TIP_PRIORITY: u8 = 96;

const SEARCH_FOLLOW_UPS: &[FollowUp] = &[
    follow_up("show <index>", "Show the full entry of a result by its index", 10, true),
    follow_up(
        "search {host} {base} \"(&(objectClass=person)(cn=*))\"",
        "Narrow the results with a more specific filter",
        20,
        true,
    ),
    follow_up("search {host} {base} {format}", "Try another output format", 30, true),
    follow_up("compare {host} <dn1> <dn2>", "Compare two of the entries found", 40, true),
    follow_up("search --help", "All search options", GENERIC_HELP_PRIORITY, false),
];

const INFO_FOLLOW_UPS: &[FollowUp] = &[
    follow_up("search {host} <base_dn>", "Search one of the server's naming contexts", 10, true),
    follow_up("schema {host}", "Browse the server schema", 20, true),
    follow_up("info --help", "All info options", GENERIC_HELP_PRIORITY, false),
];

const COMPARE_FOLLOW_UPS: &[FollowUp] = &[
    follow_up("search {host} {base}", "Look at the compared entries in context", 20, true),
    follow_up("modify {host} <dn> --replace <attr>=<value>", "Align a differing attribute", 30, true),
    follow_up("compare --help", "All compare options", GENERIC_HELP_PRIORITY, false),
];

const SCHEMA_FOLLOW_UPS: &[FollowUp] = &[
    follow_up("schema {host} inetOrgPerson", "Describe a specific object class", 10, true),
    follow_up("schema {host} --attr mail", "Describe a single attribute type", 20, true),
    follow_up(
        "search {host} {base} \"(objectClass=*)\"",
        "Find entries using these object classes",
        30,
        true,
    ),
    follow_up("schema --help", "All schema options", GENERIC_HELP_PRIORITY, false),
];

const ADD_FOLLOW_UPS: &[FollowUp] = &[
    follow_up(
        "search {host} {base} \"(objectClass=*)\"",
        "Verify that the new entry exists",
        10,
        true,
    ),
    follow_up("modify {host} <dn> --add <attr>=<value>", "Add more attributes to the entry", 30, true),
    follow_up("add --help", "All add options", GENERIC_HELP_PRIORITY, false),
];

const MODIFY_FOLLOW_UPS: &[FollowUp] = &[
    follow_up("search {host} {base}", "Verify the changes", 10, true),
    follow_up("compare {host} <dn1> <dn2>", "Compare with a similar entry", 40, true),
    follow_up("modify --help", "All modify options", GENERIC_HELP_PRIORITY, false),
];

const DELETE_FOLLOW_UPS: &[FollowUp] = &[
    follow_up("search {host} {base}", "Confirm the entry is gone", 10, true),
    follow_up("delete --help", "All delete options", GENERIC_HELP_PRIORITY, false),
];

const RENAME_FOLLOW_UPS: &[FollowUp] = &[
    follow_up("search {host} {base}", "Find the renamed entry", 10, true),
    follow_up("rename --help", "All rename options", GENERIC_HELP_PRIORITY, false),
];

const INTERACTIVE_FOLLOW_UPS: &[FollowUp] = &[
    follow_up("info {host}", "Check the server you are connected to", 20, true),
    follow_up("interactive --help", "All interactive options", GENERIC_HELP_PRIORITY, false),
];

fn follow_ups(intent: Intent) -> &'static [FollowUp] {
    match intent {
        Intent::Search => SEARCH_FOLLOW_UPS,
        Intent::Info => INFO_FOLLOW_UPS,
        Intent::Compare => COMPARE_FOLLOW_UPS,
        Intent::Schema => SCHEMA_FOLLOW_UPS,
        Intent::Add => ADD_FOLLOW_UPS,
        Intent::Modify => MODIFY_FOLLOW_UPS,
        Intent::Delete => DELETE_FOLLOW_UPS,
        Intent::Rename => RENAME_FOLLOW_UPS,
        Intent::Interactive => INTERACTIVE_FOLLOW_UPS,
        Intent::Unknown => &[],
    }
}

#[derive(Debug)]
struct Candidate {
    text: String,
    rationale: String,
    priority: u8,
    turns_ago: usize,
}

impl Candidate {
    fn new(text: impl Into<String>, rationale: impl Into<String>, priority: u8, turns_ago: usize) -> Self {
        Self {
            text: text.into(),
            rationale: rationale.into(),
            priority,
            turns_ago,
        }
    }
}

/// Suggestion engine
pub struct SuggestionEngine;

impl SuggestionEngine {
    /// Suggestions for the next command, best first, at most [`MAX_SUGGESTIONS`].
    /// A fresh context yields nothing.
    pub fn suggest_next(context: &Context) -> Vec<Suggestion> {
        Self::suggest_with_limit(context, MAX_SUGGESTIONS)
    }

    pub fn suggest_with_limit(context: &Context, limit: usize) -> Vec<Suggestion> {
        let used_flags = context.historical_flags();
        let mut candidates = Vec::new();

        if let Some(error) = &context.last_error {
            candidates.extend(Self::suggest_from_error(error, context));
        }

        if let Some(intent) = context.current_intent {
            let (turns_ago, succeeded) = context.last_outcome_of(intent).unwrap_or((0, true));
            for row in follow_ups(intent) {
                if row.needs_success && !succeeded {
                    continue;
                }
                if let Some(text) = Self::fill(row.template, context, &used_flags) {
                    candidates.push(Candidate::new(text, row.rationale, row.priority, turns_ago));
                }
            }
        }

        for (intent, turns_ago) in context.recent_successes() {
            if Some(intent) == context.current_intent {
                continue;
            }
            for row in follow_ups(intent) {
                if row.priority >= GENERIC_HELP_PRIORITY {
                    continue;
                }
                if let Some(text) = Self::fill(row.template, context, &used_flags) {
                    candidates.push(Candidate::new(text, row.rationale, row.priority, turns_ago));
                }
            }
        }

        candidates.extend(Self::session_tips(context));

        // Static priority first, recency of the source command second
        candidates.sort_by_key(|c| (c.priority, c.turns_ago));

        let mut seen = HashSet::new();
        let suggestions: Vec<Suggestion> = candidates
            .into_iter()
            .filter(|c| seen.insert(c.text.clone()))
            .take(limit.min(MAX_SUGGESTIONS))
            .map(|c| Suggestion {
                confidence: Scorer::calculate_suggestion_score(
                    c.priority,
                    Scorer::calculate_recency_weight(c.turns_ago),
                ),
                text: c.text,
                rationale: c.rationale,
            })
            .collect();

        tracing::debug!(count = suggestions.len(), "generated suggestions");

        suggestions
    }

    /// Credentials and SSL for a session that reached a server without them
    fn session_tips(context: &Context) -> Vec<Candidate> {
        let Some((turns_ago, entry)) = context.last_success() else {
            return Vec::new();
        };
        let analysis = Analyzer::analyze(&entry.raw_text, &Context::new());
        let intent = analysis.intent;
        if analysis.argument("host").is_none() {
            return Vec::new();
        }

        let line = redact_secrets(strip_help_marker(&entry.raw_text).0);
        let mut tips = Vec::new();

        if intent.find_flag("--username").is_some() && !analysis.has_flag("--username") {
            tips.push(Candidate::new(
                format!("{} -u <bind_dn> -p <password>", line),
                "Authenticate with -u and -p for more privileges",
                AUTH_TIP_PRIORITY,
                turns_ago,
            ));
        }
        if intent.find_flag("--ssl").is_some() && !analysis.has_flag("--ssl") {
            tips.push(Candidate::new(
                format!("{} --ssl", line),
                "Consider --ssl for a secure connection",
                SSL_TIP_PRIORITY,
                turns_ago,
            ));
        }

        tips
    }

    /// Corrective suggestions for the last error, all ranked above follow-ups
    fn suggest_from_error(error: &ErrorKind, context: &Context) -> Vec<Candidate> {
        let last = context
            .history()
            .rev()
            .find(|entry| !entry.is_help_query())
            .map(|entry| redact_secrets(strip_help_marker(&entry.raw_text).0))
            .unwrap_or_default();
        let command_word = last.split_whitespace().next().unwrap_or_default();
        let host = context.current_host.as_deref().unwrap_or("<host>");

        match error {
            ErrorKind::ConnectionError { .. } => {
                let retry = if last.is_empty() { "<command>" } else { last.as_str() };
                vec![
                    Candidate::new(format!("info {}", host), "Check that the server is reachable", 0, 0),
                    Candidate::new(
                        format!("{} --ssl --port 636", retry),
                        "Retry over SSL on port 636",
                        1,
                        0,
                    ),
                    Candidate::new(format!("{} --port 389", retry), "Retry on the standard LDAP port", 2, 0),
                    Candidate::new(
                        format!("{} -u <bind_dn> -p <password>", retry),
                        "Bind with credentials if anonymous access is refused",
                        3,
                        0,
                    ),
                ]
            }
            ErrorKind::OperationError { message, hint } => {
                let base = context
                    .current_base_dn
                    .as_deref()
                    .map(quote_if_needed)
                    .unwrap_or_else(|| "<base_dn>".to_string());
                vec![Candidate::new(
                    format!("search {} {}", host, base),
                    hint.clone().unwrap_or_else(|| format!("The server said: {}", message)),
                    5,
                    0,
                )]
            }
            ErrorKind::UnknownCommand {
                did_you_mean: Some(candidate),
                ..
            } => {
                let rest = last.split_once(char::is_whitespace).map(|(_, rest)| rest.trim());
                let text = match rest {
                    Some(rest) if !rest.is_empty() => format!("{} {}", candidate, rest),
                    _ => candidate.clone(),
                };
                vec![Candidate::new(text, format!("Did you mean '{}'?", candidate), 0, 0)]
            }
            ErrorKind::UnknownCommand { did_you_mean: None, .. } => {
                vec![Candidate::new("help", "List the available commands", 5, 0)]
            }
            ErrorKind::AmbiguousMatch { candidates, .. } => candidates
                .iter()
                .map(|name| Candidate::new(format!("{}?", name), format!("Help for '{}'", name), 1, 0))
                .collect(),
            ErrorKind::MissingArgument { intent, .. } => vec![
                Candidate::new(intent.syntax(), format!("Usage of '{}'", intent), 0, 0),
                Candidate::new(format!("{}?", intent), format!("Help for '{}'", intent), 5, 0),
            ],
            ErrorKind::UnrecognizedFlag {
                flag,
                did_you_mean: Some(fix),
            } => vec![Candidate::new(
                last.replacen(flag.as_str(), fix, 1),
                format!("Did you mean '{}'?", fix),
                0,
                0,
            )],
            ErrorKind::UnrecognizedFlag { did_you_mean: None, .. } => {
                match Intent::from_name(command_word) {
                    Some(intent) => vec![Candidate::new(
                        format!("{} --help", intent),
                        format!("Flags accepted by '{}'", intent),
                        5,
                        0,
                    )],
                    None => Vec::new(),
                }
            }
            ErrorKind::UnterminatedQuote { offset } => {
                let quote = last
                    .get(*offset..)
                    .and_then(|rest| rest.chars().next())
                    .filter(|c| *c == '"' || *c == '\'')
                    .unwrap_or('"');
                vec![Candidate::new(
                    format!("{}{}", last, quote),
                    format!("Close the quote opened at column {}", offset + 1),
                    0,
                    0,
                )]
            }
        }
    }

    /// Fill a template, or `None` when a placeholder has nothing to offer
    fn fill(template: &str, context: &Context, used_flags: &[String]) -> Option<String> {
        let base = context
            .current_base_dn
            .as_deref()
            .map(quote_if_needed)
            .unwrap_or_else(|| "<base_dn>".to_string());
        let mut text = template
            .replace("{host}", context.current_host.as_deref().unwrap_or("<host>"))
            .replace("{base}", &base);

        if text.contains("{format}") {
            let format = OUTPUT_FORMAT_FLAGS
                .iter()
                .find(|flag| !used_flags.iter().any(|used| used.as_str() == **flag))?;
            text = text.replace("{format}", format);
        }

        Some(text)
    }
}
