// Plain-text rendering for the shell and the CLI

use crate::db::ValueKind;
use crate::intelligence::{AnalysisResult, Suggestion, Validation};
use crate::shell::session::TurnOutcome;

pub fn render_analysis(analysis: &AnalysisResult) -> String {
    let mut out = String::new();

    for error in &analysis.errors {
        out.push_str(&format!("error: {}\n", error));
    }
    for warning in &analysis.warnings {
        out.push_str(&format!("warning: {}\n", warning));
    }

    // A single correction is already part of the error message
    if analysis.corrections.len() > 1 {
        let candidates: Vec<_> = analysis
            .corrections
            .iter()
            .map(|c| c.candidate.as_str())
            .collect();
        out.push_str(&format!("did you mean one of: {}\n", candidates.join(", ")));
    }

    if analysis.errors.iter().any(|e| e.code() == "unknown_command") && analysis.corrections.is_empty() {
        out.push_str("Type ? to list the available commands\n");
    }

    out
}

pub fn render_validation(validation: &Validation) -> String {
    let mut out = render_analysis(&validation.analysis);

    for warning in &validation.warnings {
        out.push_str(&format!("warning: {}\n", warning));
    }

    match &validation.preview {
        Some(preview) => {
            out.push_str(&format!("Command is valid. {}\n", preview));
        }
        None if validation.analysis.help_requested => {
            out.push_str("Help queries are not validated\n");
        }
        None => out.push_str("Command is not valid\n"),
    }

    out
}

pub fn render_suggestions(suggestions: &[Suggestion]) -> String {
    if suggestions.is_empty() {
        return "No suggestions yet. Run a command first.\n".to_string();
    }

    let mut out = String::new();
    out.push_str("Suggestions\n");
    out.push_str(&format!("{}\n", "=".repeat(60)));
    for (i, suggestion) in suggestions.iter().enumerate() {
        out.push_str(&format!(
            "{}. {} (confidence: {:.0}%)\n   {}\n",
            i + 1,
            suggestion.text,
            suggestion.confidence * 100.0,
            suggestion.rationale
        ));
    }
    out
}

pub fn render_outcome(outcome: &TurnOutcome) -> String {
    match outcome {
        TurnOutcome::Help { help, .. } => help.to_string(),
        TurnOutcome::Rejected(analysis) => render_analysis(analysis),
        TurnOutcome::Executed { analysis, outcome } => {
            let mut out = render_analysis(analysis);
            out.push_str(&format!("{}\n", outcome.summary));
            for entry in &outcome.entries {
                out.push_str(&format!("{}\n", entry));
            }
            out
        }
        TurnOutcome::Failed { error, .. } => format!("error: {}\n", error),
    }
}

pub fn render_history(lines: &[String]) -> String {
    if lines.is_empty() {
        return "No commands found.\n".to_string();
    }

    lines
        .iter()
        .enumerate()
        .map(|(i, line)| format!("{:3}. {}\n", i + 1, line))
        .collect()
}

pub fn render_remembered(kind: ValueKind, values: &[String]) -> String {
    if values.is_empty() {
        return format!("No {} remembered yet.\n", kind);
    }

    let mut out = format!("Recent {}s\n", kind);
    for value in values {
        out.push_str(&format!("  {}\n", value));
    }
    out
}
