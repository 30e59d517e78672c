/// Progressive help
///
/// Renders help for a partial command at one of three disclosure levels.
/// Repeating the same `?` query moves one level deeper.

use crate::intelligence::analyzer::Analyzer;
use crate::intelligence::context::Context;
use crate::intelligence::corrector::suggest_correction;
use crate::intelligence::intent::Intent;
use crate::intelligence::tokenizer::{strip_help_marker, tokenize};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum DisclosureLevel {
    /// Synopsis, usage and required arguments
    #[default]
    Basic,
    /// Adds optional arguments and flags
    Detailed,
    /// Adds examples and common pitfalls
    Full,
}

impl DisclosureLevel {
    /// Level for a query that directly follows `repeats` identical ones
    pub fn from_repeats(repeats: usize) -> Self {
        (0..repeats.min(2)).fold(DisclosureLevel::Basic, |level, _| level.next())
    }

    /// Full stays Full
    pub fn next(self) -> Self {
        match self {
            DisclosureLevel::Basic => DisclosureLevel::Detailed,
            DisclosureLevel::Detailed | DisclosureLevel::Full => DisclosureLevel::Full,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DisclosureLevel::Basic => "basic",
            DisclosureLevel::Detailed => "detailed",
            DisclosureLevel::Full => "full",
        }
    }
}

impl fmt::Display for DisclosureLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DisclosureLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "basic" => Ok(DisclosureLevel::Basic),
            "detailed" => Ok(DisclosureLevel::Detailed),
            "full" => Ok(DisclosureLevel::Full),
            other => Err(format!(
                "unknown disclosure level '{}' (expected basic, detailed or full)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HelpSection {
    pub heading: String,
    pub lines: Vec<String>,
}

impl HelpSection {
    fn new(heading: &str, lines: Vec<String>) -> Self {
        Self {
            heading: heading.to_string(),
            lines,
        }
    }
}

/// Rendered help, printable as plain text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormattedHelp {
    pub title: String,
    pub level: DisclosureLevel,
    pub sections: Vec<HelpSection>,
    pub correction: Option<String>,
}

impl FormattedHelp {
    pub fn section(&self, heading: &str) -> Option<&HelpSection> {
        self.sections.iter().find(|section| section.heading == heading)
    }
}

impl fmt::Display for FormattedHelp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "{}", "=".repeat(60))?;

        if let Some(correction) = &self.correction {
            writeln!(f, "Did you mean '{}'?", correction)?;
        }

        for section in &self.sections {
            writeln!(f)?;
            writeln!(f, "{}:", section.heading)?;
            for line in &section.lines {
                writeln!(f, "  {}", line)?;
            }
        }

        if self.level < DisclosureLevel::Full {
            writeln!(f)?;
            writeln!(f, "(Repeat the same ? query for more detail)")?;
        }

        Ok(())
    }
}

/// Help renderer
pub struct HelpRenderer;

impl HelpRenderer {
    /// Render help for `partial` (a trailing `?` is ignored).
    ///
    /// Pure: the same input always gives the same output.
    pub fn render_help(partial: &str, level: DisclosureLevel) -> FormattedHelp {
        let (partial, _) = strip_help_marker(partial);
        let tokens = tokenize(partial);

        let Some(first) = tokens.tokens.first() else {
            return Self::render_overview("LDAPie commands".to_string(), None, level);
        };

        match Intent::from_name(&first.text) {
            Some(intent) => Self::render_intent(intent, partial, tokens.tokens.len() > 1, level),
            None => {
                let correction = suggest_correction(&first.text, Intent::names())
                    .into_iter()
                    .next()
                    .map(|c| c.candidate);
                Self::render_overview(format!("Unknown command '{}'", first.text), correction, level)
            }
        }
    }

    fn render_intent(
        intent: Intent,
        partial: &str,
        has_arguments: bool,
        level: DisclosureLevel,
    ) -> FormattedHelp {
        let mut sections = vec![HelpSection::new("Usage", vec![intent.syntax().to_string()])];

        let required: Vec<String> = intent
            .positionals()
            .iter()
            .filter(|arg| arg.required)
            .map(|arg| format!("<{}>  {}", arg.name, arg.help))
            .collect();
        sections.push(HelpSection::new(
            "Required arguments",
            if required.is_empty() {
                vec!["(none)".to_string()]
            } else {
                required
            },
        ));

        if has_arguments {
            let analysis = Analyzer::analyze(partial, &Context::new());
            let line = match intent.positionals().get(analysis.positionals.len()) {
                Some(arg) => format!("<{}>  {}", arg.name, arg.help),
                None => "All arguments are present. Add options or run the command".to_string(),
            };
            sections.push(HelpSection::new("Next argument", vec![line]));
        }

        if level >= DisclosureLevel::Detailed {
            let optional: Vec<String> = intent
                .positionals()
                .iter()
                .filter(|arg| !arg.required)
                .map(|arg| format!("[<{}>]  {}", arg.name, arg.help))
                .collect();
            if !optional.is_empty() {
                sections.push(HelpSection::new("Optional arguments", optional));
            }

            let options = intent
                .flags()
                .map(|flag| format!("{:<28} {}", flag.usage(), flag.help))
                .collect();
            sections.push(HelpSection::new("Options", options));
        }

        if level == DisclosureLevel::Full {
            sections.push(HelpSection::new(
                "Examples",
                intent.examples().iter().map(|e| e.to_string()).collect(),
            ));
            sections.push(HelpSection::new(
                "Common pitfalls",
                intent.common_errors().iter().map(|e| e.to_string()).collect(),
            ));
        }

        FormattedHelp {
            title: format!("{} - {}", intent, intent.synopsis()),
            level,
            sections,
            correction: None,
        }
    }

    fn render_overview(title: String, correction: Option<String>, level: DisclosureLevel) -> FormattedHelp {
        let mut sections = vec![HelpSection::new(
            "Available commands",
            Intent::ALL
                .iter()
                .map(|intent| format!("{:<12} {}", intent.name(), intent.synopsis()))
                .collect(),
        )];

        if level >= DisclosureLevel::Detailed {
            sections.push(HelpSection::new(
                "Getting help",
                vec![
                    "<command> ?      help for a command".to_string(),
                    "<command> --help full option list".to_string(),
                    "suggest          what to do next".to_string(),
                ],
            ));
        }

        if level == DisclosureLevel::Full {
            sections.push(HelpSection::new(
                "Examples",
                Intent::ALL
                    .iter()
                    .filter_map(|intent| intent.examples().first())
                    .map(|e| e.to_string())
                    .collect(),
            ));
        }

        FormattedHelp {
            title,
            level,
            sections,
            correction,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_add_sections() {
        let basic = HelpRenderer::render_help("search", DisclosureLevel::Basic);
        assert!(basic.section("Usage").is_some());
        assert!(basic.section("Required arguments").is_some());
        assert!(basic.section("Options").is_none());
        assert!(basic.section("Examples").is_none());

        let detailed = HelpRenderer::render_help("search", DisclosureLevel::Detailed);
        assert!(detailed.section("Options").is_some());
        assert!(detailed.section("Optional arguments").is_some());
        assert!(detailed.section("Examples").is_none());

        let full = HelpRenderer::render_help("search", DisclosureLevel::Full);
        assert!(full.section("Examples").is_some());
        assert!(full.section("Common pitfalls").is_some());
    }

    #[test]
    fn test_render_is_deterministic() {
        for partial in ["", "search", "serch", "delete host", "frobnicate"] {
            for level in [DisclosureLevel::Basic, DisclosureLevel::Detailed, DisclosureLevel::Full] {
                assert_eq!(
                    HelpRenderer::render_help(partial, level),
                    HelpRenderer::render_help(partial, level)
                );
            }
        }
    }

    #[test]
    fn test_unknown_partial() {
        let help = HelpRenderer::render_help("serch", DisclosureLevel::Basic);
        assert_eq!(help.correction.as_deref(), Some("search"));
        let commands = help.section("Available commands").unwrap();
        assert_eq!(commands.lines.len(), Intent::ALL.len());
        assert!(help.to_string().contains("Did you mean 'search'?"));

        let help = HelpRenderer::render_help("frobnicate", DisclosureLevel::Basic);
        assert!(help.correction.is_none());
    }

    #[test]
    fn test_empty_partial_lists_commands() {
        let help = HelpRenderer::render_help("?", DisclosureLevel::Basic);
        assert!(help.correction.is_none());
        assert!(help.section("Available commands").is_some());
    }

    #[test]
    fn test_next_argument() {
        let help = HelpRenderer::render_help("search ldap.example.com ?", DisclosureLevel::Basic);
        let next = help.section("Next argument").unwrap();
        assert!(next.lines[0].starts_with("<base_dn>"));

        let help = HelpRenderer::render_help("search ldap.example.com dc=x -a cn", DisclosureLevel::Basic);
        assert!(help.section("Next argument").unwrap().lines[0].starts_with("<filter>"));

        let help = HelpRenderer::render_help("search", DisclosureLevel::Basic);
        assert!(help.section("Next argument").is_none());
    }

    #[test]
    fn test_plain_text_output() {
        let text = HelpRenderer::render_help("delete", DisclosureLevel::Full).to_string();
        assert!(text.starts_with("delete - Delete an entry"));
        assert!(text.contains("--recursive"));
        assert!(!text.contains('\x1b'));
    }

    #[test]
    fn test_disclosure_level() {
        assert_eq!(DisclosureLevel::from_repeats(0), DisclosureLevel::Basic);
        assert_eq!(DisclosureLevel::from_repeats(1), DisclosureLevel::Detailed);
        assert_eq!(DisclosureLevel::from_repeats(7), DisclosureLevel::Full);
        assert_eq!(DisclosureLevel::Full.next(), DisclosureLevel::Full);
        assert_eq!("Detailed".parse::<DisclosureLevel>(), Ok(DisclosureLevel::Detailed));
        assert!("verbose".parse::<DisclosureLevel>().is_err());
    }
}
