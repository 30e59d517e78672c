/// Command analyzer
///
/// Classifies a line of input into an [`Intent`] and checks it against the
/// intent's argument and flag table before anything is executed. Analysis is
/// total: every problem becomes an [`ErrorKind`] in the result, nothing is
/// ever returned as an `Err`.

use crate::intelligence::context::Context;
use crate::intelligence::corrector::{suggest_correction, Correction};
use crate::intelligence::intent::Intent;
use crate::intelligence::tokenizer::{quote_if_needed, strip_help_marker, tokenize, Token};
use serde::Serialize;
use std::fmt;

/// Where a single prompt turn ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnState {
    /// Waiting for the next line; every turn starts here
    AwaitingInput,
    Classified,
    ErrorDetected,
    HelpOverlay,
}

/// Problems found in a command line, plus failures passed through from the
/// directory. These are values, not errors: they never abort a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ErrorKind {
    UnknownCommand {
        token: String,
        did_you_mean: Option<String>,
    },
    MissingArgument {
        intent: Intent,
        name: String,
        hint: Option<String>,
    },
    UnrecognizedFlag {
        flag: String,
        did_you_mean: Option<String>,
    },
    UnterminatedQuote {
        /// Byte offset of the opening quote within the command text
        offset: usize,
    },
    /// Several corrections tied for the best distance
    AmbiguousMatch {
        token: String,
        candidates: Vec<String>,
    },
    /// The directory could not be reached
    ConnectionError { message: String },
    /// The directory rejected an operation
    OperationError {
        message: String,
        hint: Option<String>,
    },
}

impl ErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::UnknownCommand { .. } => "unknown_command",
            ErrorKind::MissingArgument { .. } => "missing_argument",
            ErrorKind::UnrecognizedFlag { .. } => "unrecognized_flag",
            ErrorKind::UnterminatedQuote { .. } => "unterminated_quote",
            ErrorKind::AmbiguousMatch { .. } => "ambiguous_match",
            ErrorKind::ConnectionError { .. } => "connection_error",
            ErrorKind::OperationError { .. } => "operation_error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::UnknownCommand { token, .. } if token.is_empty() => {
                write!(f, "No command given")
            }
            ErrorKind::UnknownCommand { token, did_you_mean } => {
                write!(f, "Unknown command '{}'", token)?;
                if let Some(candidate) = did_you_mean {
                    write!(f, ". Did you mean '{}'?", candidate)?;
                }
                Ok(())
            }
            ErrorKind::MissingArgument { intent, name, hint } => {
                write!(f, "Missing argument <{}> for '{}'", name, intent)?;
                if let Some(hint) = hint {
                    write!(f, " ({})", hint)?;
                }
                Ok(())
            }
            ErrorKind::UnrecognizedFlag { flag, did_you_mean } => {
                write!(f, "Unrecognized flag '{}'", flag)?;
                if let Some(candidate) = did_you_mean {
                    write!(f, ". Did you mean '{}'?", candidate)?;
                }
                Ok(())
            }
            ErrorKind::UnterminatedQuote { offset } => {
                write!(f, "Unterminated quote starting at column {}", offset + 1)
            }
            ErrorKind::AmbiguousMatch { token, candidates } => {
                write!(f, "'{}' is ambiguous, could be: {}", token, candidates.join(", "))
            }
            ErrorKind::ConnectionError { message } => write!(f, "Connection error: {}", message),
            ErrorKind::OperationError { message, hint } => {
                write!(f, "Operation failed: {}", message)?;
                if let Some(hint) = hint {
                    write!(f, " ({})", hint)?;
                }
                Ok(())
            }
        }
    }
}

/// A flag as it appeared on the command line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedFlag {
    pub name: String,
    pub value: Option<String>,
}

/// Everything the analyzer learned about one line of input
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub input: String,
    pub intent: Intent,
    pub state: TurnState,
    pub help_requested: bool,
    pub tokens: Vec<String>,
    pub positionals: Vec<String>,
    pub flags: Vec<ParsedFlag>,
    pub errors: Vec<ErrorKind>,
    pub warnings: Vec<String>,
    pub corrections: Vec<Correction>,
}

impl AnalysisResult {
    fn new(input: &str, help_requested: bool) -> Self {
        Self {
            input: input.trim().to_string(),
            intent: Intent::Unknown,
            state: TurnState::AwaitingInput,
            help_requested,
            tokens: Vec::new(),
            positionals: Vec::new(),
            flags: Vec::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
            corrections: Vec::new(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// The input without its help marker
    pub fn partial_command(&self) -> &str {
        strip_help_marker(&self.input).0
    }

    /// Positional argument by its name in the intent's table
    pub fn argument(&self, name: &str) -> Option<&str> {
        self.intent
            .positionals()
            .iter()
            .position(|arg| arg.name == name)
            .and_then(|idx| self.positionals.get(idx))
            .map(String::as_str)
    }

    /// True if the flag was given under any of its spellings
    pub fn has_flag(&self, name: &str) -> bool {
        self.find_flag(name).is_some()
    }

    pub fn flag_value(&self, name: &str) -> Option<&str> {
        self.find_flag(name).and_then(|flag| flag.value.as_deref())
    }

    fn find_flag(&self, name: &str) -> Option<&ParsedFlag> {
        match self.intent.find_flag(name) {
            Some(spec) => self.flags.iter().find(|flag| spec.matches(&flag.name)),
            None => self.flags.iter().find(|flag| flag.name == name),
        }
    }
}

/// Outcome of `--validate`: the analysis plus a dry-run preview
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Validation {
    pub analysis: AnalysisResult,
    /// Command-specific warnings on top of the analysis warnings
    pub warnings: Vec<String>,
    /// What would run, present only when the command is valid
    pub preview: Option<String>,
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        self.analysis.is_clean() && self.preview.is_some()
    }
}

#[derive(Default)]
struct ParsedArguments {
    positionals: Vec<String>,
    flags: Vec<ParsedFlag>,
    errors: Vec<ErrorKind>,
    warnings: Vec<String>,
}

/// Command analyzer
pub struct Analyzer;

impl Analyzer {
    /// Classify `raw_text` and check it against its intent's schema.
    ///
    /// A trailing `?` turns the line into a help query: the partial command is
    /// classified but missing arguments and unknown flags are not reported.
    pub fn analyze(raw_text: &str, context: &Context) -> AnalysisResult {
        let (partial, help_requested) = strip_help_marker(raw_text);
        let tokenized = tokenize(partial);
        let mut result = AnalysisResult::new(raw_text, help_requested);
        result.tokens = tokenized.texts();

        if let Some(offset) = tokenized.unterminated_quote {
            result.errors.push(ErrorKind::UnterminatedQuote { offset });
        }

        match tokenized.tokens.split_first() {
            None => {
                if !help_requested {
                    result.errors.push(ErrorKind::UnknownCommand {
                        token: String::new(),
                        did_you_mean: None,
                    });
                }
            }
            Some((first, rest)) => match Intent::from_name(&first.text) {
                Some(intent) => {
                    result.intent = intent;
                    let parsed = Self::parse_arguments(intent, rest, context);
                    result.positionals = parsed.positionals;
                    result.flags = parsed.flags;
                    if !help_requested {
                        result.errors.extend(parsed.errors);
                        result.warnings.extend(parsed.warnings);
                    }
                }
                None => Self::classify_unknown(&first.text, &mut result),
            },
        }

        result.state = if help_requested {
            TurnState::HelpOverlay
        } else if result.errors.is_empty() {
            TurnState::Classified
        } else {
            TurnState::ErrorDetected
        };

        tracing::debug!(
            intent = %result.intent,
            state = ?result.state,
            errors = result.errors.len(),
            "analyzed command"
        );

        result
    }

    /// Analyze without executing, adding command-specific warnings and a
    /// preview of what would happen.
    pub fn validate(raw_text: &str, context: &Context) -> Validation {
        let analysis = Self::analyze(raw_text, context);

        if !analysis.is_clean() || analysis.help_requested {
            return Validation {
                analysis,
                warnings: Vec::new(),
                preview: None,
            };
        }

        let mut warnings = Vec::new();
        match analysis.intent {
            Intent::Search => {
                if let Some(filter) = analysis.argument("filter") {
                    if !(filter.starts_with('(') && filter.ends_with(')')) {
                        warnings.push(format!(
                            "LDAP filter should be enclosed in parentheses. Try: search {} {} \"({})\"",
                            analysis.argument("host").unwrap_or("<host>"),
                            quote_if_needed(analysis.argument("base_dn").unwrap_or("<base_dn>")),
                            filter
                        ));
                    }
                }
            }
            Intent::Delete => {
                if analysis.has_flag("--recursive") {
                    warnings.push(
                        "This will delete the entry and all its children recursively".to_string(),
                    );
                } else {
                    warnings.push(
                        "Only an entry without children can be deleted. Add --recursive to remove a whole subtree"
                            .to_string(),
                    );
                }
            }
            _ => {}
        }

        let preview = Some(Self::preview(&analysis));
        Validation {
            analysis,
            warnings,
            preview,
        }
    }

    /// One-line description of what executing the analysed command would do
    pub fn preview(analysis: &AnalysisResult) -> String {
        let arg = |name: &str| analysis.argument(name).unwrap_or("?").to_string();

        match analysis.intent {
            Intent::Search => format!(
                "Would search {} with base DN {} using filter {}",
                arg("host"),
                arg("base_dn"),
                analysis.argument("filter").unwrap_or("(objectClass=*)")
            ),
            Intent::Info => format!("Would read server information from {}", arg("host")),
            Intent::Compare => format!(
                "Would compare {} with {} on {}",
                arg("dn1"),
                arg("dn2"),
                arg("host")
            ),
            Intent::Schema => match analysis.argument("object_class") {
                Some(class) => format!("Would describe object class {} on {}", class, arg("host")),
                None => format!("Would list the schema of {}", arg("host")),
            },
            Intent::Add => format!("Would add entry {} on {}", arg("dn"), arg("host")),
            Intent::Modify => format!("Would modify entry {} on {}", arg("dn"), arg("host")),
            Intent::Delete => {
                if analysis.has_flag("--recursive") {
                    format!(
                        "Would recursively delete {} and all its children on {}",
                        arg("dn"),
                        arg("host")
                    )
                } else {
                    format!("Would delete entry {} on {}", arg("dn"), arg("host"))
                }
            }
            Intent::Rename => match analysis.flag_value("--parent") {
                Some(parent) => format!(
                    "Would move {} to {},{} on {}",
                    arg("dn"),
                    arg("new_rdn"),
                    parent,
                    arg("host")
                ),
                None => format!(
                    "Would rename {} to {} on {}",
                    arg("dn"),
                    arg("new_rdn"),
                    arg("host")
                ),
            },
            Intent::Interactive => match analysis.flag_value("--host") {
                Some(host) => format!("Would start an interactive session on {}", host),
                None => "Would start an interactive session".to_string(),
            },
            Intent::Unknown => format!("Would not execute: {}", analysis.input),
        }
    }

    fn classify_unknown(token: &str, result: &mut AnalysisResult) {
        let corrections = suggest_correction(token, Intent::names());
        let best = corrections.first().map(|c| c.distance);
        let tied: Vec<String> = corrections
            .iter()
            .filter(|c| Some(c.distance) == best)
            .map(|c| c.candidate.clone())
            .collect();

        let error = if tied.len() > 1 {
            ErrorKind::AmbiguousMatch {
                token: token.to_string(),
                candidates: tied,
            }
        } else {
            ErrorKind::UnknownCommand {
                token: token.to_string(),
                did_you_mean: tied.into_iter().next(),
            }
        };

        result.errors.push(error);
        result.corrections = corrections;
    }

    fn parse_arguments(intent: Intent, tokens: &[Token], context: &Context) -> ParsedArguments {
        let mut parsed = ParsedArguments::default();
        let mut i = 0;

        while i < tokens.len() {
            let token = &tokens[i];
            i += 1;

            if !token.is_flag() {
                parsed.positionals.push(token.text.clone());
                continue;
            }

            let (name, inline_value) = match token.text.split_once('=') {
                Some((name, value)) => (name.to_string(), Some(value.to_string())),
                None => (token.text.clone(), None),
            };

            match intent.find_flag(&name) {
                Some(spec) if spec.takes_value => {
                    let value = inline_value.or_else(|| match tokens.get(i) {
                        Some(next) if !next.is_flag() => {
                            i += 1;
                            Some(next.text.clone())
                        }
                        _ => None,
                    });
                    if value.is_none() {
                        parsed.errors.push(ErrorKind::MissingArgument {
                            intent,
                            name: spec.long_name().to_string(),
                            hint: Some(format!("{} expects a value", name)),
                        });
                    }
                    parsed.flags.push(ParsedFlag { name, value });
                }
                Some(_) => {
                    if inline_value.is_some() {
                        parsed.warnings.push(format!("{} does not take a value", name));
                    }
                    parsed.flags.push(ParsedFlag {
                        name,
                        value: inline_value,
                    });
                }
                None => {
                    // Flags of this command first, then flags seen earlier in the session
                    let candidates = intent
                        .flags()
                        .flat_map(|flag| flag.names.iter().map(|n| n.to_string()))
                        .chain(context.historical_flags());
                    let did_you_mean = suggest_correction(&name, candidates)
                        .into_iter()
                        .next()
                        .map(|c| c.candidate);
                    parsed.errors.push(ErrorKind::UnrecognizedFlag {
                        flag: name,
                        did_you_mean,
                    });
                }
            }
        }

        let specs = intent.positionals();
        for spec in specs
            .iter()
            .skip(parsed.positionals.len())
            .filter(|spec| spec.required)
        {
            parsed.errors.push(ErrorKind::MissingArgument {
                intent,
                name: spec.name.to_string(),
                hint: Self::hint_for(spec.name, context),
            });
        }

        if parsed.positionals.len() > specs.len() {
            parsed.warnings.push(format!(
                "Unexpected argument(s): {}",
                parsed.positionals[specs.len()..].join(" ")
            ));
        }

        parsed
    }

    fn hint_for(argument: &str, context: &Context) -> Option<String> {
        match argument {
            "host" => context
                .current_host
                .as_ref()
                .map(|host| format!("last used host: {}", host)),
            "base_dn" | "dn" => context
                .current_base_dn
                .as_ref()
                .map(|dn| format!("last used DN: {}", dn)),
            _ => None,
        }
    }
}
