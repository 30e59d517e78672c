/// Intelligence module
///
/// The command-analysis engine: intent detection, corrections, next-step
/// suggestions and progressive help. Everything here is synchronous and works
/// on an explicit [`Context`].

pub mod analyzer;
pub mod context;
pub mod corrector;
pub mod help_renderer;
pub mod intent;
pub mod redact;
pub mod scorer;
pub mod suggestion_engine;
pub mod tokenizer;

pub use analyzer::{AnalysisResult, Analyzer, ErrorKind, ParsedFlag, TurnState, Validation};
pub use context::{CommandHistoryEntry, Context, DEFAULT_HISTORY_LIMIT};
pub use corrector::{suggest_correction, Correction, MAX_CORRECTIONS};
pub use help_renderer::{DisclosureLevel, FormattedHelp, HelpRenderer, HelpSection};
pub use intent::{ArgSpec, FlagSpec, Intent};
pub use redact::redact_secrets;
pub use scorer::Scorer;
pub use suggestion_engine::{Suggestion, SuggestionEngine, MAX_SUGGESTIONS};
