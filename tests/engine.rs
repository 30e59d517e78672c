//! End-to-end checks of the analysis, suggestion and help engine through the
//! public API.

use ldapie_lib::core::{Directory, DirectoryError, DirectoryOutcome, DryRunDirectory};
use ldapie_lib::intelligence::{
    suggest_correction, AnalysisResult, Analyzer, CommandHistoryEntry, Context, DisclosureLevel,
    ErrorKind, HelpRenderer, Intent, SuggestionEngine, TurnState,
};
use ldapie_lib::shell::{Session, TurnOutcome};
use ldapie_lib::Database;
use std::sync::Arc;

struct UnreachableDirectory;

impl Directory for UnreachableDirectory {
    fn execute(&mut self, _: &AnalysisResult) -> Result<DirectoryOutcome, DirectoryError> {
        Err(DirectoryError::Connection("Can't contact LDAP server".to_string()))
    }
}

#[test]
fn exact_commands_classify_without_errors() {
    let context = Context::new();
    let lines = [
        ("search ldap.example.com \"dc=example,dc=com\"", Intent::Search),
        ("info ldap.example.com", Intent::Info),
        ("compare ldap.example.com cn=a,dc=x cn=b,dc=x", Intent::Compare),
        ("schema ldap.example.com", Intent::Schema),
        ("add ldap.example.com cn=a,dc=x", Intent::Add),
        ("modify ldap.example.com cn=a,dc=x", Intent::Modify),
        ("delete ldap.example.com cn=a,dc=x", Intent::Delete),
        ("rename ldap.example.com cn=a,dc=x cn=b", Intent::Rename),
        ("interactive", Intent::Interactive),
    ];

    for (line, intent) in lines {
        let result = Analyzer::analyze(line, &context);
        assert_eq!(result.intent, intent, "{}", line);
        assert!(result.errors.is_empty(), "{}: {:?}", line, result.errors);
    }
}

#[test]
fn corrections_stay_below_half_the_token_length() {
    let candidates: Vec<&str> = Intent::names().collect();
    let tokens = [
        "serch", "seach", "inf", "infp", "comapre", "shema", "ad", "modfy", "delte", "renme",
        "interactve", "x", "qwertyuiop", "",
    ];

    for token in tokens {
        let ceil_half = (token.chars().count() + 1) / 2;
        let corrections = suggest_correction(token, &candidates);
        assert!(corrections.len() <= 3);
        for correction in corrections {
            assert!(correction.distance < ceil_half, "{} -> {:?}", token, correction);
        }
    }

    let result = suggest_correction("serch", ["search", "info", "schema"]);
    let pairs: Vec<_> = result.iter().map(|c| c.as_pair()).collect();
    assert_eq!(pairs, vec![("search", 1)]);
}

#[test]
fn help_is_deterministic() {
    for partial in ["", "search", "search ldap.example.com", "serch", "rename h dn"] {
        for level in [DisclosureLevel::Basic, DisclosureLevel::Detailed, DisclosureLevel::Full] {
            let first = HelpRenderer::render_help(partial, level).to_string();
            let second = HelpRenderer::render_help(partial, level).to_string();
            assert_eq!(first, second);
        }
    }
}

#[tokio::test]
async fn repeated_help_queries_deepen_then_stay_full() {
    let mut session = Session::new(DryRunDirectory, Context::new());
    let mut levels = Vec::new();

    for _ in 0..3 {
        if let TurnOutcome::Help { help, .. } = session.run_turn("search ?").await {
            levels.push(help.level);
        }
    }
    assert_eq!(
        levels,
        vec![DisclosureLevel::Basic, DisclosureLevel::Detailed, DisclosureLevel::Full]
    );

    if let TurnOutcome::Help { help, .. } = session.run_turn("search ?").await {
        assert_eq!(help.level, DisclosureLevel::Full);
    } else {
        panic!("expected help");
    }
}

#[test]
fn empty_input_is_an_unknown_command() {
    let result = Analyzer::analyze("   ", &Context::new());
    assert_eq!(result.intent, Intent::Unknown);
    assert_eq!(result.errors.len(), 1);
    assert!(matches!(result.errors[0], ErrorKind::UnknownCommand { .. }));
    assert!(result.corrections.is_empty());
}

#[test]
fn successful_search_suggests_show_before_help() {
    let mut context = Context::new().with_base_dn("dc=example,dc=com");
    context.record(CommandHistoryEntry::new(
        "search ldap.example.com dc=example,dc=com",
        Some(Intent::Search),
        true,
    ));

    let suggestions = SuggestionEngine::suggest_next(&context);
    let show = suggestions.iter().position(|s| s.text.starts_with("show")).unwrap();
    let help = suggestions.iter().position(|s| s.text == "search --help").unwrap();
    assert!(show < help);
    assert!(suggestions.len() <= 5);
}

#[test]
fn unterminated_quote_is_reported() {
    let result = Analyzer::analyze("search \"dc=example,dc=com", &Context::new());
    assert!(result
        .errors
        .iter()
        .any(|e| matches!(e, ErrorKind::UnterminatedQuote { offset: 7 })));
    assert_eq!(result.state, TurnState::ErrorDetected);
}

#[test]
fn fresh_context_has_no_suggestions() {
    assert!(SuggestionEngine::suggest_next(&Context::new()).is_empty());
}

#[tokio::test]
async fn connection_failures_rank_connection_fixes_first() {
    let mut session = Session::new(UnreachableDirectory, Context::new());
    session.run_turn("search ldap.example.com dc=example,dc=com").await;

    let suggestions = session.suggestions(5);
    assert_eq!(suggestions[0].text, "info ldap.example.com");
    assert!(suggestions.iter().any(|s| s.text.ends_with("--ssl --port 636")));
    // the search never succeeded, so no result follow-ups
    assert!(suggestions.iter().all(|s| !s.text.starts_with("show")));
}

#[tokio::test]
async fn failed_turns_never_end_the_session() {
    let db = Arc::new(Database::new_in_memory().await.unwrap());
    let mut session = Session::new(DryRunDirectory, Context::new()).with_database(Arc::clone(&db), "it");

    for line in ["", "serch", "search", "search \"x", "info --bogus h", "search?", "info ldap.example.com"] {
        session.run_turn(line).await;
    }

    assert_eq!(session.context().current_intent, Some(Intent::Info));
    assert!(session.context().last_error.is_none());

    let stats = db.stats().await.unwrap();
    assert_eq!(stats.succeeded_commands, 1);
}
