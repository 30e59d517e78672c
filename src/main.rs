// ldapie - LDAP for humans
//
// Entry point. Parses CLI args, sets up logging and config, and dispatches to
// the handlers below.

use anyhow::Context as _;
use chrono::Utc;
use clap::{Parser, Subcommand};
use ldapie_lib::{
    core::{DryRunDirectory, Searcher},
    intelligence::{tokenizer::quote_if_needed, Context, DisclosureLevel, HelpRenderer, Intent},
    shell::{render, Repl, Session},
    Config, Database, LdapieError,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ldapie", version, about = "LDAP for humans", disable_help_subcommand = true)]
struct Cli {
    /// Config file (default: <config dir>/ldapie/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check a command without running it
    #[command(long_flag = "validate")]
    Validate {
        /// Print the analysis as JSON
        #[arg(long)]
        json: bool,

        /// The command to check
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        line: Vec<String>,
    },

    /// Show help for a (partial) command
    Help {
        #[arg(long, default_value = "basic")]
        level: DisclosureLevel,

        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        partial: Vec<String>,
    },

    /// Suggest next commands after replaying the given ones
    Suggest {
        /// Earlier commands, one per argument, oldest first
        history: Vec<String>,
    },

    /// Start the interactive shell
    Shell {
        #[arg(long)]
        host: Option<String>,

        #[arg(long)]
        base: Option<String>,
    },

    /// Show or search persisted history
    History {
        /// Fuzzy search query
        query: Option<String>,

        /// Only commands of this kind
        #[arg(long, value_parser = parse_intent)]
        intent: Option<Intent>,

        #[arg(short, long, default_value_t = 20)]
        limit: usize,

        /// Print database counts instead of commands
        #[arg(long)]
        stats: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {}", describe_error(&err));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("could not load config from {}", path.display()))?,
        None => Config::load().context("could not load config")?,
    };

    match cli.command {
        Some(Commands::Validate { json, line }) => handle_validate(&line, json),
        Some(Commands::Help { level, partial }) => {
            let help = HelpRenderer::render_help(&join_argv(&partial), level);
            print!("{}", help);
            Ok(ExitCode::SUCCESS)
        }
        Some(Commands::Suggest { history }) => handle_suggest(&history, &config).await,
        Some(Commands::History { stats: true, .. }) => handle_stats(&config).await,
        Some(Commands::History { query, intent, limit, .. }) => {
            handle_history(query.as_deref(), intent, limit, &config).await
        }
        Some(Commands::Shell { host, base }) => handle_shell(host, base, &config).await,
        None => handle_shell(None, None, &config).await,
    }
}

// Our own errors carry a friendlier message than their Display
fn describe_error(err: &anyhow::Error) -> String {
    match err.downcast_ref::<LdapieError>() {
        Some(inner) if err.chain().count() > 1 => format!("{}: {}", err, inner.user_message()),
        Some(inner) => inner.user_message(),
        None => format!("{:#}", err),
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_env("LDAPIE_LOG").unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn handle_validate(line: &[String], json: bool) -> anyhow::Result<ExitCode> {
    let validation = ldapie_lib::intelligence::Analyzer::validate(&join_argv(line), &Context::new());

    if json {
        println!("{}", serde_json::to_string_pretty(&validation)?);
    } else {
        print!("{}", render::render_validation(&validation));
    }

    if validation.analysis.is_clean() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

async fn handle_suggest(history: &[String], config: &Config) -> anyhow::Result<ExitCode> {
    let mut session = Session::new(
        DryRunDirectory,
        Context::with_history_limit(config.history.limit),
    );
    for line in history {
        session.run_turn(line).await;
    }

    let suggestions = session.suggestions(config.suggestion_limit());
    print!("{}", render::render_suggestions(&suggestions));

    Ok(ExitCode::SUCCESS)
}

async fn handle_history(
    query: Option<&str>,
    intent: Option<Intent>,
    limit: usize,
    config: &Config,
) -> anyhow::Result<ExitCode> {
    let db = Arc::new(open_database(config).await?);
    let searcher = Searcher::new(Arc::clone(&db));

    let lines: Vec<String> = match (query, intent) {
        (Some(query), _) => searcher
            .search(query, limit)
            .await?
            .into_iter()
            .filter(|result| intent.is_none() || result.command.intent() == intent)
            .map(|result| result.command.raw_text)
            .collect(),
        (None, Some(intent)) => searcher
            .search_by_intent(intent, limit)
            .await?
            .into_iter()
            .map(|result| result.command.raw_text)
            .collect(),
        (None, None) => db
            .get_recent_commands(limit as i64)
            .await?
            .into_iter()
            .map(|command| command.raw_text)
            .collect(),
    };

    print!("{}", render::render_history(&lines));
    db.close().await;

    Ok(ExitCode::SUCCESS)
}

async fn handle_stats(config: &Config) -> anyhow::Result<ExitCode> {
    let db = open_database(config).await?;
    let stats = db.stats().await?;

    println!("History database: {}", db.path().display());
    println!("{}", "=".repeat(60));
    println!("Commands:        {}", stats.total_commands);
    println!("  succeeded:     {}", stats.succeeded_commands);
    println!("Sessions:        {}", stats.sessions);
    println!("Stored values:   {}", stats.stored_values);

    db.close().await;
    Ok(ExitCode::SUCCESS)
}

async fn handle_shell(
    host: Option<String>,
    base: Option<String>,
    config: &Config,
) -> anyhow::Result<ExitCode> {
    let mut context = Context::with_history_limit(config.history.limit);
    context.current_host = host;
    context.current_base_dn = base;

    let mut session = Session::new(DryRunDirectory, context);

    let mut db = None;
    if config.history.persist {
        // History is a convenience; the shell works without it
        match open_database(config).await {
            Ok(opened) => {
                let opened = Arc::new(opened);
                let session_id = format!("{}-{}", Utc::now().format("%Y%m%d%H%M%S"), std::process::id());
                tracing::info!(session = %session_id, "recording history");
                session = session.with_database(Arc::clone(&opened), session_id);
                if let Err(e) = session.restore_defaults().await {
                    tracing::warn!(error = %e, "could not restore last host and base DN");
                }
                db = Some(opened);
            }
            Err(e) => tracing::warn!(error = %e, "history disabled"),
        }
    }

    let mut repl = Repl::new(session, config.shell.prompt.clone(), config.suggestion_limit());
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut stdout = io::stdout();
    repl.run(stdin, &mut stdout).await?;
    stdout.flush()?;

    if let Some(db) = db {
        db.close().await;
    }

    Ok(ExitCode::SUCCESS)
}

async fn open_database(config: &Config) -> anyhow::Result<Database> {
    let path = config.database_path()?;
    Database::new(&path)
        .await
        .with_context(|| format!("could not open history database at {}", path.display()))
}

fn parse_intent(name: &str) -> Result<Intent, String> {
    Intent::from_name(name).ok_or_else(|| {
        format!(
            "unknown command '{}' (expected one of: {})",
            name,
            Intent::names().collect::<Vec<_>>().join(", ")
        )
    })
}

// The shell already split the line; put it back together so quoting survives
fn join_argv(args: &[String]) -> String {
    args.iter()
        .map(|arg| quote_if_needed(arg))
        .collect::<Vec<_>>()
        .join(" ")
}
