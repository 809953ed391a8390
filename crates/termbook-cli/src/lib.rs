use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{ArgAction, Args, Parser, Subcommand};
use termbook_config::{Config, LoadOptions};
use termbook_ops::{ExportOptions, OperationError, Operations, PrerenderOptions};
use tracing_subscriber::EnvFilter;

/// Entry point for CLI execution. Returns the desired exit code.
pub fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut options = LoadOptions::default();
    if let Some(path) = cli.config {
        options = options.with_override_path(path);
    }
    let config = Config::load(options)?;
    let root = config.sources.working_directory.clone();
    let ops = Operations::new(config);

    match cli.command {
        Command::Prerender(args) => handle_prerender(&ops, &root, args),
        Command::SyncGlossary(args) => handle_sync(&ops, &root, args),
        Command::Cleanup => handle_cleanup(&ops, &root),
    }
}

fn handle_prerender(ops: &Operations, root: &Path, args: PrerenderArgs) -> Result<i32> {
    let options = PrerenderOptions {
        dry_run: args.dry_run,
    };

    match ops.prerender(options) {
        Ok(outcome) => {
            println!(
                "✅ Processed {} files, substituted {} terms and {} dashes",
                outcome.files_processed(),
                outcome.terms_replaced(),
                outcome.dashes_replaced()
            );
            if outcome.dry_run {
                println!("   Dry run: nothing written to {}/", relative(&outcome.staging_dir, root));
            } else {
                println!("   Staged files: {}/", relative(&outcome.staging_dir, root));
            }
            Ok(0)
        }
        Err(err) => missing_glossary(err, root),
    }
}

fn handle_sync(ops: &Operations, root: &Path, args: SyncArgs) -> Result<i32> {
    let options = ExportOptions {
        output: args.output.map(|path| root.join(path)),
    };

    match ops.export(options) {
        Ok(outcome) => {
            println!(
                "✅ Synchronized {} terms: {} → {}",
                outcome.terms,
                relative(&outcome.glossary_path, root),
                relative(&outcome.output_path, root)
            );
            if outcome.duplicates > 0 {
                println!(
                    "   {} duplicate terms overwritten by later entries",
                    outcome.duplicates
                );
            }
            Ok(0)
        }
        Err(err) => missing_glossary(err, root),
    }
}

fn handle_cleanup(ops: &Operations, root: &Path) -> Result<i32> {
    let outcome = ops.cleanup();
    println!(
        "ℹ️  Staged files in {}/ retained for reuse ({} files)",
        relative(&outcome.staging_dir, root),
        outcome.retained
    );
    println!("   They will be overwritten on the next build");
    Ok(0)
}

/// A missing glossary is reported and mapped to exit code 1; anything else
/// propagates.
fn missing_glossary(err: OperationError, root: &Path) -> Result<i32> {
    match err {
        OperationError::MissingGlossary { path } => {
            eprintln!("error: glossary file {} not found", relative(&path, root));
            Ok(1)
        }
        other => Err(other.into()),
    }
}

fn relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(io::stderr().is_terminal())
        .with_writer(io::stderr)
        .init();
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Glossary and typography hooks for book builds",
    propagate_version = true
)]
struct Cli {
    /// Use this config file on top of the discovered ones
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Stage chapters with glossary terms and dashes resolved
    Prerender(PrerenderArgs),
    /// Export the glossary as JSON
    SyncGlossary(SyncArgs),
    /// Post-render hook; keeps staged files for the next build
    Cleanup,
}

#[derive(Args)]
struct PrerenderArgs {
    /// Report what would be staged without writing
    #[arg(long = "dry-run")]
    dry_run: bool,
}

#[derive(Args)]
struct SyncArgs {
    /// Write the JSON export here instead of the configured path
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,
}
