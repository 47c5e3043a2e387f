// rollbook CLI - student roster reconciliation batch jobs

mod check;
mod compare;
mod exit_codes;
mod masterlist;
mod roster;
mod sql;
mod util;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use rollbook_io::IoError;
use rollbook_recon::ReconError;

use exit_codes::{EXIT_SUCCESS, EXIT_ERROR, EXIT_USAGE, io_exit_code, recon_exit_code};

#[derive(Parser)]
#[command(name = "rollbook")]
#[command(about = "Reconcile student rosters: masterlist, database export, attendance sheets")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Debug logging (overrides RUST_LOG)
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only warnings and errors (overrides RUST_LOG)
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse the masterlist CSV into masterlist JSON
    #[command(after_help = "\
Examples:
  rollbook masterlist 'Masterlist 25-26.csv'
  rollbook masterlist masterlist.csv -o data/masterlist.json")]
    Masterlist {
        /// Masterlist CSV export (banner line, header line, rows)
        csv: PathBuf,

        /// Output JSON file
        #[arg(long, short = 'o', default_value = "masterlist.json")]
        output: PathBuf,
    },

    /// Compare masterlist students against a database export
    #[command(after_help = "\
Examples:
  rollbook compare masterlist.json db.json
  rollbook compare masterlist.json db.json -o comparison.json
  rollbook compare masterlist.json db.json --json | jq .summary
  rollbook compare masterlist.json db.json --rules rules.toml --strict")]
    Compare {
        /// Masterlist JSON (authoritative source)
        masterlist: PathBuf,

        /// Database export JSON (array of {id, full_name, english_name, grade})
        database: PathBuf,

        /// Write the comparison JSON to this file
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Rules TOML (duplicate policy)
        #[arg(long, env = "ROLLBOOK_RULES")]
        rules: Option<PathBuf>,

        /// Print the comparison JSON to stdout instead of the human report
        #[arg(long)]
        json: bool,

        /// Exit 7 when anything needs review (mismatch, missing or orphan)
        #[arg(long)]
        strict: bool,
    },

    /// Build a deduplicated roster from attendance HTML exports
    #[command(after_help = "\
Examples:
  rollbook roster 'Attendance ASA (Q1)/'
  rollbook roster exports/ --markdown roster.md --json roster.json
  rollbook roster exports/ --rules rules.toml -v")]
    Roster {
        /// Directory containing *.html exports (one per activity)
        dir: PathBuf,

        /// Write the Markdown roster here (printed to stdout when no output is given)
        #[arg(long)]
        markdown: Option<PathBuf>,

        /// Write the roster JSON here
        #[arg(long)]
        json: Option<PathBuf>,

        /// Rules TOML (roster keyword lists)
        #[arg(long, env = "ROLLBOOK_RULES")]
        rules: Option<PathBuf>,
    },

    /// Generate SQL scripts for manual review
    #[command(subcommand)]
    Sql(sql::SqlCommands),

    /// Validate rules and corrections files without running anything
    #[command(after_help = "\
Examples:
  rollbook check --rules rules.toml
  rollbook check --corrections corrections.toml
  rollbook check --rules rules.toml --corrections corrections.toml")]
    Check(CheckArgs),
}

#[derive(Args)]
#[group(required = true, multiple = true)]
struct CheckArgs {
    /// Rules TOML to validate
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Corrections TOML to validate
    #[arg(long)]
    corrections: Option<PathBuf>,
}

fn long_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nengine:  rollbook-recon ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   debug",
            "\ntarget:  ", env!("TARGET"),
        )
    } else {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nengine:  rollbook-recon ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   release",
            "\ntarget:  ", env!("TARGET"),
        )
    }
}

/// stderr logger; `-v`/`-q` win over `RUST_LOG`, which wins over `info`.
fn init_logging(verbose: bool, quiet: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    } else if quiet {
        builder.filter_level(log::LevelFilter::Warn);
    }
    builder.format_timestamp(None).format_target(false).init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::Masterlist { csv, output } => masterlist::cmd_masterlist(csv, output),
        Commands::Compare { masterlist, database, output, rules, json, strict } => {
            compare::cmd_compare(masterlist, database, output, rules, json, strict)
        }
        Commands::Roster { dir, markdown, json, rules } => {
            roster::cmd_roster(dir, markdown, json, rules)
        }
        Commands::Sql(cmd) => sql::cmd_sql(cmd),
        Commands::Check(CheckArgs { rules, corrections }) => check::cmd_check(rules, corrections),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn args(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    pub fn general(msg: impl Into<String>) -> Self {
        Self::new(EXIT_ERROR, msg)
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<IoError> for CliError {
    fn from(err: IoError) -> Self {
        let hint = match &err {
            IoError::MissingLine(_) => {
                Some("the masterlist needs a banner line and a header line before the rows".to_string())
            }
            _ => None,
        };
        Self { code: io_exit_code(&err), message: err.to_string(), hint }
    }
}

impl From<ReconError> for CliError {
    fn from(err: ReconError) -> Self {
        Self::new(recon_exit_code(&err), err.to_string())
    }
}
