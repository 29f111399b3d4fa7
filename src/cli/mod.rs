//! CLI surface for setlogs.
//!
//! Extensible command tree + thin handlers; anything with semantics lives in
//! the library: handlers only wire arguments to `Store`, `import` and
//! `plugin` calls and print the result.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::Result;
use crate::core::Kind;

mod commands;
pub mod render;

// =============================================================================
// Entry + global options
// =============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "setlogs",
    version,
    about = "Versioned keyed-record bases built from a baseline plus patches",
    arg_required_else_help = true
)]
pub struct Cli {
    /// Storage root (default: SETLOGS_DATA_DIR, else the XDG data dir).
    #[arg(long, global = true, value_name = "PATH")]
    pub root: Option<PathBuf>,

    /// Errors only.
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,

    /// Debug output (repeat for more).
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize the storage root.
    Init,

    /// Import a delimited file as a new baseline, or as a patch against an
    /// existing base.
    #[command(alias = "csv")]
    Import(ImportArgs),

    /// Print a base's fully materialized view.
    View(ViewArgs),

    /// List registered bases.
    Bases,

    /// Run a named transformation plugin against a base.
    Plugin(PluginArgs),
}

// =============================================================================
// Per-command args
// =============================================================================

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Delimited text file to read.
    #[arg(short = 'f', long, value_name = "PATH")]
    pub file: PathBuf,

    /// Base name. A `base` import creates the base; other kinds require it
    /// to exist.
    #[arg(short = 'n', long, value_name = "NAME")]
    pub name: String,

    /// Log kind to import as (base, mutate or set).
    #[arg(short = 'k', long, default_value = "base", value_parser = parse_kind)]
    pub kind: Kind,
}

#[derive(Args, Debug)]
pub struct ViewArgs {
    /// Base name.
    #[arg(short = 'n', long, value_name = "NAME")]
    pub name: String,
}

#[derive(Args, Debug)]
pub struct PluginArgs {
    /// Base name.
    #[arg(short = 'n', long, value_name = "NAME")]
    pub name: String,

    /// Plugin to run.
    #[arg(value_name = "PLUGIN")]
    pub plugin: String,

    /// Plugin arguments.
    #[arg(value_name = "ARGS", trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

fn parse_kind(s: &str) -> std::result::Result<Kind, String> {
    match Kind::parse(s.trim()) {
        Ok(Kind::Empty) | Err(_) => Err("kind must be base, mutate or set".to_string()),
        Ok(kind) => Ok(kind),
    }
}

pub fn parse_from<I, T>(args: I) -> Cli
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Cli::parse_from(args)
}

// =============================================================================
// Dispatch
// =============================================================================

pub fn run(cli: Cli) -> Result<()> {
    let root = cli.root.unwrap_or_else(crate::paths::data_dir);
    let ctx = Ctx { root };

    match cli.command {
        Commands::Init => commands::init::handle(&ctx),
        Commands::Import(args) => commands::import::handle(&ctx, args),
        Commands::View(args) => commands::view::handle(&ctx, args),
        Commands::Bases => commands::bases::handle(&ctx),
        Commands::Plugin(args) => commands::plugin::handle(&ctx, args),
    }
}

/// Resolved per-invocation context shared by handlers.
pub(crate) struct Ctx {
    pub(crate) root: PathBuf,
}
