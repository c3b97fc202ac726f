mod cmd;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::cmd::PassArgs;
use crate::output::OutputFormat;

/// makevars - Export build-graph variables to make
#[derive(Parser)]
#[command(name = "makevars")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Run one pass and write make_vars<suffix>.mk if it changed
  Generate {
    #[command(flatten)]
    pass: PassArgs,
  },

  /// Render the makefile fragment to stdout without writing it
  Show {
    #[command(flatten)]
    pass: PassArgs,
  },

  /// List the variables the providers export
  List {
    #[command(flatten)]
    pass: PassArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value_t)]
    output: OutputFormat,
  },

  /// Compare exported variables against the current environment
  Check {
    #[command(flatten)]
    pass: PassArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value_t)]
    output: OutputFormat,
  },
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "warn" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  match cli.command {
    Commands::Generate { pass } => cmd::cmd_generate(&pass),
    Commands::Show { pass } => cmd::cmd_show(&pass),
    Commands::List { pass, output } => cmd::cmd_list(&pass, cli.verbose, output.is_json()),
    Commands::Check { pass, output } => cmd::cmd_check(&pass, cli.verbose, output.is_json()),
  }
}
