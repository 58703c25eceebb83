//! Main CLI application structure

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use super::output::{Output, OutputFormat};
use super::session::{Overrides, Session};
use super::{query, status, transfer};
use crate::logging::init_logging;
use crate::storage::Config;

#[derive(Parser)]
#[command(name = "subjects-graph")]
#[command(author, version, about = "Track your way through a curriculum's prerequisite graph")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Catalog JSON file (overrides `catalog` in config)
    #[arg(long, global = true)]
    pub catalog: Option<PathBuf>,

    /// Variant to work on (overrides the selected one)
    #[arg(long, global = true)]
    pub variant: Option<String>,

    /// Directory where progress is saved
    #[arg(long, global = true, env = "SUBJECTS_GRAPH_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Output format [default: text, or `default_format` from config]
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the variants in the catalog
    Variants,

    /// Select the variant to use from now on
    Use {
        /// Variant ID
        variant: String,
    },

    /// Show every subject with its status and availability
    Show,

    /// List subjects that can be taken
    Available {
        /// Minimum availability ID (defaults to the highest tier)
        #[arg(long)]
        at_least: Option<String>,
    },

    /// Move a subject to its next status
    Toggle {
        /// Subject ID
        subject: String,
    },

    /// Set a subject's status
    Set {
        /// Subject ID
        subject: String,

        /// Status ID
        status: String,
    },

    /// Clear saved progress of the active variant
    Reset,

    /// Show approved and pending percentages
    Progress,

    /// Export saved progress as JSON
    Export {
        /// File to write (defaults to stdout)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Replace saved progress with an exported file
    Import {
        /// Exported JSON file
        path: PathBuf,
    },
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let config = Config::load()?;
    let format = cli
        .format
        .or_else(|| config.settings.default_format.map(OutputFormat::from))
        .unwrap_or_default();
    let output = Output::new(format);

    if let Some(path) = &config.project_file {
        output.verbose_ctx("config", &format!("Using project config: {}", path.display()));
    }

    let overrides = Overrides {
        catalog: cli.catalog,
        variant: cli.variant,
        data_dir: cli.data_dir,
    };
    let session = Session::open(&overrides, &config, &output)?;

    match cli.command {
        Commands::Variants => query::variants(&output, &session)?,
        Commands::Use { variant } => status::select(&output, &session, &variant)?,
        Commands::Show => query::show(&output, &session)?,
        Commands::Available { at_least } => {
            query::available(&output, &session, at_least.as_deref())?
        }
        Commands::Toggle { subject } => status::toggle(&output, &session, &subject)?,
        Commands::Set { subject, status } => status::set(&output, &session, &subject, &status)?,
        Commands::Reset => status::reset(&output, &session)?,
        Commands::Progress => query::progress(&output, &session)?,
        Commands::Export { output: path } => transfer::export(&output, &session, path.as_deref())?,
        Commands::Import { path } => transfer::import(&output, &session, &path)?,
    }

    output.verbose_ctx("run", "Command completed successfully");
    Ok(())
}
