//! CLI argument parsing using clap.
//!
//! Defines the command-line interface with all options and subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// confscout: discover and validate application settings
///
/// Extracts the configurable settings of terminal emulators, editors and
/// multiplexers, and checks values against curated setting catalogs.
#[derive(Debug, Parser)]
#[command(name = "confscout")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding reference catalogs
    #[arg(long = "catalog-dir", global = true, value_name = "DIR")]
    pub catalog_dir: Option<PathBuf>,

    /// Per-attempt extraction timeout in seconds
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Enable verbose logging and per-application detail
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

/// Subcommands for confscout
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract the settings of one application into a catalog file
    Extract {
        /// Application name
        app: String,

        /// Output path (default: <output dir>/<app>.yaml)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Extraction method
        #[arg(long, short, value_enum, default_value_t = MethodArg::Auto)]
        method: MethodArg,

        /// Merge into an existing catalog instead of replacing it
        #[arg(long, short)]
        update: bool,
    },

    /// Extract several applications concurrently
    Batch {
        /// Comma-separated applications (default: every known application)
        #[arg(long, value_delimiter = ',')]
        apps: Vec<String>,

        /// Directory for the generated catalogs
        #[arg(long = "output-dir", value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Number of concurrent workers
        #[arg(long, short)]
        workers: Option<usize>,

        /// Merge into existing catalogs instead of replacing them
        #[arg(long, short)]
        update: bool,
    },

    /// Check a value against an application's catalog
    Validate {
        /// Application name
        app: String,
        /// Setting name
        setting: String,
        /// Value, parsed as JSON when possible
        value: String,
    },

    /// Search an application's catalog
    Search {
        /// Application name
        app: String,
        /// Case-insensitive text to look for
        query: String,
    },

    /// Generate an application config from its catalog
    Map {
        /// Application name
        app: String,

        /// Existing application config to merge into
        #[arg(long)]
        existing: Option<PathBuf>,

        /// Output path (default: print to stdout)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Check that a catalog maps cleanly onto an application config
    CheckMapping {
        /// Application name
        app: String,
    },

    /// List known applications and available catalogs
    Apps,

    /// Generate a default configuration file
    Init {
        /// Output path for the configuration file
        #[arg(long, short, default_value = super::defaults::CONFIG_FILE)]
        output: PathBuf,
    },
}

/// Extraction method selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MethodArg {
    /// Try every method in priority order
    Auto,
    /// The application's own config dump command
    Cli,
    /// Reference files in the source repository
    Docs,
    /// Installed manual pages
    Man,
    /// The user's existing config file
    File,
    /// Settings compiled into confscout
    Builtin,
}

impl MethodArg {
    /// Name of the selected strategy, or `None` for automatic selection.
    #[must_use]
    pub const fn strategy_name(self) -> Option<&'static str> {
        match self {
            Self::Auto => None,
            Self::Cli => Some("cli"),
            Self::Docs => Some("docs"),
            Self::Man => Some("man"),
            Self::File => Some("file"),
            Self::Builtin => Some("builtin"),
        }
    }
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parses CLI arguments from an iterator (useful for testing).
    pub fn parse_from_iter<I, T>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::parse_from(iter)
    }

    /// Returns true if this is the init command.
    #[must_use]
    pub const fn is_init(&self) -> bool {
        matches!(self.command, Command::Init { .. })
    }

    /// Worker count given on the batch command line, if any.
    #[must_use]
    pub const fn batch_workers(&self) -> Option<usize> {
        match self.command {
            Command::Batch { workers, .. } => workers,
            _ => None,
        }
    }
}
