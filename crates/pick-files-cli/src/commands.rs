use clap::{Args, Parser, Subcommand, ValueEnum};
use pick_files_core::export::STDOUT_TARGET;
use pick_files_core::{AppConfig, ConflictPolicy, ExportFormat};
use std::path::PathBuf;
use tracing::warn;

#[derive(Debug, Parser)]
#[command(name = "pick-files", version)]
#[command(
    about = "Randomly pick files from a set of folders and copy them to a destination",
    long_about = "Randomly selects a number of files from a set of folders (including \
                  sub-folders) and copies them into a single destination folder. During \
                  repeat runs, previously selected files can be blocked from selection for \
                  a period of time."
)]
pub struct Cli {
    /// Use configuration file
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// History database path [default: pick-files-db.json, under $SNAP_USER_DATA if set]
    #[arg(long, global = true, value_name = "PATH")]
    pub database: Option<String>,

    /// Verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Debug output
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Log filter requested on the command line, if any.
    pub fn log_level(&self) -> Option<&'static str> {
        if self.debug {
            Some("trace")
        } else if self.verbose {
            Some("debug")
        } else {
            None
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Randomly pick files and copy them into the destination folder
    Pick(PickArgs),
    /// Print the history database and exit
    PrintDatabase(PrintDatabaseArgs),
    /// Print statistics of the history database
    Stats,
    /// Delete the history database
    ResetDatabase {
        /// Do not ask for confirmation
        #[arg(long)]
        force: bool,
    },
    /// Print the effective configuration; output can be used as configuration file
    DumpConfig(PickArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DestinationOption {
    /// Abort if the destination folder has entries
    #[value(alias = "panic")]
    Fail,
    /// Copy next to existing entries, renaming on name collisions
    Append,
    /// Delete existing entries first
    #[value(alias = "delete")]
    OverwriteClear,
}

impl From<DestinationOption> for ConflictPolicy {
    fn from(option: DestinationOption) -> Self {
        match option {
            DestinationOption::Fail => ConflictPolicy::Fail,
            DestinationOption::Append => ConflictPolicy::Append,
            DestinationOption::OverwriteClear => ConflictPolicy::OverwriteClear,
        }
    }
}

#[derive(Debug, Args)]
pub struct PickArgs {
    /// A folder to pick files from, recursively; can be used multiple times
    #[arg(long = "folder", value_name = "PATH")]
    pub folders: Vec<String>,

    /// The number of files to choose
    #[arg(short = 'N', long)]
    pub number: Option<usize>,

    /// The output folder for the selected files
    #[arg(long, value_name = "PATH")]
    pub destination: Option<String>,

    /// What to do when the destination folder already has entries
    #[arg(long, value_enum)]
    pub destination_option: Option<DestinationOption>,

    /// Only consider files with this suffix ('jpg' or '.jpg', case-sensitive); repeatable
    #[arg(long = "suffix", value_name = "SUFFIX")]
    pub suffixes: Vec<String>,

    /// Block files picked less than this long ago, e.g. 36h, 3d, 2w
    #[arg(long, value_name = "DURATION")]
    pub block_selection: Option<String>,

    /// Forget files not seen for this long
    #[arg(long, value_name = "DURATION")]
    pub retention: Option<String>,

    /// Skip files and folders matching this glob; repeatable
    #[arg(long = "ignore", value_name = "GLOB")]
    pub ignore_patterns: Vec<String>,

    /// Only show the chosen files, do not copy them
    #[arg(long)]
    pub dry_run: bool,

    /// Reset the history database before picking
    #[arg(long)]
    pub reset_database: bool,

    /// Deprecated, use --destination-option overwrite-clear
    #[arg(long, hide = true)]
    pub delete_existing: bool,

    /// Deprecated, use --destination-option append
    #[arg(long, hide = true)]
    pub append: bool,
}

impl PickArgs {
    /// Command-line values take precedence over the configuration layers.
    pub fn apply_to(&self, config: &mut AppConfig) {
        if !self.folders.is_empty() {
            config.folders = self.folders.clone();
        }
        if let Some(number) = self.number {
            config.number = number;
        }
        if let Some(destination) = &self.destination {
            config.destination = destination.clone();
        }
        if let Some(option) = self.destination_option {
            config.destination_option = option.into();
        }
        if !self.suffixes.is_empty() {
            config.suffixes = self.suffixes.clone();
        }
        if let Some(block) = &self.block_selection {
            config.block_selection = block.clone();
        }
        if let Some(retention) = &self.retention {
            config.retention = retention.clone();
        }
        if !self.ignore_patterns.is_empty() {
            config.ignore_patterns = self.ignore_patterns.clone();
        }
        if self.delete_existing {
            warn!("This option is deprecated: Use --destination-option overwrite-clear");
            config.destination_option = ConflictPolicy::OverwriteClear;
        }
        if self.append {
            warn!("This option is deprecated: Use --destination-option append");
            config.destination_option = ConflictPolicy::Append;
        }
    }
}

#[derive(Debug, Args)]
pub struct PrintDatabaseArgs {
    /// Output file; `-` means standard output
    #[arg(short, long, default_value = STDOUT_TARGET)]
    pub output: String,

    /// Output format: CSV, JSON or YAML
    #[arg(long, default_value = "CSV", value_parser = parse_format)]
    pub format: ExportFormat,
}

fn parse_format(s: &str) -> Result<ExportFormat, String> {
    s.parse::<ExportFormat>().map_err(|e| e.to_string())
}
