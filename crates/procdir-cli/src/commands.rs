use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use procdir_core::PlacementPolicy;

#[derive(Debug, Parser)]
#[command(name = "procdir")]
#[command(about = "File documents into logistics process folders", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Validate a process, create its folder if new and file documents into it
    Upload(UploadArgs),
    /// List processes matching the given filters
    Search(SearchArgs),
    /// Show every process with the given number
    Lookup {
        /// Six-digit process number
        number: String,
    },
    /// Manage registered client names
    Clients {
        #[command(subcommand)]
        action: ClientAction,
    },
    /// Open a folder in the platform file explorer
    Open { path: PathBuf },
    /// Check that a folder can be listed and written to
    CheckAccess { path: PathBuf },
    /// Print configuration values
    PrintConfig,
}

#[derive(Debug, Args)]
pub struct UploadArgs {
    #[arg(long)]
    pub client: String,
    /// IMPORTAÇÃO or EXPORTAÇÃO
    #[arg(long)]
    pub area: String,
    /// Aéreo, Rodoviário or Marítimo
    #[arg(long)]
    pub service: String,
    #[arg(long)]
    pub number: String,
    /// Two-digit year
    #[arg(long)]
    pub year: String,
    #[arg(long)]
    pub reference: String,
    /// What to do when a file name is already taken
    #[arg(long, value_enum, default_value_t = PolicyArg::Substitute)]
    pub policy: PolicyArg,
    /// Place the files in the expense sub-folder
    #[arg(long)]
    pub expense: bool,
    /// Rename each file after this expense (requires --due-date)
    #[arg(long, requires = "due_date")]
    pub expense_name: Option<String>,
    /// Due date, YYYY-MM-DD
    #[arg(long)]
    pub due_date: Option<String>,
    /// Move the files instead of copying them. Files that are skipped or
    /// rejected stay where they are.
    #[arg(long = "move")]
    pub move_files: bool,
    /// Open the destination folder afterwards
    #[arg(long)]
    pub open: bool,
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    #[arg(long)]
    pub client: Option<String>,
    #[arg(long)]
    pub area: Option<String>,
    #[arg(long)]
    pub service: Option<String>,
    #[arg(long)]
    pub year: Option<String>,
    /// Substring of the reference, case-insensitive
    #[arg(long)]
    pub reference: Option<String>,
    /// Lowest process number, inclusive
    #[arg(long)]
    pub from: Option<u32>,
    /// Highest process number, inclusive
    #[arg(long)]
    pub to: Option<u32>,
    /// Print the results as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Subcommand)]
pub enum ClientAction {
    /// List registered clients
    List,
    /// Register a client
    Add { name: String },
    /// Remove a registered client
    Remove { name: String },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PolicyArg {
    Substitute,
    Rename,
    Skip,
}

impl From<PolicyArg> for PlacementPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Substitute => PlacementPolicy::Substitute,
            PolicyArg::Rename => PlacementPolicy::RenameWithTimestamp,
            PolicyArg::Skip => PlacementPolicy::Skip,
        }
    }
}
