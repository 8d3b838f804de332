use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "seal",
    about = "Inspect and maintain a save's sealed-envelope and stamp stores",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// TOML store configuration
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Game data directory holding `ModData/`
    #[arg(long, global = true)]
    pub data_root: Option<PathBuf>,

    /// Save (world) identifier
    #[arg(short, long, global = true)]
    pub save: Option<String>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Move legacy one-file-per-blob contents into the blob store
    Migrate(MigrateArgs),
    /// Store or fetch sealed contents
    Blob(BlobArgs),
    /// Register or inspect stamp designs
    Stamp(StampArgs),
    /// Print the fingerprint of a design
    Fingerprint(FingerprintArgs),
}

#[derive(Args)]
pub struct MigrateArgs {
    /// Legacy directory to read instead of the configured one
    #[arg(long)]
    pub dir: Option<PathBuf>,
}

#[derive(Args)]
pub struct BlobArgs {
    #[command(subcommand)]
    pub action: BlobAction,
}

#[derive(Subcommand)]
pub enum BlobAction {
    /// Store a file's bytes and print the new id
    Put {
        file: PathBuf,
        #[arg(long, default_value = "cli")]
        creator: String,
    },
    /// Write a blob's bytes to a file, or stdout
    Get {
        id: String,
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

#[derive(Args)]
pub struct StampArgs {
    #[command(subcommand)]
    pub action: StampAction,
}

#[derive(Subcommand)]
pub enum StampAction {
    /// Register a design
    Save(StampSaveArgs),
    /// Show a registered design
    Show { id: i64 },
}

#[derive(Args)]
pub struct StampSaveArgs {
    #[arg(short, long)]
    pub title: String,
    #[arg(long, default_value = "cli")]
    pub creator: String,
    #[command(flatten)]
    pub design: DesignInput,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
pub struct DesignInput {
    /// Design as a '0'/'1' string of square length
    #[arg(long)]
    pub design: Option<String>,
    /// Text file with one row per line ('#' or '1' engraved, '.' or '0' blank)
    #[arg(long)]
    pub file: Option<PathBuf>,
}

#[derive(Args)]
pub struct FingerprintArgs {
    #[command(flatten)]
    pub design: DesignInput,
}
