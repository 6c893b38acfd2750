use std::path::PathBuf;

use crate::commands::Commands;

use clap::Parser;

#[derive(Parser)]
#[command(name = "healthportal")]
#[command(about = "Command line client for the HealthPortal healthcare information portal")]
#[command(version)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub(crate) command: Commands,

    /// Backend URL (default: HP_API_URL, then config file, then http://localhost:5000)
    #[arg(long, global = true)]
    pub(crate) api_url: Option<String>,

    /// Directory holding the session (default: HP_STORAGE_DIR, then the data dir)
    #[arg(long, global = true)]
    pub(crate) storage_dir: Option<PathBuf>,
}
