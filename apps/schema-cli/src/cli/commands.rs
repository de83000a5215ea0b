//! # CLI Commands
//! A module for all the commands that can be run from the CLI

use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Connection and schema-location arguments shared by every command.
/// Flags win over the `[influxdb]` section of the settings file.
#[derive(Args, Debug)]
pub struct ConnectionArgs {
    /// Directory holding the declarative schema (db/ and cq/ subdirectories)
    #[arg(long, default_value = ".")]
    pub schema_dir: PathBuf,

    /// Base URL of the InfluxDB HTTP API (default: http://localhost:8086)
    #[arg(long)]
    pub url: Option<String>,

    /// Username for HTTP basic auth
    #[arg(long)]
    pub user: Option<String>,

    /// Password for HTTP basic auth
    #[arg(long)]
    pub password: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Displays the statements that would bring the instance in line with the
    /// schema files, without applying anything
    Plan {
        #[command(flatten)]
        connection: ConnectionArgs,
    },
    /// Applies the planned statements to the instance
    Apply {
        #[command(flatten)]
        connection: ConnectionArgs,

        /// Plan and report, but submit nothing
        #[arg(long)]
        dry_run: bool,

        /// Allow destructive operations (DROP statements are skipped otherwise)
        #[arg(long)]
        force: bool,
    },
}
