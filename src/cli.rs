use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "plugforge",
    about = "Generate customized plugin projects from versioned template archives",
    version
)]
pub struct Cli {
    /// Print debug diagnostics (or set PLUGFORGE_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by commands that resolve a template.
#[derive(Args)]
pub struct TemplateArgs {
    /// Template version to fetch
    #[arg(long = "template-version", value_name = "VERSION")]
    pub version: String,

    /// Template source: URL pattern with {version}, a directory of <version>.zip files, or a zip file
    #[arg(short, long)]
    pub source: Option<String>,

    /// Set values (can be repeated: -d name=MyPlugin)
    #[arg(short, long = "data", value_name = "KEY=VALUE")]
    pub data: Vec<String>,

    /// TOML file of values; -d pairs override it
    #[arg(long, value_name = "FILE")]
    pub values: Option<PathBuf>,

    /// Settings file (plugforge.toml)
    #[arg(long, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Never prompt for missing values
    #[arg(long)]
    pub no_input: bool,

    /// Bypass the download cache
    #[arg(long)]
    pub no_cache: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a plugin project archive
    New {
        #[command(flatten)]
        template: TemplateArgs,

        /// Directory to write the archive into
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Replace an existing archive with the same name
        #[arg(long)]
        overwrite: bool,

        /// List the files that would be generated without writing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Show the resolved token set without generating anything
    Tokens {
        #[command(flatten)]
        template: TemplateArgs,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// List cached template archives
    List,

    /// Remove cached template archives
    ClearCache {
        /// Only remove this version
        #[arg(long = "template-version", value_name = "VERSION")]
        version: Option<String>,
    },
}
