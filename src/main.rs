mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> miette::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::New {
            template,
            output,
            overwrite,
            dry_run,
        } => commands::new::run(template, output, overwrite, dry_run).await,
        Commands::Tokens { template, json } => commands::tokens::run(template, json).await,
        Commands::List => commands::list::run(),
        Commands::ClearCache { version } => commands::clear_cache::run(version),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "plugforge=debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("PLUGFORGE_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}
