//! Command routing logic for CLI

use crate::args::{Cli, Commands};
use crate::{app, commands};

/// Route CLI commands to their respective handlers
pub async fn route(cli: Cli) -> anyhow::Result<()> {
    let config = app::load_config(&cli.config)?;
    let router = app::build_router(&config)?;

    match cli.command {
        Commands::Status { json } => commands::status::status(&router, json),
        Commands::Check { json } => commands::status::check(&router, json).await,
        Commands::Ask(args) => commands::ask::ask(&router, &args).await,
        Commands::Classify(args) => commands::classify::explain(&router, &args),
    }
}
