//! Hearth CLI
//!
//! Inspect provider routing and send prompts through the router.
//!
//! ```bash
//! hearth status
//! hearth ask "Quel temps fera-t-il demain ?"
//! RUST_LOG=hearth_core=debug hearth classify "analyse nutritionnelle détaillée"
//! ```

mod app;
mod args;
mod commands;
mod router;
mod signal_handler;

use args::Cli;
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    app::init_tracing(cli.verbose, cli.log_json);
    router::route(cli).await
}
