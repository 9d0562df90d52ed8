//! CLI argument definitions using clap
//!
//! - hearth status               # Providers and routing eligibility
//! - hearth check                # Probe every enabled provider
//! - hearth ask "prompt"         # Route a prompt with fallback
//! - hearth classify "prompt"    # Show the routing decision only

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Default configuration file name used across all CLI commands.
pub const DEFAULT_CONFIG_FILE: &str = "hearth.toml";

#[derive(Parser)]
#[command(name = "hearth")]
#[command(about = "Hearth - AI request routing with health-aware fallback")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(
        long,
        global = true,
        env = "HEARTH_CONFIG",
        default_value = DEFAULT_CONFIG_FILE
    )]
    pub config: PathBuf,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show configured providers and whether they would be routed to
    Status {
        /// Print machine-readable JSON
        #[arg(long)]
        json: bool,
    },

    /// Send a minimal request to every enabled provider
    Check {
        /// Print machine-readable JSON
        #[arg(long)]
        json: bool,
    },

    /// Route a prompt and print the answer
    Ask(AskArgs),

    /// Classify a prompt and show which provider would serve it
    Classify(ClassifyArgs),
}

#[derive(Args, Clone)]
pub struct AskArgs {
    /// Prompt to send
    pub prompt: String,

    /// System prompt
    #[arg(long)]
    pub system: Option<String>,

    /// Try this provider first
    #[arg(long)]
    pub provider: Option<String>,

    #[arg(long)]
    pub max_tokens: Option<u32>,

    #[arg(long, default_value_t = 0.7)]
    pub temperature: f32,

    /// Only route to providers that accept images
    #[arg(long)]
    pub vision: bool,

    /// Ask for a JSON object response
    #[arg(long)]
    pub json: bool,

    /// Print the answer as it arrives (single provider, no fallback)
    #[arg(long)]
    pub stream: bool,

    /// Number of fallback providers after the first choice
    #[arg(long)]
    pub max_fallbacks: Option<u32>,
}

#[derive(Args, Clone)]
pub struct ClassifyArgs {
    pub prompt: String,

    #[arg(long)]
    pub provider: Option<String>,

    #[arg(long)]
    pub max_tokens: Option<u32>,

    #[arg(long)]
    pub vision: bool,

    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ask_arguments() {
        let cli = Cli::try_parse_from([
            "hearth",
            "ask",
            "liste des courses",
            "--provider",
            "mistral",
            "--max-tokens",
            "200",
            "--stream",
        ])
        .unwrap();

        match cli.command {
            Commands::Ask(args) => {
                assert_eq!(args.prompt, "liste des courses");
                assert_eq!(args.provider.as_deref(), Some("mistral"));
                assert_eq!(args.max_tokens, Some(200));
                assert!(args.stream);
                assert_eq!(args.temperature, 0.7);
            }
            _ => panic!("expected ask"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "hearth",
            "status",
            "--json",
            "--config",
            "/etc/hearth.toml",
        ])
        .unwrap();
        assert_eq!(cli.config, PathBuf::from("/etc/hearth.toml"));
        assert!(matches!(cli.command, Commands::Status { json: true }));
    }
}
