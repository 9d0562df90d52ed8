//! Status and availability commands

use colored::*;
use hearth_core::{ProviderStatus, Router};

/// Show every configured provider and whether it would be routed to
pub fn status(router: &Router, json: bool) -> anyhow::Result<()> {
    let providers = router.status();
    if json {
        println!("{}", serde_json::to_string_pretty(&providers)?);
        return Ok(());
    }

    println!();
    println!("{}", "Hearth Providers".bold().underline());
    println!("{}", "=".repeat(50).dimmed());
    if providers.is_empty() {
        println!("  {}", "No providers configured".yellow());
        return Ok(());
    }
    for provider in &providers {
        print_provider(provider);
    }
    println!();
    Ok(())
}

fn print_provider(provider: &ProviderStatus) {
    let marker = if provider.would_route {
        "●".green()
    } else if provider.enabled {
        "●".red()
    } else {
        "○".dimmed()
    };
    println!();
    println!("{} {} ({})", marker, provider.id.bold(), provider.model_id.cyan());
    println!(
        "  Priority: {}  Cost/1k: {}  Context: {}",
        provider.priority,
        provider.cost_per_1k_tokens,
        provider.max_context_tokens
    );

    let mut capabilities = Vec::new();
    if provider.capabilities.supports_streaming {
        capabilities.push("streaming");
    }
    if provider.capabilities.supports_vision {
        capabilities.push("vision");
    }
    if provider.capabilities.supports_json_mode {
        capabilities.push("json");
    }
    println!("  Capabilities: {}", capabilities.join(", "));

    if !provider.enabled {
        println!("  {}", "Disabled".dimmed());
    } else if provider.latency_samples > 0 || provider.consecutive_errors > 0 {
        println!(
            "  Health: {} errors, {:.0} ms avg over {} calls",
            provider.consecutive_errors, provider.average_latency_ms, provider.latency_samples
        );
    }
}

/// Probe every enabled provider with a minimal request
pub async fn check(router: &Router, json: bool) -> anyhow::Result<()> {
    let availability = router.check_availability().await;
    if json {
        println!("{}", serde_json::to_string_pretty(&availability)?);
        return Ok(());
    }

    println!();
    println!("{}", "Provider Check".bold().underline());
    println!("{}", "=".repeat(50).dimmed());
    for (id, available) in &availability {
        if *available {
            println!("  {} {}", "✓".green(), id);
        } else {
            println!("  {} {}", "✗".red(), id);
        }
    }

    let up = availability.values().filter(|ok| **ok).count();
    println!();
    println!("{}/{} providers reachable", up, availability.len());
    Ok(())
}
