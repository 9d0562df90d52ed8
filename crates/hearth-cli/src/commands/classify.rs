//! Explain a routing decision without sending anything

use colored::*;
use hearth_core::{RouteRequest, Router};

use crate::args::ClassifyArgs;

pub fn explain(router: &Router, args: &ClassifyArgs) -> anyhow::Result<()> {
    let mut request = RouteRequest::new(args.prompt.clone())
        .with_vision(args.vision)
        .with_json(args.json);
    if let Some(provider) = &args.provider {
        request = request.with_forced_provider(provider.clone());
    }
    if let Some(max_tokens) = args.max_tokens {
        request = request.with_max_tokens(max_tokens);
    }

    let score = router
        .classifier()
        .score(&request.prompt, request.token_budget());

    match router.choose_provider(&request) {
        Some(decision) => {
            println!(
                "Complexity: {} (score {})",
                decision.complexity.to_string().cyan(),
                score
            );
            println!(
                "Provider:   {} ({})",
                decision.provider.id.green().bold(),
                decision.provider.model_id
            );
        }
        None => {
            let complexity = router
                .classifier()
                .classify(&request.prompt, request.token_budget());
            println!("Complexity: {} (score {})", complexity.to_string().cyan(), score);
            println!("Provider:   {}", "no eligible provider".red());
        }
    }
    Ok(())
}
