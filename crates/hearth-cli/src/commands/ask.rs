//! Send a prompt through the router

use std::io::Write;

use futures::StreamExt;
use hearth_core::{RouteRequest, Router};
use tokio_util::sync::CancellationToken;

use crate::args::AskArgs;
use crate::signal_handler::InterruptGuard;

pub fn build_request(args: &AskArgs) -> RouteRequest {
    let mut request = RouteRequest::new(args.prompt.clone())
        .with_temperature(args.temperature)
        .with_vision(args.vision)
        .with_json(args.json);
    if let Some(system) = &args.system {
        request = request.with_system_prompt(system.clone());
    }
    if let Some(provider) = &args.provider {
        request = request.with_forced_provider(provider.clone());
    }
    if let Some(max_tokens) = args.max_tokens {
        request = request.with_max_tokens(max_tokens);
    }
    if let Some(max_fallbacks) = args.max_fallbacks {
        request = request.with_max_fallbacks(max_fallbacks);
    }
    request
}

pub async fn ask(router: &Router, args: &AskArgs) -> anyhow::Result<()> {
    let token = CancellationToken::new();
    let _guard = match InterruptGuard::install(token.clone()) {
        Ok(guard) => Some(guard),
        Err(e) => {
            tracing::warn!("Ctrl+C will not cancel the request: {}", e);
            None
        }
    };
    let request = build_request(args).with_cancellation(token);

    if args.stream {
        let mut stream = router.call_streaming(&request).await?;
        let mut stdout = std::io::stdout();
        while let Some(chunk) = stream.next().await {
            write!(stdout, "{}", chunk?)?;
            stdout.flush()?;
        }
        writeln!(stdout)?;
    } else {
        let answer = router.call(&request).await?;
        println!("{}", answer);
    }
    Ok(())
}
