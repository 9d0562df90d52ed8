use futures::stream::StreamExt;
use signal_hook::consts::SIGINT;
use signal_hook_tokio::{Handle, Signals};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Cancels a token on the first Ctrl+C while alive
pub struct InterruptGuard {
    handle: Handle,
    task: JoinHandle<()>,
}

impl InterruptGuard {
    pub fn install(token: CancellationToken) -> std::io::Result<Self> {
        let mut signals = Signals::new(&[SIGINT])?;
        let handle = signals.handle();

        let task = tokio::spawn(async move {
            if signals.next().await.is_some() {
                tracing::info!("Interrupt received, cancelling request");
                token.cancel();
            }
        });

        Ok(Self { handle, task })
    }
}

impl Drop for InterruptGuard {
    fn drop(&mut self) {
        self.handle.close();
        self.task.abort();
    }
}
