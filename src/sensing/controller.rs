use anyhow::{bail, Context, Result};
use log::info;
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;

use super::loop_worker::{cycle_loop, CycleContext};
use super::perception::PerceptionSource;

/// Owns the background cycle loop task.
pub struct SensingController {
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
}

impl SensingController {
    pub fn new() -> Self {
        Self {
            handle: None,
            cancel_token: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    pub fn start_sensing(
        &mut self,
        ctx: CycleContext,
        source: Box<dyn PerceptionSource>,
        cycle_delay: Duration,
    ) -> Result<()> {
        if self.is_running() {
            bail!("sensing already active");
        }

        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(cycle_loop(ctx, source, cycle_delay, cancel_token.clone()));

        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        Ok(())
    }

    /// Cancels the loop and waits for the in-flight cycle to finish.
    pub async fn stop_sensing(&mut self) -> Result<()> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
            info!("Stop signal sent to cycle loop");
        }

        if let Some(handle) = self.handle.take() {
            handle
                .await
                .context("cycle loop task failed to join")
                .map(|_| ())
        } else {
            Ok(())
        }
    }
}

impl Default for SensingController {
    fn default() -> Self {
        Self::new()
    }
}
