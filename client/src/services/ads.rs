use std::time::Duration;

use tracing::info;

use super::{AdOutcome, AdService};
use crate::error::ClientError;

/// Stand-in for the mini-app's rewarded ad: waits `delay` and reports whether
/// the viewer watched to the end.
#[derive(Debug, Clone)]
pub struct SimulatedAdService {
    delay: Duration,
    completes: bool,
}

impl SimulatedAdService {
    pub fn new(delay: Duration) -> Self {
        Self { delay, completes: true }
    }

    pub fn skipping(delay: Duration) -> Self {
        Self { delay, completes: false }
    }
}

impl AdService for SimulatedAdService {
    async fn show(&self) -> Result<AdOutcome, ClientError> {
        info!("📺 Showing rewarded ad");
        tokio::time::sleep(self.delay).await;
        Ok(AdOutcome { done: self.completes })
    }
}
