//! Registrars for exercising the daemon without a registration API.

use core::time::Duration;
use deveui::{AttemptOutcome, DevEui, EngineConfig, Endpoint, Registrar};

/// Accepts every identifier after `delay`.
#[derive(Clone, Copy, Debug, Default)]
pub struct AcceptAll {
    pub delay: Duration,
}

impl Registrar for AcceptAll {
    async fn attempt(&self, _deveui: DevEui, _endpoint: &Endpoint, _timeout: Duration) -> AttemptOutcome {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        AttemptOutcome::Success
    }
}

pub fn engine_config() -> EngineConfig {
    EngineConfig::new("localhost:8000/register")
        .unwrap()
        .with_attempt_timeout(Duration::from_secs(1))
        .with_num_workers(4)
}
