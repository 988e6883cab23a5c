//! Readiness by fixed delay.

use async_trait::async_trait;
use std::time::Duration;

use crate::domain::models::Role;
use crate::domain::ports::ReadinessProbe;

/// Assumes a started role is ready after a fixed delay.
///
/// A zero delay returns immediately.
#[derive(Debug, Clone, Copy)]
pub struct FixedDelayReadiness {
    delay: Duration,
}

impl FixedDelayReadiness {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

#[async_trait]
impl ReadinessProbe for FixedDelayReadiness {
    async fn wait_until_ready(&self, role: Role) {
        if self.delay.is_zero() {
            return;
        }
        tracing::debug!(role = %role, delay_ms = self.delay.as_millis() as u64, "Waiting for readiness");
        tokio::time::sleep(self.delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_waits_for_configured_delay() {
        let probe = FixedDelayReadiness::new(Duration::from_secs(3));
        let began = tokio::time::Instant::now();
        probe.wait_until_ready(Role::Backend).await;
        assert!(began.elapsed() >= Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_zero_delay_returns_immediately() {
        let probe = FixedDelayReadiness::new(Duration::ZERO);
        let began = std::time::Instant::now();
        probe.wait_until_ready(Role::Frontend).await;
        assert!(began.elapsed() < Duration::from_secs(1));
    }
}
