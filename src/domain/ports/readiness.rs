//! Readiness port.
//!
//! Started services are not health-checked; whatever implements this trait
//! decides when a role is assumed ready.

use async_trait::async_trait;

use crate::domain::models::Role;

#[async_trait]
pub trait ReadinessProbe: Send + Sync {
    /// Resolve once `role` is assumed to accept requests.
    async fn wait_until_ready(&self, role: Role);
}
