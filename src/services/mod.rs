pub mod readiness;
pub mod supervisor;

pub use readiness::FixedDelayReadiness;
pub use supervisor::{Supervisor, SupervisorPorts};
