//! Logging, tracing export and metrics shared by the service binaries.

mod logging;
pub mod metrics;

pub use logging::{ObsConfig, init_tracing};
pub use metrics::{MetricsError, MetricsRegistry};
