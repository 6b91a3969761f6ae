pub mod config;
pub mod extract;
pub mod model;
pub mod probe;
pub mod reducer;
pub mod store;
pub mod summary;

pub use model::{MetricValue, Metrics, NewService, ServiceId, ServiceRecord, ServiceStatus};
pub use probe::{HealthChecker, ProbeError, ProbeResponse, Transport};
pub use store::{KvStore, ServiceStore, StoreError};
