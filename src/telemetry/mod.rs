pub mod telemetry;

pub use telemetry::{SnapshotRequest, TelemetryPublisher};
