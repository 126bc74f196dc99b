pub mod car;
pub mod registry;
pub mod scheduler;

pub use car::Car;
pub use registry::{CallRegistry, CancelOutcome};
pub use scheduler::Scheduler;
