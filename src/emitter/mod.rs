pub mod emitter;
pub mod emitter_tests;

pub use emitter::{CommandEmitter, SubmitOutcome};
