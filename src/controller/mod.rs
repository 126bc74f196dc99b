pub mod controller;
pub mod controller_tests;
pub mod ingest;

pub use controller::Controller;
pub use ingest::EventIngestor;
