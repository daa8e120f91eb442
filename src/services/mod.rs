//! Business logic services.

pub mod event_broadcaster;
pub mod executor;
pub mod ingest;

pub use event_broadcaster::EventBroadcaster;
pub use executor::{CancelOutcome, Executor, ExecutorConfig};
pub use ingest::{IngestOutcome, Ingestor};
