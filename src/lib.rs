pub mod config;
pub mod error;
pub mod fetch;
pub mod period;
pub mod pipeline;
pub mod process;
pub mod publish;
pub mod schema;

pub use config::IngestConfig;
pub use error::IngestError;
pub use period::Period;
pub use pipeline::{Ingestor, PeriodOutcome};
