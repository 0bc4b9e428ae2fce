pub mod config;
pub mod enrich;
pub mod error;
pub mod http;
pub mod listing;
pub mod logging;
pub mod magnitude;
pub mod notion;
pub mod paths;
pub mod pipeline;
pub mod properties;
pub mod repository;
pub mod schema;
pub mod trending;

// Re-export commonly used types
pub use config::Config;
pub use error::SyncError;
pub use pipeline::{Orchestrator, RunReport, RunSettings};
pub use repository::{FieldKey, Repository};
pub use schema::Schema;
