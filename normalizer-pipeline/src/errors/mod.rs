mod extractor;
mod orchestrator;
mod schema;

pub use extractor::ExtractionError;
pub use orchestrator::OrchestratorError;
pub use schema::SchemaError;
