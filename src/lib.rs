pub mod analytics;
pub mod catalog;
pub mod enrich;
pub mod error;
pub mod filter;
pub mod models;
pub mod output;
pub mod reader;
pub mod report;
pub mod validate;
mod pipeline;

// Re-export the batch entry point for convenience
pub use pipeline::{run_pipeline, PipelineOptions, PipelineOutcome};
