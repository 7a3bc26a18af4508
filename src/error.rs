use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SalesAnalyticsError {
    #[error("Failed to read input file {}: {source}", .path.display())]
    InputFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write output file {}: {source}", .path.display())]
    OutputFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Catalog request failed: {0}")]
    CatalogRequest(#[from] reqwest::Error),

    #[error("Unexpected catalog payload: {0}")]
    CatalogPayload(String),
}
