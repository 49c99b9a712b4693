pub mod ingest;
pub mod titles;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
