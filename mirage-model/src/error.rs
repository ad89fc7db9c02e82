use thiserror::Error;

/// Errors produced while validating or parsing model values.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Invalid id: {0}")]
    InvalidId(String),

    #[error("Invalid sort field: {0}")]
    InvalidSortField(String),
}
