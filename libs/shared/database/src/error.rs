use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("No row with id {id} in {table}")]
    NotFound { table: &'static str, id: i64 },

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Row serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<anyhow::Error> for StoreError {
    fn from(e: anyhow::Error) -> Self {
        StoreError::Backend(e.to_string())
    }
}
