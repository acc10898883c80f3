use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session store database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;
