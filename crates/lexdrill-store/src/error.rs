use std::fmt;

#[derive(Debug)]
pub enum StoreError {
    Sqlite(rusqlite::Error),
    /// Persisted JSON that no longer (de)serializes: session rows,
    /// wire-format export files.
    Serde(serde_json::Error),
    /// A row or field whose content cannot map back to a word record.
    InvalidData(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Sqlite(e) => write!(f, "vocabulary database error: {e}"),
            StoreError::Serde(e) => write!(f, "unreadable stored state: {e}"),
            StoreError::InvalidData(msg) => write!(f, "bad word data: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Sqlite(e)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serde(e)
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
