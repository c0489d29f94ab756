//! Result and error types for the core library

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Core library error type
///
/// The first five variants are the user-facing failures the presentation
/// layer turns into messages. The rest wrap infrastructure failures.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Username already taken: {0}")]
    DuplicateUser(String),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Malformed CSV: {}", summarize_rows(.0))]
    MalformedRow(Vec<RowError>),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    /// Create a database error
    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

impl From<duckdb::Error> for Error {
    fn from(err: duckdb::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;

/// One rejected CSV row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowError {
    /// 1-based line number in the source text (the header is line 1)
    pub line: u64,
    pub reason: String,
}

impl RowError {
    pub fn new(line: u64, reason: impl Into<String>) -> Self {
        Self {
            line,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.reason)
    }
}

fn summarize_rows(rows: &[RowError]) -> String {
    let details: Vec<String> = rows.iter().map(|r| r.to_string()).collect();
    format!("{} row(s) rejected ({})", rows.len(), details.join("; "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_row_message_lists_every_row() {
        let err = Error::MalformedRow(vec![
            RowError::new(2, "weight 'abc' is not a number"),
            RowError::new(4, "missing calories"),
        ]);
        let msg = err.to_string();
        assert!(msg.contains("2 row(s) rejected"));
        assert!(msg.contains("line 2: weight 'abc' is not a number"));
        assert!(msg.contains("line 4: missing calories"));
    }

    #[test]
    fn test_invalid_input_message() {
        let err = Error::invalid_input("weight must be positive");
        assert_eq!(err.to_string(), "Invalid input: weight must be positive");
    }

    #[test]
    fn test_duckdb_error_maps_to_database() {
        let err: Error = duckdb::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, Error::Database(_)));
    }
}
