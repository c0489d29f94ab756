//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies. DuckDB
//! backs both the user and the entry repository.

pub mod duckdb;
