//! Event log migrations
//!
//! The event log lives in its own database file (logs.duckdb) so it can be
//! exported or wiped without touching user data. Same embedding scheme as
//! [`crate::migrations`].

/// All log migrations, embedded at compile time, applied in order.
pub const LOG_MIGRATIONS: &[(&str, &str)] = &[
    ("000_migrations.sql", include_str!("000_migrations.sql")),
    (
        "001_initial_schema.sql",
        include_str!("001_initial_schema.sql"),
    ),
];
