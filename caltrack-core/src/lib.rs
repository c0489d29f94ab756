//! CalTrack Core - data and calculation layer for weight and calorie logging
//!
//! This crate follows a hexagonal layout:
//!
//! - **domain**: entries, users, profiles and trend types, with validation
//! - **ports**: repository traits the services depend on
//! - **services**: credentials, entries, CSV transfer, trends, needs
//! - **adapters**: the DuckDB implementation of the ports

pub mod adapters;
pub mod config;
pub mod domain;
pub mod log_migrations;
pub mod migrations;
pub mod ports;
pub mod services;

use std::path::Path;
use std::sync::Arc;

use adapters::duckdb::DuckDbRepository;
use config::Config;
use services::*;

pub use domain::{
    ActivityLevel, CaloricProfile, Entry, Error, Period, Profile, Result, RowError, Sex,
    TrendPoint, TrendWindow, User, UserId, View, WeightUnit,
};
pub use services::{EntryPoint, LogEvent, LoggingService};

/// File name of the main database inside the data directory
pub const DB_FILENAME: &str = "caltrack.duckdb";

/// Main context for CalTrack operations
///
/// Holds the configuration, the shared repository and one instance of each
/// service. Build one per process (or per command) from the data directory.
pub struct CaltrackContext {
    pub config: Config,
    pub repository: Arc<DuckDbRepository>,
    pub credential_service: CredentialService,
    pub entry_service: EntryService,
    pub transfer_service: TransferService,
    pub trend_service: TrendService,
    pub needs_service: NeedsService,
    pub status_service: StatusService,
}

impl CaltrackContext {
    /// Open the data directory, creating the database on first use
    pub fn new(data_dir: &Path) -> Result<Self> {
        let config = Config::load(data_dir)?;
        let repository = Arc::new(DuckDbRepository::new(&data_dir.join(DB_FILENAME))?);
        repository.ensure_schema()?;

        Ok(Self::with_repository(config, repository))
    }

    /// Wire services around an already opened repository
    pub fn with_repository(config: Config, repository: Arc<DuckDbRepository>) -> Self {
        let unit = config.weight_unit;

        Self {
            credential_service: CredentialService::new(repository.clone()),
            entry_service: EntryService::new(repository.clone()),
            transfer_service: TransferService::new(repository.clone()),
            trend_service: TrendService::new(repository.clone()),
            needs_service: NeedsService::new(repository.clone(), repository.clone(), unit),
            status_service: StatusService::new(repository.clone(), repository.clone(), unit),
            config,
            repository,
        }
    }
}
