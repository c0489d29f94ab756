//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on a specific use case or feature area.

pub mod calculator;
mod credential;
pub mod csv_bridge;
mod entry;
pub mod logging;
pub mod migration;
mod needs;
mod status;
pub mod trend;

pub use calculator::{bmr, estimate};
pub use credential::CredentialService;
pub use csv_bridge::TransferService;
pub use entry::EntryService;
pub use logging::{EntryPoint, LogEntry, LogEvent, LoggingService};
pub use migration::{MigrationResult, MigrationService};
pub use needs::{weight_trend, Direction, NeedsReport, NeedsService};
pub use status::{StatusService, StatusSummary};
pub use trend::{aggregate, aggregate_strict, TrendReport, TrendService, TrendSummary};
