//! Core domain entities
//!
//! All business entities are defined here. These are pure data structures
//! with validation logic - no I/O or external dependencies.

mod entry;
mod profile;
pub mod result;
mod trend;
mod user;

pub(crate) use entry::validate_weight;
pub use entry::{Entry, WeightUnit};
pub use profile::{ActivityLevel, CaloricProfile, Sex};
pub use result::{Error, Result, RowError};
pub use trend::{Period, TrendPoint, TrendWindow, View};
pub use user::{normalize_username, Profile, User, UserId};
