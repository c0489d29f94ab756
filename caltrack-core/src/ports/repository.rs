//! Repository ports - persistence abstraction
//!
//! Services depend on these traits only. The DuckDB adapter implements
//! both; tests and alternative front ends can swap in their own store.

use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::{Entry, Profile, Result, User, UserId};

/// Credential lookup result; the hash stays inside the credential service
#[derive(Debug, Clone)]
pub struct StoredCredentials {
    pub user_id: UserId,
    pub password_hash: String,
}

/// Aggregate facts about a user's entries
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryStats {
    pub count: i64,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}

/// Persistence of users, credentials and profiles
pub trait UserRepository: Send + Sync {
    /// Insert a new user and return the assigned id.
    ///
    /// Fails with `DuplicateUser` when the username is taken.
    fn insert_user(
        &self,
        username: &str,
        password_hash: &str,
        created_at: DateTime<Utc>,
    ) -> Result<UserId>;

    /// Insert a new user and their profile in one transaction.
    ///
    /// Nothing is stored when either write fails.
    fn insert_user_with_profile(
        &self,
        username: &str,
        password_hash: &str,
        created_at: DateTime<Utc>,
        profile: &Profile,
    ) -> Result<UserId>;

    /// Look up the stored hash for a username
    fn find_credentials(&self, username: &str) -> Result<Option<StoredCredentials>>;

    /// Get a user by id
    fn get_user(&self, id: UserId) -> Result<Option<User>>;

    /// Insert or replace the user's profile
    fn upsert_profile(&self, id: UserId, profile: &Profile) -> Result<()>;

    /// Get the user's profile, if one was ever saved
    fn get_profile(&self, id: UserId) -> Result<Option<Profile>>;

    /// Delete a user together with their profile and entries.
    ///
    /// Returns false when no such user existed.
    fn delete_user(&self, id: UserId) -> Result<bool>;
}

/// Persistence of daily entries, keyed by (user, date)
pub trait EntryRepository: Send + Sync {
    /// Insert or replace the entry for its (user, date)
    fn upsert_entry(&self, entry: &Entry) -> Result<()>;

    /// Upsert many entries in one transaction.
    ///
    /// Callers must not pass two entries for the same (user, date).
    fn bulk_upsert_entries(&self, entries: &[Entry]) -> Result<()>;

    /// Get the entry for one day
    fn get_entry(&self, user_id: UserId, date: NaiveDate) -> Result<Option<Entry>>;

    /// Entries with `start <= date <= end`, ascending by date
    fn entries_in_range(
        &self,
        user_id: UserId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Entry>>;

    /// The most recent `limit` entries (all when `None`), ascending by date
    fn latest_entries(&self, user_id: UserId, limit: Option<usize>) -> Result<Vec<Entry>>;

    /// Delete one day's entry; false when nothing matched
    fn delete_entry(&self, user_id: UserId, date: NaiveDate) -> Result<bool>;

    /// Count and date span of the user's entries
    fn entry_stats(&self, user_id: UserId) -> Result<EntryStats>;
}
