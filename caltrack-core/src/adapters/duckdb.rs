//! DuckDB repository implementation

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use duckdb::{params, Connection};

use crate::domain::{ActivityLevel, Entry, Error, Profile, Result, Sex, User, UserId};
use crate::ports::{EntryRepository, EntryStats, StoredCredentials, UserRepository};
use crate::services::{MigrationResult, MigrationService};

/// Maximum number of retries when database file is locked
const MAX_RETRIES: u32 = 5;

/// Initial retry delay in milliseconds (doubles each retry: 50, 100, 200, 400, 800ms)
const INITIAL_RETRY_DELAY_MS: u64 = 50;

const ENTRY_COLUMNS: &str = "user_id, entry_date::VARCHAR, weight, calories";

/// Check if an error message indicates a file locking issue that should be retried
fn is_retryable_error(err_msg: &str) -> bool {
    let lower = err_msg.to_lowercase();
    // Windows error messages
    lower.contains("being used by another process")
        || lower.contains("cannot access the file")
        // Unix/macOS error messages
        || lower.contains("resource temporarily unavailable")
        || lower.contains("database is locked")
        || lower.contains("file is already open")
        || lower.contains("could not set lock on file")
}

fn is_unique_violation(err_msg: &str) -> bool {
    let lower = err_msg.to_lowercase();
    lower.contains("duplicate key") || lower.contains("unique constraint")
}

/// Raw entry columns as read from a row, converted outside the row closure
type EntryRow = (i64, String, f64, i64);

fn entry_from_row(row: EntryRow) -> Result<Entry> {
    let (user_id, date, weight, calories) = row;
    let date = parse_date(&date)?;
    let calories = u32::try_from(calories)
        .map_err(|_| Error::database(format!("stored calories out of range: {}", calories)))?;
    Ok(Entry {
        user_id: UserId(user_id),
        date,
        weight,
        calories,
    })
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| Error::database(format!("stored date '{}' is invalid: {}", s, e)))
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::database(format!("stored timestamp '{}' is invalid: {}", s, e)))
}

/// DuckDB repository implementation
pub struct DuckDbRepository {
    conn: Mutex<Connection>,
    db_path: Option<PathBuf>,
}

impl DuckDbRepository {
    /// Open (or create) the database file
    ///
    /// Includes retry logic with exponential backoff for file locking errors,
    /// which occur when a second process still holds the file.
    pub fn new(db_path: &Path) -> Result<Self> {
        let mut last_error = None;

        for attempt in 0..MAX_RETRIES {
            match Self::try_open_connection(db_path) {
                Ok(conn) => {
                    return Ok(Self {
                        conn: Mutex::new(conn),
                        db_path: Some(db_path.to_path_buf()),
                    });
                }
                Err(e) => {
                    let err_msg = e.to_string();
                    if is_retryable_error(&err_msg) && attempt < MAX_RETRIES - 1 {
                        let delay =
                            Duration::from_millis(INITIAL_RETRY_DELAY_MS * 2u64.pow(attempt));
                        eprintln!(
                            "[caltrack] Database busy, retrying in {}ms (attempt {}/{}): {}",
                            delay.as_millis(),
                            attempt + 1,
                            MAX_RETRIES,
                            err_msg
                        );
                        thread::sleep(delay);
                        last_error = Some(e);
                        continue;
                    }
                    return Err(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            Error::database(format!("Failed to open database after {} retries", MAX_RETRIES))
        }))
    }

    /// Open a throwaway in-memory database (tests, previews)
    pub fn in_memory() -> Result<Self> {
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        let conn = Connection::open_in_memory_with_flags(config)?;
        Ok(Self {
            conn: Mutex::new(conn),
            db_path: None,
        })
    }

    fn try_open_connection(db_path: &Path) -> Result<Connection> {
        // Extension autoloading stays off: nothing here needs one and cached
        // extensions can fail code signing on macOS
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        let conn = Connection::open_with_flags(db_path, config)?;
        Ok(conn)
    }

    /// Path of the backing file, `None` for in-memory databases
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| Error::database(format!("Lock poisoned: {}", e)))
    }

    /// Run database migrations using the MigrationService
    pub fn run_migrations(&self) -> Result<MigrationResult> {
        let conn = self.conn()?;
        MigrationService::new(&conn).run_pending()
    }

    /// Ensure database schema exists (runs pending migrations)
    pub fn ensure_schema(&self) -> Result<()> {
        self.run_migrations()?;
        Ok(())
    }
}

impl UserRepository for DuckDbRepository {
    fn insert_user(
        &self,
        username: &str,
        password_hash: &str,
        created_at: DateTime<Utc>,
    ) -> Result<UserId> {
        let conn = self.conn()?;
        insert_user_on(&conn, username, password_hash, created_at)
    }

    fn insert_user_with_profile(
        &self,
        username: &str,
        password_hash: &str,
        created_at: DateTime<Utc>,
        profile: &Profile,
    ) -> Result<UserId> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let id = insert_user_on(&tx, username, password_hash, created_at)?;
        upsert_profile_on(&tx, id, profile)?;
        tx.commit()?;
        Ok(id)
    }

    fn find_credentials(&self, username: &str) -> Result<Option<StoredCredentials>> {
        let conn = self.conn()?;
        let found = conn.query_row(
            "SELECT user_id, password_hash FROM sys_users WHERE username = ?",
            params![username],
            |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)),
        );

        match found {
            Ok((id, password_hash)) => Ok(Some(StoredCredentials {
                user_id: UserId(id),
                password_hash,
            })),
            Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn get_user(&self, id: UserId) -> Result<Option<User>> {
        let conn = self.conn()?;
        let found = conn.query_row(
            "SELECT user_id, username, created_at FROM sys_users WHERE user_id = ?",
            params![id.0],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            },
        );

        match found {
            Ok((id, username, created_at)) => Ok(Some(User::new(
                UserId(id),
                username,
                parse_timestamp(&created_at)?,
            ))),
            Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn upsert_profile(&self, id: UserId, profile: &Profile) -> Result<()> {
        let conn = self.conn()?;
        upsert_profile_on(&conn, id, profile)
    }

    fn get_profile(&self, id: UserId) -> Result<Option<Profile>> {
        let conn = self.conn()?;
        let found = conn.query_row(
            "SELECT sex, age, height_cm, activity_level FROM sys_profiles WHERE user_id = ?",
            params![id.0],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, f64>(2)?,
                    row.get::<_, String>(3)?,
                ))
            },
        );

        let (sex, age, height_cm, activity_level) = match found {
            Ok(row) => row,
            Err(duckdb::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let corrupt = |e: Error| Error::database(format!("stored profile is invalid: {}", e));
        let sex: Sex = sex.parse().map_err(corrupt)?;
        let activity_level: ActivityLevel = activity_level.parse().map_err(corrupt)?;
        let age = u32::try_from(age)
            .map_err(|_| Error::database(format!("stored age out of range: {}", age)))?;

        Ok(Some(Profile {
            sex,
            age,
            height_cm,
            activity_level,
        }))
    }

    fn delete_user(&self, id: UserId) -> Result<bool> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        // Children first; the schema declares no foreign keys
        tx.execute("DELETE FROM sys_entries WHERE user_id = ?", params![id.0])?;
        tx.execute("DELETE FROM sys_profiles WHERE user_id = ?", params![id.0])?;
        let deleted = tx.execute("DELETE FROM sys_users WHERE user_id = ?", params![id.0])?;

        tx.commit()?;
        Ok(deleted > 0)
    }
}

impl EntryRepository for DuckDbRepository {
    fn upsert_entry(&self, entry: &Entry) -> Result<()> {
        let conn = self.conn()?;
        upsert_entry_on(&conn, entry, &Utc::now().to_rfc3339())
    }

    fn bulk_upsert_entries(&self, entries: &[Entry]) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let now = Utc::now().to_rfc3339();
        for entry in entries {
            upsert_entry_on(&tx, entry, &now)?;
        }
        tx.commit()?;
        Ok(())
    }

    fn get_entry(&self, user_id: UserId, date: NaiveDate) -> Result<Option<Entry>> {
        let conn = self.conn()?;
        let found = conn.query_row(
            &format!(
                "SELECT {} FROM sys_entries WHERE user_id = ? AND entry_date = CAST(? AS DATE)",
                ENTRY_COLUMNS
            ),
            params![user_id.0, date.to_string()],
            read_entry_row,
        );

        match found {
            Ok(row) => entry_from_row(row).map(Some),
            Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn entries_in_range(
        &self,
        user_id: UserId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Entry>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM sys_entries
             WHERE user_id = ?
               AND entry_date BETWEEN CAST(? AS DATE) AND CAST(? AS DATE)
             ORDER BY entry_date ASC",
            ENTRY_COLUMNS
        ))?;

        let rows = stmt
            .query_map(
                params![user_id.0, start.to_string(), end.to_string()],
                read_entry_row,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter().map(entry_from_row).collect()
    }

    fn latest_entries(&self, user_id: UserId, limit: Option<usize>) -> Result<Vec<Entry>> {
        let conn = self.conn()?;

        let rows = match limit {
            Some(limit) => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM sys_entries
                     WHERE user_id = ?
                     ORDER BY entry_date DESC
                     LIMIT ?",
                    ENTRY_COLUMNS
                ))?;
                let limit = i64::try_from(limit).unwrap_or(i64::MAX);
                let rows = stmt
                    .query_map(params![user_id.0, limit], read_entry_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                rows
            }
            None => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM sys_entries
                     WHERE user_id = ?
                     ORDER BY entry_date DESC",
                    ENTRY_COLUMNS
                ))?;
                let rows = stmt
                    .query_map(params![user_id.0], read_entry_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                rows
            }
        };

        let mut entries = rows
            .into_iter()
            .map(entry_from_row)
            .collect::<Result<Vec<_>>>()?;
        entries.reverse();
        Ok(entries)
    }

    fn delete_entry(&self, user_id: UserId, date: NaiveDate) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM sys_entries WHERE user_id = ? AND entry_date = CAST(? AS DATE)",
            params![user_id.0, date.to_string()],
        )?;
        Ok(deleted > 0)
    }

    fn entry_stats(&self, user_id: UserId) -> Result<EntryStats> {
        let conn = self.conn()?;
        let (count, first, last) = conn.query_row(
            "SELECT COUNT(*), MIN(entry_date)::VARCHAR, MAX(entry_date)::VARCHAR
             FROM sys_entries WHERE user_id = ?",
            params![user_id.0],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, Option<String>>(1)?,
                    row.get::<_, Option<String>>(2)?,
                ))
            },
        )?;

        Ok(EntryStats {
            count,
            first_date: first.as_deref().map(parse_date).transpose()?,
            last_date: last.as_deref().map(parse_date).transpose()?,
        })
    }
}

fn read_entry_row(row: &duckdb::Row) -> duckdb::Result<EntryRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn insert_user_on(
    conn: &Connection,
    username: &str,
    password_hash: &str,
    created_at: DateTime<Utc>,
) -> Result<UserId> {
    let existing: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sys_users WHERE username = ?",
        params![username],
        |row| row.get(0),
    )?;
    if existing > 0 {
        return Err(Error::DuplicateUser(username.to_string()));
    }

    conn.query_row(
        "INSERT INTO sys_users (username, password_hash, created_at)
         VALUES (?, ?, ?)
         RETURNING user_id",
        params![username, password_hash, created_at.to_rfc3339()],
        |row| row.get::<_, i64>(0),
    )
    .map(UserId)
    .map_err(|e| {
        let msg = e.to_string();
        if is_unique_violation(&msg) {
            Error::DuplicateUser(username.to_string())
        } else {
            Error::Database(msg)
        }
    })
}

fn upsert_profile_on(conn: &Connection, id: UserId, profile: &Profile) -> Result<()> {
    conn.execute(
        "INSERT INTO sys_profiles (user_id, sex, age, height_cm, activity_level, updated_at)
         VALUES (?, ?, ?, ?, ?, ?)
         ON CONFLICT (user_id) DO UPDATE SET
            sex = EXCLUDED.sex,
            age = EXCLUDED.age,
            height_cm = EXCLUDED.height_cm,
            activity_level = EXCLUDED.activity_level,
            updated_at = EXCLUDED.updated_at",
        params![
            id.0,
            profile.sex.as_str(),
            i64::from(profile.age),
            profile.height_cm,
            profile.activity_level.as_str(),
            Utc::now().to_rfc3339(),
        ],
    )?;
    Ok(())
}

fn upsert_entry_on(conn: &Connection, entry: &Entry, now: &str) -> Result<()> {
    // created_at survives an overwrite, the values and updated_at do not
    conn.execute(
        "INSERT INTO sys_entries (user_id, entry_date, weight, calories, created_at, updated_at)
         VALUES (?, CAST(? AS DATE), ?, ?, ?, ?)
         ON CONFLICT (user_id, entry_date) DO UPDATE SET
            weight = EXCLUDED.weight,
            calories = EXCLUDED.calories,
            updated_at = EXCLUDED.updated_at",
        params![
            entry.user_id.0,
            entry.date.to_string(),
            entry.weight,
            i64::from(entry.calories),
            now,
            now,
        ],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> DuckDbRepository {
        let repo = DuckDbRepository::in_memory().unwrap();
        repo.ensure_schema().unwrap();
        repo
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_retryable_errors() {
        assert!(is_retryable_error("IO Error: Could not set lock on file"));
        assert!(is_retryable_error("The process cannot access the file"));
        assert!(!is_retryable_error("Catalog Error: table not found"));
    }

    #[test]
    fn test_insert_user_assigns_sequential_ids() {
        let repo = repo();
        let a = repo.insert_user("a", "hash", Utc::now()).unwrap();
        let b = repo.insert_user("b", "hash", Utc::now()).unwrap();
        assert_ne!(a, b);
        assert!(b.0 > a.0);
    }

    #[test]
    fn test_insert_user_duplicate() {
        let repo = repo();
        repo.insert_user("a", "hash", Utc::now()).unwrap();
        let err = repo.insert_user("a", "other", Utc::now()).unwrap_err();
        assert!(matches!(err, Error::DuplicateUser(name) if name == "a"));
    }

    #[test]
    fn test_insert_user_with_profile() {
        let repo = repo();
        let profile = Profile::new(Sex::Female, 28, 170.0, ActivityLevel::Moderate).unwrap();
        let id = repo
            .insert_user_with_profile("a", "hash", Utc::now(), &profile)
            .unwrap();
        assert_eq!(repo.get_profile(id).unwrap(), Some(profile.clone()));

        let err = repo
            .insert_user_with_profile("a", "hash", Utc::now(), &profile)
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateUser(_)));
        assert!(repo.get_user(UserId(id.0 + 1)).unwrap().is_none());
    }

    #[test]
    fn test_get_user_round_trips_created_at() {
        let repo = repo();
        let created = Utc::now();
        let id = repo.insert_user("a", "hash", created).unwrap();
        let user = repo.get_user(id).unwrap().unwrap();
        assert_eq!(user.username, "a");
        assert_eq!(user.created_at.timestamp(), created.timestamp());
        assert!(repo.get_user(UserId(999)).unwrap().is_none());
    }

    #[test]
    fn test_profile_upsert_replaces() {
        let repo = repo();
        let id = repo.insert_user("a", "hash", Utc::now()).unwrap();
        assert!(repo.get_profile(id).unwrap().is_none());

        let first = Profile::new(Sex::Male, 30, 180.0, ActivityLevel::Sedentary).unwrap();
        repo.upsert_profile(id, &first).unwrap();
        let second = Profile::new(Sex::Male, 31, 181.0, ActivityLevel::Active).unwrap();
        repo.upsert_profile(id, &second).unwrap();

        assert_eq!(repo.get_profile(id).unwrap(), Some(second));
    }

    #[test]
    fn test_latest_entries_ascending() {
        let repo = repo();
        let user = UserId(1);
        for day in 1..=5 {
            let entry = Entry::new(user, d(2024, 1, day), 70.0 + day as f64, 2000).unwrap();
            repo.upsert_entry(&entry).unwrap();
        }

        let latest = repo.latest_entries(user, Some(3)).unwrap();
        let dates: Vec<NaiveDate> = latest.iter().map(|e| e.date).collect();
        assert_eq!(dates, vec![d(2024, 1, 3), d(2024, 1, 4), d(2024, 1, 5)]);

        assert_eq!(repo.latest_entries(user, None).unwrap().len(), 5);
    }

    #[test]
    fn test_entry_stats() {
        let repo = repo();
        let user = UserId(1);
        assert_eq!(repo.entry_stats(user).unwrap(), EntryStats::default());

        repo.upsert_entry(&Entry::new(user, d(2024, 2, 1), 70.0, 1800).unwrap())
            .unwrap();
        repo.upsert_entry(&Entry::new(user, d(2024, 1, 1), 71.0, 1900).unwrap())
            .unwrap();

        let stats = repo.entry_stats(user).unwrap();
        assert_eq!(stats.count, 2);
        assert_eq!(stats.first_date, Some(d(2024, 1, 1)));
        assert_eq!(stats.last_date, Some(d(2024, 2, 1)));
    }

    #[test]
    fn test_delete_user_cascades() {
        let repo = repo();
        let id = repo.insert_user("a", "hash", Utc::now()).unwrap();
        let other = repo.insert_user("b", "hash", Utc::now()).unwrap();
        repo.upsert_entry(&Entry::new(id, d(2024, 1, 1), 70.0, 2000).unwrap())
            .unwrap();
        repo.upsert_entry(&Entry::new(other, d(2024, 1, 1), 60.0, 1500).unwrap())
            .unwrap();
        repo.upsert_profile(id, &Profile::new(Sex::Female, 40, 160.0, ActivityLevel::Light).unwrap())
            .unwrap();

        assert!(repo.delete_user(id).unwrap());
        assert!(repo.get_user(id).unwrap().is_none());
        assert!(repo.get_profile(id).unwrap().is_none());
        assert_eq!(repo.entry_stats(id).unwrap().count, 0);
        assert_eq!(repo.entry_stats(other).unwrap().count, 1);

        assert!(!repo.delete_user(id).unwrap());
    }
}
