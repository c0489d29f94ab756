//! Entry service - daily weight and calorie records

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::domain::{Entry, Error, Result, UserId, View};
use crate::ports::EntryRepository;

/// Entry store operations
pub struct EntryService {
    repository: Arc<dyn EntryRepository>,
}

impl EntryService {
    pub fn new(repository: Arc<dyn EntryRepository>) -> Self {
        Self { repository }
    }

    /// Insert or replace the entry for `date`
    pub fn upsert(
        &self,
        user_id: UserId,
        date: NaiveDate,
        weight: f64,
        calories: i64,
    ) -> Result<Entry> {
        let entry = Entry::new(user_id, date, weight, calories)?;
        self.repository.upsert_entry(&entry)?;
        Ok(entry)
    }

    /// Entries with `start <= date <= end`, oldest first
    pub fn query_range(
        &self,
        user_id: UserId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Entry>> {
        if start > end {
            return Ok(Vec::new());
        }
        self.repository.entries_in_range(user_id, start, end)
    }

    /// Delete the entry for `date`
    pub fn delete(&self, user_id: UserId, date: NaiveDate) -> Result<()> {
        if self.repository.delete_entry(user_id, date)? {
            Ok(())
        } else {
            Err(Error::not_found(format!("no entry for {}", date)))
        }
    }

    pub fn get(&self, user_id: UserId, date: NaiveDate) -> Result<Option<Entry>> {
        self.repository.get_entry(user_id, date)
    }

    /// Like [`get`](Self::get), but a missing entry is `NotFound`
    pub fn require(&self, user_id: UserId, date: NaiveDate) -> Result<Entry> {
        self.get(user_id, date)?
            .ok_or_else(|| Error::not_found(format!("no entry for {}", date)))
    }

    /// The most recent entries covered by `view`, oldest first
    pub fn latest(&self, user_id: UserId, view: View) -> Result<Vec<Entry>> {
        self.repository.latest_entries(user_id, view.limit())
    }

    pub fn all(&self, user_id: UserId) -> Result<Vec<Entry>> {
        self.repository.latest_entries(user_id, None)
    }

    /// Upsert a batch in one transaction
    ///
    /// Later entries for the same (user, date) replace earlier ones.
    pub fn bulk_upsert(&self, entries: &[Entry]) -> Result<()> {
        let mut deduped: Vec<Entry> = Vec::with_capacity(entries.len());
        let mut seen: HashMap<(UserId, NaiveDate), usize> = HashMap::new();
        for entry in entries {
            match seen.get(&(entry.user_id, entry.date)) {
                Some(&idx) => deduped[idx] = entry.clone(),
                None => {
                    seen.insert((entry.user_id, entry.date), deduped.len());
                    deduped.push(entry.clone());
                }
            }
        }
        self.repository.bulk_upsert_entries(&deduped)
    }
}
