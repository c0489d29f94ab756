//! Status service - summary of a user's stored data

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{Error, Result, UserId, View, WeightUnit};
use crate::ports::{EntryRepository, UserRepository};

pub struct StatusService {
    users: Arc<dyn UserRepository>,
    entries: Arc<dyn EntryRepository>,
    weight_unit: WeightUnit,
}

impl StatusService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        entries: Arc<dyn EntryRepository>,
        weight_unit: WeightUnit,
    ) -> Self {
        Self {
            users,
            entries,
            weight_unit,
        }
    }

    pub fn summary(&self, user_id: UserId) -> Result<StatusSummary> {
        let user = self
            .users
            .get_user(user_id)?
            .ok_or_else(|| Error::not_found(format!("user {}", user_id)))?;
        let stats = self.entries.entry_stats(user_id)?;
        let latest = self.entries.latest_entries(user_id, View::Week.limit())?;

        Ok(StatusSummary {
            username: user.username,
            entry_count: stats.count,
            first_date: stats.first_date,
            last_date: stats.last_date,
            latest_weight: latest.last().map(|e| e.weight),
            weight_unit: self.weight_unit,
            has_profile: self.users.get_profile(user_id)?.is_some(),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct StatusSummary {
    pub username: String,
    pub entry_count: i64,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub latest_weight: Option<f64>,
    pub weight_unit: WeightUnit,
    pub has_profile: bool,
}
