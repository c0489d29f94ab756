//! Needs service - data-driven maintenance estimate
//!
//! Combines the formula estimate with what the user's own log says: if
//! weight is moving while eating N kcal/day, maintenance sits N minus the
//! energy equivalent of that movement.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::{CaloricProfile, Entry, Error, Result, UserId, View, WeightUnit};
use crate::ports::{EntryRepository, UserRepository};

/// kcal per pound of body weight
const KCAL_PER_LB: f64 = 3500.0;
/// Entries until a sample's trend weight decays by a factor of e
const TREND_HALF_LIFE: f64 = 7.0;
/// Weekly change (lb) treated as holding steady
const MAINTAIN_DELTA: f64 = 0.1;
const RAPID_LOSS_LB_PER_WEEK: f64 = 1.5;
const RAPID_GAIN_LB_PER_WEEK: f64 = 0.75;
/// +0.5 lb/week
const GAIN_SURPLUS: f64 = 0.5 * KCAL_PER_LB / 7.0;
/// -1.0 lb/week
const LOSE_DEFICIT: f64 = 1.0 * KCAL_PER_LB / 7.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Losing,
    Maintaining,
    Gaining,
}

#[derive(Debug, Clone, Serialize)]
pub struct NeedsReport {
    /// Formula estimate at the latest logged weight
    pub estimated_needs: u32,
    /// Maintenance derived from logged intake and weight movement
    pub maintenance: i64,
    pub gain: i64,
    pub lose: i64,
    pub weekly_change_lb: f64,
    pub direction: Direction,
    pub warning: Option<String>,
    pub entries_used: usize,
}

impl NeedsReport {
    /// One-line advice matching the direction of travel
    pub fn recommendation(&self) -> String {
        match self.direction {
            Direction::Maintaining => {
                "You are maintaining weight. Stay at your current intake to hold it.".to_string()
            }
            Direction::Losing => format!(
                "You are losing {:.2} lb/week. Eat more if this is faster than you want.",
                self.weekly_change_lb.abs()
            ),
            Direction::Gaining => format!(
                "You are gaining {:.2} lb/week. Eat less if this is faster than you want.",
                self.weekly_change_lb
            ),
        }
    }
}

pub struct NeedsService {
    users: Arc<dyn UserRepository>,
    entries: Arc<dyn EntryRepository>,
    weight_unit: WeightUnit,
}

impl NeedsService {
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

    /// Build the needs report over the entries covered by `view`
    pub fn report(&self, user_id: UserId, view: View) -> Result<NeedsReport> {
        let profile = self
            .users
            .get_profile(user_id)?
            .ok_or_else(|| Error::not_found("profile not set; run `ct profile` first"))?;
        let entries = self.entries.latest_entries(user_id, view.limit())?;
        let latest = entries
            .last()
            .ok_or_else(|| Error::not_found("no entries logged yet"))?;

        let estimated_needs = CaloricProfile {
            age: profile.age,
            sex: profile.sex,
            height_cm: profile.height_cm,
            weight_kg: self.weight_unit.to_kg(latest.weight),
            activity_level: profile.activity_level,
        }
        .estimate()?;

        let weekly_change_lb = weekly_change_lb(&entries, self.weight_unit);
        let avg_calories =
            entries.iter().map(|e| f64::from(e.calories)).sum::<f64>() / entries.len() as f64;
        let maintenance = avg_calories - weekly_change_lb * KCAL_PER_LB / 7.0;

        let direction = if weekly_change_lb.abs() <= MAINTAIN_DELTA {
            Direction::Maintaining
        } else if weekly_change_lb < 0.0 {
            Direction::Losing
        } else {
            Direction::Gaining
        };

        let warning = if weekly_change_lb < -RAPID_LOSS_LB_PER_WEEK {
            Some("You are losing weight too rapidly. Consider eating more.".to_string())
        } else if weekly_change_lb > RAPID_GAIN_LB_PER_WEEK {
            Some("You are gaining weight too rapidly. Consider eating less.".to_string())
        } else {
            None
        };

        Ok(NeedsReport {
            estimated_needs,
            maintenance: maintenance.round() as i64,
            gain: (maintenance + GAIN_SURPLUS).round() as i64,
            lose: (maintenance - LOSE_DEFICIT).round() as i64,
            weekly_change_lb,
            direction,
            warning,
            entries_used: entries.len(),
        })
    }
}

/// Exponentially weighted mean, newest sample weighted highest
///
/// `weights` must be ordered oldest first.
pub fn weight_trend(weights: &[f64]) -> Option<f64> {
    if weights.is_empty() {
        return None;
    }
    let (sum, norm) = weights
        .iter()
        .rev()
        .enumerate()
        .fold((0.0, 0.0), |(sum, norm), (age, w)| {
            let k = (-(age as f64) / TREND_HALF_LIFE).exp();
            (sum + w * k, norm + k)
        });
    Some(sum / norm)
}

/// Pounds per week between the oldest entry and the current trend
fn weekly_change_lb(entries: &[Entry], unit: WeightUnit) -> f64 {
    let (Some(first), Some(last)) = (entries.first(), entries.last()) else {
        return 0.0;
    };
    let weights: Vec<f64> = entries.iter().map(|e| unit.to_lb(e.weight)).collect();
    let trend = weight_trend(&weights).unwrap_or(weights[0]);

    let days = (last.date - first.date).num_days().max(1) as f64;
    (trend - weights[0]) / (days / 7.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::duckdb::DuckDbRepository;
    use crate::domain::{ActivityLevel, Profile, Sex};
    use chrono::{Days, NaiveDate, Utc};

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn setup(unit: WeightUnit) -> (Arc<DuckDbRepository>, NeedsService, UserId) {
        let repo = Arc::new(DuckDbRepository::in_memory().unwrap());
        repo.ensure_schema().unwrap();
        let user = repo.insert_user("pat", "hash", Utc::now()).unwrap();
        let service = NeedsService::new(repo.clone(), repo.clone(), unit);
        (repo, service, user)
    }

    fn log(repo: &DuckDbRepository, user: UserId, weights: &[f64], calories: u32) {
        for (i, w) in weights.iter().enumerate() {
            let date = start().checked_add_days(Days::new(i as u64)).unwrap();
            repo.upsert_entry(&Entry::new(user, date, *w, calories as i64).unwrap())
                .unwrap();
        }
    }

    fn profile() -> Profile {
        Profile::new(Sex::Male, 30, 180.0, ActivityLevel::Sedentary).unwrap()
    }

    #[test]
    fn test_weight_trend_favours_recent() {
        assert_eq!(weight_trend(&[]), None);
        assert_eq!(weight_trend(&[80.0]), Some(80.0));
        let trend = weight_trend(&[82.0, 80.0]).unwrap();
        assert!(trend < 81.0 && trend > 80.0);
    }

    #[test]
    fn test_requires_profile_and_entries() {
        let (repo, service, user) = setup(WeightUnit::Kg);
        assert!(matches!(service.report(user, View::All), Err(Error::NotFound(_))));

        repo.upsert_profile(user, &profile()).unwrap();
        assert!(matches!(service.report(user, View::All), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_steady_weight_is_maintaining() {
        let (repo, service, user) = setup(WeightUnit::Kg);
        repo.upsert_profile(user, &profile()).unwrap();
        log(&repo, user, &[80.0; 14], 2400);

        let report = service.report(user, View::All).unwrap();
        assert_eq!(report.estimated_needs, 2136);
        assert_eq!(report.direction, Direction::Maintaining);
        assert_eq!(report.maintenance, 2400);
        assert_eq!(report.gain, 2650);
        assert_eq!(report.lose, 1900);
        assert!(report.warning.is_none());
        assert_eq!(report.entries_used, 14);
    }

    #[test]
    fn test_losing_weight_raises_maintenance() {
        let (repo, service, user) = setup(WeightUnit::Lb);
        repo.upsert_profile(user, &profile()).unwrap();
        let weights: Vec<f64> = (0..15).map(|i| 200.0 - i as f64 * 0.2).collect();
        log(&repo, user, &weights, 2000);

        let report = service.report(user, View::All).unwrap();
        assert_eq!(report.direction, Direction::Losing);
        assert!(report.weekly_change_lb < -MAINTAIN_DELTA);
        assert!(report.maintenance > 2000);
        assert!(report.recommendation().contains("losing"));
    }

    #[test]
    fn test_rapid_gain_warning() {
        let (repo, service, user) = setup(WeightUnit::Lb);
        repo.upsert_profile(user, &profile()).unwrap();
        let weights: Vec<f64> = (0..8).map(|i| 170.0 + i as f64).collect();
        log(&repo, user, &weights, 3500);

        let report = service.report(user, View::Week).unwrap();
        assert_eq!(report.direction, Direction::Gaining);
        assert!(report.warning.unwrap().contains("gaining"));
        assert_eq!(report.entries_used, 7);
    }
}
