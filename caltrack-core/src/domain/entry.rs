//! Entry domain model - one day of weight and calorie data

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::result::{Error, Result};
use super::user::UserId;

const LB_PER_KG: f64 = 2.204_622_621_848_776;

/// A user's weight and calorie record for a single calendar day
///
/// Weight is kept in whatever unit the installation is configured for;
/// see [`WeightUnit`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub user_id: UserId,
    pub date: NaiveDate,
    pub weight: f64,
    pub calories: u32,
}

impl Entry {
    /// Build a validated entry
    ///
    /// Calories arrive as a signed value so negative input from a form or
    /// a CSV cell is reported instead of wrapping.
    pub fn new(user_id: UserId, date: NaiveDate, weight: f64, calories: i64) -> Result<Self> {
        validate_weight(weight)?;
        let calories = u32::try_from(calories).map_err(|_| {
            if calories < 0 {
                Error::invalid_input(format!("calories must not be negative (got {})", calories))
            } else {
                Error::invalid_input(format!("calories out of range (got {})", calories))
            }
        })?;

        Ok(Self {
            user_id,
            date,
            weight,
            calories,
        })
    }
}

pub(crate) fn validate_weight(weight: f64) -> Result<()> {
    if !weight.is_finite() || weight <= 0.0 {
        return Err(Error::invalid_input(format!(
            "weight must be a positive number (got {})",
            weight
        )));
    }
    Ok(())
}

/// Unit entry weights are recorded in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    #[default]
    Kg,
    Lb,
}

impl WeightUnit {
    pub fn to_kg(&self, weight: f64) -> f64 {
        match self {
            WeightUnit::Kg => weight,
            WeightUnit::Lb => weight / LB_PER_KG,
        }
    }

    pub fn to_lb(&self, weight: f64) -> f64 {
        match self {
            WeightUnit::Kg => weight * LB_PER_KG,
            WeightUnit::Lb => weight,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WeightUnit::Kg => "kg",
            WeightUnit::Lb => "lb",
        }
    }
}

impl fmt::Display for WeightUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WeightUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "kg" | "kgs" | "kilograms" => Ok(WeightUnit::Kg),
            "lb" | "lbs" | "pounds" => Ok(WeightUnit::Lb),
            other => Err(Error::invalid_input(format!("unknown weight unit '{}'", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    #[test]
    fn test_entry_validation() {
        assert!(Entry::new(UserId(1), day(), 70.0, 2000).is_ok());
        assert!(Entry::new(UserId(1), day(), 70.0, 0).is_ok());
        assert!(matches!(
            Entry::new(UserId(1), day(), 0.0, 2000),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            Entry::new(UserId(1), day(), -3.0, 2000),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            Entry::new(UserId(1), day(), f64::INFINITY, 2000),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            Entry::new(UserId(1), day(), 70.0, -1),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_unit_conversion() {
        let kg = WeightUnit::Lb.to_kg(220.462_262_184_877_6);
        assert!((kg - 100.0).abs() < 1e-9);
        assert_eq!(WeightUnit::Kg.to_kg(80.0), 80.0);
        assert!((WeightUnit::Kg.to_lb(1.0) - LB_PER_KG).abs() < 1e-12);
    }

    #[test]
    fn test_parse_unit() {
        assert_eq!("LBS".parse::<WeightUnit>().unwrap(), WeightUnit::Lb);
        assert_eq!("kg".parse::<WeightUnit>().unwrap(), WeightUnit::Kg);
        assert!("stone".parse::<WeightUnit>().is_err());
    }
}
