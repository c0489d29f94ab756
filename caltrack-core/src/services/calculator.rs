//! Caloric needs calculator
//!
//! Mifflin-St Jeor basal metabolic rate scaled by an activity multiplier.

use crate::domain::{validate_weight, ActivityLevel, CaloricProfile, Error, Result, Sex};

/// Basal metabolic rate in kcal/day
pub fn bmr(age: u32, sex: Sex, height_cm: f64, weight_kg: f64) -> Result<f64> {
    if age == 0 {
        return Err(Error::invalid_input("age must be greater than zero"));
    }
    if !height_cm.is_finite() || height_cm <= 0.0 {
        return Err(Error::invalid_input("height must be greater than zero"));
    }
    validate_weight(weight_kg)?;

    let base = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * f64::from(age);
    Ok(match sex {
        Sex::Male => base + 5.0,
        Sex::Female => base - 161.0,
    })
}

/// Estimated daily caloric requirement, rounded to the nearest kcal
pub fn estimate(
    age: u32,
    sex: Sex,
    height_cm: f64,
    weight_kg: f64,
    activity_level: ActivityLevel,
) -> Result<u32> {
    let total = bmr(age, sex, height_cm, weight_kg)? * activity_level.multiplier();
    // Very light, very old, or very short inputs can push BMR below zero
    if total <= 0.0 {
        return Err(Error::invalid_input(
            "inputs are outside the range the formula covers",
        ));
    }
    let rounded = total.round();
    if !rounded.is_finite() || rounded > f64::from(u32::MAX) {
        return Err(Error::invalid_input(format!("estimate {} is out of range", rounded)));
    }
    Ok(rounded as u32)
}

impl CaloricProfile {
    pub fn estimate(&self) -> Result<u32> {
        estimate(
            self.age,
            self.sex,
            self.height_cm,
            self.weight_kg,
            self.activity_level,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_value() {
        // 10*80 + 6.25*180 - 5*30 + 5 = 1780; * 1.2 = 2136
        assert_eq!(
            estimate(30, Sex::Male, 180.0, 80.0, ActivityLevel::Sedentary).unwrap(),
            2136
        );
    }

    #[test]
    fn test_female_offset() {
        let male = bmr(40, Sex::Male, 165.0, 60.0).unwrap();
        let female = bmr(40, Sex::Female, 165.0, 60.0).unwrap();
        assert_eq!(male - female, 166.0);
        // 600 + 1031.25 - 200 - 161 = 1270.25; * 1.55 = 1968.89
        assert_eq!(
            estimate(40, Sex::Female, 165.0, 60.0, ActivityLevel::Moderate).unwrap(),
            1969
        );
    }

    #[test]
    fn test_multipliers_increase_estimate() {
        let values: Vec<u32> = ActivityLevel::ALL
            .iter()
            .map(|level| estimate(30, Sex::Male, 180.0, 80.0, *level).unwrap())
            .collect();
        assert!(values.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(values.last().copied(), Some(3382));
    }

    #[test]
    fn test_rejects_non_positive_inputs() {
        for result in [
            estimate(0, Sex::Male, 180.0, 80.0, ActivityLevel::Sedentary),
            estimate(30, Sex::Male, 0.0, 80.0, ActivityLevel::Sedentary),
            estimate(30, Sex::Male, 180.0, -1.0, ActivityLevel::Sedentary),
            estimate(30, Sex::Male, f64::NAN, 80.0, ActivityLevel::Sedentary),
        ] {
            assert!(matches!(result, Err(Error::InvalidInput(_))));
        }
    }

    #[test]
    fn test_rejects_estimate_beyond_u32() {
        assert!(matches!(
            estimate(30, Sex::Male, 180.0, 1e12, ActivityLevel::Sedentary),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_caloric_profile() {
        let profile = CaloricProfile {
            age: 30,
            sex: Sex::Male,
            height_cm: 180.0,
            weight_kg: 80.0,
            activity_level: ActivityLevel::Sedentary,
        };
        assert_eq!(profile.estimate().unwrap(), 2136);
    }
}
