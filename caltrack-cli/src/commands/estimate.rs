//! Estimate command - caloric needs from biometrics only

use anyhow::Result;
use caltrack_core::services::{bmr, estimate};
use caltrack_core::{ActivityLevel, Sex};

pub fn run(
    age: u32,
    sex: Sex,
    height_cm: f64,
    weight_kg: f64,
    activity: ActivityLevel,
    json: bool,
) -> Result<()> {
    let needs = estimate(age, sex, height_cm, weight_kg, activity)?;

    if json {
        println!(
            "{}",
            serde_json::json!({
                "bmr": bmr(age, sex, height_cm, weight_kg)?.round(),
                "activity_level": activity.as_str(),
                "multiplier": activity.multiplier(),
                "estimated_needs": needs,
            })
        );
    } else {
        println!("Estimated daily needs: {} kcal", needs);
    }

    Ok(())
}
