//! Profile command - show or update biometric data

use anyhow::{bail, Result};
use caltrack_core::Profile;
use colored::Colorize;

use super::login;
use crate::output::create_table;
use crate::ProfileArgs;

pub fn run(user: Option<&str>, args: ProfileArgs, json: bool) -> Result<()> {
    let (ctx, id) = login(user)?;
    let current = ctx.credential_service.profile(id)?;

    let profile = if args.is_empty() {
        current
    } else {
        // Fill unspecified fields from the stored profile
        let merged = match (&current, args) {
            (Some(cur), args) => Profile::new(
                args.sex.unwrap_or(cur.sex),
                args.age.unwrap_or(cur.age),
                args.height.unwrap_or(cur.height_cm),
                args.activity.unwrap_or(cur.activity_level),
            )?,
            (
                None,
                ProfileArgs {
                    sex: Some(sex),
                    age: Some(age),
                    height: Some(height),
                    activity: Some(activity),
                },
            ) => Profile::new(sex, age, height, activity)?,
            (None, _) => bail!("No profile yet; give all of --sex, --age, --height and --activity"),
        };
        ctx.credential_service.update_profile(id, &merged)?;
        if !json {
            println!("{} Profile updated", "✓".green());
        }
        Some(merged)
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
        return Ok(());
    }

    let Some(profile) = profile else {
        println!("{}", "No profile set.".dimmed());
        println!("Set one with: ct profile --sex <male|female> --age <years> --height <cm> --activity <level>");
        return Ok(());
    };

    let mut table = create_table();
    table.add_row(vec!["Sex", profile.sex.as_str()]);
    table.add_row(vec!["Age", &profile.age.to_string()]);
    table.add_row(vec!["Height", &format!("{:.1} cm", profile.height_cm)]);
    table.add_row(vec!["Activity", profile.activity_level.as_str()]);
    println!("{}", table);

    Ok(())
}
