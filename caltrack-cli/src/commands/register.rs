//! Register command - create a new user

use anyhow::{bail, Result};
use caltrack_core::Profile;
use colored::Colorize;

use super::{get_context, read_password, require_user};
use crate::ProfileArgs;

pub fn run(username: Option<&str>, args: ProfileArgs) -> Result<()> {
    let username = require_user(username)?;

    // All or nothing: a half-filled profile cannot feed the calculator
    let profile = if args.is_empty() {
        None
    } else {
        match (args.sex, args.age, args.height, args.activity) {
            (Some(sex), Some(age), Some(height), Some(activity)) => {
                Some(Profile::new(sex, age, height, activity)?)
            }
            _ => bail!("Give all of --sex, --age, --height and --activity, or none of them"),
        }
    };

    let ctx = get_context()?;
    let password = read_password(true)?;

    let id = match &profile {
        Some(profile) => ctx
            .credential_service
            .register_with_profile(username, &password, profile)?,
        None => ctx.credential_service.register(username, &password)?,
    };

    println!(
        "\n{} Registered '{}' (user id {})",
        "✓".green(),
        username.trim(),
        id
    );
    if profile.is_none() {
        println!(
            "{}",
            "Set your profile with `ct profile` to enable `ct needs`.".dimmed()
        );
    }
    println!();

    Ok(())
}
