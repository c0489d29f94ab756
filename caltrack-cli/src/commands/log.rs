//! Log command - record a day's weight and calories

use anyhow::Result;
use chrono::{Local, NaiveDate};
use colored::Colorize;
use dialoguer::Confirm;

use super::login;
use crate::output::format_weight;

pub fn run(
    user: Option<&str>,
    weight: f64,
    calories: i64,
    date: Option<NaiveDate>,
    force: bool,
) -> Result<()> {
    let (ctx, id) = login(user)?;
    let date = date.unwrap_or_else(|| Local::now().date_naive());
    let unit = ctx.config.weight_unit;

    if !force {
        if let Some(existing) = ctx.entry_service.get(id, date)? {
            println!(
                "\n{}",
                format!(
                    "{} already has {} and {} kcal.",
                    date,
                    format_weight(existing.weight, unit),
                    existing.calories
                )
                .yellow()
            );
            if !Confirm::new()
                .with_prompt("Overwrite it?")
                .default(false)
                .interact()?
            {
                println!("{}\n", "Cancelled".dimmed());
                return Ok(());
            }
        }
    }

    let entry = ctx.entry_service.upsert(id, date, weight, calories)?;
    println!(
        "{} {}: {}, {} kcal",
        "✓".green(),
        entry.date,
        format_weight(entry.weight, unit),
        entry.calories
    );

    Ok(())
}
