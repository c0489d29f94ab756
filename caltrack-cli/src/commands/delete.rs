//! Delete command - remove one day's entry

use anyhow::Result;
use chrono::NaiveDate;
use colored::Colorize;
use dialoguer::Confirm;

use super::login;
use crate::output::format_weight;

pub fn run(user: Option<&str>, date: NaiveDate, force: bool) -> Result<()> {
    let (ctx, id) = login(user)?;
    let entry = ctx.entry_service.require(id, date)?;

    if !force
        && !Confirm::new()
            .with_prompt(format!(
                "Delete the entry for {} ({}, {} kcal)?",
                date,
                format_weight(entry.weight, ctx.config.weight_unit),
                entry.calories
            ))
            .default(false)
            .interact()?
    {
        println!("{}", "Cancelled".dimmed());
        return Ok(());
    }

    ctx.entry_service.delete(id, date)?;
    println!("{} Deleted entry for {}", "✓".green(), date);

    Ok(())
}
