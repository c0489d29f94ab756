//! View command - list logged entries

use anyhow::Result;
use caltrack_core::View;
use chrono::NaiveDate;
use colored::Colorize;

use super::login;
use crate::output::{create_table, format_weight};

pub fn run(
    user: Option<&str>,
    period: View,
    range: Option<(NaiveDate, NaiveDate)>,
    json: bool,
) -> Result<()> {
    let (ctx, id) = login(user)?;
    let entries = match range {
        Some((from, to)) => ctx.entry_service.query_range(id, from, to)?,
        None => ctx.entry_service.latest(id, period)?,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("{}", "No entries found.".dimmed());
        return Ok(());
    }

    let unit = ctx.config.weight_unit;
    let mut table = create_table();
    table.set_header(vec!["Date", "Weight", "Calories"]);
    for entry in &entries {
        table.add_row(vec![
            entry.date.format("%a %Y-%m-%d").to_string(),
            format_weight(entry.weight, unit),
            entry.calories.to_string(),
        ]);
    }

    let title = match range {
        Some((from, to)) => format!("Entries {} to {}", from, to),
        None => format!("Entries ({})", period.label()),
    };
    println!("{}", title.bold());
    println!("{}", table);
    println!("{}", format!("{} entries", entries.len()).dimmed());

    Ok(())
}
