//! Status command - summary of stored data

use anyhow::Result;
use colored::Colorize;

use super::login;
use crate::output::{create_table, format_weight};

pub fn run(user: Option<&str>, json: bool) -> Result<()> {
    let (ctx, id) = login(user)?;
    let status = ctx.status_service.summary(id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("{}", format!("CalTrack Status for {}", status.username).bold());
    println!();

    let mut table = create_table();
    table.add_row(vec!["Entries", &status.entry_count.to_string()]);
    if let Some(weight) = status.latest_weight {
        table.add_row(vec!["Latest weight", &format_weight(weight, status.weight_unit)]);
    }
    table.add_row(vec!["Weight unit", status.weight_unit.as_str()]);
    table.add_row(vec!["Profile", if status.has_profile { "set" } else { "not set" }]);
    println!("{}", table);

    if let (Some(first), Some(last)) = (status.first_date, status.last_date) {
        println!();
        println!("Date range: {} to {}", first, last);
    }

    Ok(())
}
