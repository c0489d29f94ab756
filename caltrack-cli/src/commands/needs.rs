//! Needs command - caloric needs from profile and log

use anyhow::Result;
use caltrack_core::View;
use colored::Colorize;

use super::login;
use crate::output::{create_table, warning};

pub fn run(user: Option<&str>, period: View, json: bool) -> Result<()> {
    let (ctx, id) = login(user)?;
    let report = ctx.needs_service.report(id, period)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "{}",
        format!("Caloric Needs ({}, {} entries)", period.label(), report.entries_used).bold()
    );
    println!();

    let mut table = create_table();
    table.add_row(vec!["Formula estimate", &format!("{} kcal", report.estimated_needs)]);
    table.add_row(vec!["Maintenance", &format!("{} kcal", report.maintenance)]);
    table.add_row(vec!["Gain 0.5 lb/week", &format!("{} kcal", report.gain)]);
    table.add_row(vec!["Lose 1 lb/week", &format!("{} kcal", report.lose)]);
    table.add_row(vec!["Weekly change", &format!("{:+.2} lb", report.weekly_change_lb)]);
    println!("{}", table);
    println!();

    println!("{}", report.recommendation());
    if let Some(w) = &report.warning {
        warning(&format!("Warning: {}", w));
    }

    Ok(())
}
