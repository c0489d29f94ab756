//! Trends command - moving averages and period summary

use anyhow::Result;
use caltrack_core::{TrendWindow, View};
use colored::Colorize;

use super::login;
use crate::output::{create_table, format_avg, format_change, format_weight};

pub fn run(
    user: Option<&str>,
    period: View,
    window: Option<TrendWindow>,
    strict: bool,
    json: bool,
) -> Result<()> {
    let (ctx, id) = login(user)?;
    let window = window.unwrap_or(ctx.config.trend_window);
    let strict = strict || ctx.config.strict_trend;

    let report = ctx.trend_service.trend(id, period, window, strict)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let Some(summary) = &report.summary else {
        println!("{}", "No entries found.".dimmed());
        return Ok(());
    };

    let unit = ctx.config.weight_unit;
    println!("{}", format!("Trends for {}", summary.label).bold());
    println!();

    let mut overview = create_table();
    overview.add_row(vec!["Entries", &summary.entries.to_string()]);
    overview.add_row(vec!["Average weight", &format_weight(summary.avg_weight, unit)]);
    overview.add_row(vec!["Net change", &format_change(summary.net_change, unit)]);
    overview.add_row(vec!["Average calories", &format!("{:.0}", summary.avg_calories)]);
    println!("{}", overview);
    println!();

    let mut table = create_table();
    table.set_header(vec![
        "Date".to_string(),
        format!("Avg weight ({})", unit),
        "Avg calories".to_string(),
    ]);
    for point in &report.points {
        table.add_row(vec![
            point.date.to_string(),
            format_avg(point.avg_weight, 1),
            format_avg(point.avg_calories, 0),
        ]);
    }
    println!("{}", table);

    let policy = if report.strict { ", strict" } else { "" };
    println!("{}", format!("Window: {}{}", report.window, policy).dimmed());

    Ok(())
}
