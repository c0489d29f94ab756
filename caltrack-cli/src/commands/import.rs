//! Import command - load entries from CSV

use std::path::Path;

use anyhow::Result;
use caltrack_core::Error;
use colored::Colorize;

use super::login;
use crate::output::create_table;

pub fn run(user: Option<&str>, file: &Path, json: bool) -> Result<()> {
    let (ctx, id) = login(user)?;

    let entries = match ctx.transfer_service.import_file(file, id) {
        Ok(entries) => entries,
        Err(Error::MalformedRow(rows)) => {
            if json {
                println!("{}", serde_json::json!({ "imported": 0, "errors": rows }));
            } else {
                println!("{}", "Nothing was imported. Fix these rows and retry:".red());
                let mut table = create_table();
                table.set_header(vec!["Line", "Problem"]);
                for row in &rows {
                    table.add_row(vec![row.line.to_string(), row.reason.clone()]);
                }
                println!("{}", table);
            }
            return Err(Error::MalformedRow(rows).into());
        }
        Err(e) => return Err(e.into()),
    };

    if json {
        println!(
            "{}",
            serde_json::json!({
                "imported": entries.len(),
                "first_date": entries.first().map(|e| e.date),
                "last_date": entries.last().map(|e| e.date),
            })
        );
        return Ok(());
    }

    match (entries.first(), entries.last()) {
        (Some(first), Some(last)) => println!(
            "{} Imported {} entries ({} to {})",
            "✓".green(),
            entries.len(),
            first.date,
            last.date
        ),
        _ => println!("{}", "The file has no rows.".dimmed()),
    }

    Ok(())
}
