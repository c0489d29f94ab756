//! Export command - write entries to CSV

use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::Colorize;

use super::login;

pub fn run(user: Option<&str>, dir: Option<PathBuf>, stdout: bool) -> Result<()> {
    let (ctx, id) = login(user)?;

    if stdout {
        print!("{}", ctx.transfer_service.export(id)?);
        return Ok(());
    }

    let dir = match dir {
        Some(dir) => dir,
        None => std::env::current_dir().context("Could not read the current directory")?,
    };
    let path = ctx.transfer_service.export_file(id, &dir)?;
    println!("{} Exported to {}", "✓".green(), path.display());

    Ok(())
}
