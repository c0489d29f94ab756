//! Login command - verify credentials

use anyhow::Result;
use colored::Colorize;

use super::{login, require_user};

pub fn run(user: Option<&str>) -> Result<()> {
    let username = require_user(user)?;
    let (ctx, id) = login(user)?;
    let account = ctx.credential_service.user(id)?;

    println!(
        "{} Logged in as '{}' (member since {})",
        "✓".green(),
        username.trim(),
        account.created_at.format("%Y-%m-%d")
    );
    println!(
        "{}",
        "Set CALTRACK_USER and CALTRACK_PASSWORD to skip prompts in scripts.".dimmed()
    );

    Ok(())
}
