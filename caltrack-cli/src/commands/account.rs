//! Account command - delete your account

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use dialoguer::Confirm;

use super::login;

#[derive(Subcommand)]
pub enum AccountCommands {
    /// Delete your account and every entry in it
    Delete {
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },
}

pub fn run(user: Option<&str>, command: AccountCommands) -> Result<()> {
    match command {
        AccountCommands::Delete { force } => {
            let (ctx, id) = login(user)?;
            let status = ctx.status_service.summary(id)?;

            if !force {
                println!(
                    "\n{}",
                    format!(
                        "This will permanently delete '{}' and {} entries.",
                        status.username, status.entry_count
                    )
                    .yellow()
                );
                println!("{}\n", "Export first with `ct export` if you want a copy.".dimmed());

                if !Confirm::new()
                    .with_prompt("Are you sure?")
                    .default(false)
                    .interact()?
                {
                    println!("{}\n", "Cancelled".dimmed());
                    return Ok(());
                }
            }

            ctx.credential_service.delete_account(id)?;
            println!("\n{} Account '{}' deleted\n", "✓".green(), status.username);
        }
    }

    Ok(())
}
