//! CLI command implementations

pub mod account;
pub mod delete;
pub mod estimate;
pub mod export;
pub mod import;
pub mod log;
pub mod login;
pub mod logs;
pub mod needs;
pub mod profile;
pub mod register;
pub mod status;
pub mod trends;
pub mod view;

use std::path::PathBuf;

use anyhow::{Context, Result};
use caltrack_core::{CaltrackContext, EntryPoint, Error, LogEvent, LoggingService, UserId};
use dialoguer::Password;

/// Get the logging service for CLI operations
///
/// Returns None if logging fails to initialize (shouldn't block operations)
pub fn get_logger() -> Option<LoggingService> {
    let data_dir = get_data_dir().ok()?;
    std::fs::create_dir_all(&data_dir).ok()?;
    LoggingService::new(&data_dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION")).ok()
}

/// Log an event, ignoring any errors (logging should never break the app)
pub fn log_event(logger: &Option<LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.log(event);
    }
}

/// Short, data-free description of a failure for the event log
///
/// Core error messages can carry usernames or CSV content, so only the
/// kind is recorded.
pub fn error_kind(err: &anyhow::Error) -> (&'static str, Option<String>) {
    match err.downcast_ref::<Error>() {
        Some(Error::DuplicateUser(_)) => ("duplicate_user", None),
        Some(Error::InvalidCredentials) => ("invalid_credentials", None),
        Some(Error::InvalidInput(_)) => ("invalid_input", None),
        Some(Error::NotFound(_)) => ("not_found", None),
        Some(Error::MalformedRow(rows)) => {
            ("malformed_row", Some(format!("{} row(s) rejected", rows.len())))
        }
        Some(Error::Database(_)) => ("database", None),
        Some(Error::Config(_)) => ("config", None),
        Some(Error::Io(e)) => ("io", Some(format!("{:?}", e.kind()))),
        Some(Error::Json(_)) => ("json", None),
        Some(Error::Csv(_)) => ("csv", None),
        None => ("other", None),
    }
}

/// Data directory from `CALTRACK_DIR`, or `~/.caltrack`
pub fn get_data_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("CALTRACK_DIR") {
        return Ok(PathBuf::from(dir));
    }
    let home = dirs::home_dir().context("Could not find home directory")?;
    Ok(home.join(".caltrack"))
}

/// Open the data directory, creating it on first use
pub fn get_context() -> Result<CaltrackContext> {
    let data_dir = get_data_dir()?;

    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory: {:?}", data_dir))?;

    CaltrackContext::new(&data_dir).context("Failed to open CalTrack data")
}

/// Password from `CALTRACK_PASSWORD`, else an interactive prompt
pub fn read_password(confirm: bool) -> Result<String> {
    if let Ok(password) = std::env::var("CALTRACK_PASSWORD") {
        return Ok(password);
    }

    let mut prompt = Password::new().with_prompt("Password");
    if confirm {
        prompt = prompt.with_confirmation("Repeat password", "Passwords do not match");
    }
    Ok(prompt.interact()?)
}

/// Username given with `--user` / `CALTRACK_USER`
pub fn require_user(user: Option<&str>) -> Result<&str> {
    user.context("No user given. Pass --user <name> or set CALTRACK_USER")
}

/// Authenticate the command's user and return the open context with their id
pub fn login(user: Option<&str>) -> Result<(CaltrackContext, UserId)> {
    let username = require_user(user)?;
    let ctx = get_context()?;
    let password = read_password(false)?;
    let id = ctx.credential_service.authenticate(username, &password)?;
    Ok((ctx, id))
}
