//! CalTrack CLI - weight and calorie log in your terminal

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use caltrack_core::{ActivityLevel, LogEvent, LoggingService, Sex, TrendWindow, View};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{
    account, delete, estimate, export, import, log, login, logs, needs, profile, register, status,
    trends, view,
};

/// CalTrack - weight and calorie log in your terminal
#[derive(Parser)]
#[command(name = "ct", version, about, long_about = None)]
struct Cli {
    /// User to act as
    #[arg(long, short, global = true, env = "CALTRACK_USER")]
    user: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Biometric fields shared by `register` and `profile`
#[derive(clap::Args, Default)]
pub struct ProfileArgs {
    /// male or female
    #[arg(long)]
    pub sex: Option<Sex>,
    /// Age in years
    #[arg(long)]
    pub age: Option<u32>,
    /// Height in centimetres
    #[arg(long)]
    pub height: Option<f64>,
    /// sedentary, light, moderate, active or very_active
    #[arg(long)]
    pub activity: Option<ActivityLevel>,
}

impl ProfileArgs {
    pub fn is_empty(&self) -> bool {
        self.sex.is_none() && self.age.is_none() && self.height.is_none() && self.activity.is_none()
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new user
    Register {
        /// Username (defaults to --user)
        username: Option<String>,
        #[command(flatten)]
        profile: ProfileArgs,
    },

    /// Check a username and password
    Login,

    /// Show or update your biometric profile
    Profile {
        #[command(flatten)]
        profile: ProfileArgs,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Record weight and calories for a day
    Log {
        /// Body weight in the configured unit
        weight: f64,
        /// Calories eaten
        calories: i64,
        /// Day to record (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Overwrite an existing entry without asking
        #[arg(long, short)]
        force: bool,
    },

    /// Delete the entry for a day
    Delete {
        /// Day to delete (YYYY-MM-DD)
        date: NaiveDate,
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },

    /// List logged entries
    View {
        /// 1w, 1m, 3m, 6m, 1y or all
        #[arg(long, short, default_value = "all")]
        period: View,
        /// First day to include (YYYY-MM-DD); overrides --period
        #[arg(long, requires = "to")]
        from: Option<NaiveDate>,
        /// Last day to include (YYYY-MM-DD)
        #[arg(long, requires = "from")]
        to: Option<NaiveDate>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show moving averages of weight and calories
    Trends {
        /// 1w, 1m, 3m, 6m, 1y or all
        #[arg(long, short, default_value = "all")]
        period: View,
        /// Entry count or day/week/month (default from settings)
        #[arg(long, short)]
        window: Option<TrendWindow>,
        /// Leave averages empty until the window is full
        #[arg(long)]
        strict: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Estimate caloric needs from your log
    Needs {
        /// 1w, 1m, 3m, 6m, 1y or all
        #[arg(long, short, default_value = "all")]
        period: View,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Estimate daily caloric needs from biometrics alone
    Estimate {
        #[arg(long)]
        age: u32,
        #[arg(long)]
        sex: Sex,
        /// Height in centimetres
        #[arg(long)]
        height: f64,
        /// Weight in kilograms
        #[arg(long)]
        weight: f64,
        #[arg(long, default_value = "sedentary")]
        activity: ActivityLevel,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Import entries from CSV
    Import {
        /// Path to CSV file
        file: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export entries to CSV
    Export {
        /// Directory to write data_MMDDYY.csv into (default: current directory)
        #[arg(long)]
        dir: Option<PathBuf>,
        /// Print CSV to stdout instead of writing a file
        #[arg(long)]
        stdout: bool,
    },

    /// Show a summary of your stored data
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage your account
    Account {
        #[command(subcommand)]
        command: account::AccountCommands,
    },

    /// View and manage application logs
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },
}

impl Commands {
    /// Name recorded in the event log
    fn name(&self) -> &'static str {
        match self {
            Commands::Register { .. } => "register",
            Commands::Login => "login",
            Commands::Profile { .. } => "profile",
            Commands::Log { .. } => "log",
            Commands::Delete { .. } => "delete",
            Commands::View { .. } => "view",
            Commands::Trends { .. } => "trends",
            Commands::Needs { .. } => "needs",
            Commands::Estimate { .. } => "estimate",
            Commands::Import { .. } => "import",
            Commands::Export { .. } => "export",
            Commands::Status { .. } => "status",
            Commands::Account { .. } => "account",
            Commands::Logs { .. } => "logs",
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let logger = commands::get_logger();
    let name = cli.command.name();
    commands::log_event(&logger, LogEvent::new("command_executed").with_command(name));

    match run(cli, logger.as_ref()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let (kind, details) = commands::error_kind(&e);
            let mut event = LogEvent::new(format!("{}_failed", name))
                .with_command(name)
                .with_error(kind);
            if let Some(details) = details {
                event = event.with_error_details(details);
            }
            commands::log_event(&logger, event);

            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, logger: Option<&LoggingService>) -> Result<()> {
    let user = cli.user.as_deref();
    match cli.command {
        Commands::Register { username, profile } => {
            register::run(username.as_deref().or(user), profile)
        }
        Commands::Login => login::run(user),
        Commands::Profile { profile, json } => profile::run(user, profile, json),
        Commands::Log { weight, calories, date, force } => {
            log::run(user, weight, calories, date, force)
        }
        Commands::Delete { date, force } => delete::run(user, date, force),
        Commands::View { period, from, to, json } => {
            let range = from.zip(to);
            view::run(user, period, range, json)
        }
        Commands::Trends { period, window, strict, json } => {
            trends::run(user, period, window, strict, json)
        }
        Commands::Needs { period, json } => needs::run(user, period, json),
        Commands::Estimate { age, sex, height, weight, activity, json } => {
            estimate::run(age, sex, height, weight, activity, json)
        }
        Commands::Import { file, json } => import::run(user, &file, json),
        Commands::Export { dir, stdout } => export::run(user, dir, stdout),
        Commands::Status { json } => status::run(user, json),
        Commands::Account { command } => account::run(user, command),
        Commands::Logs { command } => logs::run(command, logger),
    }
}
