use crate::adapters::clock::{FixedClock, SystemClock};
use crate::core::dashboard::Tab;
use crate::core::deadline::parse_deadline;
use crate::domain::ports::Clock;
use crate::utils::error::{PortalError, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "tender-desk")]
#[command(about = "Track tenders, submitted bids and client requirement requests")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "tender-desk.toml")]
    pub config: String,

    /// Portal access PIN
    #[arg(long, env = "TENDER_DESK_PIN", hide_env_values = true)]
    pub pin: Option<String>,

    /// Evaluate countdowns at this instant instead of the system clock
    #[arg(long)]
    pub now: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check the access PIN and exit
    Login,
    /// Active tenders with countdowns and stats
    Tenders,
    /// Tenders already sent to clients
    Submitted,
    /// Incoming requirement submissions
    Requests,
    /// Details of one tender
    Show { id: i64 },
    /// Keep a tab on screen, refreshing its countdowns
    Watch {
        #[arg(long, default_value = "tenders")]
        tab: Tab,
    },
    /// Create a new tender
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        deadline: String,
        #[arg(long)]
        amount: String,
        #[arg(long)]
        description: String,
        #[arg(long, default_value = "")]
        requirements: String,
    },
    /// Upload our submission document and mark the tender as submitted
    Complete {
        id: i64,
        #[arg(long)]
        document: PathBuf,
    },
    /// Delete a tender
    Delete { id: i64 },
    /// Send tender requirements with supporting documents
    SubmitRequirements {
        #[arg(long)]
        name: String,
        #[arg(long)]
        deadline: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long = "file")]
        files: Vec<PathBuf>,
    },
    /// Send a message to the team
    Contact {
        #[arg(long)]
        subject: String,
        #[arg(long)]
        message: String,
    },
    /// Write the tender list to a CSV file
    Export {
        #[arg(short, long, default_value = "tenders.csv")]
        output: PathBuf,
    },
}

impl CliConfig {
    pub fn clock(&self) -> Result<Arc<dyn Clock>> {
        match &self.now {
            Some(instant) => {
                let fixed = parse_deadline(instant).map_err(|_| {
                    PortalError::validation("now", format!("'{}' is not a timestamp", instant))
                })?;
                tracing::info!("🕒 Using fixed clock at {}", fixed);
                Ok(Arc::new(FixedClock(fixed)))
            }
            None => Ok(Arc::new(SystemClock)),
        }
    }

    pub fn access_pin(&self) -> Result<&str> {
        self.pin
            .as_deref()
            .ok_or_else(|| PortalError::validation("pin", "Provide --pin or set TENDER_DESK_PIN"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_watch_with_tab() {
        let cli = CliConfig::try_parse_from([
            "tender-desk",
            "--pin",
            "1234",
            "watch",
            "--tab",
            "submitted",
        ])
        .unwrap();
        assert!(matches!(cli.command, Command::Watch { tab: Tab::Submitted }));
        assert_eq!(cli.access_pin().unwrap(), "1234");
    }

    #[test]
    fn fixed_clock_from_flag() {
        let cli = CliConfig::try_parse_from([
            "tender-desk",
            "--now",
            "2025-03-01T12:00:00Z",
            "tenders",
        ])
        .unwrap();
        assert_eq!(cli.clock().unwrap().now().to_rfc3339(), "2025-03-01T12:00:00+00:00");
    }

    #[test]
    fn collects_repeated_files() {
        let cli = CliConfig::try_parse_from([
            "tender-desk",
            "submit-requirements",
            "--name",
            "Canteen",
            "--deadline",
            "2025-04-01T10:00",
            "--file",
            "a.pdf",
            "--file",
            "b.xlsx",
        ])
        .unwrap();
        match cli.command {
            Command::SubmitRequirements { files, .. } => assert_eq!(files.len(), 2),
            other => panic!("unexpected command {:?}", other),
        }
    }
}
