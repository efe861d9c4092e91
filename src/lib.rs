pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::{CliConfig, Command};
pub use crate::config::PortalConfig;

pub use crate::adapters::{FixedClock, HttpNotifier, RestStore, SystemClock};
pub use crate::core::deadline::{evaluate, Countdown, Tier};
pub use crate::utils::error::{DeadlineError, PortalError, Result};
