use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use humantime::parse_duration;
use serde::Deserialize;
use tracing::{debug, info};

use crate::notify::{Notifier, Permission, TerminalBell};
use crate::reminder::{DEFAULT_LEAD, MAX_LEAD};

/// How desktop-style notifications behave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationMode {
    /// Permission requests are granted.
    Granted,
    /// Permission requests are refused, notifications are dropped.
    Denied,
    /// No notification support at all.
    Unavailable,
}

impl FromStr for NotificationMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "granted" => Ok(NotificationMode::Granted),
            "denied" => Ok(NotificationMode::Denied),
            "unavailable" => Ok(NotificationMode::Unavailable),
            other => Err(anyhow!(
                "Unknown notification mode '{}' (granted, denied, unavailable).",
                other
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawConfig {
    reminder_lead: String,
    notifications: NotificationMode,
    log: String,
}

impl Default for RawConfig {
    fn default() -> Self {
        RawConfig {
            reminder_lead: "2m".to_string(),
            notifications: NotificationMode::Granted,
            log: "warn".to_string(),
        }
    }
}

/// Settings read from the configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub reminder_lead: Duration,
    pub notifications: NotificationMode,
    pub log: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            reminder_lead: DEFAULT_LEAD,
            notifications: NotificationMode::Granted,
            log: "warn".to_string(),
        }
    }
}

impl Config {
    /// Load the configuration from `path`, or from the default location when
    /// no path is given. A missing default file means default settings; a
    /// missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Config> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match default_config_file() {
                Some(path) if path.exists() => path,
                _ => {
                    debug!("no configuration file, using defaults");
                    return Ok(Config::default());
                }
            },
        };

        info!(path = %path.display(), "loading configuration");
        let text = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read configuration file {}.", path.display()))?;
        Config::parse(&text)
            .with_context(|| format!("Failed to parse configuration file {}.", path.display()))
    }

    /// Parse the TOML text of a configuration file.
    pub fn parse(text: &str) -> Result<Config> {
        let raw: RawConfig = toml::from_str(text)?;
        let reminder_lead = parse_lead(&raw.reminder_lead)
            .with_context(|| format!("Invalid reminder_lead '{}'.", raw.reminder_lead))?;
        Ok(Config {
            reminder_lead,
            notifications: raw.notifications,
            log: raw.log,
        })
    }

    /// The notification capability matching the configured mode.
    pub fn notifier(&self) -> Notifier {
        match self.notifications {
            NotificationMode::Granted => {
                Notifier::Available(Arc::new(TerminalBell::new(Permission::Granted)))
            }
            NotificationMode::Denied => {
                Notifier::Available(Arc::new(TerminalBell::new(Permission::Denied)))
            }
            NotificationMode::Unavailable => Notifier::Unavailable,
        }
    }
}

/// Parse a reminder lead such as "2m" or "1h 30m". Leads longer than a day
/// are refused.
pub fn parse_lead(text: &str) -> Result<Duration> {
    let lead = parse_duration(text)?;
    if lead > MAX_LEAD {
        return Err(anyhow!(
            "Reminder lead '{}' is longer than {}.",
            text,
            humantime::format_duration(MAX_LEAD)
        ));
    }
    Ok(lead)
}

fn default_config_file() -> Option<PathBuf> {
    ProjectDirs::from("com", "gozque", "todoalarm").map(|dirs| {
        let mut path = PathBuf::from(dirs.config_dir());
        path.push("config.toml");
        path
    })
}
