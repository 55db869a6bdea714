use crate::sla::{CalendarError, InvalidSlaHours, SlaEngine, SlaPolicy, WorkingCalendar};
use anyhow::{Context, Result};
use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid time '{value}' for calendar.{field}, expected HH:MM")]
    InvalidTime { field: &'static str, value: String },
    #[error("Unknown weekday '{0}' in calendar.working_days")]
    UnknownWeekday(String),
    #[error(transparent)]
    Calendar(#[from] CalendarError),
    #[error(transparent)]
    Sla(#[from] InvalidSlaHours),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub calendar: CalendarConfig,
    #[serde(default)]
    pub sla: SlaConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub watch: WatchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarConfig {
    #[serde(default = "default_window_start")]
    pub start: String,
    #[serde(default = "default_window_end")]
    pub end: String,
    #[serde(default = "default_working_days")]
    pub working_days: Vec<String>,
}

fn default_window_start() -> String {
    "11:30".to_string()
}

fn default_window_end() -> String {
    "21:30".to_string()
}

fn default_working_days() -> Vec<String> {
    ["Mon", "Tue", "Wed", "Thu", "Fri"]
        .iter()
        .map(|d| d.to_string())
        .collect()
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            start: default_window_start(),
            end: default_window_end(),
            working_days: default_working_days(),
        }
    }
}

impl CalendarConfig {
    pub fn to_calendar(&self) -> Result<WorkingCalendar, ConfigError> {
        let start = parse_time("start", &self.start)?;
        let end = parse_time("end", &self.end)?;
        let days = self
            .working_days
            .iter()
            .map(|d| {
                d.trim()
                    .parse::<Weekday>()
                    .map_err(|_| ConfigError::UnknownWeekday(d.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(WorkingCalendar::new(&days, start, end)?)
    }
}

fn parse_time(field: &'static str, value: &str) -> Result<NaiveTime, ConfigError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").map_err(|_| ConfigError::InvalidTime {
        field,
        value: value.to_string(),
    })
}

/// Required working hours per priority
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlaConfig {
    #[serde(default = "default_p1")]
    pub p1: f64,
    #[serde(default = "default_p2")]
    pub p2: f64,
    #[serde(default = "default_p3")]
    pub p3: f64,
    #[serde(default = "default_p4")]
    pub p4: f64,
}

fn default_p1() -> f64 {
    8.0
}

fn default_p2() -> f64 {
    12.0
}

fn default_p3() -> f64 {
    24.0
}

fn default_p4() -> f64 {
    36.0
}

impl Default for SlaConfig {
    fn default() -> Self {
        Self {
            p1: default_p1(),
            p2: default_p2(),
            p3: default_p3(),
            p4: default_p4(),
        }
    }
}

impl SlaConfig {
    pub fn to_policy(&self) -> Result<SlaPolicy, ConfigError> {
        Ok(SlaPolicy::new(self.p1, self.p2, self.p3, self.p4)?)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StoreConfig {
    /// Ticket document path (defaults to tickets.json in the data directory)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    #[serde(default = "default_tick_millis")]
    pub tick_millis: u64,
}

fn default_tick_millis() -> u64 {
    1000
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            tick_millis: default_tick_millis(),
        }
    }
}

impl Config {
    /// Validated calendar and SLA budgets
    pub fn engine(&self) -> Result<SlaEngine, ConfigError> {
        Ok(SlaEngine::new(
            self.calendar.to_calendar()?,
            self.sla.to_policy()?,
        ))
    }

    /// Where the ticket document lives
    pub fn store_path(&self) -> Result<PathBuf> {
        match &self.store.path {
            Some(path) => Ok(path.clone()),
            None => Ok(data_dir()?.join("tickets.json")),
        }
    }
}

fn project_dirs() -> Result<directories::ProjectDirs> {
    directories::ProjectDirs::from("", "", "slawatch").context("Could not determine home directory")
}

pub fn config_dir() -> Result<PathBuf> {
    Ok(project_dirs()?.config_dir().to_path_buf())
}

pub fn data_dir() -> Result<PathBuf> {
    Ok(project_dirs()?.data_dir().to_path_buf())
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

pub fn load(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };

    if !path.exists() {
        anyhow::bail!(
            "Config file not found at {}. Run `slawatch --init` to create one.",
            path.display()
        );
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;

    let config = parse(&content)
        .with_context(|| format!("Failed to parse config from {}", path.display()))?;

    Ok(config)
}

/// Parse and validate config text
pub fn parse(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content)?;
    config.engine()?;
    Ok(config)
}

/// Write the default config. Returns the path written, or `None` if a config
/// already exists and `overwrite` is false.
pub fn init(path: Option<&Path>, overwrite: bool) -> Result<Option<PathBuf>> {
    let config_path = match path {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };

    if config_path.exists() && !overwrite {
        return Ok(None);
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let content = toml::to_string_pretty(&Config::default())?;
    std::fs::write(&config_path, content)
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

    tracing::info!("Wrote default config to {}", config_path.display());
    Ok(Some(config_path))
}
