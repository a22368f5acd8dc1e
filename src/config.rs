//! Configuration management for notifiable
//!
//! This module defines the main `Config` struct and its sub-structs,
//! responsible for holding all application settings. It uses the `figment`
//! crate to load configuration from a TOML file and merge it with
//! environment variables and command-line arguments.

use crate::cli::Cli;
use crate::error::ConfigError;
use crate::resolver::{AccessorTable, Descriptor, Descriptors};
use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The main configuration struct for the application.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    /// The logging level (or `EnvFilter` directive) for the application.
    pub log_level: String,
    /// The log output format.
    pub log_format: LogFormat,
    /// Configuration for the available couriers.
    pub couriers: CouriersConfig,
    /// Notifiable kind to the ordered names of the couriers that handle it.
    pub routes: BTreeMap<String, Vec<String>>,
    /// Descriptor overrides for the built-in activity notifiable.
    pub activity: ActivityConfig,
}

/// The log output format.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Configuration for the available couriers.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CouriersConfig {
    pub log: LogCourierConfig,
    /// Configuration for webhook push delivery. Disabled when absent.
    pub push: Option<PushConfig>,
}

/// Configuration for the log courier.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LogCourierConfig {
    pub enabled: bool,
}

/// Configuration for webhook push delivery.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PushConfig {
    /// The webhook URL notifications are POSTed to.
    pub webhook_url: String,
    /// Request timeout in milliseconds.
    #[serde(default = "default_push_timeout_ms")]
    pub timeout_ms: u64,
    /// The delivery channel name recorded on notifications.
    #[serde(default = "default_push_channel")]
    pub channel: String,
    /// Receiver kinds that get pushes. Empty means every receiver.
    #[serde(default)]
    pub receiver_kinds: Vec<String>,
}

fn default_push_timeout_ms() -> u64 {
    10_000
}

fn default_push_channel() -> String {
    "push".to_string()
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            webhook_url: String::new(),
            timeout_ms: default_push_timeout_ms(),
            channel: default_push_channel(),
            receiver_kinds: Vec::new(),
        }
    }
}

/// Accessor names for the activity notifiable's descriptors.
///
/// An unset role keeps the built-in descriptor. An empty name declares the
/// role absent.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct ActivityConfig {
    pub receiver: Option<String>,
    pub sender: Option<String>,
    pub target: Option<String>,
}

impl ActivityConfig {
    /// Applies the configured names over `defaults` and binds them against
    /// `table`.
    pub fn descriptors<T>(
        &self,
        defaults: Descriptors<T>,
        table: &AccessorTable<T>,
    ) -> Result<Descriptors<T>, ConfigError> {
        fn pick<T>(name: &Option<String>, default: Descriptor<T>) -> Descriptor<T> {
            match name.as_deref() {
                None => default,
                Some("") => Descriptor::Absent,
                Some(name) => Descriptor::named(name),
            }
        }

        Descriptors {
            receiver: pick(&self.receiver, defaults.receiver),
            sender: pick(&self.sender, defaults.sender),
            target: pick(&self.target, defaults.target),
        }
        .bind(table)
    }
}

impl Config {
    /// Loads the application configuration by layering sources: defaults,
    /// the TOML file named on the command line, environment variables, and
    /// command-line arguments.
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));
        if let Some(path) = &cli.config {
            figment = figment.merge(Toml::file(path));
        }
        let config: Config = figment
            // Allow overriding with environment variables, e.g., NOTIFIABLE_LOG_LEVEL=debug
            .merge(Env::prefixed("NOTIFIABLE_").split("__"))
            .merge(cli.clone())
            .extract()?;
        Ok(config)
    }
}

// Provide a default implementation for tests and easy setup.
impl Default for Config {
    fn default() -> Self {
        let mut routes = BTreeMap::new();
        routes.insert("activity".to_string(), vec!["log".to_string()]);

        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            couriers: CouriersConfig {
                log: LogCourierConfig { enabled: true },
                push: None,
            },
            routes,
            activity: ActivityConfig::default(),
        }
    }
}
