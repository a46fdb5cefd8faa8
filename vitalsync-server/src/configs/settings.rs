use std::env;
use std::path::Path;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::configs::normalize_path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logger {
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Database {
    pub migration_path: Option<String>,
    pub clean_start: bool,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Simulation {
    /// Period of the simulation tick
    pub tick_interval_ms: u64,
    /// Wall clock window in which a device loses at most one battery percent
    pub battery_interval_secs: u64,
    /// Trailing readings per device included in a snapshot
    pub reading_window: u32,
    /// Readings kept per device in storage, 0 keeps everything
    pub max_stored_readings: u32,
    /// Period of the rule summary job
    pub summary_interval_secs: u64,
    /// Load the demo patients when the database is empty
    pub seed: bool,
}

impl Simulation {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    pub fn battery_interval(&self) -> Duration {
        Duration::from_secs(self.battery_interval_secs)
    }

    pub fn summary_interval(&self) -> Duration {
        Duration::from_secs(self.summary_interval_secs.max(1))
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            battery_interval_secs: 60,
            reading_window: 30,
            max_stored_readings: 0,
            summary_interval_secs: 30,
            seed: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Cors {
    pub allowed_origins: Vec<String>,
}

impl Cors {
    pub fn is_permissive(&self) -> bool {
        self.allowed_origins.is_empty() || self.allowed_origins.iter().any(|origin| origin == "*")
    }
}

impl Default for Cors {
    fn default() -> Self {
        Self {
            allowed_origins: vec![String::from("*")],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub server: Server,
    pub logger: Logger,
    pub database: Database,
    #[serde(default)]
    pub simulation: Simulation,
    #[serde(default)]
    pub cors: Cors,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or("development".into());

        let mut settings: Settings = Config::builder()
            .add_source(File::with_name("configs/default"))
            .add_source(File::with_name(&format!("configs/{run_mode}")).required(false))
            .add_source(
                Environment::with_prefix("VITALSYNC")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cors.allowed_origins")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        if let Some(migrate) = &settings.database.migration_path {
            if Path::new(migrate).is_dir() {
                let migrate_path = normalize_path(migrate)
                    .map_err(|e| ConfigError::Message(e.to_string()))?
                    .to_string_lossy()
                    .to_string();

                settings.database.migration_path = Some(migrate_path);
            } else {
                tracing::warn!("migration path {} is not a directory, skipping migrations", migrate);
                settings.database.migration_path = None;
            }
        }

        Ok(settings)
    }
}
