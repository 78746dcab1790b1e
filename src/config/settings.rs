use std::path::Path;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::{dispatcher::OverflowPolicy, error::ConfigError, logging::LoggingConfig};

/// Префикс переменных окружения: `EVTDIS_DISPATCHER__QUEUE_CAPACITY=64`.
pub const ENV_PREFIX: &str = "EVTDIS";

/// Настройки диспетчеров по умолчанию.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherSettings {
    /// Ёмкость очереди; отсутствие значения означает неограниченную очередь
    pub queue_capacity: Option<usize>,
    pub overflow: OverflowPolicy,
    pub drain_on_stop: bool,
    /// Интервал простоя в миллисекундах для `on_idle`
    pub idle_timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub dispatcher: DispatcherSettings,
    pub logging: LoggingConfig,
}

impl Default for DispatcherSettings {
    fn default() -> Self {
        Self {
            queue_capacity: None,
            overflow: OverflowPolicy::Block,
            drain_on_stop: true,
            idle_timeout_ms: None,
        }
    }
}

impl Settings {
    /// Загружает настройки из значений по умолчанию и переменных окружения.
    pub fn load() -> Result<Self, ConfigError> {
        Self::build(None)
    }

    /// Как [`Settings::load`], но сначала читает TOML-файл. Переменные
    /// окружения имеют приоритет над файлом.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        Self::build(Some(path))
    }

    fn build(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            // Значения по умолчанию
            .set_default("dispatcher.overflow", "block")?
            .set_default("dispatcher.drain_on_stop", true)?
            .set_default("logging.level", "info")?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }

        let cfg = builder
            // Переменные окружения с префиксом EVTDIS_
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = cfg.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dispatcher.idle_timeout_ms == Some(0) {
            return Err(ConfigError::Invalid {
                key: "dispatcher.idle_timeout_ms".into(),
                reason: "must be greater than zero".into(),
            });
        }
        if self.dispatcher.queue_capacity == Some(0) {
            return Err(ConfigError::Invalid {
                key: "dispatcher.queue_capacity".into(),
                reason: "must be greater than zero".into(),
            });
        }
        self.logging.validate()
    }
}
