use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Формат вывода событий в консоль.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    #[default]
    Compact,
    Json,
}

/// Периодичность ротации файла логов.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rotation {
    #[default]
    Never,
    Hourly,
    Daily,
}

/// Параметры файлового sink-а (через `tracing-appender`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSinkConfig {
    pub dir: PathBuf,
    pub prefix: String,
    pub rotation: Rotation,
}

/// Конфигурация логирования.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Уровень или директива `EnvFilter`, например `"info"` или
    /// `"evtdis=debug,warn"`. `RUST_LOG` имеет приоритет.
    pub level: String,
    pub format: LogFormat,
    pub with_ansi: bool,
    pub with_target: bool,
    /// Имена потоков полезны: у каждого диспетчера свой поток `evtdis-<name>`
    pub with_thread_names: bool,
    /// Файловый sink; `None` означает только консоль
    pub file: Option<FileSinkConfig>,
}

impl Default for FileSinkConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("logs"),
            prefix: "evtdis.log".to_string(),
            rotation: Rotation::Never,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
            with_ansi: true,
            with_target: true,
            with_thread_names: true,
            file: None,
        }
    }
}

impl LoggingConfig {
    /// Директива для `EnvFilter`, собранная из конфигурации.
    pub fn build_filter_directive(&self) -> String {
        self.level.trim().to_string()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let directive = self.build_filter_directive();
        if directive.is_empty() {
            return Err(ConfigError::Invalid {
                key: "logging.level".into(),
                reason: "must not be empty".into(),
            });
        }
        tracing_subscriber::EnvFilter::try_new(&directive).map_err(|e| ConfigError::Invalid {
            key: "logging.level".into(),
            reason: e.to_string(),
        })?;
        if let Some(file) = &self.file {
            if file.prefix.is_empty() {
                return Err(ConfigError::Invalid {
                    key: "logging.file.prefix".into(),
                    reason: "must not be empty".into(),
                });
            }
        }
        Ok(())
    }
}
