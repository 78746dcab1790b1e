pub mod config;
mod filters;
mod formatter;
pub mod handle;

pub use self::config::{FileSinkConfig, LogFormat, LoggingConfig, Rotation};
pub use filters::build_filter_from_config;
pub use handle::LoggingHandle;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::LoggingError;

/// Инициализация логирования с конфигурацией.
///
/// Устанавливает глобальный subscriber: `EnvFilter`, консольный layer и,
/// если задан, файловый sink. Возвращённый handle нужно держать до конца
/// работы программы, иначе файловый буфер будет сброшен раньше времени.
pub fn init_logging(config: LoggingConfig) -> Result<LoggingHandle, LoggingError> {
    let env_filter = filters::build_filter_from_config(&config)?;
    let mut layers = Vec::new();

    // Console layer
    layers.push(formatter::build_console_layer(&config));

    // File layer
    let file_guard = match &config.file {
        Some(file) => {
            let (file_layer, guard) = handle::build_file_layer(file)?;
            layers.push(file_layer);
            Some(guard)
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layers)
        .try_init()
        .map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        log_level = %config.level,
        format = ?config.format,
        file_enabled = file_guard.is_some(),
        "Logging system initialized"
    );

    Ok(LoggingHandle::new(file_guard))
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    /// Тест проверяет, что повторная инициализация возвращает ошибку, а не
    /// панику. Глобальный subscriber устанавливается один раз на процесс.
    #[test]
    #[serial]
    fn test_second_init_fails() {
        std::env::remove_var("RUST_LOG");
        let first = init_logging(LoggingConfig {
            level: "warn".into(),
            with_ansi: false,
            ..Default::default()
        });
        let second = init_logging(LoggingConfig::default());

        // Другой тест мог установить subscriber раньше; тогда ошибка уже на
        // первом вызове.
        if let Ok(handle) = first {
            handle.shutdown();
        }
        assert!(matches!(second, Err(LoggingError::AlreadyInitialized(_))));
    }
}
