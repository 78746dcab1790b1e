use std::{fs, path::Path};

use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{fmt, layer::Layer as LayerTrait, registry::LookupSpan};

use crate::{
    error::LoggingError,
    logging::config::{FileSinkConfig, Rotation},
};

/// Handle для управления lifecycle логирования.
///
/// Держит `WorkerGuard` файлового sink-а: пока handle жив, фоновый поток
/// `tracing-appender` пишет записи в файл; при drop буфер сбрасывается.
#[derive(Debug)]
pub struct LoggingHandle {
    file_guard: Option<WorkerGuard>,
}

impl LoggingHandle {
    pub fn new(file_guard: Option<WorkerGuard>) -> Self {
        Self { file_guard }
    }

    pub fn has_file_sink(&self) -> bool {
        self.file_guard.is_some()
    }

    /// Сбрасывает файловый буфер и завершает фоновый поток записи.
    pub fn shutdown(mut self) {
        tracing::info!(file_sink = self.has_file_sink(), "Logging shutdown");
        drop(self.file_guard.take());
    }
}

/// Файловый layer без ANSI-последовательностей.
pub fn build_file_layer<S>(
    config: &FileSinkConfig
) -> Result<(Box<dyn LayerTrait<S> + Send + Sync>, WorkerGuard), LoggingError>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fs::create_dir_all(&config.dir)?;

    let dir: &Path = &config.dir;
    let appender = match config.rotation {
        Rotation::Never => rolling::never(dir, &config.prefix),
        Rotation::Hourly => rolling::hourly(dir, &config.prefix),
        Rotation::Daily => rolling::daily(dir, &config.prefix),
    };
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let layer = fmt::layer()
        .with_ansi(false)
        .with_thread_names(true)
        .with_writer(writer);

    Ok((Box::new(layer), guard))
}

#[cfg(test)]
mod tests {
    use tracing::info;
    use tracing_subscriber::{prelude::*, registry::Registry};

    use super::*;

    /// Тест проверяет, что записи доходят до файла после drop guard-а.
    #[test]
    fn test_file_layer_writes_records() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = FileSinkConfig {
            dir: dir.path().join("nested"),
            prefix: "test.log".into(),
            rotation: Rotation::Never,
        };

        let (layer, guard) = build_file_layer::<Registry>(&cfg).unwrap();
        let handle = LoggingHandle::new(Some(guard));
        assert!(handle.has_file_sink());

        let subscriber = Registry::default().with(layer);
        tracing::subscriber::with_default(subscriber, || {
            info!(dispatcher = "audit", "file sink record");
        });
        handle.shutdown();

        let contents = fs::read_to_string(cfg.dir.join("test.log")).unwrap();
        assert!(contents.contains("file sink record"));
        assert!(contents.contains("dispatcher=\"audit\""));
    }

    #[test]
    fn test_handle_without_file_sink() {
        let handle = LoggingHandle::new(None);
        assert!(!handle.has_file_sink());
        handle.shutdown();
    }
}
