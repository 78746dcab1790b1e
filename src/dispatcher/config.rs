use std::{fmt, sync::Arc, time::Duration};

use super::{log_handler_error, ErrorCallback, HandlerFailure, OverflowPolicy};
use crate::config::DispatcherSettings;

/// Параметры, с которыми создаётся диспетчер.
#[derive(Clone)]
pub struct DispatcherConfig {
    /// Ёмкость очереди; `None` означает неограниченную очередь
    pub queue_capacity: Option<usize>,
    /// Поведение публикации при заполненной очереди
    pub overflow: OverflowPolicy,
    /// Дообрабатывать накопленные события при `stop()`
    pub drain_on_stop: bool,
    /// Интервал простоя, после которого вызывается `EventHandler::on_idle`;
    /// `None` отключает хук
    pub idle_timeout: Option<Duration>,
    /// Вызывается в потоке диспетчера при каждой ошибке обработчика
    pub on_handler_error: ErrorCallback,
}

impl DispatcherConfig {
    /// Ограничивает очередь `capacity` событиями.
    pub fn with_capacity(
        mut self,
        capacity: usize,
    ) -> Self {
        self.queue_capacity = Some(capacity);
        self
    }

    pub fn unbounded(mut self) -> Self {
        self.queue_capacity = None;
        self
    }

    pub fn with_overflow(
        mut self,
        overflow: OverflowPolicy,
    ) -> Self {
        self.overflow = overflow;
        self
    }

    pub fn with_drain_on_stop(
        mut self,
        drain: bool,
    ) -> Self {
        self.drain_on_stop = drain;
        self
    }

    pub fn with_idle_timeout(
        mut self,
        timeout: Duration,
    ) -> Self {
        self.idle_timeout = Some(timeout);
        self
    }

    pub fn on_handler_error<F>(
        mut self,
        callback: F,
    ) -> Self
    where
        F: Fn(&HandlerFailure<'_>) + Send + Sync + 'static,
    {
        self.on_handler_error = Arc::new(callback);
        self
    }
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            queue_capacity: None,
            overflow: OverflowPolicy::Block,
            drain_on_stop: true,
            idle_timeout: None,
            on_handler_error: Arc::new(log_handler_error),
        }
    }
}

impl From<&DispatcherSettings> for DispatcherConfig {
    fn from(settings: &DispatcherSettings) -> Self {
        Self {
            queue_capacity: settings.queue_capacity,
            overflow: settings.overflow,
            drain_on_stop: settings.drain_on_stop,
            idle_timeout: settings.idle_timeout_ms.map(Duration::from_millis),
            ..Default::default()
        }
    }
}

impl fmt::Debug for DispatcherConfig {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("DispatcherConfig")
            .field("queue_capacity", &self.queue_capacity)
            .field("overflow", &self.overflow)
            .field("drain_on_stop", &self.drain_on_stop)
            .field("idle_timeout", &self.idle_timeout)
            .finish_non_exhaustive()
    }
}
