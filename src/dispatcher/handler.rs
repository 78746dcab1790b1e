use std::{any::Any, sync::Arc};

use tracing::error;

use crate::{error::HandlerError, event::Event};

/// Обработчик событий, исполняемый в потоке диспетчера.
///
/// Реализуется конкретным потребителем. Для замыканий вида
/// `FnMut(&Event) -> Result<(), HandlerError>` есть готовая реализация.
///
/// Хуки жизненного цикла вызываются в том же потоке, что и `handle`:
/// `on_start` до первого события, `on_stop` после последнего. Паника в
/// хуке пишется в лог и не останавливает диспетчер.
pub trait EventHandler: Send + 'static {
    fn handle(
        &mut self,
        event: &Event,
    ) -> Result<(), HandlerError>;

    /// Рабочий поток запущен.
    fn on_start(&mut self) {}

    /// Очередь пуста дольше `idle_timeout` из [`DispatcherConfig`].
    /// Повторяется каждый интервал, пока событий нет.
    ///
    /// [`DispatcherConfig`]: super::DispatcherConfig
    fn on_idle(&mut self) {}

    /// Рабочий поток завершается: очередь закрыта и пуста.
    fn on_stop(&mut self) {}
}

impl<F> EventHandler for F
where
    F: FnMut(&Event) -> Result<(), HandlerError> + Send + 'static,
{
    fn handle(
        &mut self,
        event: &Event,
    ) -> Result<(), HandlerError> {
        self(event)
    }
}

/// Сведения о сбое обработчика, передаваемые в callback ошибок.
#[derive(Debug)]
pub struct HandlerFailure<'a> {
    pub dispatcher: &'a str,
    pub event: &'a Event,
    pub error: &'a HandlerError,
}

/// Callback, вызываемый в потоке диспетчера при каждой ошибке обработчика.
pub type ErrorCallback = Arc<dyn Fn(&HandlerFailure<'_>) + Send + Sync>;

/// Callback по умолчанию: пишет ошибку в лог.
pub fn log_handler_error(failure: &HandlerFailure<'_>) {
    error!(
        dispatcher = failure.dispatcher,
        event = failure.event.name(),
        error = %failure.error,
        "Event handler failed"
    );
}

/// Достаёт текст из полезной нагрузки паники.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
