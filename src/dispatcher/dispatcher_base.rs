use std::{
    fmt,
    panic::{self, AssertUnwindSafe},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use super::{
    handler::panic_message,
    metrics::DispatcherMetrics,
    queue::{Popped, PushError},
    state::AtomicState,
    DispatcherConfig, DispatcherState, DispatcherStats, ErrorCallback, EventHandler, EventQueue,
    HandlerFailure,
};
use crate::{
    error::{DispatchError, DispatchResult, HandlerError},
    event::Event,
};

static NEXT_DISPATCHER_ID: AtomicU64 = AtomicU64::new(1);

/// Уникальный в пределах процесса идентификатор диспетчера.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DispatcherId(u64);

/// Состояние, разделяемое между владельцем диспетчера, его рабочим
/// потоком и издателями, хранящими [`DispatcherHandle`].
struct Shared {
    id: DispatcherId,
    name: Arc<str>,
    queue: EventQueue,
    state: AtomicState,
    metrics: DispatcherMetrics,
}

/// Ссылка на очередь диспетчера, через которую издатель доставляет
/// события. Умеет только ставить события в очередь.
#[derive(Clone)]
pub struct DispatcherHandle {
    shared: Arc<Shared>,
}

/// Диспетчер: собственный фоновый поток, FIFO-очередь и обработчик.
///
/// Жизненный цикл `Idle → Running → Stopping → Stopped`. События,
/// доставленные до `start()`, копятся в очереди и обрабатываются после
/// запуска. `stop()` по умолчанию дообрабатывает очередь, `force_stop()`
/// отбрасывает всё, что ещё не взято в обработку. Выполняющийся вызов
/// обработчика не прерывается.
pub struct Dispatcher {
    shared: Arc<Shared>,
    handler: Mutex<Option<Box<dyn EventHandler>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    drain_on_stop: bool,
    idle_timeout: Option<Duration>,
    on_handler_error: ErrorCallback,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl DispatcherId {
    fn next() -> Self {
        DispatcherId(NEXT_DISPATCHER_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl DispatcherHandle {
    pub fn id(&self) -> DispatcherId {
        self.shared.id
    }

    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// Принимает ли диспетчер ещё события.
    pub fn is_accepting(&self) -> bool {
        !self.shared.queue.is_closed()
    }

    pub fn capacity(&self) -> Option<usize> {
        self.shared.queue.capacity()
    }

    /// Ставит событие в очередь диспетчера. Обработку не ждёт.
    pub(crate) fn deliver(
        &self,
        event: Event,
    ) -> DispatchResult<()> {
        match self.shared.queue.push(event) {
            Ok(()) => {
                self.shared.metrics.inc_enqueued();
                Ok(())
            }
            Err(PushError::Full { capacity }) => {
                self.shared.metrics.inc_rejected();
                Err(DispatchError::QueueFull {
                    name: self.shared.name.to_string(),
                    capacity,
                })
            }
            Err(PushError::Closed) => {
                self.shared.metrics.inc_rejected();
                Err(DispatchError::Closed(self.shared.name.to_string()))
            }
        }
    }
}

impl Dispatcher {
    /// Создаёт диспетчер с конфигурацией по умолчанию: неограниченная
    /// очередь, дообработка при остановке, ошибки обработчика в лог.
    pub fn new<H: EventHandler>(
        name: &str,
        handler: H,
    ) -> Self {
        Self::with_config(name, handler, DispatcherConfig::default())
    }

    pub fn with_config<H: EventHandler>(
        name: &str,
        handler: H,
        config: DispatcherConfig,
    ) -> Self {
        let capacity = match config.queue_capacity {
            Some(0) => {
                warn!(dispatcher = name, "Queue capacity 0 is not usable, using 1");
                Some(1)
            }
            other => other,
        };
        let idle_timeout = match config.idle_timeout {
            Some(timeout) if timeout.is_zero() => {
                warn!(dispatcher = name, "Idle timeout 0 is not usable, using 1ms");
                Some(Duration::from_millis(1))
            }
            other => other,
        };

        let shared = Arc::new(Shared {
            id: DispatcherId::next(),
            name: Arc::from(name),
            queue: EventQueue::new(capacity, config.overflow),
            state: AtomicState::new(DispatcherState::Idle),
            metrics: DispatcherMetrics::new(),
        });

        debug!(
            dispatcher = name,
            id = shared.id.0,
            capacity = ?capacity,
            overflow = ?config.overflow,
            drain_on_stop = config.drain_on_stop,
            idle_timeout = ?idle_timeout,
            "Dispatcher created"
        );

        Self {
            shared,
            handler: Mutex::new(Some(Box::new(handler))),
            worker: Mutex::new(None),
            drain_on_stop: config.drain_on_stop,
            idle_timeout,
            on_handler_error: config.on_handler_error,
        }
    }

    pub fn id(&self) -> DispatcherId {
        self.shared.id
    }

    pub fn name(&self) -> &str {
        &self.shared.name
    }

    pub fn state(&self) -> DispatcherState {
        self.shared.state.load()
    }

    pub fn is_running(&self) -> bool {
        self.state() == DispatcherState::Running
    }

    /// Количество событий, ожидающих обработки.
    pub fn queue_len(&self) -> usize {
        self.shared.queue.len()
    }

    pub fn stats(&self) -> DispatcherStats {
        self.shared.metrics.snapshot()
    }

    /// Возвращает handle для подписки у издателя.
    pub fn handle(&self) -> DispatcherHandle {
        DispatcherHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Запускает рабочий поток. Допустимо только из `Idle`.
    pub fn start(&self) -> DispatchResult<()> {
        // Держим слот потока до сохранения JoinHandle, чтобы
        // параллельный stop() не пропустил join.
        let mut worker = self.worker.lock();

        self.shared
            .state
            .transition(DispatcherState::Idle, DispatcherState::Running)
            .map_err(|actual| self.invalid_state(DispatcherState::Idle, actual))?;

        let Some(handler) = self.handler.lock().take() else {
            self.shared.state.store(DispatcherState::Stopped);
            return Err(self.invalid_state(DispatcherState::Idle, DispatcherState::Stopped));
        };

        let shared = Arc::clone(&self.shared);
        let on_error = Arc::clone(&self.on_handler_error);
        let idle_timeout = self.idle_timeout;
        let spawned = thread::Builder::new()
            .name(format!("evtdis-{}", self.shared.name))
            .spawn(move || run_worker(shared, handler, on_error, idle_timeout));

        match spawned {
            Ok(join) => {
                *worker = Some(join);
                info!(
                    dispatcher = %self.shared.name,
                    id = self.shared.id.0,
                    backlog = self.shared.queue.len(),
                    "Dispatcher started"
                );
                Ok(())
            }
            Err(source) => {
                let abandoned = self.shared.queue.close(false);
                self.shared.metrics.add_abandoned(abandoned as u64);
                self.shared.state.store(DispatcherState::Stopped);
                Err(DispatchError::Spawn {
                    name: self.shared.name.to_string(),
                    source,
                })
            }
        }
    }

    /// Останавливает диспетчер и ждёт завершения рабочего потока.
    ///
    /// Накопленные события дообрабатываются, если `drain_on_stop`
    /// включён в конфигурации, иначе отбрасываются.
    pub fn stop(&self) -> DispatchResult<()> {
        self.shutdown(!self.drain_on_stop)
    }

    /// Останавливает диспетчер, отбрасывая события, которые ещё не
    /// переданы обработчику.
    pub fn force_stop(&self) -> DispatchResult<()> {
        self.shutdown(true)
    }

    fn shutdown(
        &self,
        force: bool,
    ) -> DispatchResult<()> {
        if let Err(actual) = self
            .shared
            .state
            .transition(DispatcherState::Running, DispatcherState::Stopping)
        {
            // Рабочий поток упал сам: сообщаем причину один раз.
            if actual == DispatcherState::Stopped {
                if let Some(join) = self.worker.lock().take() {
                    if let Err(payload) = join.join() {
                        return Err(DispatchError::WorkerPanicked {
                            name: self.shared.name.to_string(),
                            message: panic_message(&*payload),
                        });
                    }
                }
            }
            return Err(self.invalid_state(DispatcherState::Running, actual));
        }

        let abandoned = self.shared.queue.close(!force);
        self.shared.metrics.add_abandoned(abandoned as u64);
        info!(
            dispatcher = %self.shared.name,
            force,
            abandoned,
            "Stopping dispatcher"
        );

        let Some(join) = self.worker.lock().take() else {
            return Ok(());
        };

        if join.thread().id() == thread::current().id() {
            // Вызов из собственного обработчика: поток завершится сам
            // после возврата из handle().
            debug!(dispatcher = %self.shared.name, "Stop requested from worker thread");
            return Ok(());
        }

        match join.join() {
            Ok(()) => {
                info!(dispatcher = %self.shared.name, "Dispatcher stopped");
                Ok(())
            }
            Err(payload) => {
                self.shared.state.store(DispatcherState::Stopped);
                Err(DispatchError::WorkerPanicked {
                    name: self.shared.name.to_string(),
                    message: panic_message(&*payload),
                })
            }
        }
    }

    fn invalid_state(
        &self,
        expected: DispatcherState,
        actual: DispatcherState,
    ) -> DispatchError {
        DispatchError::InvalidState {
            name: self.shared.name.to_string(),
            expected,
            actual,
        }
    }
}

/// Цикл рабочего потока: берёт события по одному и передаёт обработчику.
///
/// Ошибка или паника обработчика учитывается, передаётся в callback и
/// не прерывает цикл. Паника в хуках или в самом callback-е только
/// пишется в лог. Выход, когда очередь закрыта и пуста.
fn run_worker(
    shared: Arc<Shared>,
    mut handler: Box<dyn EventHandler>,
    on_error: ErrorCallback,
    idle_timeout: Option<Duration>,
) {
    let _exit = WorkerExit(&shared);
    debug!(dispatcher = %shared.name, "Dispatcher worker running");
    guarded(&shared, "on_start", || handler.on_start());

    loop {
        let event = match shared.queue.pop_or_idle(idle_timeout) {
            Popped::Event(event) => event,
            Popped::Idle => {
                shared.metrics.inc_idle_ticks();
                guarded(&shared, "on_idle", || handler.on_idle());
                continue;
            }
            Popped::Closed => break,
        };

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| handler.handle(&event)));
        let error = match outcome {
            Ok(Ok(())) => {
                shared.metrics.inc_handled();
                continue;
            }
            Ok(Err(err)) => err,
            Err(payload) => HandlerError::Panicked(panic_message(&*payload)),
        };

        shared.metrics.inc_failed();
        let failure = HandlerFailure {
            dispatcher: &shared.name,
            event: &event,
            error: &error,
        };
        guarded(&shared, "on_handler_error", || on_error(&failure));
    }

    guarded(&shared, "on_stop", || handler.on_stop());
    shared.state.store(DispatcherState::Stopped);
    debug!(dispatcher = %shared.name, "Dispatcher worker exited");
}

/// Вызывает пользовательский код вне `handle`, перехватывая панику.
fn guarded(
    shared: &Shared,
    hook: &str,
    f: impl FnOnce(),
) {
    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(f)) {
        shared.metrics.inc_hook_panics();
        error!(
            dispatcher = %shared.name,
            hook,
            panic = %panic_message(&*payload),
            "Dispatcher hook panicked"
        );
    }
}

/// Если рабочий поток падает вне перехваченного кода, закрывает очередь,
/// чтобы производители не ждали места вечно, и помечает диспетчер
/// остановленным.
struct WorkerExit<'a>(&'a Shared);

impl Drop for WorkerExit<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            let abandoned = self.0.queue.close(false);
            self.0.metrics.add_abandoned(abandoned as u64);
            self.0.state.store(DispatcherState::Stopped);
            error!(dispatcher = %self.0.name, abandoned, "Dispatcher worker died");
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов
////////////////////////////////////////////////////////////////////////////////

impl Drop for Dispatcher {
    fn drop(&mut self) {
        match self.state() {
            DispatcherState::Running => {
                let _ = self.stop();
            }
            DispatcherState::Idle => {
                self.shared.queue.close(false);
                self.shared.state.store(DispatcherState::Stopped);
            }
            DispatcherState::Stopping | DispatcherState::Stopped => {}
        }
    }
}

impl fmt::Display for DispatcherId {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl PartialEq for DispatcherHandle {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.shared.id == other.shared.id
    }
}

impl Eq for DispatcherHandle {}

impl fmt::Debug for DispatcherHandle {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("DispatcherHandle")
            .field("id", &self.shared.id)
            .field("name", &self.shared.name)
            .finish()
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("id", &self.shared.id)
            .field("name", &self.shared.name)
            .field("state", &self.state())
            .field("queued", &self.queue_len())
            .finish()
    }
}
