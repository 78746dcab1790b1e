//! Диспетчеры событий.
//!
//! Каждый диспетчер владеет ровно одним фоновым потоком и одной
//! потокобезопасной FIFO-очередью:
//!
//! - `dispatcher_base`: жизненный цикл и цикл потребления.
//! - `queue` (приватный): очередь с `Condvar` и политикой переполнения.
//! - `handler`: трейт обработчика и callback ошибок.
//! - `config`: параметры создания диспетчера.
//! - `metrics`: счётчики событий.
//! - `state`: машина состояний.

pub mod config;
pub mod dispatcher_base;
pub mod handler;
pub mod metrics;
mod queue;
pub mod state;

pub use self::config::DispatcherConfig;
pub use dispatcher_base::{Dispatcher, DispatcherHandle, DispatcherId};
pub use handler::{log_handler_error, ErrorCallback, EventHandler, HandlerFailure};
pub use metrics::{DispatcherMetrics, DispatcherStats};
pub(crate) use queue::EventQueue;
pub use queue::OverflowPolicy;
pub use state::DispatcherState;
