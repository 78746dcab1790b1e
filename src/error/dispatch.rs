use std::io;

use thiserror::Error;

use crate::dispatcher::DispatcherState;

pub type DispatchResult<T> = Result<T, DispatchError>;

/// Ошибки жизненного цикла диспетчера и его очереди.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("dispatcher '{name}' is {actual}, expected {expected}")]
    InvalidState {
        name: String,
        expected: DispatcherState,
        actual: DispatcherState,
    },

    #[error("queue of dispatcher '{name}' is full (capacity {capacity})")]
    QueueFull { name: String, capacity: usize },

    #[error("dispatcher '{0}' no longer accepts events")]
    Closed(String),

    #[error("failed to spawn worker thread for dispatcher '{name}': {source}")]
    Spawn {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("worker thread of dispatcher '{name}' panicked: {message}")]
    WorkerPanicked { name: String, message: String },
}

/// Ошибка публикации события.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PublishError {
    #[error("event '{event}' rejected: queue of dispatcher '{dispatcher}' is full (capacity {capacity})")]
    QueueFull {
        event: String,
        dispatcher: String,
        capacity: usize,
    },

    #[error("event '{0}' is already registered")]
    AlreadyRegistered(String),

    #[error("event '{0}' is not registered")]
    NotRegistered(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_state_display() {
        let err = DispatchError::InvalidState {
            name: "audit".into(),
            expected: DispatcherState::Idle,
            actual: DispatcherState::Running,
        };
        assert_eq!(err.to_string(), "dispatcher 'audit' is running, expected idle");
    }

    #[test]
    fn test_publish_queue_full_display() {
        let err = PublishError::QueueFull {
            event: "Tick".into(),
            dispatcher: "slow".into(),
            capacity: 4,
        };
        assert_eq!(
            err.to_string(),
            "event 'Tick' rejected: queue of dispatcher 'slow' is full (capacity 4)"
        );
    }

    #[test]
    fn test_publish_registration_display() {
        assert_eq!(
            PublishError::AlreadyRegistered("Tick".into()).to_string(),
            "event 'Tick' is already registered"
        );
        assert_eq!(
            PublishError::NotRegistered("Tick".into()).to_string(),
            "event 'Tick' is not registered"
        );
    }
}
