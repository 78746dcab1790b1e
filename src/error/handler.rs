use thiserror::Error;

/// Ошибка, возникшая внутри обработчика событий диспетчера.
///
/// Никогда не передаётся издателю: поток диспетчера перехватывает её,
/// сообщает через callback и продолжает работу.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("handler failed: {0}")]
    Failed(String),

    #[error("handler panicked: {0}")]
    Panicked(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl HandlerError {
    pub fn failed(msg: impl Into<String>) -> Self {
        HandlerError::Failed(msg.into())
    }
}
