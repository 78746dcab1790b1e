use thiserror::Error;

use super::{ConfigError, DispatchError, LoggingError, PublishError, SchemaError};

pub type EvtResult<T> = Result<T, EvtError>;

/// Общий тип ошибки крейта для вызывающего кода, которому не важен
/// конкретный источник.
#[derive(Debug, Error)]
pub enum EvtError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Publish(#[from] PublishError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Logging(#[from] LoggingError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn define_twice() -> EvtResult<()> {
        let res: Result<(), SchemaError> = Err(SchemaError::DuplicateDefinition("Tick".into()));
        res?;
        Ok(())
    }

    #[test]
    fn test_question_mark_converts_schema_error() {
        let err = define_twice().unwrap_err();
        assert!(matches!(
            err,
            EvtError::Schema(SchemaError::DuplicateDefinition(_))
        ));
        assert_eq!(err.to_string(), "event schema 'Tick' is already defined");
    }
}
