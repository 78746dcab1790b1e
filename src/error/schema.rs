use thiserror::Error;

use crate::event::FieldType;

/// Причина, по которой значения не соответствуют схеме события.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MismatchKind {
    #[error("missing value for field '{0}'")]
    MissingField(String),

    #[error("field '{field}' expects {expected}, got {found}")]
    WrongType {
        field: String,
        expected: FieldType,
        found: FieldType,
    },

    #[error("unknown field '{0}'")]
    UnknownField(String),

    #[error("value for field '{0}' is supplied more than once")]
    DuplicateValue(String),
}

/// Ошибки определения схем и построения событий.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("event schema '{0}' is already defined")]
    DuplicateDefinition(String),

    #[error("event schema '{0}' is not defined")]
    UnknownSchema(String),

    #[error("event '{schema}' does not match its schema: {kind}")]
    SchemaMismatch { schema: String, kind: MismatchKind },

    #[error("field '{field}' is declared twice in schema '{schema}'")]
    DuplicateField { schema: String, field: String },

    #[error("default for field '{field}' in schema '{schema}' must be {expected}, got {found}")]
    InvalidDefault {
        schema: String,
        field: String,
        expected: FieldType,
        found: FieldType,
    },
}

impl SchemaError {
    pub(crate) fn mismatch(
        schema: &str,
        kind: MismatchKind,
    ) -> Self {
        SchemaError::SchemaMismatch {
            schema: schema.to_string(),
            kind,
        }
    }

    /// Возвращает `true`, если ошибка относится к несоответствию схеме.
    pub fn is_mismatch(&self) -> bool {
        matches!(self, SchemaError::SchemaMismatch { .. })
    }
}
