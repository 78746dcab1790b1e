use std::{collections::HashMap, sync::Arc};

use parking_lot::RwLock;
use tracing::debug;

use super::{Event, FieldDef, FieldValue, Schema};
use crate::error::SchemaError;

/// Реестр схем событий.
///
/// Создаётся явно и передаётся производителям; глобального состояния нет.
/// Имя схемы регистрируется ровно один раз.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: RwLock<HashMap<Arc<str>, Arc<Schema>>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Регистрирует новую схему.
    ///
    /// Повторное определение существующего имени возвращает
    /// `DuplicateDefinition`, реестр при этом не меняется.
    pub fn define<F>(
        &self,
        name: &str,
        fields: impl IntoIterator<Item = F>,
    ) -> Result<Arc<Schema>, SchemaError>
    where
        F: Into<FieldDef>,
    {
        let schema = Arc::new(Schema::new(name, fields)?);

        let mut schemas = self.schemas.write();
        if schemas.contains_key(name) {
            return Err(SchemaError::DuplicateDefinition(name.to_string()));
        }
        schemas.insert(Arc::from(name), Arc::clone(&schema));
        drop(schemas);

        debug!(schema = name, fields = schema.fields().len(), "Event schema defined");
        Ok(schema)
    }

    /// Строит событие по зарегистрированной схеме.
    pub fn construct<K, I>(
        &self,
        name: &str,
        values: I,
    ) -> Result<Event, SchemaError>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, FieldValue)>,
    {
        let schema = self
            .get(name)
            .ok_or_else(|| SchemaError::UnknownSchema(name.to_string()))?;
        schema.construct(values)
    }

    pub fn get(
        &self,
        name: &str,
    ) -> Option<Arc<Schema>> {
        self.schemas.read().get(name).cloned()
    }

    pub fn contains(
        &self,
        name: &str,
    ) -> bool {
        self.schemas.read().contains_key(name)
    }

    /// Имена всех схем в алфавитном порядке.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.schemas.read().keys().map(|k| k.to_string()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.schemas.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::{error::MismatchKind, event::FieldType};

    #[test]
    fn test_define_and_construct() {
        let registry = SchemaRegistry::new();
        registry.define("Tick", [("count", FieldType::Int)]).unwrap();

        let event = registry
            .construct("Tick", [("count", FieldValue::Int(1))])
            .unwrap();
        assert_eq!(event.int("count"), Some(1));
        assert!(registry.contains("Tick"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_redefine_fails_and_keeps_original() {
        let registry = SchemaRegistry::new();
        let first = registry.define("Tick", [("count", FieldType::Int)]).unwrap();

        let err = registry
            .define("Tick", [("count", FieldType::Str)])
            .unwrap_err();
        assert_eq!(err, SchemaError::DuplicateDefinition("Tick".into()));

        let current = registry.get("Tick").unwrap();
        assert!(Arc::ptr_eq(&first, &current));
    }

    #[test]
    fn test_construct_unknown_schema() {
        let registry = SchemaRegistry::new();
        let err = registry
            .construct("Ghost", Vec::<(&str, FieldValue)>::new())
            .unwrap_err();
        assert_eq!(err, SchemaError::UnknownSchema("Ghost".into()));
    }

    #[test]
    fn test_construct_mismatch_through_registry() {
        let registry = SchemaRegistry::new();
        registry.define("Tick", [("count", FieldType::Int)]).unwrap();
        let err = registry
            .construct("Tick", [("count", FieldValue::from("one"))])
            .unwrap_err();
        assert!(matches!(
            err,
            SchemaError::SchemaMismatch {
                kind: MismatchKind::WrongType { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_names_sorted() {
        let registry = SchemaRegistry::new();
        for name in ["Two", "One", "Three"] {
            registry.define::<FieldDef>(name, []).unwrap();
        }
        assert_eq!(registry.names(), vec!["One", "Three", "Two"]);
    }

    /// Тест проверяет, что при гонке определений одного имени ровно
    /// один поток получает успех.
    #[test]
    fn test_concurrent_define_single_winner() {
        let registry = Arc::new(SchemaRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || registry.define("Race", [("n", FieldType::Int)]).is_ok())
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();
        assert_eq!(winners, 1);
        assert_eq!(registry.len(), 1);
    }
}
