use std::{fmt, sync::Arc};

use serde::{ser::SerializeMap, Serialize, Serializer};

use super::{FieldValue, Schema};

/// Неизменяемый экземпляр события, прошедший проверку схемой.
///
/// Клонирование дешёвое: все копии разделяют одни и те же данные через
/// `Arc`, поэтому одно событие можно раздать нескольким диспетчерам без
/// дополнительной синхронизации. Методов изменения полей нет.
#[derive(Clone)]
pub struct Event {
    inner: Arc<EventData>,
}

struct EventData {
    schema: Arc<Schema>,
    /// Значения в порядке полей схемы.
    values: Vec<FieldValue>,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl Event {
    pub(crate) fn from_parts(
        schema: Arc<Schema>,
        values: Vec<FieldValue>,
    ) -> Self {
        debug_assert_eq!(schema.fields().len(), values.len());
        Self {
            inner: Arc::new(EventData { schema, values }),
        }
    }

    /// Имя схемы, по которому издатель ищет подписчиков.
    pub fn name(&self) -> &str {
        self.inner.schema.name()
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.inner.schema
    }

    pub fn get(
        &self,
        field: &str,
    ) -> Option<&FieldValue> {
        self.inner
            .schema
            .position(field)
            .map(|idx| &self.inner.values[idx])
    }

    pub fn int(
        &self,
        field: &str,
    ) -> Option<i64> {
        self.get(field).and_then(FieldValue::as_int)
    }

    pub fn float(
        &self,
        field: &str,
    ) -> Option<f64> {
        self.get(field).and_then(FieldValue::as_float)
    }

    pub fn bool(
        &self,
        field: &str,
    ) -> Option<bool> {
        self.get(field).and_then(FieldValue::as_bool)
    }

    pub fn str(
        &self,
        field: &str,
    ) -> Option<&str> {
        self.get(field).and_then(FieldValue::as_str)
    }

    /// Пары (имя поля, значение) в порядке объявления в схеме.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.inner
            .schema
            .fields()
            .iter()
            .map(|f| &*f.name)
            .zip(self.inner.values.iter())
    }

    pub fn len(&self) -> usize {
        self.inner.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.values.is_empty()
    }

    /// Проверяет, что два `Event` являются копиями одного и того же экземпляра.
    pub fn ptr_eq(
        &self,
        other: &Event,
    ) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов
////////////////////////////////////////////////////////////////////////////////

impl PartialEq for Event {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.name() == other.name() && self.inner.values == other.inner.values
    }
}

impl fmt::Debug for Event {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}", self.name())?;
        f.debug_map().entries(self.fields()).finish()
    }
}

struct FieldsView<'a>(&'a Event);

impl Serialize for FieldsView<'_> {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in self.0.fields() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl Serialize for Event {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("event", self.name())?;
        map.serialize_entry("fields", &FieldsView(self))?;
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::FieldType;

    fn sample() -> Event {
        let schema = Arc::new(
            Schema::new(
                "EventFour",
                [
                    ("p1", FieldType::Float),
                    ("p2", FieldType::List),
                    ("p3", FieldType::Bool),
                ],
            )
            .unwrap(),
        );
        schema
            .construct([
                ("p1", FieldValue::Float(4.0)),
                (
                    "p2",
                    FieldValue::List(vec![
                        FieldValue::Int(1),
                        FieldValue::Int(2),
                        FieldValue::Int(3),
                    ]),
                ),
                ("p3", FieldValue::Bool(true)),
            ])
            .unwrap()
    }

    #[test]
    fn test_typed_accessors() {
        let event = sample();
        assert_eq!(event.float("p1"), Some(4.0));
        assert_eq!(event.bool("p3"), Some(true));
        assert_eq!(event.int("p1"), None);
        assert_eq!(event.get("missing"), None);
        assert_eq!(event.len(), 3);
    }

    /// Тест проверяет, что клон разделяет данные с оригиналом.
    #[test]
    fn test_clone_shares_data() {
        let a = sample();
        let b = a.clone();
        assert!(a.ptr_eq(&b));
        assert_eq!(a, b);
    }

    #[test]
    fn test_equal_values_but_distinct_instances() {
        let a = sample();
        let b = sample();
        assert!(!a.ptr_eq(&b));
        assert_eq!(a, b);
    }

    #[test]
    fn test_serialize_as_json() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "event": "EventFour",
                "fields": { "p1": 4.0, "p2": [1, 2, 3], "p3": true }
            })
        );
    }

    #[test]
    fn test_debug_lists_fields() {
        let out = format!("{:?}", sample());
        assert!(out.starts_with("EventFour{"));
        assert!(out.contains("\"p3\": Bool(true)"));
    }

    #[test]
    fn test_event_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Event>();
    }
}
