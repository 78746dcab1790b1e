use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Тип поля, объявленный в схеме события.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Bool,
    Int,
    Float,
    Str,
    Bytes,
    List,
}

/// Значение поля события.
///
/// Каждому варианту соответствует ровно один [`FieldType`]. Целые числа
/// не приводятся к `Float` неявно: проверка типа строгая.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Bytes),
    List(Vec<FieldValue>),
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Bool => "bool",
            FieldType::Int => "int",
            FieldType::Float => "float",
            FieldType::Str => "str",
            FieldType::Bytes => "bytes",
            FieldType::List => "list",
        }
    }
}

impl FieldValue {
    /// Возвращает тип, которому соответствует значение.
    pub fn field_type(&self) -> FieldType {
        match self {
            FieldValue::Bool(_) => FieldType::Bool,
            FieldValue::Int(_) => FieldType::Int,
            FieldValue::Float(_) => FieldType::Float,
            FieldValue::Str(_) => FieldType::Str,
            FieldValue::Bytes(_) => FieldType::Bytes,
            FieldValue::List(_) => FieldType::List,
        }
    }

    pub fn conforms_to(
        &self,
        ty: FieldType,
    ) -> bool {
        self.field_type() == ty
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            FieldValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            FieldValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            FieldValue::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов
////////////////////////////////////////////////////////////////////////////////

impl fmt::Display for FieldType {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        FieldValue::Int(v as i64)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Str(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Str(v)
    }
}

impl From<Bytes> for FieldValue {
    fn from(v: Bytes) -> Self {
        FieldValue::Bytes(v)
    }
}

impl From<Vec<FieldValue>> for FieldValue {
    fn from(v: Vec<FieldValue>) -> Self {
        FieldValue::List(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Тест проверяет соответствие каждого варианта значения своему типу.
    #[test]
    fn test_field_type_of_each_variant() {
        let cases = [
            (FieldValue::from(true), FieldType::Bool),
            (FieldValue::from(7i64), FieldType::Int),
            (FieldValue::from(1.5), FieldType::Float),
            (FieldValue::from("x"), FieldType::Str),
            (FieldValue::from(Bytes::from_static(b"\x00\x01")), FieldType::Bytes),
            (FieldValue::from(vec![FieldValue::Int(1)]), FieldType::List),
        ];
        for (value, ty) in cases {
            assert_eq!(value.field_type(), ty);
            assert!(value.conforms_to(ty));
        }
    }

    /// Тест проверяет, что целое число не считается `Float`.
    #[test]
    fn test_int_does_not_conform_to_float() {
        assert!(!FieldValue::Int(1).conforms_to(FieldType::Float));
        assert_eq!(FieldValue::Int(1).as_float(), None);
    }

    #[test]
    fn test_accessors() {
        assert_eq!(FieldValue::Bool(true).as_bool(), Some(true));
        assert_eq!(FieldValue::Int(3).as_int(), Some(3));
        assert_eq!(FieldValue::Str("a".into()).as_str(), Some("a"));
        assert_eq!(FieldValue::Str("a".into()).as_int(), None);
        assert_eq!(
            FieldValue::List(vec![FieldValue::Int(1)]).as_list(),
            Some(&[FieldValue::Int(1)][..])
        );
    }

    #[test]
    fn test_field_type_serde_lowercase() {
        let json = serde_json::to_string(&FieldType::Bytes).unwrap();
        assert_eq!(json, "\"bytes\"");
        let back: FieldType = serde_json::from_str("\"float\"").unwrap();
        assert_eq!(back, FieldType::Float);
    }
}
