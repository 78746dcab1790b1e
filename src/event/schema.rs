use std::{collections::HashMap, sync::Arc};

use super::{Event, FieldType, FieldValue};
use crate::error::{MismatchKind, SchemaError};

/// Объявление одного поля схемы: имя, тип и необязательное значение
/// по умолчанию.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub name: Arc<str>,
    pub ty: FieldType,
    pub default: Option<FieldValue>,
}

/// Именованная схема события с упорядоченным списком полей.
///
/// Схема неизменяема после создания. Экземпляры событий строятся только
/// через [`Schema::construct`], поэтому каждое событие гарантированно
/// соответствует своей схеме.
#[derive(Debug, PartialEq)]
pub struct Schema {
    name: Arc<str>,
    fields: Vec<FieldDef>,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl FieldDef {
    pub fn new(
        name: &str,
        ty: FieldType,
    ) -> Self {
        Self {
            name: Arc::from(name),
            ty,
            default: None,
        }
    }

    /// Задаёт значение, подставляемое, если поле не передано при
    /// построении события.
    pub fn with_default(
        mut self,
        value: impl Into<FieldValue>,
    ) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }
}

impl Schema {
    /// Создаёт схему и проверяет объявления полей.
    ///
    /// Ошибки: `DuplicateField` при повторе имени поля, `InvalidDefault`
    /// если значение по умолчанию не совпадает с объявленным типом.
    pub fn new<F>(
        name: &str,
        fields: impl IntoIterator<Item = F>,
    ) -> Result<Self, SchemaError>
    where
        F: Into<FieldDef>,
    {
        let fields: Vec<FieldDef> = fields.into_iter().map(Into::into).collect();

        for (idx, field) in fields.iter().enumerate() {
            if fields[..idx].iter().any(|f| f.name == field.name) {
                return Err(SchemaError::DuplicateField {
                    schema: name.to_string(),
                    field: field.name.to_string(),
                });
            }
            if let Some(default) = &field.default {
                if !default.conforms_to(field.ty) {
                    return Err(SchemaError::InvalidDefault {
                        schema: name.to_string(),
                        field: field.name.to_string(),
                        expected: field.ty,
                        found: default.field_type(),
                    });
                }
            }
        }

        Ok(Self {
            name: Arc::from(name),
            fields,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn field(
        &self,
        name: &str,
    ) -> Option<&FieldDef> {
        self.fields.iter().find(|f| &*f.name == name)
    }

    pub(crate) fn position(
        &self,
        name: &str,
    ) -> Option<usize> {
        self.fields.iter().position(|f| &*f.name == name)
    }

    /// Строит событие из переданных значений.
    ///
    /// Одно и то же имя поля, переданное дважды, даёт `DuplicateValue`.
    /// Порядок проверки: для каждого объявленного поля берётся переданное
    /// значение, иначе значение по умолчанию, иначе `MissingField`. Затем
    /// проверяется тип. Оставшиеся значения дают `UnknownField`. Функция
    /// чистая и не трогает никакого разделяемого состояния.
    pub fn construct<K, I>(
        self: &Arc<Self>,
        values: I,
    ) -> Result<Event, SchemaError>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, FieldValue)>,
    {
        let mut supplied: HashMap<String, FieldValue> = HashMap::new();
        for (key, value) in values {
            let key: String = key.into();
            if supplied.contains_key(&key) {
                return Err(SchemaError::mismatch(
                    &self.name,
                    MismatchKind::DuplicateValue(key),
                ));
            }
            supplied.insert(key, value);
        }

        let mut ordered = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            let value = match supplied.remove(&*field.name) {
                Some(value) => value,
                None => match &field.default {
                    Some(default) => default.clone(),
                    None => {
                        return Err(SchemaError::mismatch(
                            &self.name,
                            MismatchKind::MissingField(field.name.to_string()),
                        ))
                    }
                },
            };

            if !value.conforms_to(field.ty) {
                return Err(SchemaError::mismatch(
                    &self.name,
                    MismatchKind::WrongType {
                        field: field.name.to_string(),
                        expected: field.ty,
                        found: value.field_type(),
                    },
                ));
            }
            ordered.push(value);
        }

        // Сообщаем о лексикографически первом лишнем поле, чтобы ошибка
        // не зависела от порядка обхода HashMap.
        if let Some(extra) = supplied.into_keys().min() {
            return Err(SchemaError::mismatch(
                &self.name,
                MismatchKind::UnknownField(extra),
            ));
        }

        Ok(Event::from_parts(Arc::clone(self), ordered))
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов
////////////////////////////////////////////////////////////////////////////////

impl From<(&str, FieldType)> for FieldDef {
    fn from((name, ty): (&str, FieldType)) -> Self {
        FieldDef::new(name, ty)
    }
}
