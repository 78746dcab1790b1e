//! Схемы событий и их экземпляры.
//!
//! - `value`: типы полей и значения.
//! - `schema`: объявление схемы и проверка значений при построении события.
//! - `event_base`: неизменяемый экземпляр события.
//! - `registry`: потокобезопасный реестр схем по имени.

pub mod event_base;
pub mod registry;
pub mod schema;
pub mod value;

pub use event_base::Event;
pub use registry::SchemaRegistry;
pub use schema::{FieldDef, Schema};
pub use value::{FieldType, FieldValue};
