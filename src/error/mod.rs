pub mod dispatch;
pub mod global;
pub mod handler;
pub mod schema;
pub mod system;

pub use dispatch::{DispatchError, DispatchResult, PublishError};
pub use global::{EvtError, EvtResult};
pub use handler::HandlerError;
pub use schema::{MismatchKind, SchemaError};
pub use system::{ConfigError, LoggingError};
