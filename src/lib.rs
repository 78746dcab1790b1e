/// Configuration loading (defaults, TOML, environment).
pub mod config;
/// Dispatchers: one worker thread and one FIFO queue each.
pub mod dispatcher;
/// Error types: schema, lifecycle, publish, handler, config, logging.
pub mod error;
/// Event schemas and immutable, schema-validated event instances.
pub mod event;
/// Logging setup (filters, console and file sinks).
pub mod logging;
/// Publisher: subscription registry and fan-out.
pub mod pubsub;

// -----------------------------------------------------------------------------
//  Frequently used public types
// -----------------------------------------------------------------------------

/// Settings.
pub use self::config::{DispatcherSettings, Settings};
/// Dispatcher API.
pub use dispatcher::{
    Dispatcher, DispatcherConfig, DispatcherHandle, DispatcherId, DispatcherState,
    DispatcherStats, ErrorCallback, EventHandler, HandlerFailure, OverflowPolicy,
};
/// Operation errors and result types.
pub use error::{
    ConfigError, DispatchError, DispatchResult, EvtError, EvtResult, HandlerError, LoggingError,
    MismatchKind, PublishError, SchemaError,
};
/// Event definitions.
pub use event::{Event, FieldDef, FieldType, FieldValue, Schema, SchemaRegistry};
/// Logging.
pub use logging::{init_logging, LoggingConfig, LoggingHandle};
/// Publish API.
pub use pubsub::{Publisher, PublisherStats};
