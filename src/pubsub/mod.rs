//! Издатель событий (publish–subscribe внутри процесса).
//!
//! - `publisher`: реестр подписок по имени события и раздача событий
//!   очередям диспетчеров.

pub mod publisher;

pub use publisher::{Publisher, PublisherMetrics, PublisherStats};
