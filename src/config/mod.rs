pub mod settings;

pub use settings::{DispatcherSettings, Settings, ENV_PREFIX};
