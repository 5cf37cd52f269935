//! Configuration loading and management.

mod builder;
mod env;
mod error;
mod file;
pub mod path;
mod properties;
mod resolve;
mod source;

pub use builder::Config;
pub use env::EnvSource;
pub use error::ConfigError;
pub use file::FileSource;
pub use properties::Properties;
pub use resolve::resolve_value;
pub use source::{ConfigSource, PropertiesSource};
