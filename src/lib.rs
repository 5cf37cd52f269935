pub mod bind;
pub mod config;
pub mod context;
pub mod domain;
mod error;
pub mod logging;

pub use bind::{Bindable, Binder};
pub use config::{Config, ConfigError, Properties};
pub use context::AppContext;
pub use error::Error;
