//! Application context carrying the bound configuration.

use crate::bind::Bindable;
use crate::{Config, Error};

/// Central application context holding the configuration.
///
/// The configuration is bound once at startup and read through
/// [`config()`](Self::config) afterwards. Components receive the context (or
/// a reference to the config) explicitly; nothing is held in global state.
///
/// ## Example
///
/// ```no_run
/// use propbind::domain::ApplicationProperties;
/// use propbind::{AppContext, Config};
///
/// let ctx = AppContext::builder()
///     .with_config(
///         Config::builder()
///             .with_file("application.properties", true)
///             .build::<ApplicationProperties>()?,
///     )
///     .build()?;
///
/// for (key, brand) in &ctx.config().map_of_brands {
///     println!("{key}: {brand}");
/// }
/// # Ok::<(), propbind::Error>(())
/// ```
#[derive(Debug)]
pub struct AppContext<C> {
    config: C,
}

impl<C> AppContext<C> {
    /// Returns a reference to the configuration.
    pub fn config(&self) -> &C {
        &self.config
    }

    /// Consumes the context, returning the configuration.
    pub fn into_config(self) -> C {
        self.config
    }
}

impl<C: Bindable> AppContext<C> {
    /// Loads and binds `C` from `config` in one step.
    pub fn load(config: Config) -> Result<Self, Error> {
        AppContext::builder().with_config(config.build::<C>()?).build()
    }
}

impl AppContext<()> {
    /// Creates a new builder for constructing an `AppContext`.
    pub fn builder() -> AppContextBuilder<()> {
        AppContextBuilder { config: None }
    }
}

/// Builder for constructing an [`AppContext`].
///
/// The builder starts with no config (`AppContextBuilder<()>`) and transitions
/// to `AppContextBuilder<C>` when [`with_config`](Self::with_config) is called.
#[derive(Debug)]
#[must_use = "builders do nothing until .build() is called"]
pub struct AppContextBuilder<C> {
    config: Option<C>,
}

impl AppContextBuilder<()> {
    /// Attaches a bound configuration to the application context.
    pub fn with_config<C>(self, config: C) -> AppContextBuilder<C> {
        AppContextBuilder {
            config: Some(config),
        }
    }
}

impl<C> AppContextBuilder<C> {
    /// Builds the `AppContext`.
    ///
    /// Returns an error if no configuration was provided.
    pub fn build(self) -> Result<AppContext<C>, Error> {
        Ok(AppContext {
            config: self.config.ok_or(Error::MissingConfig)?,
        })
    }
}
