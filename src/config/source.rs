use super::{ConfigError, Properties};

/// A provider of flat key/value properties.
///
/// Sources are applied in registration order; a key produced by a later
/// source replaces the same key from an earlier one.
pub trait ConfigSource: Send + Sync + std::fmt::Debug {
    fn properties(&self) -> Result<Properties, ConfigError>;

    /// Short description used in log output.
    fn describe(&self) -> String;
}

/// A fixed, in-memory set of properties.
#[derive(Debug, Clone, Default)]
pub struct PropertiesSource {
    properties: Properties,
}

impl PropertiesSource {
    pub fn new(properties: Properties) -> Self {
        Self { properties }
    }
}

impl ConfigSource for PropertiesSource {
    fn properties(&self) -> Result<Properties, ConfigError> {
        Ok(self.properties.clone())
    }

    fn describe(&self) -> String {
        format!("in-memory ({} keys)", self.properties.len())
    }
}
