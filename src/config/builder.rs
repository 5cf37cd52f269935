use std::path::Path;

use tracing::{debug, info};

use super::env::EnvSource;
use super::file::FileSource;
use super::source::{ConfigSource, PropertiesSource};
use super::{ConfigError, Properties};
use crate::bind::{Bindable, Binder};

/// Builder for loading properties from several sources and binding them.
///
/// Sources are applied in registration order. A key produced by a later
/// source replaces the same key from an earlier one; there is no deeper
/// merging.
///
/// ## Placeholders
///
/// Values can reference other properties using `${some.key}` syntax, with an
/// optional fallback after a colon. References are resolved by the binder
/// when it reads a value, so keys outside the target are never expanded:
///
/// ```properties
/// brand.default.created=2020-01-01T00:00:00Z
/// application.mapOfBrands.acme.dateCreated=${brand.acme.created:${brand.default.created}}
/// ```
///
/// Use `$$` to escape a literal `$` (e.g., `$${VAR}` becomes `${VAR}`).
///
/// ## Example
///
/// ```no_run
/// use propbind::Config;
/// use propbind::domain::ApplicationProperties;
///
/// let config: ApplicationProperties = Config::builder()
///     .with_file("application.properties", true)
///     .with_file("application-local.properties", false)
///     .with_env("APPLICATION", "__")
///     .build()?;
/// # Ok::<(), propbind::ConfigError>(())
/// ```
#[derive(Debug, Default)]
#[must_use = "builders do nothing until .build() is called"]
pub struct Config {
    sources: Vec<Box<dyn ConfigSource>>,
    binder: Binder,
}

impl Config {
    /// Creates a new configuration builder.
    pub fn builder() -> Self {
        Self::default()
    }

    /// Adds a `.properties` or `.toml` file to be loaded.
    ///
    /// If `required` is `true`, the build will fail if the file doesn't exist.
    /// Optional files that are missing are silently skipped.
    pub fn with_file(self, path: impl AsRef<Path>, required: bool) -> Self {
        self.with_source(FileSource::new(path, required))
    }

    /// Loads properties from environment variables with the given prefix.
    ///
    /// With prefix `APPLICATION` and separator `__`, the variable
    /// `APPLICATION__LIST_OF_BRANDS__0__NAME` supplies
    /// `application.list_of_brands[0].name`, which binds to
    /// `listOfBrands[0].name`.
    pub fn with_env(self, prefix: impl Into<String>, separator: impl Into<String>) -> Self {
        self.with_source(EnvSource::new(prefix, separator))
    }

    /// Adds a fixed set of properties.
    pub fn with_properties(self, properties: Properties) -> Self {
        self.with_source(PropertiesSource::new(properties))
    }

    pub fn with_source(mut self, source: impl ConfigSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Replaces the binder, e.g. to register additional converters.
    pub fn with_binder(mut self, binder: Binder) -> Self {
        self.binder = binder;
        self
    }

    /// Loads and layers every source without binding.
    ///
    /// Placeholders are left as written; see [`resolve_value`](super::resolve_value).
    pub fn load(&self) -> Result<Properties, ConfigError> {
        let mut merged = Properties::new();

        for source in &self.sources {
            let props = source.properties()?;
            debug!(source = %source.describe(), keys = props.len(), "loaded property source");
            merged.extend(props);
        }

        Ok(merged)
    }

    /// Loads and binds the configuration into `T`.
    ///
    /// Binding happens once here rather than on each access; either the
    /// whole value binds or an error is returned.
    pub fn build<T: Bindable>(self) -> Result<T, ConfigError> {
        let merged = self.load()?;
        let bound = self.binder.bind_to(&merged)?;
        info!(sources = self.sources.len(), keys = merged.len(), "configuration bound");
        Ok(bound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ApplicationProperties;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_later_sources_override_earlier_keys() {
        let base: Properties = [
            ("application.mapOfBrands.acme.id", "1"),
            ("application.mapOfBrands.acme.name", "Acme"),
        ]
        .into_iter()
        .collect();
        let overlay: Properties = [("application.mapOfBrands.acme.name", "Acme Corp")]
            .into_iter()
            .collect();

        let config: ApplicationProperties = Config::builder()
            .with_properties(base)
            .with_properties(overlay)
            .build()
            .unwrap();

        let acme = &config.map_of_brands["acme"];
        assert_eq!(acme.id, Some(1));
        assert_eq!(acme.name.as_deref(), Some("Acme Corp"));
    }

    #[test]
    fn test_placeholders_are_resolved_when_bound() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "defaults.created=2023-05-01T10:00:00Z\n\
             application.listOfBrands[0].name=First\n\
             application.listOfBrands[0].dateCreated=${{defaults.created}}\n\
             application.listOfBrands[1].dateCreated=${{missing:2024-01-01T00:00:00+01:00}}"
        )
        .unwrap();

        let config: ApplicationProperties = Config::builder()
            .with_file(file.path(), true)
            .build()
            .unwrap();

        assert_eq!(config.list_of_brands.len(), 2);
        assert_eq!(
            config.list_of_brands[0].date_created.map(|d| d.to_rfc3339()),
            Some("2023-05-01T10:00:00+00:00".to_string())
        );
        assert_eq!(
            config.list_of_brands[1].date_created.map(|d| d.to_rfc3339()),
            Some("2024-01-01T00:00:00+01:00".to_string())
        );
    }

    #[test]
    fn test_missing_optional_file_binds_empty() {
        let config: ApplicationProperties = Config::builder()
            .with_file("/nonexistent/application.properties", false)
            .build()
            .unwrap();
        assert!(config.map_of_brands.is_empty());
        assert!(config.list_of_brands.is_empty());
    }

    #[test]
    fn test_load_keeps_placeholders_as_written() {
        let props: Properties = [("a", "1"), ("b", "${a}${a}")].into_iter().collect();
        let loaded = Config::builder().with_properties(props).load().unwrap();
        assert_eq!(loaded.get("b"), Some("${a}${a}"));
    }

    #[test]
    fn test_unrelated_broken_placeholders_do_not_fail_build() {
        let props: Properties = [
            ("application.mapOfBrands.acme.id", "1"),
            ("application.mapOfBrands.acme.name", "Acme"),
            ("other.url", "${undefined.host}"),
            ("unrelated.secret", "pa${ss"),
        ]
        .into_iter()
        .collect();

        let config: ApplicationProperties =
            Config::builder().with_properties(props).build().unwrap();

        assert_eq!(config.map_of_brands["acme"].id, Some(1));
        assert_eq!(config.map_of_brands["acme"].name.as_deref(), Some("Acme"));
    }

    fn env_style(pairs: &[(&str, &str)]) -> Properties {
        let vars = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string()));
        EnvSource::new("APPLICATION", "__").entries_from(vars)
    }

    #[test]
    fn test_last_source_wins_across_name_spellings() {
        let first: Properties = [("application.listOfBrands[0].name", "file1")]
            .into_iter()
            .collect();
        let env = env_style(&[("APPLICATION__LIST_OF_BRANDS__0__NAME", "env")]);
        let last: Properties = [("application.listOfBrands[0].name", "file2")]
            .into_iter()
            .collect();

        let config: ApplicationProperties = Config::builder()
            .with_properties(first.clone())
            .with_properties(env.clone())
            .with_properties(last)
            .build()
            .unwrap();
        assert_eq!(config.list_of_brands[0].name.as_deref(), Some("file2"));

        let config: ApplicationProperties = Config::builder()
            .with_properties(first)
            .with_properties(env)
            .build()
            .unwrap();
        assert_eq!(config.list_of_brands[0].name.as_deref(), Some("env"));
    }

    #[test]
    fn test_env_source_binds_with_relaxed_names() {
        let config: ApplicationProperties = Config::builder()
            .with_properties(
                [("application.listOfBrands[0].id", "9")]
                    .into_iter()
                    .collect(),
            )
            .with_properties(env_style(&[("APPLICATION__LIST_OF_BRANDS__0__NAME", "From Env")]))
            .build()
            .unwrap();

        assert_eq!(config.list_of_brands.len(), 1);
        assert_eq!(config.list_of_brands[0].id, Some(9));
        assert_eq!(config.list_of_brands[0].name.as_deref(), Some("From Env"));
    }
}
