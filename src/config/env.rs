use super::source::ConfigSource;
use super::{ConfigError, Properties};

/// Properties taken from environment variables.
///
/// `MYAPP__MAP_OF_BRANDS__ACME__ID` with prefix `MYAPP` and separator `__`
/// becomes `myapp.map_of_brands.acme.id`. Segments are lowercased and
/// all-digit segments become sequence indexes (`[0]`). Relaxed name matching
/// in the binder maps `map_of_brands` onto `mapOfBrands`.
#[derive(Debug, Clone)]
pub struct EnvSource {
    prefix: String,
    separator: String,
}

impl EnvSource {
    pub fn new(prefix: impl Into<String>, separator: impl Into<String>) -> Self {
        let separator = separator.into();
        assert!(!separator.is_empty(), "separator must not be empty");
        Self {
            prefix: prefix.into(),
            separator,
        }
    }

    pub(crate) fn entries_from(&self, vars: impl IntoIterator<Item = (String, String)>) -> Properties {
        let prefix_with_sep = format!("{}{}", self.prefix, self.separator);
        let root = self.prefix.to_lowercase();
        let mut props = Properties::new();

        for (name, value) in vars {
            let Some(path_str) = name.strip_prefix(&prefix_with_sep) else {
                continue;
            };
            if path_str.is_empty() {
                continue;
            }

            let mut key = root.clone();
            for segment in path_str.split(&self.separator) {
                if !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()) {
                    key.push('[');
                    key.push_str(segment);
                    key.push(']');
                } else {
                    key.push('.');
                    key.push_str(&segment.to_lowercase());
                }
            }
            props.insert(key, value);
        }

        props
    }
}

impl ConfigSource for EnvSource {
    fn properties(&self) -> Result<Properties, ConfigError> {
        Ok(self.entries_from(std::env::vars()))
    }

    fn describe(&self) -> String {
        format!("environment {}{}*", self.prefix, self.separator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_maps_names_to_keys() {
        let source = EnvSource::new("APPLICATION", "__");
        let props = source.entries_from(vars(&[
            ("APPLICATION__MAP_OF_BRANDS__ACME__NAME", "Acme"),
            ("APPLICATION__LIST_OF_BRANDS__2__ID", "7"),
            ("OTHER__VALUE", "ignored"),
            ("APPLICATION__", "ignored"),
        ]));

        assert_eq!(props.len(), 2);
        assert_eq!(props.get("application.map_of_brands.acme.name"), Some("Acme"));
        assert_eq!(props.get("application.list_of_brands[2].id"), Some("7"));
    }

    #[test]
    fn test_reads_process_environment() {
        // Cargo sets this for every test binary.
        let props = EnvSource::new("CARGO", "_").properties().unwrap();
        assert_eq!(
            props.get("cargo.manifest.dir").map(str::to_string),
            std::env::var("CARGO_MANIFEST_DIR").ok()
        );
    }

    #[test]
    #[should_panic(expected = "separator must not be empty")]
    fn test_empty_separator_panics() {
        EnvSource::new("APP", "");
    }
}
