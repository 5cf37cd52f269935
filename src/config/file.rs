//! File-based configuration source.

use std::path::{Path, PathBuf};

use toml::{Table, Value};

use super::source::ConfigSource;
use super::{ConfigError, Properties};

/// A configuration source that loads a `.properties` or `.toml` file.
///
/// The format is chosen by extension: `.toml` files are flattened into
/// dotted keys, anything else is read as `.properties`. Files can be marked
/// as required or optional. Required files that don't exist cause an error;
/// optional files that don't exist are silently skipped.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    required: bool,
}

impl FileSource {
    /// Creates a new file source.
    ///
    /// If `required` is true, the build will fail if the file doesn't exist.
    pub fn new(path: impl AsRef<Path>, required: bool) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            required,
        }
    }

    fn is_toml(&self) -> bool {
        self.path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"))
    }
}

impl ConfigSource for FileSource {
    fn properties(&self) -> Result<Properties, ConfigError> {
        let Some(contents) = read_config_file(&self.path, self.required)? else {
            tracing::debug!(path = %self.path.display(), "optional config file not found, skipping");
            return Ok(Properties::new());
        };

        if self.is_toml() {
            let table: Table =
                toml::from_str(&contents).map_err(|e| ConfigError::TomlParseError {
                    path: self.path.clone(),
                    source: e,
                })?;
            let mut props = Properties::new();
            flatten_table(&table, "", &mut props);
            Ok(props)
        } else {
            Properties::parse(&contents, &self.path)
        }
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}

/// Reads a config file.
///
/// Returns `Ok(None)` if the file doesn't exist and `required` is false.
fn read_config_file(path: &Path, required: bool) -> Result<Option<String>, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            if required {
                Err(ConfigError::FileNotFound(path.to_path_buf()))
            } else {
                Ok(None)
            }
        }
        Err(e) => Err(ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

fn flatten_table(table: &Table, prefix: &str, out: &mut Properties) {
    for (key, value) in table {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        flatten_value(value, path, out);
    }
}

fn flatten_value(value: &Value, path: String, out: &mut Properties) {
    match value {
        Value::Table(t) => flatten_table(t, &path, out),
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                flatten_value(item, format!("{path}[{i}]"), out);
            }
        }
        Value::String(s) => out.insert(path, s.clone()),
        Value::Integer(i) => out.insert(path, i.to_string()),
        Value::Float(f) => out.insert(path, f.to_string()),
        Value::Boolean(b) => out.insert(path, b.to_string()),
        Value::Datetime(dt) => out.insert(path, dt.to_string()),
    }
}
