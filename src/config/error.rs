use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("required config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse properties '{path}' at line {line}: {reason}")]
    ParseError {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("failed to parse config file '{path}': {source}")]
    TomlParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("failed to deserialize config: {0}")]
    DeserializeError(#[from] toml::de::Error),

    #[error("invalid value for '{key}' (expected {type_name}): {reason}")]
    MalformedValue {
        key: String,
        type_name: String,
        reason: String,
    },

    #[error("no converter registered for type '{type_name}' (field '{key}')")]
    MissingConverter { key: String, type_name: String },

    #[error("required value missing: {key}")]
    MissingValue { key: String },

    #[error("invalid property key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("invalid sequence index '{segment}' in '{key}'")]
    InvalidIndex { key: String, segment: String },

    #[error("empty map key or index in '{key}'")]
    EmptySegment { key: String },

    #[error("circular reference detected in configuration")]
    CircularReference,

    #[error("referenced property not found: {0}")]
    ReferenceNotFound(String),

    #[error("invalid reference path: {0}")]
    InvalidReferencePath(String),

    #[error("unclosed reference (missing '}}')")]
    UnclosedReference,
}
