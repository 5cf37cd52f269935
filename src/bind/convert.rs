//! Scalar conversions from raw property strings.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, FixedOffset};
use toml::Value;

use super::TypeTag;

/// Converts a raw value to its bound form.
///
/// `None` is the absence marker: the key was present but carried no value.
/// A converter returns `Ok(None)` to leave the field unset and `Err` with a
/// reason when the input is malformed.
pub type ConvertFn = fn(Option<&str>) -> Result<Option<Value>, String>;

/// Converters keyed by the type tag they produce.
#[derive(Clone, Default)]
pub struct ConverterRegistry {
    converters: HashMap<TypeTag, ConvertFn>,
}

impl fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.converters.keys()).finish()
    }
}

impl ConverterRegistry {
    /// Registers `convert` for `tag`, returning the converter it replaced.
    pub fn register(&mut self, tag: TypeTag, convert: ConvertFn) -> Option<ConvertFn> {
        self.converters.insert(tag, convert)
    }

    pub fn get(&self, tag: TypeTag) -> Option<ConvertFn> {
        self.converters.get(&tag).copied()
    }

    pub fn contains(&self, tag: TypeTag) -> bool {
        self.converters.contains_key(&tag)
    }
}

/// Direct parse for the primitive tags.
pub(crate) fn parse_primitive(tag: TypeTag, raw: Option<&str>) -> Result<Option<Value>, String> {
    let Some(raw) = raw else {
        return Ok(None);
    };

    let value = match tag {
        TypeTag::String => Value::String(raw.to_string()),
        TypeTag::Integer => Value::Integer(raw.parse::<i64>().map_err(|e| e.to_string())?),
        TypeTag::Float => Value::Float(raw.parse::<f64>().map_err(|e| e.to_string())?),
        TypeTag::Boolean => {
            if raw.eq_ignore_ascii_case("true") {
                Value::Boolean(true)
            } else if raw.eq_ignore_ascii_case("false") {
                Value::Boolean(false)
            } else {
                return Err(format!("'{raw}' is not 'true' or 'false'"));
            }
        }
        TypeTag::Named(name) => return Err(format!("'{name}' is not a primitive type")),
    };

    Ok(Some(value))
}

/// Converter for [`TypeTag::DATE_TIME`].
///
/// The result is stored in RFC 3339 form, which `chrono` deserializes back
/// into a `DateTime<FixedOffset>`.
pub fn convert_date_time(raw: Option<&str>) -> Result<Option<Value>, String> {
    match raw {
        None => Ok(None),
        Some(s) => parse_date_time(s).map(|dt| Some(Value::String(dt.to_rfc3339()))),
    }
}

/// Parses an ISO-8601 date-time carrying an offset.
///
/// Accepts RFC 3339, timestamps without seconds (`2023-05-01T10:00Z`), and a
/// trailing region id in brackets (`...+02:00[Europe/Paris]`), of which only
/// the offset is kept.
pub fn parse_date_time(s: &str) -> Result<DateTime<FixedOffset>, String> {
    let s = s.trim();
    let s = match s.find('[') {
        Some(open) if s.ends_with(']') => &s[..open],
        _ => s,
    };

    // chrono's RFC 3339 parser also takes a space here; ISO-8601 does not.
    if !matches!(s.as_bytes().get(10), Some(b'T' | b't')) {
        return Err(format!("'{s}' is not an ISO-8601 date-time: expected 'T' after the date"));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt);
    }

    let normalized = match s.strip_suffix(['Z', 'z']) {
        Some(local) => format!("{local}+00:00"),
        None => s.to_string(),
    };
    DateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M%:z")
        .map_err(|e| format!("'{s}' is not an ISO-8601 date-time with offset: {e}"))
}
