use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use toml::{Table, Value};
use tracing::{debug, trace};

use super::convert::{convert_date_time, parse_primitive, ConvertFn, ConverterRegistry};
use super::{Bindable, EntitySchema, Shape, Target, TypeTag};
use crate::config::path::{canonical, PropertyPath, Segment};
use crate::config::{resolve_value, ConfigError, Properties};

/// Binds flat properties onto a declared [`Target`].
///
/// The binder collects every key under the target prefix, walks the schema
/// and produces a value tree that serde turns into the typed result. Binding
/// either succeeds completely or returns the first error; no partially
/// populated value is ever produced.
///
/// ## Example
///
/// ```
/// use propbind::bind::Binder;
/// use propbind::config::Properties;
/// use propbind::domain::ApplicationProperties;
///
/// let props: Properties = [
///     ("application.mapOfBrands.acme.id", "1"),
///     ("application.mapOfBrands.acme.dateCreated", "2023-05-01T10:00:00Z"),
///     ("application.listOfBrands[0].name", "First"),
/// ]
/// .into_iter()
/// .collect();
///
/// let bound: ApplicationProperties = Binder::new().bind_to(&props)?;
/// assert_eq!(bound.map_of_brands["acme"].id, Some(1));
/// assert_eq!(bound.list_of_brands[0].name.as_deref(), Some("First"));
/// # Ok::<(), propbind::ConfigError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Binder {
    converters: ConverterRegistry,
}

impl Default for Binder {
    fn default() -> Self {
        Self::new()
    }
}

/// A property under the target prefix, with the segments not yet consumed.
///
/// `value` is raw; placeholders are resolved against `source` only when the
/// binder reads it.
#[derive(Debug, Clone, Copy)]
struct Entry<'a> {
    key: &'a str,
    rest: &'a [Segment],
    value: &'a str,
    source: &'a Properties,
}

impl<'a> Entry<'a> {
    fn advance(self) -> Self {
        Self {
            rest: &self.rest[1..],
            ..self
        }
    }

    fn is_leaf(&self) -> bool {
        self.rest.is_empty()
    }

    fn resolved_value(&self) -> Result<String, ConfigError> {
        resolve_value(self.value, self.source)
    }
}

impl Binder {
    /// A binder with the date-time converter registered.
    pub fn new() -> Self {
        let mut binder = Self::empty();
        binder.register_converter(TypeTag::DATE_TIME, convert_date_time);
        binder
    }

    /// A binder with no converters; only primitive fields can be bound.
    pub fn empty() -> Self {
        Self {
            converters: ConverterRegistry::default(),
        }
    }

    /// Registers the converter used for scalar fields of type `tag`,
    /// replacing any previous one.
    pub fn register_converter(&mut self, tag: TypeTag, convert: ConvertFn) -> &mut Self {
        if self.converters.register(tag, convert).is_some() {
            debug!(type_name = tag.name(), "replaced registered converter");
        }
        self
    }

    /// Binds `T` from its own declared target.
    pub fn bind_to<T: Bindable>(&self, source: &Properties) -> Result<T, ConfigError> {
        self.bind(source, &T::target())
    }

    /// Binds `source` onto `target` and deserializes the result into `T`.
    pub fn bind<T: DeserializeOwned>(
        &self,
        source: &Properties,
        target: &Target,
    ) -> Result<T, ConfigError> {
        let table = self.bind_table(source, target)?;
        Ok(Value::Table(table).try_into()?)
    }

    /// Binds `source` onto `target`, returning the untyped value tree.
    pub fn bind_table(&self, source: &Properties, target: &Target) -> Result<Table, ConfigError> {
        self.check_converters(&target.schema, &target.prefix)?;

        let prefix = PropertyPath::parse(&target.prefix).map_err(|reason| {
            ConfigError::InvalidKey {
                key: target.prefix.clone(),
                reason,
            }
        })?;
        let prefix = prefix.segments();
        let canonical_prefix = canonical(&target.prefix);

        let mut parsed = Vec::new();
        for (key, value) in source.iter() {
            match PropertyPath::parse(key) {
                Ok(path) => parsed.push((key, path, value)),
                Err(reason) if is_under(&canonical(key), &canonical_prefix) => {
                    return Err(ConfigError::InvalidKey {
                        key: key.to_string(),
                        reason,
                    });
                }
                Err(reason) => trace!(key, %reason, "skipping unparseable key"),
            }
        }

        let entries: Vec<Entry<'_>> = parsed
            .iter()
            .filter(|(_, path, _)| starts_with(path.segments(), prefix))
            .map(|(key, path, value)| Entry {
                key: *key,
                rest: &path.segments()[prefix.len()..],
                value: *value,
                source,
            })
            .collect();

        debug!(
            prefix = %target.prefix,
            entity = %target.schema.name,
            keys = entries.len(),
            "binding properties"
        );

        self.bind_entity(&entries, &target.schema, &target.prefix)
    }

    /// Fails if any named scalar type in the schema has no converter.
    fn check_converters(&self, schema: &EntitySchema, path: &str) -> Result<(), ConfigError> {
        for field in &schema.fields {
            self.check_shape(&field.shape, &format!("{path}.{}", field.name))?;
        }
        Ok(())
    }

    fn check_shape(&self, shape: &Shape, path: &str) -> Result<(), ConfigError> {
        match shape {
            Shape::Scalar(tag) if !tag.is_primitive() && !self.converters.contains(*tag) => {
                Err(ConfigError::MissingConverter {
                    key: path.to_string(),
                    type_name: tag.name().to_string(),
                })
            }
            Shape::Scalar(_) => Ok(()),
            Shape::Entity(schema) => self.check_converters(schema, path),
            Shape::Map(element) | Shape::List(element) => {
                self.check_shape(element, &format!("{path}[*]"))
            }
        }
    }

    fn bind_entity(
        &self,
        entries: &[Entry<'_>],
        schema: &EntitySchema,
        path: &str,
    ) -> Result<Table, ConfigError> {
        let mut table = Table::new();

        for field in &schema.fields {
            let matching: Vec<Entry<'_>> = entries
                .iter()
                .filter(|e| e.rest.first().is_some_and(|s| s.matches_name(&field.name)))
                .map(|e| e.advance())
                .collect();
            let field_path = format!("{path}.{}", field.name);

            match self.bind_shape(&matching, &field.shape, &field_path)? {
                Some(value) => {
                    table.insert(field.name.clone(), value);
                }
                None if field.required => {
                    return Err(ConfigError::MissingValue { key: field_path });
                }
                None => {}
            }
        }

        for entry in entries {
            let known = entry
                .rest
                .first()
                .is_some_and(|s| schema.fields.iter().any(|f| s.matches_name(&f.name)));
            if !known {
                trace!(key = entry.key, entity = %schema.name, "ignoring unknown key");
            }
        }

        Ok(table)
    }

    fn bind_shape(
        &self,
        entries: &[Entry<'_>],
        shape: &Shape,
        path: &str,
    ) -> Result<Option<Value>, ConfigError> {
        if entries.is_empty() {
            return Ok(None);
        }

        match shape {
            Shape::Scalar(tag) => match entries.iter().rev().find(|e| e.is_leaf()) {
                Some(entry) => self.convert(*tag, &entry.resolved_value()?, entry.key),
                None => Ok(None),
            },
            Shape::Entity(schema) => {
                let (leaves, nested): (Vec<Entry<'_>>, Vec<Entry<'_>>) =
                    entries.iter().copied().partition(|e| e.is_leaf());
                for entry in &leaves {
                    trace!(key = entry.key, "ignoring value assigned directly to an entity");
                }
                if nested.is_empty() {
                    return Ok(None);
                }
                Ok(Some(Value::Table(self.bind_entity(&nested, schema, path)?)))
            }
            Shape::Map(element) => self.bind_map(entries, element, path).map(Some),
            Shape::List(element) => self.bind_list(entries, element, path),
        }
    }

    fn bind_map(
        &self,
        entries: &[Entry<'_>],
        element: &Shape,
        path: &str,
    ) -> Result<Value, ConfigError> {
        let mut groups: BTreeMap<&str, Vec<Entry<'_>>> = BTreeMap::new();
        for entry in entries {
            let Some(segment) = entry.rest.first() else {
                trace!(key = entry.key, "ignoring value assigned directly to a map");
                continue;
            };
            if segment.text().is_empty() {
                return Err(ConfigError::EmptySegment {
                    key: entry.key.to_string(),
                });
            }
            groups.entry(segment.text()).or_default().push(entry.advance());
        }

        let mut table = Table::new();
        for (key, group) in groups {
            if let Some(value) = self.bind_shape(&group, element, &format!("{path}[{key}]"))? {
                table.insert(key.to_string(), value);
            }
        }
        Ok(Value::Table(table))
    }

    fn bind_list(
        &self,
        entries: &[Entry<'_>],
        element: &Shape,
        path: &str,
    ) -> Result<Option<Value>, ConfigError> {
        let mut groups: BTreeMap<usize, Vec<Entry<'_>>> = BTreeMap::new();
        let mut inline = None;

        for entry in entries {
            let Some(segment) = entry.rest.first() else {
                inline = Some(*entry);
                continue;
            };
            let text = segment.text();
            if text.is_empty() {
                return Err(ConfigError::EmptySegment {
                    key: entry.key.to_string(),
                });
            }
            let index = parse_index(text).ok_or_else(|| ConfigError::InvalidIndex {
                key: entry.key.to_string(),
                segment: text.to_string(),
            })?;
            groups.entry(index).or_default().push(entry.advance());
        }

        if groups.is_empty() {
            // `tags=a,b,c` form, only meaningful for scalar elements.
            return match (inline, element) {
                (Some(entry), Shape::Scalar(tag)) => {
                    let value = entry.resolved_value()?;
                    let mut items = Vec::new();
                    for item in value.split(',').map(str::trim).filter(|s| !s.is_empty()) {
                        if let Some(value) = self.convert(*tag, item, entry.key)? {
                            items.push(value);
                        }
                    }
                    Ok(Some(Value::Array(items)))
                }
                (Some(entry), _) => {
                    trace!(key = entry.key, "ignoring value assigned directly to a list");
                    Ok(None)
                }
                (None, _) => Ok(None),
            };
        }

        let mut items = Vec::with_capacity(groups.len());
        for (index, group) in groups {
            if let Some(value) = self.bind_shape(&group, element, &format!("{path}[{index}]"))? {
                items.push(value);
            }
        }
        Ok(Some(Value::Array(items)))
    }

    fn convert(&self, tag: TypeTag, raw: &str, key: &str) -> Result<Option<Value>, ConfigError> {
        // Blank input is the absence marker for everything but strings.
        let input = match tag {
            TypeTag::String => Some(raw),
            _ if raw.trim().is_empty() => None,
            _ => Some(raw.trim()),
        };

        let result = if tag.is_primitive() {
            parse_primitive(tag, input)
        } else {
            let convert = self
                .converters
                .get(tag)
                .ok_or_else(|| ConfigError::MissingConverter {
                    key: key.to_string(),
                    type_name: tag.name().to_string(),
                })?;
            convert(input)
        };

        result.map_err(|reason| ConfigError::MalformedValue {
            key: key.to_string(),
            type_name: tag.name().to_string(),
            reason,
        })
    }
}

/// Plain decimal digits without leading zeros, so `[01]` and `[+1]` never
/// alias `[1]`.
fn parse_index(text: &str) -> Option<usize> {
    let digits_only = !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit());
    let canonical = text == "0" || !text.starts_with('0');
    if digits_only && canonical {
        text.parse().ok()
    } else {
        None
    }
}

fn starts_with(segments: &[Segment], prefix: &[Segment]) -> bool {
    segments.len() >= prefix.len()
        && segments
            .iter()
            .zip(prefix)
            .all(|(segment, expected)| segment.matches_name(expected.text()))
}

/// Textual check used for keys that failed to parse.
fn is_under(canonical_key: &str, canonical_prefix: &str) -> bool {
    canonical_key
        .strip_prefix(canonical_prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with(['.', '[']))
}
