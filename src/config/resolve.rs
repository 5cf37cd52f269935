//! Placeholder resolution for property values.
//!
//! Supports `${some.key}` to reference another property and
//! `${some.key:fallback}` to supply a value when the key is absent.
//! Use `$${...}` to escape and produce a literal `${...}`.
//!
//! Values are resolved one at a time, when they are read, so a broken
//! placeholder in a key nobody binds never fails a load.

use super::{ConfigError, Properties};

/// Resolves every `${...}` placeholder in `raw` against `props`.
///
/// Referenced values are resolved recursively. Returns an error if a
/// reference cycles back to a key already being resolved, or if a referenced
/// key doesn't exist and has no fallback.
pub fn resolve_value(raw: &str, props: &Properties) -> Result<String, ConfigError> {
    let mut resolving = Vec::new();
    resolve_in(raw, props, &mut resolving)
}

/// `resolving` holds the keys whose values are currently being expanded.
fn resolve_in(
    raw: &str,
    props: &Properties,
    resolving: &mut Vec<String>,
) -> Result<String, ConfigError> {
    if !raw.contains('$') {
        return Ok(raw.to_string());
    }

    let mut result = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '$' {
            result.push(ch);
            continue;
        }
        match chars.peek() {
            Some('$') => {
                // Escape sequence: $$ -> $
                chars.next();
                result.push('$');
            }
            Some('{') => {
                chars.next();
                let body = consume_until_close(&mut chars).ok_or(ConfigError::UnclosedReference)?;
                result.push_str(&lookup(props, &body, resolving)?);
            }
            _ => result.push('$'),
        }
    }

    Ok(result)
}

/// Consumes the body of a reference up to its matching `}`.
///
/// Braces nest, so a fallback may itself hold a reference (`${a:${b}}`).
fn consume_until_close(chars: &mut std::iter::Peekable<std::str::Chars>) -> Option<String> {
    let mut result = String::new();
    let mut depth = 0usize;
    for ch in chars.by_ref() {
        match ch {
            '{' => depth += 1,
            '}' if depth == 0 => return Some(result),
            '}' => depth -= 1,
            _ => {}
        }
        result.push(ch);
    }
    None
}

/// Looks up `key` or `key:fallback` and resolves what it finds.
fn lookup(
    props: &Properties,
    body: &str,
    resolving: &mut Vec<String>,
) -> Result<String, ConfigError> {
    let (key, fallback) = match body.split_once(':') {
        Some((key, fallback)) => (key.trim(), Some(fallback)),
        None => (body.trim(), None),
    };
    if key.is_empty() {
        return Err(ConfigError::InvalidReferencePath(body.to_string()));
    }

    match (props.get(key), fallback) {
        (Some(value), _) => {
            if resolving.iter().any(|k| k == key) {
                return Err(ConfigError::CircularReference);
            }
            resolving.push(key.to_string());
            let resolved = resolve_in(value, props, resolving);
            resolving.pop();
            resolved
        }
        (None, Some(fallback)) => resolve_in(fallback, props, resolving),
        (None, None) => Err(ConfigError::ReferenceNotFound(key.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(pairs: &[(&str, &str)]) -> Properties {
        pairs.iter().copied().collect()
    }

    fn resolve(p: &Properties, key: &str) -> Result<String, ConfigError> {
        resolve_value(p.get(key).unwrap(), p)
    }

    #[test]
    fn test_simple_reference() {
        let p = props(&[("host", "localhost"), ("url", "http://${host}/api")]);
        assert_eq!(resolve(&p, "url").unwrap(), "http://localhost/api");
    }

    #[test]
    fn test_chained_references() {
        let p = props(&[("a", "hello"), ("b", "${a} world"), ("c", "${b}!")]);
        assert_eq!(resolve(&p, "c").unwrap(), "hello world!");
    }

    #[test]
    fn test_fallback_value() {
        let p = props(&[
            ("created", "${brand.created:2020-01-01T00:00:00Z}"),
            ("empty", "${missing:}"),
        ]);
        assert_eq!(resolve(&p, "created").unwrap(), "2020-01-01T00:00:00Z");
        assert_eq!(resolve(&p, "empty").unwrap(), "");
    }

    #[test]
    fn test_nested_fallback() {
        let p = props(&[
            ("default.created", "2020-01-01T00:00:00Z"),
            ("created", "${acme.created:${default.created}}"),
        ]);
        assert_eq!(resolve(&p, "created").unwrap(), "2020-01-01T00:00:00Z");
    }

    #[test]
    fn test_present_key_wins_over_fallback() {
        let p = props(&[("name", "Acme"), ("label", "${name:unknown}")]);
        assert_eq!(resolve(&p, "label").unwrap(), "Acme");
    }

    #[test]
    fn test_escape_sequence() {
        let p = props(&[("a", "x"), ("value", "use $${a} literally, cost $5")]);
        assert_eq!(resolve(&p, "value").unwrap(), "use ${a} literally, cost $5");
    }

    #[test]
    fn test_escaped_reference_in_referenced_value_stays_literal() {
        let p = props(&[("template", "$${name}"), ("copy", "${template}")]);
        assert_eq!(resolve(&p, "copy").unwrap(), "${name}");
    }

    #[test]
    fn test_same_key_twice_is_not_circular() {
        let p = props(&[("a", "1"), ("b", "${a}${a}")]);
        assert_eq!(resolve(&p, "b").unwrap(), "11");
    }

    #[test]
    fn test_circular_reference() {
        let p = props(&[("a", "${b}"), ("b", "${a}")]);
        assert!(matches!(resolve(&p, "a"), Err(ConfigError::CircularReference)));
    }

    #[test]
    fn test_missing_reference() {
        let p = props(&[("url", "${nonexistent.key}")]);
        assert!(matches!(
            resolve(&p, "url"),
            Err(ConfigError::ReferenceNotFound(k)) if k == "nonexistent.key"
        ));
    }

    #[test]
    fn test_empty_reference() {
        let p = props(&[("bad", "${}")]);
        assert!(matches!(resolve(&p, "bad"), Err(ConfigError::InvalidReferencePath(_))));
    }

    #[test]
    fn test_unclosed_reference() {
        let p = props(&[("bad", "${oops")]);
        assert!(matches!(resolve(&p, "bad"), Err(ConfigError::UnclosedReference)));
    }
}
