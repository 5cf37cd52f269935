//! Flat key/value property storage and the `.properties` text format.

use std::path::Path;

use super::ConfigError;

/// An ordered set of string properties.
///
/// Entries are kept in insertion order. Inserting a key that is already
/// present removes the old entry and appends the new one, so the most recent
/// write always comes last even when the binder later matches several
/// spellings of the same field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    entries: Vec<(String, String)>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `.properties` text.
    ///
    /// `origin` is only used for error messages.
    pub fn parse(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        let mut props = Self::new();
        for (key, value) in parse_lines(text, origin)? {
            props.insert(key, value);
        }
        Ok(props)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        self.entries.retain(|(k, _)| *k != key);
        self.entries.push((key, value));
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Applies every entry of `other` on top of `self`.
    pub fn extend(&mut self, other: impl IntoIterator<Item = (String, String)>) {
        for (key, value) in other {
            self.insert(key, value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Properties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut props = Self::new();
        for (key, value) in iter {
            props.insert(key, value);
        }
        props
    }
}

impl IntoIterator for Properties {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Splits text into logical lines (joining `\` continuations) and parses
/// each into a key/value pair.
fn parse_lines(text: &str, origin: &Path) -> Result<Vec<(String, String)>, ConfigError> {
    let mut pairs = Vec::new();
    let mut logical = String::new();
    let mut start_line = 0;
    let mut continuing = false;

    for (idx, raw) in text.lines().enumerate() {
        let line = if continuing {
            raw.trim_start()
        } else {
            let trimmed = raw.trim_start();
            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
                continue;
            }
            start_line = idx + 1;
            trimmed
        };

        if ends_with_continuation(line) {
            logical.push_str(&line[..line.len() - 1]);
            continuing = true;
            continue;
        }

        logical.push_str(line);
        continuing = false;
        pairs.push(parse_pair(&logical, origin, start_line)?);
        logical.clear();
    }

    if continuing && !logical.is_empty() {
        pairs.push(parse_pair(&logical, origin, start_line)?);
    }

    Ok(pairs)
}

/// An odd number of trailing backslashes means the last one escapes the newline.
fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
}

fn parse_pair(line: &str, origin: &Path, line_no: usize) -> Result<(String, String), ConfigError> {
    let chars: Vec<char> = line.chars().collect();
    let mut i = 0;
    let mut key_end = chars.len();

    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            '=' | ':' | ' ' | '\t' | '\u{c}' => {
                key_end = i;
                break;
            }
            _ => i += 1,
        }
    }
    let key_end = key_end.min(chars.len());

    // Skip whitespace, at most one separator, then whitespace again.
    let mut value_start = key_end;
    while value_start < chars.len() && matches!(chars[value_start], ' ' | '\t' | '\u{c}') {
        value_start += 1;
    }
    if value_start < chars.len() && matches!(chars[value_start], '=' | ':') {
        value_start += 1;
        while value_start < chars.len() && matches!(chars[value_start], ' ' | '\t' | '\u{c}') {
            value_start += 1;
        }
    }

    let raw_key: String = chars[..key_end].iter().collect();
    let raw_value: String = chars[value_start..].iter().collect();

    let error = |reason: String| ConfigError::ParseError {
        path: origin.to_path_buf(),
        line: line_no,
        reason,
    };

    Ok((
        unescape(&raw_key).map_err(error)?,
        unescape(&raw_value).map_err(error)?,
    ))
}

fn unescape(s: &str) -> Result<String, String> {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{c}'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                let code = (hex.len() == 4)
                    .then(|| u32::from_str_radix(&hex, 16).ok())
                    .flatten()
                    .and_then(char::from_u32)
                    .ok_or_else(|| format!("malformed \\u escape: \\u{hex}"))?;
                out.push(code);
            }
            Some(other) => out.push(other),
            None => {}
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Properties {
        Properties::parse(text, Path::new("test.properties")).unwrap()
    }

    #[test]
    fn test_separators() {
        let props = parse("a=1\nb: 2\nc 3\nd = four five\n");
        assert_eq!(props.get("a"), Some("1"));
        assert_eq!(props.get("b"), Some("2"));
        assert_eq!(props.get("c"), Some("3"));
        assert_eq!(props.get("d"), Some("four five"));
    }

    #[test]
    fn test_comments_and_blank_lines() {
        let props = parse("# comment\n\n! also comment\n   \nkey=value\n");
        assert_eq!(props.len(), 1);
        assert_eq!(props.get("key"), Some("value"));
    }

    #[test]
    fn test_line_continuation() {
        let props = parse("names=alpha, \\\n      beta, \\\n      gamma\nnext=1\n");
        assert_eq!(props.get("names"), Some("alpha, beta, gamma"));
        assert_eq!(props.get("next"), Some("1"));
    }

    #[test]
    fn test_escaped_backslash_is_not_continuation() {
        let props = parse("path=C:\\\\temp\\\\\nother=x\n");
        assert_eq!(props.get("path"), Some("C:\\temp\\"));
        assert_eq!(props.get("other"), Some("x"));
    }

    #[test]
    fn test_escapes() {
        let props = parse("key\\=with\\:seps=tab\\there\nsnow=\\u2603\n");
        assert_eq!(props.get("key=with:seps"), Some("tab\there"));
        assert_eq!(props.get("snow"), Some("\u{2603}"));
    }

    #[test]
    fn test_empty_value() {
        let props = parse("empty=\nbare\n");
        assert_eq!(props.get("empty"), Some(""));
        assert_eq!(props.get("bare"), Some(""));
    }

    #[test]
    fn test_bad_unicode_escape() {
        let result = Properties::parse("ok=1\nbad=\\u12\n", Path::new("x.properties"));
        assert!(matches!(result, Err(ConfigError::ParseError { line: 2, .. })));
    }

    #[test]
    fn test_reinserted_key_moves_to_end() {
        let props = parse("a=1\nb=2\na=3\n");
        let pairs: Vec<_> = props.iter().collect();
        assert_eq!(pairs, vec![("b", "2"), ("a", "3")]);
    }
}
