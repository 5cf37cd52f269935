//! Property key paths.
//!
//! A key such as `application.listOfBrands[0].dateCreated` is split into
//! segments: dotted names and bracketed elements. Names are compared with
//! relaxed rules (ASCII case, `-` and `_` ignored) so that
//! `application.map-of-brands` and `APPLICATION_MAP_OF_BRANDS` address the
//! same field. Bracketed elements are kept verbatim.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// A dotted name segment.
    Name(String),
    /// A bracketed segment, `[0]` or `[some.key]`.
    Element(String),
}

impl Segment {
    pub fn text(&self) -> &str {
        match self {
            Segment::Name(s) | Segment::Element(s) => s,
        }
    }

    /// Returns true if this is a name segment matching `field`.
    pub fn matches_name(&self, field: &str) -> bool {
        match self {
            Segment::Name(s) => canonical(s) == canonical(field),
            Segment::Element(_) => false,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Name(s) => f.write_str(s),
            Segment::Element(s) => write!(f, "[{s}]"),
        }
    }
}

/// A parsed property key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyPath {
    segments: Vec<Segment>,
}

impl PropertyPath {
    pub fn parse(key: &str) -> Result<Self, String> {
        let mut segments = Vec::new();
        let mut current = String::new();
        let mut chars = key.chars();
        // `]` may only be followed by `.` or `[`.
        let mut after_bracket = false;
        // Set after a `.` until the next name character.
        let mut expect_name = false;

        while let Some(ch) = chars.next() {
            match ch {
                '.' => {
                    if !current.is_empty() {
                        segments.push(Segment::Name(std::mem::take(&mut current)));
                    } else if !after_bracket {
                        return Err("empty name segment".to_string());
                    }
                    after_bracket = false;
                    expect_name = true;
                }
                '[' => {
                    if !current.is_empty() {
                        segments.push(Segment::Name(std::mem::take(&mut current)));
                    } else if segments.is_empty() {
                        return Err("key cannot start with '['".to_string());
                    } else if expect_name {
                        return Err("empty name segment".to_string());
                    }
                    let mut element = String::new();
                    let mut closed = false;
                    for c in chars.by_ref() {
                        if c == ']' {
                            closed = true;
                            break;
                        }
                        element.push(c);
                    }
                    if !closed {
                        return Err("unclosed '['".to_string());
                    }
                    segments.push(Segment::Element(element));
                    after_bracket = true;
                    expect_name = false;
                }
                ']' => return Err("unexpected ']'".to_string()),
                _ => {
                    if after_bracket {
                        return Err(format!("expected '.' or '[' after ']', found '{ch}'"));
                    }
                    current.push(ch);
                    expect_name = false;
                }
            }
        }

        if !current.is_empty() {
            segments.push(Segment::Name(current));
        } else if segments.is_empty() {
            return Err("empty key".to_string());
        } else if expect_name {
            return Err("key ends with '.'".to_string());
        }

        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 && matches!(segment, Segment::Name(_)) {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

/// Lowercased form with `-` and `_` removed.
pub fn canonical(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '-' && *c != '_')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
