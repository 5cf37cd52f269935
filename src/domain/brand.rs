use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::Deserialize;

use crate::bind::{EntitySchema, FieldSpec, Shape, TypeTag};

/// A brand read from configuration.
///
/// Every field is optional: a key missing from the source leaves the field
/// unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Brand {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub date_created: Option<DateTime<FixedOffset>>,
}

impl Brand {
    pub fn schema() -> EntitySchema {
        EntitySchema::new("Brand")
            .field(FieldSpec::optional("id", Shape::Scalar(TypeTag::Integer)))
            .field(FieldSpec::optional("name", Shape::Scalar(TypeTag::String)))
            .field(FieldSpec::optional(
                "dateCreated",
                Shape::Scalar(TypeTag::DATE_TIME),
            ))
    }
}

impl fmt::Display for Brand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn or_unset<T: fmt::Display>(value: &Option<T>) -> String {
            value
                .as_ref()
                .map_or_else(|| "<unset>".to_string(), ToString::to_string)
        }

        write!(
            f,
            "Brand(id={}, name={}, dateCreated={})",
            or_unset(&self.id),
            or_unset(&self.name),
            self.date_created
                .map_or_else(|| "<unset>".to_string(), |d| d.to_rfc3339())
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let brand = Brand {
            id: Some(1),
            name: Some("Acme".into()),
            date_created: DateTime::parse_from_rfc3339("2023-05-01T10:00:00Z").ok(),
        };
        assert_eq!(
            brand.to_string(),
            "Brand(id=1, name=Acme, dateCreated=2023-05-01T10:00:00+00:00)"
        );
        assert_eq!(
            Brand::default().to_string(),
            "Brand(id=<unset>, name=<unset>, dateCreated=<unset>)"
        );
    }

    #[test]
    fn test_schema_field_names_match_serde_names() {
        let names: Vec<_> = Brand::schema().fields.into_iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["id", "name", "dateCreated"]);
    }
}
