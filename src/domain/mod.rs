//! The application's bound configuration.

mod brand;

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::bind::{Bindable, EntitySchema, FieldSpec, Shape, Target};

pub use brand::Brand;

/// Everything bound from keys under `application`.
///
/// ```properties
/// application.mapOfBrands.acme.id=1
/// application.mapOfBrands.acme.name=Acme
/// application.listOfBrands[0].dateCreated=2023-05-01T10:00:00Z
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationProperties {
    #[serde(default)]
    pub map_of_brands: BTreeMap<String, Brand>,
    /// In ascending index order.
    #[serde(default)]
    pub list_of_brands: Vec<Brand>,
}

impl Bindable for ApplicationProperties {
    fn target() -> Target {
        Target::new(
            "application",
            EntitySchema::new("ApplicationProperties")
                .field(FieldSpec::optional(
                    "mapOfBrands",
                    Shape::map_of(Shape::Entity(Brand::schema())),
                ))
                .field(FieldSpec::optional(
                    "listOfBrands",
                    Shape::list_of(Shape::Entity(Brand::schema())),
                )),
        )
    }
}
