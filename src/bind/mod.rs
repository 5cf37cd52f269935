//! Binding flat properties onto typed values.

mod binder;
mod convert;
mod schema;

pub use binder::Binder;
pub use convert::{convert_date_time, parse_date_time, ConvertFn, ConverterRegistry};
pub use schema::{Bindable, EntitySchema, FieldSpec, Shape, Target, TypeTag};
