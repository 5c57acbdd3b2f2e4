//! Data model for building shareable registration URLs.

pub mod error;
pub mod facets;
pub mod filters;
pub mod object_type;
pub mod options;

pub use error::{ModelError, Result};
pub use facets::FacetConfig;
pub use filters::{DayOfWeek, FilterField, FilterInput, FilterState};
pub use object_type::{
    COURSE_API_NAME, COURSE_SESSION_API_NAME, ObjectType, ObjectTypeConfig, PROGRAM_API_NAME,
    name_field,
};
pub use options::{RawRow, ReferenceOption, ValueSource, normalize_rows};
