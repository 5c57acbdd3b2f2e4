use thiserror::Error;

use crate::filters::FilterField;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("unknown filter field: {0}")]
    UnknownField(String),
    #[error("unknown day of week: {0}")]
    UnknownDay(String),
    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: FilterField, value: String },
    #[error("{field} expects a {expected} input, got {found}")]
    InputKindMismatch {
        field: FilterField,
        expected: &'static str,
        found: &'static str,
    },
    #[error("filter facet is disabled: {0}")]
    FacetDisabled(FilterField),
}

pub type Result<T> = std::result::Result<T, ModelError>;
