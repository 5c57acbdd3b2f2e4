//! Selectable reference options and normalization of raw backend rows.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// One selectable value in a filter control.
///
/// `value` is what ends up in the generated URL or filter state; `label` is
/// display-only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReferenceOption {
    pub label: String,
    pub value: String,
}

impl ReferenceOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }

    /// Option whose label and value are the same string.
    pub fn same(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            label: name.clone(),
            value: name,
        }
    }
}

/// A row as returned by the backend.
///
/// Newer queries already return `{label, value}`; older ones return the raw
/// record shape with `Name` and optionally `Id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawRow {
    Option(ReferenceOption),
    Record {
        #[serde(rename = "Name")]
        name: String,
        #[serde(rename = "Id", default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
    },
}

impl RawRow {
    pub fn record(name: impl Into<String>, id: Option<&str>) -> Self {
        Self::Record {
            name: name.into(),
            id: id.map(str::to_string),
        }
    }
}

/// Which raw field becomes the option value for a record-shaped row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
    Name,
    Id,
}

/// Normalize raw rows into options.
///
/// Option-shaped rows pass through untouched. Record-shaped rows map
/// `Name` to the label and `Name` or `Id` to the value; a row missing its
/// `Id` when one is required is dropped.
pub fn normalize_rows(rows: Vec<RawRow>, source: ValueSource) -> Vec<ReferenceOption> {
    rows.into_iter()
        .filter_map(|row| match row {
            RawRow::Option(option) => Some(option),
            RawRow::Record { name, id } => match source {
                ValueSource::Name => Some(ReferenceOption::same(name)),
                ValueSource::Id => match id {
                    Some(id) => Some(ReferenceOption::new(name, id)),
                    None => {
                        warn!(name = %name, "dropping row without Id");
                        None
                    }
                },
            },
        })
        .collect()
}
