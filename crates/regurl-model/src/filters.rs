//! User-selected narrowing criteria.
//!
//! `FilterState` is a typed record. UI controls address it by control name
//! through [`FilterField`] and [`FilterState::set`]; everything else reads the
//! fields directly.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::facets::FacetConfig;
use crate::options::ReferenceOption;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DayOfWeek {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl DayOfWeek {
    pub const ALL: [Self; 7] = [
        Self::Sunday,
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Sunday => "Sunday",
            Self::Monday => "Monday",
            Self::Tuesday => "Tuesday",
            Self::Wednesday => "Wednesday",
            Self::Thursday => "Thursday",
            Self::Friday => "Friday",
            Self::Saturday => "Saturday",
        }
    }

    /// Options for the day-of-week multi-select, Sunday first.
    pub fn options() -> Vec<ReferenceOption> {
        Self::ALL
            .into_iter()
            .map(|day| ReferenceOption::same(day.name()))
            .collect()
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DayOfWeek {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|day| day.name() == s)
            .ok_or_else(|| ModelError::UnknownDay(s.to_string()))
    }
}

/// Closed set of filter fields, named after their input controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterField {
    Location,
    Session,
    StartDate,
    EndDate,
    StartTime,
    EndTime,
    DayOfWeek,
    Age,
    CourseOptionId,
    ShowUnavailableCourseOptions,
    Instructor,
    Grade,
}

impl FilterField {
    pub const ALL: [Self; 12] = [
        Self::Location,
        Self::Session,
        Self::StartDate,
        Self::EndDate,
        Self::StartTime,
        Self::EndTime,
        Self::DayOfWeek,
        Self::Age,
        Self::CourseOptionId,
        Self::ShowUnavailableCourseOptions,
        Self::Instructor,
        Self::Grade,
    ];

    pub fn control_name(self) -> &'static str {
        match self {
            Self::Location => "Location",
            Self::Session => "session",
            Self::StartDate => "startDate",
            Self::EndDate => "endDate",
            Self::StartTime => "startTime",
            Self::EndTime => "endTime",
            Self::DayOfWeek => "dayOfWeek",
            Self::Age => "age",
            Self::CourseOptionId => "courseOptionId",
            Self::ShowUnavailableCourseOptions => "showUnavailableCourseOptions",
            Self::Instructor => "instructor",
            Self::Grade => "grade",
        }
    }

    /// True for fields driven by a checkbox control.
    pub fn is_checkbox(self) -> bool {
        matches!(self, Self::ShowUnavailableCourseOptions)
    }
}

impl fmt::Display for FilterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.control_name())
    }
}

impl FromStr for FilterField {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|field| field.control_name() == s)
            .ok_or_else(|| ModelError::UnknownField(s.to_string()))
    }
}

/// Raw value coming out of an input control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterInput {
    /// Text, date, time, number and combobox controls.
    Text(String),
    /// Checkbox controls.
    Checked(bool),
    /// Multi-select controls.
    Multi(Vec<String>),
}

impl FilterInput {
    fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Checked(_) => "checkbox",
            Self::Multi(_) => "multi-select",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    pub location: Option<String>,
    pub session: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Times are validated but kept exactly as the control supplied them.
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    /// Selection order is kept so serialization is deterministic.
    pub day_of_week: Vec<DayOfWeek>,
    /// Zero counts as "no age filter" when composing URLs.
    pub age: Option<u32>,
    pub course_option_id: Option<String>,
    pub show_unavailable_course_options: bool,
    pub instructor: Option<String>,
    pub grade: Option<String>,
}

impl FilterState {
    /// The zero-value record a fresh or refreshed builder starts from.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::empty()
    }

    /// Replace the whole record with a fresh empty value.
    pub fn reset(&mut self) {
        *self = Self::empty();
    }

    /// Age filter as applied to URLs; zero means unset.
    pub fn effective_age(&self) -> Option<u32> {
        self.age.filter(|age| *age != 0)
    }

    /// Set one field, rejecting fields whose facet is disabled.
    pub fn set_with(
        &mut self,
        facets: &FacetConfig,
        field: FilterField,
        input: FilterInput,
    ) -> Result<()> {
        if !facets.allows(field) {
            return Err(ModelError::FacetDisabled(field));
        }
        self.set(field, input)
    }

    /// Set one field from a control value.
    ///
    /// Checkbox fields take `Checked`, the day-of-week field takes `Multi`,
    /// everything else takes `Text`. An empty text value clears the field.
    pub fn set(&mut self, field: FilterField, input: FilterInput) -> Result<()> {
        match (field, input) {
            (FilterField::ShowUnavailableCourseOptions, FilterInput::Checked(checked)) => {
                self.show_unavailable_course_options = checked;
            }
            (FilterField::DayOfWeek, FilterInput::Multi(values)) => {
                let mut days = Vec::with_capacity(values.len());
                for value in values {
                    let day = value.parse::<DayOfWeek>()?;
                    if !days.contains(&day) {
                        days.push(day);
                    }
                }
                self.day_of_week = days;
            }
            (field, FilterInput::Text(value))
                if !field.is_checkbox() && field != FilterField::DayOfWeek =>
            {
                self.set_text(field, value)?;
            }
            (field, input) => {
                return Err(ModelError::InputKindMismatch {
                    field,
                    expected: expected_kind(field),
                    found: input.kind(),
                });
            }
        }
        Ok(())
    }

    fn set_text(&mut self, field: FilterField, value: String) -> Result<()> {
        // Free text keeps whitespace-only values; typed inputs treat them as cleared.
        let present = (!value.is_empty()).then_some(value);
        let typed = present.clone().filter(|raw| !raw.trim().is_empty());
        match field {
            FilterField::Location => self.location = present,
            FilterField::Session => self.session = present,
            FilterField::CourseOptionId => self.course_option_id = present,
            FilterField::Instructor => self.instructor = present,
            FilterField::Grade => self.grade = present,
            FilterField::StartDate => self.start_date = parse_opt(field, typed, parse_date)?,
            FilterField::EndDate => self.end_date = parse_opt(field, typed, parse_date)?,
            FilterField::StartTime => self.start_time = validate_time(field, typed)?,
            FilterField::EndTime => self.end_time = validate_time(field, typed)?,
            FilterField::Age => {
                self.age = parse_opt(field, typed, |raw| raw.trim().parse::<u32>().ok())?;
            }
            FilterField::DayOfWeek | FilterField::ShowUnavailableCourseOptions => {
                return Err(ModelError::InputKindMismatch {
                    field,
                    expected: expected_kind(field),
                    found: "text",
                });
            }
        }
        Ok(())
    }
}

fn expected_kind(field: FilterField) -> &'static str {
    if field.is_checkbox() {
        "checkbox"
    } else if field == FilterField::DayOfWeek {
        "multi-select"
    } else {
        "text"
    }
}

fn parse_opt<T>(
    field: FilterField,
    value: Option<String>,
    parse: impl FnOnce(&str) -> Option<T>,
) -> Result<Option<T>> {
    match value {
        None => Ok(None),
        Some(raw) => parse(&raw)
            .map(Some)
            .ok_or(ModelError::InvalidValue { field, value: raw }),
    }
}

fn validate_time(field: FilterField, value: Option<String>) -> Result<Option<String>> {
    match value {
        Some(raw) if parse_time(&raw).is_none() => {
            Err(ModelError::InvalidValue { field, value: raw })
        }
        value => Ok(value),
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

/// Accepts `HH:MM`, `HH:MM:SS` and the `HH:MM:SS.sssZ` form time inputs emit.
fn parse_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim().trim_end_matches('Z');
    NaiveTime::parse_from_str(raw, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .ok()
}
