//! Per-facet toggles for the filter model.

use serde::{Deserialize, Serialize};

use crate::filters::FilterField;

/// Which filter facets are offered.
///
/// Every facet is enabled by default. A disabled facet rejects edits, is
/// never written into a URL, and its reference dataset is not fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FacetConfig {
    pub session: bool,
    pub location: bool,
    pub date_range: bool,
    pub time_range: bool,
    pub day_of_week: bool,
    pub age: bool,
    pub instructor: bool,
    pub grade: bool,
    pub course_option: bool,
}

impl Default for FacetConfig {
    fn default() -> Self {
        Self::all()
    }
}

impl FacetConfig {
    pub const fn all() -> Self {
        Self {
            session: true,
            location: true,
            date_range: true,
            time_range: true,
            day_of_week: true,
            age: true,
            instructor: true,
            grade: true,
            course_option: true,
        }
    }

    pub fn allows(&self, field: FilterField) -> bool {
        match field {
            FilterField::Location => self.location,
            FilterField::Session => self.session,
            FilterField::StartDate | FilterField::EndDate => self.date_range,
            FilterField::StartTime | FilterField::EndTime => self.time_range,
            FilterField::DayOfWeek => self.day_of_week,
            FilterField::Age => self.age,
            FilterField::CourseOptionId | FilterField::ShowUnavailableCourseOptions => {
                self.course_option
            }
            FilterField::Instructor => self.instructor,
            FilterField::Grade => self.grade,
        }
    }
}
