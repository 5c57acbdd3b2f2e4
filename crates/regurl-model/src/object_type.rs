//! Record types the builder knows how to link to.
//!
//! Each supported record type maps to the field path used to look up its
//! display name and the query parameter that filters the registration site
//! by that name.

use serde::{Deserialize, Serialize};

pub const PROGRAM_API_NAME: &str = "TREX1__Program__c";
pub const COURSE_API_NAME: &str = "TREX1__Course__c";
pub const COURSE_SESSION_API_NAME: &str = "TREX1__Course_Session__c";

/// Supported record types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectType {
    Program,
    Course,
    CourseSession,
}

impl ObjectType {
    pub const ALL: [Self; 3] = [Self::Program, Self::Course, Self::CourseSession];

    /// Resolve an object API name. Unknown names yield `None`.
    pub fn from_api_name(api_name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|object_type| object_type.api_name() == api_name)
    }

    pub fn api_name(self) -> &'static str {
        match self {
            Self::Program => PROGRAM_API_NAME,
            Self::Course => COURSE_API_NAME,
            Self::CourseSession => COURSE_SESSION_API_NAME,
        }
    }

    pub fn filter_param_name(self) -> &'static str {
        match self {
            Self::Program => "program",
            Self::Course => "course",
            Self::CourseSession => "courseSession",
        }
    }
}

/// Display-field path and filter parameter for one record type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectTypeConfig {
    /// Qualified field names, e.g. `TREX1__Course__c.Name`.
    pub fields: Vec<String>,
    /// Query parameter name used to filter by the record's display name.
    pub filter_name: String,
}

impl ObjectTypeConfig {
    /// Look up the configuration for an object API name.
    ///
    /// Unknown names resolve to an empty field list and an empty filter name
    /// so callers degrade instead of failing.
    pub fn resolve(api_name: &str) -> Self {
        ObjectType::from_api_name(api_name)
            .map(Self::for_type)
            .unwrap_or_default()
    }

    pub fn for_type(object_type: ObjectType) -> Self {
        Self {
            fields: vec![name_field(object_type.api_name())],
            filter_name: object_type.filter_param_name().to_string(),
        }
    }

    /// True when the display-name lookup has nothing to ask for.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.filter_name.is_empty()
    }
}

/// Qualified `Name` field for an object API name.
pub fn name_field(api_name: &str) -> String {
    format!("{api_name}.Name")
}
