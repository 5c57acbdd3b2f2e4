//! Filter-state-to-URL composition.
//!
//! Two mutually exclusive shapes:
//!
//! - deep link (course sessions): `{base}?courseSessionId={id}[&courseOptionId={opt}]`
//! - filtered query (everything else):
//!   `{base}?{param}={name}[&Location={location}][&filters={json}]`
//!
//! Display names and locations use `encodeURI`-style escaping, which leaves
//! URL structure characters (`&`, `=`, `/`, `?`, ...) alone. The embedded
//! filter JSON is appended as-is; only its instructor and grade strings are
//! escaped.

use std::sync::LazyLock;

use chrono::NaiveDate;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use regex::Regex;
use regurl_model::{DayOfWeek, FacetConfig, FilterState};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Characters `encodeURI` leaves unescaped besides ASCII alphanumerics.
const URI_RESERVED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b';')
    .remove(b',')
    .remove(b'/')
    .remove(b'?')
    .remove(b':')
    .remove(b'@')
    .remove(b'&')
    .remove(b'=')
    .remove(b'+')
    .remove(b'$')
    .remove(b'#');

/// Scheme-qualified or protocol-relative URL prefix.
static ABSOLUTE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:[a-z+]+:)?//").expect("Invalid absolute URL regex"));

/// Percent-encode with `encodeURI` semantics.
pub fn encode_uri(value: &str) -> String {
    utf8_percent_encode(value, URI_RESERVED).to_string()
}

/// Join the community URL and an optional registration path.
///
/// A path that is already a full (or protocol-relative) URL replaces the
/// base outright. Otherwise it is absolutized and a leading `/s/` site
/// prefix loses its `/s`.
pub fn construct_base_url(community_url: Option<&str>, registration_path: Option<&str>) -> String {
    let mut result = community_url.unwrap_or_default().to_string();
    let Some(path) = registration_path.filter(|path| !path.is_empty()) else {
        return result;
    };
    if ABSOLUTE_URL.is_match(path) {
        return path.to_string();
    }
    let path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    };
    match path.strip_prefix("/s") {
        Some(rest) if rest.starts_with('/') => result.push_str(rest),
        _ => result.push_str(&path),
    }
    result
}

/// The JSON object carried in the `filters` query parameter.
///
/// Field order is the serialized key order. Absent keys are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmbeddedFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_range: Option<(Option<NaiveDate>, Option<NaiveDate>)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_range: Option<(Option<String>, Option<String>)>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub day_of_week: Vec<DayOfWeek>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
}

impl EmbeddedFilters {
    /// Collect the secondary filters that are set and whose facet is enabled.
    pub fn from_state(filters: &FilterState, facets: &FacetConfig) -> Self {
        let date_range = (facets.date_range
            && (filters.start_date.is_some() || filters.end_date.is_some()))
        .then_some((filters.start_date, filters.end_date));
        let time_range = (facets.time_range
            && (filters.start_time.is_some() || filters.end_time.is_some()))
        .then(|| (filters.start_time.clone(), filters.end_time.clone()));

        Self {
            session: filters.session.clone().filter(|_| facets.session),
            date_range,
            time_range,
            day_of_week: if facets.day_of_week {
                filters.day_of_week.clone()
            } else {
                Vec::new()
            },
            age: filters.effective_age().filter(|_| facets.age),
            instructor: filters
                .instructor
                .as_deref()
                .filter(|_| facets.instructor)
                .map(encode_uri),
            grade: filters
                .grade
                .as_deref()
                .filter(|_| facets.grade)
                .map(encode_uri),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// True when any secondary filter would be embedded.
pub fn has_filters(filters: &FilterState, facets: &FacetConfig) -> bool {
    !EmbeddedFilters::from_state(filters, facets).is_empty()
}

/// Everything a URL is composed from.
#[derive(Debug, Clone, Copy)]
pub struct UrlInputs<'a> {
    pub base_url: &'a str,
    pub record_id: &'a str,
    pub is_course_session: bool,
    pub filter_param_name: &'a str,
    pub display_name: Option<&'a str>,
    pub filters: &'a FilterState,
    pub facets: &'a FacetConfig,
}

/// Compose the canonical URL for the current inputs.
///
/// An empty base still yields a string; callers decide whether it is worth
/// acting on.
pub fn compose_url(inputs: &UrlInputs<'_>) -> String {
    if inputs.is_course_session {
        deep_link_url(inputs.base_url, inputs.record_id, inputs.filters, inputs.facets)
    } else {
        filtered_url(
            inputs.base_url,
            inputs.filter_param_name,
            inputs.display_name,
            inputs.filters,
            inputs.facets,
        )
    }
}

/// Session deep link. Only the course option is honoured.
pub fn deep_link_url(
    base_url: &str,
    record_id: &str,
    filters: &FilterState,
    facets: &FacetConfig,
) -> String {
    let mut url = format!("{base_url}?courseSessionId={record_id}");
    if let Some(option_id) = filters
        .course_option_id
        .as_deref()
        .filter(|_| facets.course_option)
    {
        url.push_str("&courseOptionId=");
        url.push_str(option_id);
    }
    url
}

pub fn filtered_url(
    base_url: &str,
    filter_param_name: &str,
    display_name: Option<&str>,
    filters: &FilterState,
    facets: &FacetConfig,
) -> String {
    let mut url = format!(
        "{base_url}?{filter_param_name}={}",
        encode_uri(display_name.unwrap_or_default())
    );
    if let Some(location) = filters.location.as_deref().filter(|_| facets.location) {
        url.push_str("&Location=");
        url.push_str(&encode_uri(location));
    }
    let embedded = EmbeddedFilters::from_state(filters, facets);
    if !embedded.is_empty() {
        match embedded.to_json() {
            Ok(json) => {
                url.push_str("&filters=");
                url.push_str(&json);
            }
            Err(error) => warn!(error = %error, "could not serialize embedded filters"),
        }
    }
    url
}
