//! In-memory backend fed from a JSON document.
//!
//! ```json
//! {
//!   "baseUrl": "https://club.example.com/s",
//!   "sessions": [{"label": "Fall 2024", "value": "Fall 2024"}],
//!   "locations": [{"Name": "Main Pool", "Id": "a0L1"}],
//!   "courseOptions": {"a01": [{"Name": "Mornings", "Id": "opt1", "available": false}]},
//!   "instructors": {"a01": [{"Name": "Jo"}]},
//!   "grades": [],
//!   "records": {"a01": {"TREX1__Course_Session__c.Name": "Beginner Swim"}},
//!   "failures": {"grades": ["Grade query failed"]}
//! }
//! ```

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use regurl_model::{RawRow, ReferenceOption};
use serde::Deserialize;

use crate::backend::{BackendError, RecordFields, RegistrationBackend};
use crate::loader::ChannelKind;

/// A course option row plus its availability.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CourseOptionRow {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    #[serde(rename = "Id", default)]
    pub id: Option<String>,
    #[serde(default = "available_by_default")]
    pub available: bool,
}

fn available_by_default() -> bool {
    true
}

impl CourseOptionRow {
    fn to_raw(&self) -> Option<RawRow> {
        match (&self.label, &self.value, &self.name) {
            (Some(label), Some(value), _) => {
                Some(RawRow::Option(ReferenceOption::new(label, value)))
            }
            (_, _, Some(name)) => Some(RawRow::record(name, self.id.as_deref())),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FixtureBackend {
    pub base_url: Option<String>,
    pub sessions: Vec<RawRow>,
    pub locations: Vec<RawRow>,
    pub course_options: BTreeMap<String, Vec<CourseOptionRow>>,
    pub instructors: BTreeMap<String, Vec<RawRow>>,
    pub grades: Vec<RawRow>,
    pub records: BTreeMap<String, BTreeMap<String, String>>,
    /// Channel name to the error messages its query fails with.
    pub failures: BTreeMap<String, Vec<String>>,
    #[serde(skip)]
    delays: BTreeMap<ChannelKind, Duration>,
}

impl FixtureBackend {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Make every query of `kind` wait `delay` before answering.
    #[must_use]
    pub fn with_delay(mut self, kind: ChannelKind, delay: Duration) -> Self {
        self.delays.insert(kind, delay);
        self
    }

    /// Make every query of `kind` fail with `messages`.
    #[must_use]
    pub fn with_failure(mut self, kind: ChannelKind, messages: &[&str]) -> Self {
        self.failures.insert(
            kind.name().to_string(),
            messages.iter().map(|message| (*message).to_string()).collect(),
        );
        self
    }

    async fn answer<T>(
        &self,
        kind: ChannelKind,
        value: impl FnOnce() -> Result<T, BackendError>,
    ) -> Result<T, BackendError> {
        if let Some(delay) = self.delays.get(&kind) {
            tokio::time::sleep(*delay).await;
        }
        if let Some(messages) = self.failures.get(kind.name()) {
            return Err(BackendError::Query(messages.clone()));
        }
        value()
    }
}

#[async_trait]
impl RegistrationBackend for FixtureBackend {
    async fn base_url(&self) -> Result<Option<String>, BackendError> {
        self.answer(ChannelKind::BaseUrl, || Ok(self.base_url.clone()))
            .await
    }

    async fn available_sessions(&self) -> Result<Vec<RawRow>, BackendError> {
        self.answer(ChannelKind::Sessions, || Ok(self.sessions.clone()))
            .await
    }

    async fn available_locations(&self) -> Result<Vec<RawRow>, BackendError> {
        self.answer(ChannelKind::Locations, || Ok(self.locations.clone()))
            .await
    }

    async fn course_options(
        &self,
        course_session_id: &str,
        show_unavailable: bool,
    ) -> Result<Vec<RawRow>, BackendError> {
        self.answer(ChannelKind::CourseOptions, || {
            Ok(self
                .course_options
                .get(course_session_id)
                .into_iter()
                .flatten()
                .filter(|row| show_unavailable || row.available)
                .filter_map(CourseOptionRow::to_raw)
                .collect())
        })
        .await
    }

    async fn available_instructors(&self, record_id: &str) -> Result<Vec<RawRow>, BackendError> {
        self.answer(ChannelKind::Instructors, || {
            Ok(self.instructors.get(record_id).cloned().unwrap_or_default())
        })
        .await
    }

    async fn available_grades(&self) -> Result<Vec<RawRow>, BackendError> {
        self.answer(ChannelKind::Grades, || Ok(self.grades.clone()))
            .await
    }

    async fn record(
        &self,
        record_id: &str,
        fields: &[String],
    ) -> Result<RecordFields, BackendError> {
        self.answer(ChannelKind::Record, || {
            let values = self
                .records
                .get(record_id)
                .ok_or_else(|| BackendError::NotFound(record_id.to_string()))?;
            Ok(fields
                .iter()
                .filter_map(|field| {
                    values
                        .get(field)
                        .map(|value| (field.clone(), value.clone()))
                })
                .collect())
        })
        .await
    }
}
