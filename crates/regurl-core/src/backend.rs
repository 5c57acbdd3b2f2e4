//! Backend query contract.
//!
//! The builder never talks to storage directly; it goes through a
//! [`RegistrationBackend`] so hosts can plug in whatever transport they use.

use std::collections::BTreeMap;

use async_trait::async_trait;
use regurl_model::RawRow;
use thiserror::Error;

/// Errors a backend query can fail with.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum BackendError {
    /// The query ran and reported one or more errors.
    #[error("query failed: {}", .0.join(", "))]
    Query(Vec<String>),

    /// The requested record does not exist.
    #[error("record not found: {0}")]
    NotFound(String),

    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(String),

    /// Failure without a usable body.
    #[error("unknown error")]
    Unknown,
}

impl BackendError {
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query(vec![message.into()])
    }

    /// Message suitable for a user-facing notification.
    ///
    /// A batch of query errors is joined with `", "`; anything without a
    /// message body reads as "Unknown error".
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Query(messages) if !messages.is_empty() => messages.join(", "),
            Self::NotFound(record_id) => format!("Record {record_id} was not found"),
            Self::Transport(message) if !message.is_empty() => message.clone(),
            Self::Query(_) | Self::Transport(_) | Self::Unknown => "Unknown error".to_string(),
        }
    }
}

/// Field values of a single record, keyed by qualified field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFields(BTreeMap<String, String>);

impl RecordFields {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }
}

impl FromIterator<(String, String)> for RecordFields {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Queries the builder issues against the host system.
#[async_trait]
pub trait RegistrationBackend: Send + Sync {
    /// Community site URL the registration path is joined onto.
    async fn base_url(&self) -> Result<Option<String>, BackendError>;

    async fn available_sessions(&self) -> Result<Vec<RawRow>, BackendError>;

    async fn available_locations(&self) -> Result<Vec<RawRow>, BackendError>;

    /// Purchasable options of one course session.
    async fn course_options(
        &self,
        course_session_id: &str,
        show_unavailable: bool,
    ) -> Result<Vec<RawRow>, BackendError>;

    async fn available_instructors(&self, record_id: &str) -> Result<Vec<RawRow>, BackendError>;

    async fn available_grades(&self) -> Result<Vec<RawRow>, BackendError>;

    /// Fetch the requested fields of one record.
    async fn record(&self, record_id: &str, fields: &[String])
    -> Result<RecordFields, BackendError>;
}
