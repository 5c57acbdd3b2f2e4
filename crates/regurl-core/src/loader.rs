//! Coordinated loading of the reference datasets behind the filter controls.
//!
//! Every dataset is a channel with its own [`LoadState`]. Fetches run as
//! tasks on the current tokio runtime and complete in any order; each issue
//! stamps the channel with a fresh [`RequestToken`] and completions carrying
//! an older token are discarded, so a channel always shows the latest result
//! for its current parameters.
//!
//! The course-option channel is keyed by `(record id, show unavailable)` and
//! refetches only when that key changes.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use regurl_model::{
    COURSE_SESSION_API_NAME, FacetConfig, ObjectTypeConfig, RawRow, ReferenceOption, ValueSource,
    name_field, normalize_rows,
};
use tokio::task::{Id as TaskId, JoinSet};
use tracing::{debug, warn};

use crate::backend::{BackendError, RecordFields, RegistrationBackend};
use crate::notify::{Notifier, Toast};

/// Identity of the record the builder was opened on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordContext {
    pub record_id: String,
    pub object_api_name: String,
}

impl RecordContext {
    pub fn new(record_id: impl Into<String>, object_api_name: impl Into<String>) -> Self {
        Self {
            record_id: record_id.into(),
            object_api_name: object_api_name.into(),
        }
    }

    pub fn config(&self) -> ObjectTypeConfig {
        ObjectTypeConfig::resolve(&self.object_api_name)
    }

    pub fn is_course_session(&self) -> bool {
        self.object_api_name == COURSE_SESSION_API_NAME
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChannelKind {
    Record,
    BaseUrl,
    Sessions,
    Locations,
    CourseOptions,
    Instructors,
    Grades,
}

impl ChannelKind {
    pub const ALL: [Self; 7] = [
        Self::Record,
        Self::BaseUrl,
        Self::Sessions,
        Self::Locations,
        Self::CourseOptions,
        Self::Instructors,
        Self::Grades,
    ];

    /// Channels re-triggered by a refresh; the record lookup is not one.
    pub const REFERENCE: [Self; 6] = [
        Self::BaseUrl,
        Self::Sessions,
        Self::Locations,
        Self::CourseOptions,
        Self::Instructors,
        Self::Grades,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Record => "record",
            Self::BaseUrl => "base_url",
            Self::Sessions => "sessions",
            Self::Locations => "locations",
            Self::CourseOptions => "course_options",
            Self::Instructors => "instructors",
            Self::Grades => "grades",
        }
    }

    fn value_source(self) -> ValueSource {
        match self {
            Self::CourseOptions => ValueSource::Id,
            _ => ValueSource::Name,
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Lifecycle of one channel.
///
/// `Idle` channels were never issued because they do not apply to the
/// current record or facet configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadState<T> {
    #[default]
    Idle,
    Loading,
    Ready(T),
    Errored(BackendError),
}

impl<T> LoadState<T> {
    pub fn status(&self) -> ChannelStatus {
        match self {
            Self::Idle => ChannelStatus::Idle,
            Self::Loading => ChannelStatus::Loading,
            Self::Ready(_) => ChannelStatus::Ready,
            Self::Errored(_) => ChannelStatus::Errored,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&BackendError> {
        match self {
            Self::Errored(error) => Some(error),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelStatus {
    Idle,
    Loading,
    Ready,
    Errored,
}

impl ChannelStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Errored => "errored",
        }
    }
}

/// Monotonic stamp of one issued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CourseOptionKey {
    pub record_id: String,
    pub show_unavailable: bool,
}

#[derive(Debug)]
struct Channel<T> {
    state: LoadState<T>,
    token: Option<RequestToken>,
}

impl<T> Default for Channel<T> {
    fn default() -> Self {
        Self {
            state: LoadState::Idle,
            token: None,
        }
    }
}

impl<T> Channel<T> {
    fn begin(&mut self, token: RequestToken) {
        self.token = Some(token);
        self.state = LoadState::Loading;
    }

    fn is_current(&self, token: RequestToken) -> bool {
        self.token == Some(token)
    }
}

enum Outcome {
    Record(Result<RecordFields, BackendError>),
    BaseUrl(Result<Option<String>, BackendError>),
    Rows(Result<Vec<RawRow>, BackendError>),
}

pub struct ReferenceDataLoader {
    backend: Arc<dyn RegistrationBackend>,
    notifier: Arc<dyn Notifier>,
    context: RecordContext,
    facets: FacetConfig,
    record: Channel<Option<String>>,
    base_url: Channel<Option<String>>,
    sessions: Channel<Vec<ReferenceOption>>,
    locations: Channel<Vec<ReferenceOption>>,
    course_options: Channel<Vec<ReferenceOption>>,
    instructors: Channel<Vec<ReferenceOption>>,
    grades: Channel<Vec<ReferenceOption>>,
    course_option_key: Option<CourseOptionKey>,
    next_token: u64,
    in_flight: JoinSet<Outcome>,
    pending: HashMap<TaskId, (ChannelKind, RequestToken)>,
    fetches: BTreeMap<ChannelKind, usize>,
}

impl fmt::Debug for ReferenceDataLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReferenceDataLoader")
            .field("context", &self.context)
            .field("in_flight", &self.pending.len())
            .field("course_option_key", &self.course_option_key)
            .finish_non_exhaustive()
    }
}

impl ReferenceDataLoader {
    pub fn new(
        backend: Arc<dyn RegistrationBackend>,
        notifier: Arc<dyn Notifier>,
        context: RecordContext,
        facets: FacetConfig,
    ) -> Self {
        Self {
            backend,
            notifier,
            context,
            facets,
            record: Channel::default(),
            base_url: Channel::default(),
            sessions: Channel::default(),
            locations: Channel::default(),
            course_options: Channel::default(),
            instructors: Channel::default(),
            grades: Channel::default(),
            course_option_key: None,
            next_token: 0,
            in_flight: JoinSet::new(),
            pending: HashMap::new(),
            fetches: BTreeMap::new(),
        }
    }

    pub fn context(&self) -> &RecordContext {
        &self.context
    }

    pub fn facets(&self) -> &FacetConfig {
        &self.facets
    }

    /// Whether a channel applies to the current record and facets.
    pub fn is_relevant(&self, kind: ChannelKind) -> bool {
        match kind {
            ChannelKind::Record => !self.context.config().fields.is_empty(),
            ChannelKind::BaseUrl => true,
            ChannelKind::Sessions => self.facets.session,
            ChannelKind::Locations => self.facets.location,
            ChannelKind::CourseOptions => {
                self.context.is_course_session() && self.facets.course_option
            }
            ChannelKind::Instructors => self.facets.instructor,
            ChannelKind::Grades => self.facets.grade,
        }
    }

    pub fn relevant_channels(&self) -> impl Iterator<Item = ChannelKind> + '_ {
        ChannelKind::ALL
            .into_iter()
            .filter(|kind| self.is_relevant(*kind))
    }

    /// Issue the record lookup and every relevant reference channel.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn start(&mut self, show_unavailable: bool) {
        if self.is_relevant(ChannelKind::Record) {
            self.issue(ChannelKind::Record);
        }
        self.course_option_key = Some(self.key_for(show_unavailable));
        self.issue_reference_channels();
    }

    /// Re-issue every relevant reference channel from scratch.
    pub fn refresh_all(&mut self, show_unavailable: bool) {
        self.course_option_key = Some(self.key_for(show_unavailable));
        self.issue_reference_channels();
    }

    /// Track the course-option inputs; refetch when the key changed.
    ///
    /// Returns true when a new request was issued.
    pub fn update_course_option_params(&mut self, show_unavailable: bool) -> bool {
        let key = self.key_for(show_unavailable);
        if self.course_option_key.as_ref() == Some(&key) {
            return false;
        }
        self.course_option_key = Some(key);
        if !self.is_relevant(ChannelKind::CourseOptions) {
            return false;
        }
        self.issue(ChannelKind::CourseOptions);
        true
    }

    pub fn course_option_key(&self) -> Option<&CourseOptionKey> {
        self.course_option_key.as_ref()
    }

    /// Number of requests issued for a channel since creation.
    pub fn fetch_count(&self, kind: ChannelKind) -> usize {
        self.fetches.get(&kind).copied().unwrap_or(0)
    }

    pub fn in_flight(&self) -> usize {
        self.pending.len()
    }

    pub fn status(&self, kind: ChannelKind) -> ChannelStatus {
        match kind {
            ChannelKind::Record => self.record.state.status(),
            ChannelKind::BaseUrl => self.base_url.state.status(),
            _ => self
                .options_channel(kind)
                .map_or(ChannelStatus::Idle, |channel| channel.state.status()),
        }
    }

    pub fn error(&self, kind: ChannelKind) -> Option<&BackendError> {
        match kind {
            ChannelKind::Record => self.record.state.error(),
            ChannelKind::BaseUrl => self.base_url.state.error(),
            _ => self
                .options_channel(kind)
                .and_then(|channel| channel.state.error()),
        }
    }

    /// Display name of the record, once loaded.
    pub fn record_name(&self) -> Option<&str> {
        self.record.state.data().and_then(|name| name.as_deref())
    }

    /// Community URL as returned by the backend, once loaded.
    pub fn community_url(&self) -> Option<&str> {
        self.base_url.state.data().and_then(|url| url.as_deref())
    }

    pub fn options_state(&self, kind: ChannelKind) -> Option<&LoadState<Vec<ReferenceOption>>> {
        self.options_channel(kind).map(|channel| &channel.state)
    }

    /// Loaded options of a relevant channel.
    pub fn options(&self, kind: ChannelKind) -> Option<&[ReferenceOption]> {
        if !self.is_relevant(kind) {
            return None;
        }
        self.options_state(kind)
            .and_then(LoadState::data)
            .map(Vec::as_slice)
    }

    /// Wait for the next completion that changes a channel.
    ///
    /// Stale completions are dropped on the way. Returns `None` once nothing
    /// is in flight.
    pub async fn next_update(&mut self) -> Option<ChannelKind> {
        loop {
            let joined = self.in_flight.join_next_with_id().await?;
            let (id, outcome) = match joined {
                Ok((id, outcome)) => (id, Ok(outcome)),
                Err(join_error) => (join_error.id(), Err(join_error)),
            };
            let Some((kind, token)) = self.pending.remove(&id) else {
                continue;
            };
            let outcome = match outcome {
                Ok(outcome) => outcome,
                Err(join_error) => {
                    let error = BackendError::Transport(format!("fetch task failed: {join_error}"));
                    failed_outcome(kind, error)
                }
            };
            if self.apply(kind, token, outcome) {
                return Some(kind);
            }
        }
    }

    /// Drive every in-flight request to completion.
    pub async fn settle(&mut self) {
        while self.next_update().await.is_some() {}
    }

    fn issue_reference_channels(&mut self) {
        for kind in ChannelKind::REFERENCE {
            if self.is_relevant(kind) {
                self.issue(kind);
            }
        }
    }

    fn key_for(&self, show_unavailable: bool) -> CourseOptionKey {
        CourseOptionKey {
            record_id: self.context.record_id.clone(),
            show_unavailable,
        }
    }

    fn issue(&mut self, kind: ChannelKind) {
        self.next_token += 1;
        let token = RequestToken(self.next_token);
        match kind {
            ChannelKind::Record => self.record.begin(token),
            ChannelKind::BaseUrl => self.base_url.begin(token),
            _ => {
                if let Some(channel) = self.options_channel_mut(kind) {
                    channel.begin(token);
                }
            }
        }
        *self.fetches.entry(kind).or_default() += 1;
        debug!(channel = %kind, token = token.0, "issuing fetch");

        let backend = Arc::clone(&self.backend);
        let record_id = self.context.record_id.clone();
        let handle = match kind {
            ChannelKind::Record => {
                let fields = self.context.config().fields;
                self.in_flight.spawn(async move {
                    Outcome::Record(backend.record(&record_id, &fields).await)
                })
            }
            ChannelKind::BaseUrl => self
                .in_flight
                .spawn(async move { Outcome::BaseUrl(backend.base_url().await) }),
            ChannelKind::Sessions => self
                .in_flight
                .spawn(async move { Outcome::Rows(backend.available_sessions().await) }),
            ChannelKind::Locations => self
                .in_flight
                .spawn(async move { Outcome::Rows(backend.available_locations().await) }),
            ChannelKind::CourseOptions => {
                let show_unavailable = self
                    .course_option_key
                    .as_ref()
                    .is_some_and(|key| key.show_unavailable);
                self.in_flight.spawn(async move {
                    Outcome::Rows(backend.course_options(&record_id, show_unavailable).await)
                })
            }
            ChannelKind::Instructors => self.in_flight.spawn(async move {
                Outcome::Rows(backend.available_instructors(&record_id).await)
            }),
            ChannelKind::Grades => self
                .in_flight
                .spawn(async move { Outcome::Rows(backend.available_grades().await) }),
        };
        self.pending.insert(handle.id(), (kind, token));
    }

    /// Apply a completion; false when it was stale.
    fn apply(&mut self, kind: ChannelKind, token: RequestToken, outcome: Outcome) -> bool {
        let current = match kind {
            ChannelKind::Record => self.record.is_current(token),
            ChannelKind::BaseUrl => self.base_url.is_current(token),
            _ => self
                .options_channel(kind)
                .is_some_and(|channel| channel.is_current(token)),
        };
        if !current {
            debug!(channel = %kind, token = token.0, "discarding stale completion");
            return false;
        }

        let failure = match outcome {
            Outcome::Record(Ok(fields)) => {
                let name = fields
                    .get(&name_field(&self.context.object_api_name))
                    .map(str::to_string);
                self.record.state = LoadState::Ready(name);
                None
            }
            Outcome::BaseUrl(Ok(url)) => {
                self.base_url.state = LoadState::Ready(url);
                None
            }
            Outcome::Rows(Ok(rows)) => {
                let options = normalize_rows(rows, kind.value_source());
                if let Some(channel) = self.options_channel_mut(kind) {
                    channel.state = LoadState::Ready(options);
                }
                None
            }
            Outcome::Record(Err(error))
            | Outcome::BaseUrl(Err(error))
            | Outcome::Rows(Err(error)) => Some(error),
        };

        if let Some(error) = failure {
            warn!(channel = %kind, error = %error, "reference fetch failed");
            self.notifier.notify(Toast::error(error.user_message()));
            match kind {
                ChannelKind::Record => self.record.state = LoadState::Errored(error),
                ChannelKind::BaseUrl => self.base_url.state = LoadState::Errored(error),
                _ => {
                    if let Some(channel) = self.options_channel_mut(kind) {
                        channel.state = LoadState::Errored(error);
                    }
                }
            }
        } else {
            debug!(channel = %kind, token = token.0, "channel ready");
        }
        true
    }

    fn options_channel(&self, kind: ChannelKind) -> Option<&Channel<Vec<ReferenceOption>>> {
        match kind {
            ChannelKind::Sessions => Some(&self.sessions),
            ChannelKind::Locations => Some(&self.locations),
            ChannelKind::CourseOptions => Some(&self.course_options),
            ChannelKind::Instructors => Some(&self.instructors),
            ChannelKind::Grades => Some(&self.grades),
            ChannelKind::Record | ChannelKind::BaseUrl => None,
        }
    }

    fn options_channel_mut(
        &mut self,
        kind: ChannelKind,
    ) -> Option<&mut Channel<Vec<ReferenceOption>>> {
        match kind {
            ChannelKind::Sessions => Some(&mut self.sessions),
            ChannelKind::Locations => Some(&mut self.locations),
            ChannelKind::CourseOptions => Some(&mut self.course_options),
            ChannelKind::Instructors => Some(&mut self.instructors),
            ChannelKind::Grades => Some(&mut self.grades),
            ChannelKind::Record | ChannelKind::BaseUrl => None,
        }
    }
}

fn failed_outcome(kind: ChannelKind, error: BackendError) -> Outcome {
    match kind {
        ChannelKind::Record => Outcome::Record(Err(error)),
        ChannelKind::BaseUrl => Outcome::BaseUrl(Err(error)),
        _ => Outcome::Rows(Err(error)),
    }
}
