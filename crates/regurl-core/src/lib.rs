//! Reference data loading, URL composition and sharing actions for public
//! registration links.

pub mod actions;
pub mod aggregate;
pub mod backend;
pub mod builder;
pub mod compose;
pub mod config;
pub mod fixture;
pub mod loader;
pub mod notify;

pub use actions::{
    ActionDispatcher, ActionError, Clipboard, ClipboardError, CopyOutcome, DEFAULT_ACKNOWLEDGMENT,
    NoopOpener, OpenError, UnavailableClipboard, UrlOpener,
};
pub use aggregate::{FilterControl, LoadingSummary, is_busy, is_disabled};
pub use backend::{BackendError, RecordFields, RegistrationBackend};
pub use builder::{RegistrationUrlBuilder, Services};
pub use compose::{
    EmbeddedFilters, UrlInputs, compose_url, construct_base_url, deep_link_url, encode_uri,
    filtered_url, has_filters,
};
pub use config::{BuilderConfig, ConfigError};
pub use fixture::{CourseOptionRow, FixtureBackend};
pub use loader::{
    ChannelKind, ChannelStatus, CourseOptionKey, LoadState, RecordContext, ReferenceDataLoader,
    RequestToken,
};
pub use notify::{LogNotifier, Notifier, RecordingNotifier, Toast, ToastVariant};
