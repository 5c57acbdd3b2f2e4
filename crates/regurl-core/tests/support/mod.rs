//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use regurl_core::{
    BackendError, BuilderConfig, Clipboard, ClipboardError, FixtureBackend, OpenError,
    RecordContext, RecordFields, RecordingNotifier, RegistrationBackend, RegistrationUrlBuilder,
    Services, UrlOpener,
};
use regurl_model::RawRow;

pub const PROGRAM: &str = "TREX1__Program__c";
pub const COURSE: &str = "TREX1__Course__c";
pub const SESSION: &str = "TREX1__Course_Session__c";

pub const BASE: &str = "https://club.example.com/s/registration";

pub const FIXTURE: &str = r#"{
    "baseUrl": "https://club.example.com/s",
    "sessions": [{"Name": "Fall 2024"}, {"label": "Winter 2025", "value": "Winter 2025"}],
    "locations": [{"Name": "Main Pool", "Id": "a0L1"}, {"Name": "Annex"}],
    "courseOptions": {
        "a01": [
            {"Name": "Mornings", "Id": "opt1"},
            {"Name": "Evenings", "Id": "opt2", "available": false},
            {"Name": "Broken"}
        ]
    },
    "instructors": {
        "a01": [{"Name": "Jo Park"}],
        "c01": [{"Name": "Sam Lee"}]
    },
    "grades": [{"Name": "K"}, {"Name": "1st"}],
    "records": {
        "a01": {"TREX1__Course_Session__c.Name": "Beginner Swim"},
        "c01": {"TREX1__Course__c.Name": "Intro"},
        "p01": {"TREX1__Program__c.Name": "Swim Team"}
    }
}"#;

pub fn fixture() -> FixtureBackend {
    FixtureBackend::from_json(FIXTURE).unwrap()
}

pub fn config() -> BuilderConfig {
    BuilderConfig {
        registration_url_path: Some("/s/registration".to_string()),
        ..BuilderConfig::default()
    }
}

/// Clipboard whose primary and fallback paths can be made to fail.
#[derive(Debug)]
pub struct TestClipboard {
    primary: Result<(), ClipboardError>,
    fallback: Result<(), ClipboardError>,
    written: Mutex<Vec<String>>,
}

impl TestClipboard {
    pub fn working() -> Self {
        Self::with(Ok(()), Ok(()))
    }

    pub fn with(
        primary: Result<(), ClipboardError>,
        fallback: Result<(), ClipboardError>,
    ) -> Self {
        Self {
            primary,
            fallback,
            written: Mutex::new(Vec::new()),
        }
    }

    pub fn written(&self) -> Vec<String> {
        self.written.lock().unwrap().clone()
    }
}

#[async_trait]
impl Clipboard for TestClipboard {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        self.primary.clone()?;
        self.written.lock().unwrap().push(text.to_string());
        Ok(())
    }

    fn fallback_copy(&self, text: &str) -> Result<(), ClipboardError> {
        self.fallback.clone()?;
        self.written.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct RecordingOpener {
    opened: Mutex<Vec<String>>,
}

impl RecordingOpener {
    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }
}

impl UrlOpener for RecordingOpener {
    fn open(&self, url: &str) -> Result<(), OpenError> {
        self.opened.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

pub struct Harness {
    pub builder: RegistrationUrlBuilder,
    pub notifier: Arc<RecordingNotifier>,
    pub clipboard: Arc<TestClipboard>,
    pub opener: Arc<RecordingOpener>,
}

pub fn harness_with(
    backend: Arc<dyn RegistrationBackend>,
    record_id: &str,
    object: &str,
    config: BuilderConfig,
    clipboard: TestClipboard,
) -> Harness {
    let notifier = Arc::new(RecordingNotifier::new());
    let clipboard = Arc::new(clipboard);
    let opener = Arc::new(RecordingOpener::default());
    let builder = RegistrationUrlBuilder::new(
        RecordContext::new(record_id, object),
        config,
        Services {
            backend,
            notifier: notifier.clone(),
            clipboard: clipboard.clone(),
            opener: opener.clone(),
        },
    );
    Harness {
        builder,
        notifier,
        clipboard,
        opener,
    }
}

pub fn harness(record_id: &str, object: &str) -> Harness {
    harness_with(
        Arc::new(fixture()),
        record_id,
        object,
        config(),
        TestClipboard::working(),
    )
}

/// Mounted and settled builder over the standard fixture.
pub async fn loaded(record_id: &str, object: &str) -> Harness {
    let mut harness = harness(record_id, object);
    harness.builder.mount();
    harness.builder.settle().await;
    harness
}

/// Fixture wrapper whose course-option answers take longer when
/// unavailable options are hidden, and which counts calls.
pub struct SlowCourseOptions {
    pub inner: FixtureBackend,
    pub hidden_delay: Duration,
    pub shown_delay: Duration,
    pub calls: AtomicUsize,
}

impl SlowCourseOptions {
    pub fn new(hidden_delay: Duration, shown_delay: Duration) -> Self {
        Self {
            inner: fixture(),
            hidden_delay,
            shown_delay,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RegistrationBackend for SlowCourseOptions {
    async fn base_url(&self) -> Result<Option<String>, BackendError> {
        self.inner.base_url().await
    }

    async fn available_sessions(&self) -> Result<Vec<RawRow>, BackendError> {
        self.inner.available_sessions().await
    }

    async fn available_locations(&self) -> Result<Vec<RawRow>, BackendError> {
        self.inner.available_locations().await
    }

    async fn course_options(
        &self,
        course_session_id: &str,
        show_unavailable: bool,
    ) -> Result<Vec<RawRow>, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = if show_unavailable {
            self.shown_delay
        } else {
            self.hidden_delay
        };
        tokio::time::sleep(delay).await;
        self.inner
            .course_options(course_session_id, show_unavailable)
            .await
    }

    async fn available_instructors(&self, record_id: &str) -> Result<Vec<RawRow>, BackendError> {
        self.inner.available_instructors(record_id).await
    }

    async fn available_grades(&self) -> Result<Vec<RawRow>, BackendError> {
        self.inner.available_grades().await
    }

    async fn record(
        &self,
        record_id: &str,
        fields: &[String],
    ) -> Result<RecordFields, BackendError> {
        self.inner.record(record_id, fields).await
    }
}
