use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use regurl_core::{
    BuilderConfig, ChannelKind, ChannelStatus, Clipboard, ClipboardError, CopyOutcome,
    FilterControl, FixtureBackend, LogNotifier, NoopOpener, OpenError, RecordContext,
    RegistrationUrlBuilder, Services, UnavailableClipboard, UrlOpener,
};
use regurl_model::{DayOfWeek, FilterField, FilterInput, ReferenceOption};
use tracing::{debug, info, info_span};

use crate::cli::{FilterArgs, OptionsArgs, SourceArgs, UrlArgs};

/// Opens URLs with the platform's default browser.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserOpener;

impl UrlOpener for BrowserOpener {
    fn open(&self, url: &str) -> Result<(), OpenError> {
        open::that(url).map_err(|error| OpenError {
            url: url.to_string(),
            reason: error.to_string(),
        })
    }
}

/// Writes to the operating system clipboard.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

#[async_trait]
impl Clipboard for SystemClipboard {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|error| ClipboardError::Write(error.to_string()))?;
        clipboard
            .set_text(text)
            .map_err(|error| ClipboardError::Write(error.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlReport {
    pub url: String,
    pub opened: bool,
    /// Set when a copy was requested.
    pub copied: Option<CopyOutcome>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelReport {
    pub kind: ChannelKind,
    pub status: ChannelStatus,
    pub error: Option<String>,
    pub options: Vec<ReferenceOption>,
    /// Whether the matching filter control would be disabled.
    pub control_disabled: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionsReport {
    pub record_name: Option<String>,
    pub url: String,
    pub busy: bool,
    pub channels: Vec<ChannelReport>,
    pub days: Vec<ReferenceOption>,
}

/// Filter edits in the order they are applied.
pub fn filter_edits(args: &FilterArgs) -> Vec<(FilterField, FilterInput)> {
    let text_fields = [
        (FilterField::Location, &args.location),
        (FilterField::Session, &args.session),
        (FilterField::StartDate, &args.start_date),
        (FilterField::EndDate, &args.end_date),
        (FilterField::StartTime, &args.start_time),
        (FilterField::EndTime, &args.end_time),
        (FilterField::Age, &args.age),
        (FilterField::CourseOptionId, &args.course_option),
        (FilterField::Instructor, &args.instructor),
        (FilterField::Grade, &args.grade),
    ];
    let mut edits: Vec<_> = text_fields
        .into_iter()
        .filter_map(|(field, value)| {
            value
                .as_ref()
                .map(|value| (field, FilterInput::Text(value.clone())))
        })
        .collect();
    if !args.day_of_week.is_empty() {
        edits.push((
            FilterField::DayOfWeek,
            FilterInput::Multi(args.day_of_week.clone()),
        ));
    }
    if args.show_unavailable {
        edits.push((
            FilterField::ShowUnavailableCourseOptions,
            FilterInput::Checked(true),
        ));
    }
    edits
}

pub fn run_url(args: &UrlArgs) -> Result<UrlReport> {
    let clipboard: Arc<dyn Clipboard> = if args.copy {
        Arc::new(SystemClipboard)
    } else {
        Arc::new(UnavailableClipboard)
    };
    run_url_with(args, clipboard)
}

/// Like [`run_url`], copying through the given clipboard.
pub fn run_url_with(args: &UrlArgs, clipboard: Arc<dyn Clipboard>) -> Result<UrlReport> {
    let span = info_span!("url", record_id = %args.source.record_id);
    let _guard = span.enter();
    let runtime = runtime()?;
    runtime.block_on(async {
        let mut builder = open_builder(&args.source, args.open, clipboard)?;
        builder.mount();
        builder.settle().await;

        for (field, input) in filter_edits(&args.filters) {
            builder
                .set_filter(field, input)
                .with_context(|| format!("apply {field} filter"))?;
        }
        builder.settle().await;

        let url = builder.url();
        let opened = if args.open {
            builder.open_url().context("open URL")?
        } else {
            false
        };
        let copied = if args.copy {
            Some(builder.copy_url().await.context("copy URL")?)
        } else {
            None
        };
        info!(%url, opened, ?copied, "composed registration URL");
        anyhow::Ok(UrlReport {
            url,
            opened,
            copied,
        })
    })
}

pub fn run_options(args: &OptionsArgs) -> Result<OptionsReport> {
    let span = info_span!("options", record_id = %args.source.record_id);
    let _guard = span.enter();
    let runtime = runtime()?;
    runtime.block_on(async {
        let mut builder = open_builder(&args.source, false, Arc::new(UnavailableClipboard))?;
        builder.mount();
        builder.settle().await;
        if args.show_unavailable {
            builder
                .set_filter(
                    FilterField::ShowUnavailableCourseOptions,
                    FilterInput::Checked(true),
                )
                .context("show unavailable course options")?;
            builder.settle().await;
        }
        anyhow::Ok(options_report(&builder))
    })
}

fn options_report(builder: &RegistrationUrlBuilder) -> OptionsReport {
    let loader = builder.loader();
    let channels = ChannelKind::ALL
        .into_iter()
        .map(|kind| ChannelReport {
            kind,
            status: loader.status(kind),
            error: loader.error(kind).map(|error| error.user_message()),
            options: loader.options(kind).map(<[_]>::to_vec).unwrap_or_default(),
            control_disabled: FilterControl::ALL
                .into_iter()
                .find(|control| control.channel() == kind)
                .map(|control| builder.is_disabled(control)),
        })
        .collect();
    OptionsReport {
        record_name: loader.record_name().map(str::to_string),
        url: builder.url(),
        busy: builder.is_busy(),
        channels,
        days: DayOfWeek::options(),
    }
}

fn open_builder(
    source: &SourceArgs,
    with_browser: bool,
    clipboard: Arc<dyn Clipboard>,
) -> Result<RegistrationUrlBuilder> {
    let backend = load_fixture(&source.fixture)?;
    let config = match &source.config {
        Some(path) => BuilderConfig::load_from(path).map_err(|error| {
            let message = error.user_message();
            anyhow::Error::new(error).context(message)
        })?,
        None => BuilderConfig::default(),
    };
    debug!(?config, "builder configuration");
    let opener: Arc<dyn UrlOpener> = if with_browser {
        Arc::new(BrowserOpener)
    } else {
        Arc::new(NoopOpener)
    };
    Ok(RegistrationUrlBuilder::new(
        RecordContext::new(&source.record_id, &source.object),
        config,
        Services {
            backend: Arc::new(backend),
            notifier: Arc::new(LogNotifier),
            clipboard,
            opener,
        },
    ))
}

fn load_fixture(path: &Path) -> Result<FixtureBackend> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("read fixture {}", path.display()))?;
    FixtureBackend::from_json(&content).with_context(|| format!("parse fixture {}", path.display()))
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("start async runtime")
}
