//! Reference data loading, staleness and derived busy/disabled signals.

mod support;

use std::sync::Arc;
use std::time::Duration;

use regurl_core::{ChannelKind, ChannelStatus, FilterControl, ToastVariant};
use regurl_model::{FilterInput, ReferenceOption};
use support::{
    COURSE, PROGRAM, SESSION, SlowCourseOptions, TestClipboard, config, fixture, harness,
    harness_with, loaded,
};

fn values(options: Option<&[ReferenceOption]>) -> Vec<&str> {
    options
        .unwrap_or_default()
        .iter()
        .map(|option| option.value.as_str())
        .collect()
}

#[tokio::test]
async fn mount_loads_every_relevant_channel() {
    let harness = loaded("a01", SESSION).await;
    let builder = &harness.builder;

    for kind in ChannelKind::ALL {
        assert_eq!(builder.loader().status(kind), ChannelStatus::Ready, "{kind}");
        assert_eq!(builder.loader().fetch_count(kind), 1, "{kind}");
    }
    assert_eq!(builder.loader().record_name(), Some("Beginner Swim"));
    assert_eq!(
        values(builder.options(ChannelKind::Sessions)),
        ["Fall 2024", "Winter 2025"]
    );
    assert_eq!(
        values(builder.options(ChannelKind::Locations)),
        ["Main Pool", "Annex"]
    );
    assert_eq!(values(builder.options(ChannelKind::Instructors)), ["Jo Park"]);
    assert!(harness.notifier.toasts().is_empty());
}

#[tokio::test]
async fn course_options_use_ids_and_drop_rows_without_one() {
    let harness = loaded("a01", SESSION).await;
    let options = harness.builder.options(ChannelKind::CourseOptions).unwrap();
    assert_eq!(options, [ReferenceOption::new("Mornings", "opt1")]);
}

#[tokio::test]
async fn non_session_records_never_fetch_course_options() {
    let mut harness = loaded("c01", COURSE).await;
    let loader = harness.builder.loader();
    assert_eq!(loader.status(ChannelKind::CourseOptions), ChannelStatus::Idle);
    assert_eq!(loader.fetch_count(ChannelKind::CourseOptions), 0);
    assert!(harness.builder.options(ChannelKind::CourseOptions).is_none());

    harness
        .builder
        .set_control("showUnavailableCourseOptions", FilterInput::Checked(true))
        .unwrap();
    assert_eq!(harness.builder.loader().in_flight(), 0);
    assert_eq!(
        harness.builder.loader().fetch_count(ChannelKind::CourseOptions),
        0
    );
}

#[tokio::test]
async fn course_options_refetch_once_per_distinct_key() {
    let mut harness = loaded("a01", SESSION).await;
    let count = |harness: &support::Harness| {
        harness
            .builder
            .loader()
            .fetch_count(ChannelKind::CourseOptions)
    };
    assert_eq!(count(&harness), 1);

    let builder = &mut harness.builder;
    builder
        .set_control("showUnavailableCourseOptions", FilterInput::Checked(true))
        .unwrap();
    builder.settle().await;
    assert_eq!(
        values(builder.options(ChannelKind::CourseOptions)),
        ["opt1", "opt2"]
    );

    builder
        .set_control("showUnavailableCourseOptions", FilterInput::Checked(true))
        .unwrap();
    builder
        .set_control("Location", FilterInput::Text("Annex".to_string()))
        .unwrap();
    builder
        .set_control("courseOptionId", FilterInput::Text("opt2".to_string()))
        .unwrap();
    assert_eq!(builder.loader().in_flight(), 0);
    assert_eq!(count(&harness), 2);

    harness
        .builder
        .set_control("showUnavailableCourseOptions", FilterInput::Checked(false))
        .unwrap();
    harness.builder.settle().await;
    assert_eq!(count(&harness), 3);
    assert_eq!(
        values(harness.builder.options(ChannelKind::CourseOptions)),
        ["opt1"]
    );
}

#[tokio::test(start_paused = true)]
async fn stale_course_option_answers_are_discarded() {
    let backend = Arc::new(SlowCourseOptions::new(
        Duration::from_millis(500),
        Duration::from_millis(10),
    ));
    let mut harness = harness_with(
        backend.clone(),
        "a01",
        SESSION,
        config(),
        TestClipboard::working(),
    );
    harness.builder.mount();
    harness
        .builder
        .set_control("showUnavailableCourseOptions", FilterInput::Checked(true))
        .unwrap();

    // The newer request answers first; the older one must not overwrite it.
    harness.builder.settle().await;
    assert_eq!(backend.calls(), 2);
    assert_eq!(
        harness.builder.loader().status(ChannelKind::CourseOptions),
        ChannelStatus::Ready
    );
    assert_eq!(
        values(harness.builder.options(ChannelKind::CourseOptions)),
        ["opt1", "opt2"]
    );
}

#[tokio::test(start_paused = true)]
async fn completions_are_applied_in_arrival_order() {
    let backend = fixture()
        .with_delay(ChannelKind::Sessions, Duration::from_millis(300))
        .with_delay(ChannelKind::Grades, Duration::from_millis(20))
        .with_delay(ChannelKind::Record, Duration::from_millis(100))
        .with_delay(ChannelKind::BaseUrl, Duration::from_millis(100))
        .with_delay(ChannelKind::Locations, Duration::from_millis(100))
        .with_delay(ChannelKind::Instructors, Duration::from_millis(100));
    let mut harness = harness_with(
        Arc::new(backend),
        "c01",
        COURSE,
        config(),
        TestClipboard::working(),
    );
    harness.builder.mount();
    assert!(harness.builder.is_busy());

    assert_eq!(harness.builder.next_update().await, Some(ChannelKind::Grades));
    assert!(harness.builder.is_busy());
    assert_eq!(
        harness.builder.loader().status(ChannelKind::Grades),
        ChannelStatus::Ready
    );
    assert!(harness.builder.is_disabled(FilterControl::Grade));

    let mut last = None;
    while let Some(kind) = harness.builder.next_update().await {
        last = Some(kind);
    }
    assert_eq!(last, Some(ChannelKind::Sessions));
    assert!(!harness.builder.is_busy());
    assert_eq!(harness.builder.next_update().await, None);
}

#[tokio::test]
async fn busy_disables_every_control_until_settled() {
    let mut harness = harness("a01", SESSION);
    harness.builder.mount();
    assert!(harness.builder.is_busy());
    for control in FilterControl::ALL {
        assert!(harness.builder.is_disabled(control), "{control:?}");
    }

    harness.builder.settle().await;
    assert!(!harness.builder.is_busy());
    for control in FilterControl::ALL {
        assert!(!harness.builder.is_disabled(control), "{control:?}");
    }
}

#[tokio::test]
async fn empty_or_irrelevant_datasets_disable_their_control() {
    let harness = loaded("p01", PROGRAM).await;
    let builder = &harness.builder;
    assert!(!builder.is_busy());
    assert!(builder.is_disabled(FilterControl::Instructor));
    assert!(builder.is_disabled(FilterControl::CourseOption));
    assert!(!builder.is_disabled(FilterControl::Session));

    let summary = builder.summary();
    assert!(!summary.busy);
    assert_eq!(
        summary.disabled,
        [FilterControl::CourseOption, FilterControl::Instructor]
    );
}

#[tokio::test]
async fn each_failure_is_notified_once() {
    let backend = fixture().with_failure(ChannelKind::Grades, &["Grade query failed"]);
    let mut harness = harness_with(
        Arc::new(backend),
        "c01",
        COURSE,
        config(),
        TestClipboard::working(),
    );
    harness.builder.mount();
    harness.builder.settle().await;

    let errors = harness.notifier.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "Grade query failed");
    assert_eq!(errors[0].variant, ToastVariant::Error);
    assert_eq!(
        harness.builder.loader().status(ChannelKind::Grades),
        ChannelStatus::Errored
    );
    assert!(harness.builder.is_disabled(FilterControl::Grade));
    assert!(!harness.builder.is_disabled(FilterControl::Session));

    harness.builder.refresh_all();
    harness.builder.settle().await;
    assert_eq!(harness.notifier.errors().len(), 2);
}

#[tokio::test]
async fn batched_query_errors_are_joined() {
    let backend = fixture().with_failure(ChannelKind::Locations, &["first", "second"]);
    let mut harness = harness_with(
        Arc::new(backend),
        "c01",
        COURSE,
        config(),
        TestClipboard::working(),
    );
    harness.builder.mount();
    harness.builder.settle().await;
    assert_eq!(harness.notifier.errors()[0].message, "first, second");
}

#[tokio::test]
async fn missing_record_reports_and_composes_without_name() {
    let harness = loaded("c99", COURSE).await;
    let errors = harness.notifier.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "Record c99 was not found");
    assert_eq!(
        harness.builder.url(),
        format!("{}?course=", support::BASE)
    );
}

#[tokio::test]
async fn refresh_all_clears_filters_and_refetches_reference_data() {
    let mut harness = loaded("a01", SESSION).await;
    harness
        .builder
        .set_control("showUnavailableCourseOptions", FilterInput::Checked(true))
        .unwrap();
    harness
        .builder
        .set_control("courseOptionId", FilterInput::Text("opt2".to_string()))
        .unwrap();
    harness.builder.settle().await;
    let revision = harness.builder.revision();

    harness.builder.refresh_all();
    assert!(harness.builder.filters().is_empty());
    assert!(harness.builder.revision() > revision);
    harness.builder.settle().await;

    let loader = harness.builder.loader();
    assert_eq!(loader.fetch_count(ChannelKind::Record), 1);
    assert_eq!(loader.fetch_count(ChannelKind::Sessions), 2);
    assert_eq!(loader.fetch_count(ChannelKind::CourseOptions), 3);
    assert_eq!(values(harness.builder.options(ChannelKind::CourseOptions)), ["opt1"]);
    assert_eq!(
        harness.builder.url(),
        format!("{}?courseSessionId=a01", support::BASE)
    );
}

#[tokio::test]
async fn refresh_all_is_idempotent() {
    let mut harness = loaded("c01", COURSE).await;

    harness.builder.refresh_all();
    harness.builder.settle().await;
    let first = (
        harness.builder.summary(),
        harness.builder.filters().clone(),
        harness.builder.url(),
        values(harness.builder.options(ChannelKind::Grades))
            .into_iter()
            .map(str::to_string)
            .collect::<Vec<_>>(),
    );

    harness.builder.refresh_all();
    harness.builder.settle().await;
    let second = (
        harness.builder.summary(),
        harness.builder.filters().clone(),
        harness.builder.url(),
        values(harness.builder.options(ChannelKind::Grades))
            .into_iter()
            .map(str::to_string)
            .collect::<Vec<_>>(),
    );

    assert_eq!(first, second);
}

#[tokio::test]
async fn disabled_facets_leave_their_channel_idle() {
    let mut config = config();
    config.facets.grade = false;
    config.facets.instructor = false;
    let mut harness = harness_with(
        Arc::new(fixture()),
        "c01",
        COURSE,
        config,
        TestClipboard::working(),
    );
    harness.builder.mount();
    harness.builder.settle().await;

    let loader = harness.builder.loader();
    assert_eq!(loader.status(ChannelKind::Grades), ChannelStatus::Idle);
    assert_eq!(loader.fetch_count(ChannelKind::Instructors), 0);
    assert_eq!(loader.status(ChannelKind::Sessions), ChannelStatus::Ready);
}
