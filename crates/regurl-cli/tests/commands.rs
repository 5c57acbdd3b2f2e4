//! Integration tests for the `url` and `options` commands.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use clap::Parser;
use regurl_cli::cli::{Cli, Command, FilterArgs, OptionsArgs, SourceArgs, UrlArgs};
use regurl_cli::commands::{filter_edits, run_options, run_url, run_url_with};
use regurl_cli::summary::option_table;
use regurl_core::{ChannelKind, ChannelStatus, Clipboard, ClipboardError, CopyOutcome};
use regurl_model::{FilterField, FilterInput, ReferenceOption};

const FIXTURE: &str = r#"{
    "baseUrl": "https://club.example.com/s",
    "sessions": [{"Name": "Fall 2024"}],
    "locations": [{"Name": "Main Pool"}],
    "courseOptions": {
        "a01": [
            {"Name": "Mornings", "Id": "opt1"},
            {"Name": "Evenings", "Id": "opt2", "available": false}
        ]
    },
    "grades": [{"Name": "K"}],
    "records": {
        "a01": {"TREX1__Course_Session__c.Name": "Beginner Swim"},
        "c01": {"TREX1__Course__c.Name": "Intro"}
    },
    "failures": {"instructors": ["Instructor query failed"]}
}"#;

fn write_temp(name: &str, content: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("regurl-cli-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[derive(Default)]
struct MemoryClipboard {
    written: Mutex<Vec<String>>,
}

#[async_trait]
impl Clipboard for MemoryClipboard {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        self.written.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

fn source(fixture: &str, record_id: &str, object: &str) -> SourceArgs {
    SourceArgs {
        fixture: write_temp(fixture, FIXTURE),
        record_id: record_id.to_string(),
        object: object.to_string(),
        config: None,
    }
}

#[test]
fn url_command_composes_filtered_course_url() {
    let args = UrlArgs {
        source: source("course.json", "c01", "TREX1__Course__c"),
        filters: FilterArgs {
            location: Some("Main Pool".to_string()),
            day_of_week: vec!["Monday".to_string(), "Wednesday".to_string()],
            age: Some("8".to_string()),
            ..FilterArgs::default()
        },
        open: false,
        copy: false,
    };
    let report = run_url(&args).unwrap();
    assert!(!report.opened);
    insta::assert_snapshot!(
        report.url,
        @r#"https://club.example.com/s?course=Intro&Location=Main%20Pool&filters={"dayOfWeek":["Monday","Wednesday"],"age":8}"#
    );
}

#[test]
fn url_command_honours_registration_path_config() {
    let mut args = UrlArgs {
        source: source("session.json", "a01", "TREX1__Course_Session__c"),
        filters: FilterArgs {
            course_option: Some("opt2".to_string()),
            show_unavailable: true,
            ..FilterArgs::default()
        },
        open: false,
        copy: false,
    };
    args.source.config = Some(write_temp(
        "config.toml",
        "registration_url_path = \"/s/registration\"\n",
    ));
    let report = run_url(&args).unwrap();
    assert_eq!(
        report.url,
        "https://club.example.com/s/registration?courseSessionId=a01&courseOptionId=opt2"
    );
}

#[test]
fn invalid_filter_value_is_an_error() {
    let args = UrlArgs {
        source: source("invalid.json", "c01", "TREX1__Course__c"),
        filters: FilterArgs {
            day_of_week: vec!["Funday".to_string()],
            ..FilterArgs::default()
        },
        open: false,
        copy: false,
    };
    let error = run_url(&args).unwrap_err();
    assert!(format!("{error:#}").contains("Funday"));
}

#[test]
fn missing_fixture_is_reported_with_its_path() {
    let args = OptionsArgs {
        source: SourceArgs {
            fixture: PathBuf::from("/nonexistent/regurl-fixture.json"),
            record_id: "c01".to_string(),
            object: "TREX1__Course__c".to_string(),
            config: None,
        },
        show_unavailable: false,
    };
    let error = run_options(&args).unwrap_err();
    assert!(error.to_string().contains("/nonexistent/regurl-fixture.json"));
}

#[test]
fn options_command_reports_each_channel() {
    let args = OptionsArgs {
        source: source("options.json", "a01", "TREX1__Course_Session__c"),
        show_unavailable: true,
    };
    let report = run_options(&args).unwrap();
    assert_eq!(report.record_name.as_deref(), Some("Beginner Swim"));
    assert!(!report.busy);
    assert_eq!(report.days.len(), 7);

    let channel = |kind: ChannelKind| {
        report
            .channels
            .iter()
            .find(|channel| channel.kind == kind)
            .unwrap()
    };
    let course_options = channel(ChannelKind::CourseOptions);
    assert_eq!(course_options.status, ChannelStatus::Ready);
    assert_eq!(course_options.options.len(), 2);
    assert_eq!(course_options.control_disabled, Some(false));

    let instructors = channel(ChannelKind::Instructors);
    assert_eq!(instructors.status, ChannelStatus::Errored);
    assert_eq!(
        instructors.error.as_deref(),
        Some("Instructor query failed")
    );
    assert_eq!(instructors.control_disabled, Some(true));

    assert_eq!(channel(ChannelKind::Record).control_disabled, None);
}

#[test]
fn filter_flags_map_to_control_edits() {
    let cli = Cli::try_parse_from([
        "regurl",
        "url",
        "--fixture",
        "fixture.json",
        "--record-id",
        "c01",
        "--object",
        "TREX1__Course__c",
        "--grade",
        "K",
        "--day-of-week",
        "Monday,Friday",
        "--show-unavailable",
    ])
    .unwrap();
    let Command::Url(args) = cli.command else {
        panic!("expected url command");
    };
    assert_eq!(
        filter_edits(&args.filters),
        [
            (FilterField::Grade, FilterInput::Text("K".to_string())),
            (
                FilterField::DayOfWeek,
                FilterInput::Multi(vec!["Monday".to_string(), "Friday".to_string()])
            ),
            (
                FilterField::ShowUnavailableCourseOptions,
                FilterInput::Checked(true)
            ),
        ]
    );
}

#[test]
fn option_table_lists_labels_and_values() {
    let table = option_table(&[ReferenceOption::new("Mornings", "opt1")]);
    let rendered = table.to_string();
    assert!(rendered.contains("Mornings"));
    assert!(rendered.contains("opt1"));
}

#[test]
fn copy_flag_writes_the_url_to_the_clipboard() {
    let args = UrlArgs {
        source: source("copy.json", "a01", "TREX1__Course_Session__c"),
        filters: FilterArgs::default(),
        open: false,
        copy: true,
    };
    let clipboard = Arc::new(MemoryClipboard::default());
    let report = run_url_with(&args, clipboard.clone()).unwrap();
    assert_eq!(report.copied, Some(CopyOutcome::Copied));
    assert_eq!(*clipboard.written.lock().unwrap(), [report.url]);
}

#[test]
fn url_without_copy_flag_leaves_clipboard_alone() {
    let args = UrlArgs {
        source: source("nocopy.json", "c01", "TREX1__Course__c"),
        filters: FilterArgs::default(),
        open: false,
        copy: false,
    };
    let clipboard = Arc::new(MemoryClipboard::default());
    let report = run_url_with(&args, clipboard.clone()).unwrap();
    assert_eq!(report.copied, None);
    assert!(clipboard.written.lock().unwrap().is_empty());
}

#[test]
fn malformed_config_reports_a_readable_message() {
    let mut args = OptionsArgs {
        source: source("badconfig.json", "c01", "TREX1__Course__c"),
        show_unavailable: false,
    };
    args.source.config = Some(write_temp(
        "bad.toml",
        "copy_acknowledgment_ms = \"soon\"\n",
    ));
    let error = run_options(&args).unwrap_err();
    assert!(
        error
            .to_string()
            .starts_with("The configuration file is invalid: ")
    );
}

#[test]
fn copy_flag_is_parsed() {
    let cli = Cli::try_parse_from([
        "regurl",
        "url",
        "--fixture",
        "fixture.json",
        "--record-id",
        "a01",
        "--object",
        "TREX1__Course_Session__c",
        "--copy",
    ])
    .unwrap();
    let Command::Url(args) = cli.command else {
        panic!("expected url command");
    };
    assert!(args.copy);
    assert!(!args.open);
}
