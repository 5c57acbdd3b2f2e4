use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

use regurl_core::{ChannelStatus, CopyOutcome};
use regurl_model::ReferenceOption;

use crate::commands::{OptionsReport, UrlReport};

pub fn print_url(report: &UrlReport) {
    println!("{}", report.url);
    if report.opened {
        eprintln!("Opened in browser");
    }
    match report.copied {
        Some(CopyOutcome::Copied | CopyOutcome::CopiedWithFallback) => {
            eprintln!("Copied to clipboard");
        }
        Some(CopyOutcome::Failed) => eprintln!("Could not copy to clipboard"),
        Some(CopyOutcome::Skipped) | None => {}
    }
}

pub fn print_options(report: &OptionsReport) {
    println!(
        "Record: {}",
        report.record_name.as_deref().unwrap_or("(unnamed)")
    );
    println!("URL: {}", report.url);
    println!("{}", channel_table(report));
    for channel in &report.channels {
        if channel.options.is_empty() {
            continue;
        }
        println!();
        println!("{}", channel.kind);
        println!("{}", option_table(&channel.options));
    }
    println!();
    println!("day_of_week");
    println!("{}", option_table(&report.days));
}

pub fn channel_table(report: &OptionsReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Channel"),
        header_cell("Status"),
        header_cell("Options"),
        header_cell("Control"),
        header_cell("Error"),
    ]);
    apply_table_style(&mut table);
    for channel in &report.channels {
        let control = match channel.control_disabled {
            Some(true) => dim_cell("disabled"),
            Some(false) => Cell::new("enabled").fg(Color::Green),
            None => dim_cell("-"),
        };
        table.add_row(vec![
            Cell::new(channel.kind),
            status_cell(channel.status),
            Cell::new(channel.options.len()),
            control,
            channel
                .error
                .as_deref()
                .map_or_else(|| dim_cell(""), |error| Cell::new(error).fg(Color::Red)),
        ]);
    }
    table
}

pub fn option_table(options: &[ReferenceOption]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Label"), header_cell("Value")]);
    apply_table_style(&mut table);
    for option in options {
        table.add_row(vec![option.label.as_str(), option.value.as_str()]);
    }
    table
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn status_cell(status: ChannelStatus) -> Cell {
    let cell = Cell::new(status.label());
    match status {
        ChannelStatus::Ready => cell.fg(Color::Green),
        ChannelStatus::Errored => cell.fg(Color::Red).add_attribute(Attribute::Bold),
        ChannelStatus::Loading => cell.fg(Color::Yellow),
        ChannelStatus::Idle => cell.fg(Color::DarkGrey),
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
