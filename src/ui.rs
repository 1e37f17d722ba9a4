use std::io::{self, IsTerminal};

use crate::app::{RoomView, StatusReport};
use crate::domain::asset::{AssetRecord, AssetStatus};

pub fn print_room_view(view: &RoomView) {
    let palette = Palette::auto();
    println!("{}", palette.heading(&view.location));
    println!("{}", palette.dim(&progress_line(view.verified_count, view.total_count)));

    if view.records.is_empty() {
        println!("{}", palette.dim("no items"));
        return;
    }
    for record in &view.records {
        println!("{}", format_record_row(record, &palette));
    }
}

pub fn print_missing(records: &[AssetRecord], catch_all: &str) {
    let palette = Palette::auto();
    println!("{}", palette.heading(&format!("Missing ({catch_all})")));
    if records.is_empty() {
        println!("{}", palette.dim("every catalog entry is accounted for"));
        return;
    }
    for record in records {
        println!("{}", format_record_row(record, &palette));
    }
    println!("{}", palette.dim(&format!("{} item(s) missing", records.len())));
}

pub fn print_rooms(rooms: &[String], catch_all: &str) {
    let palette = Palette::auto();
    println!("{}", palette.heading("Locations"));
    for room in rooms {
        if room.eq_ignore_ascii_case(catch_all) {
            println!("{} {}", palette.tag(room), palette.dim("(catch-all)"));
        } else {
            println!("{}", palette.tag(room));
        }
    }
}

pub fn print_status(report: &StatusReport) {
    let palette = Palette::auto();
    println!("{}", palette.heading("Inventory status"));
    println!(
        "{}",
        palette.dim(&format!(
            "catalog={} confirmed={} missing={}",
            report.catalog_count, report.confirmed_count, report.missing_count
        ))
    );
    for progress in &report.locations {
        println!(
            "{} {}",
            palette.tag(&progress.location),
            progress_line(progress.verified_count, progress.total_count)
        );
    }
}

fn format_record_row(record: &AssetRecord, palette: &Palette) -> String {
    format!(
        "{} {} {}",
        palette.tag(&record.tag),
        palette.status(record.status),
        record.name
    )
}

fn progress_line(verified: u64, total: u64) -> String {
    format!("{verified} of {total} verified")
}

struct Palette {
    enabled: bool,
}

impl Palette {
    fn auto() -> Self {
        let enabled = std::env::var_os("NO_COLOR").is_none() && io::stdout().is_terminal();
        Self { enabled }
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.enabled {
            format!("\x1b[{code}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }

    fn heading(&self, text: &str) -> String {
        self.paint("1;36", text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint("2", text)
    }

    fn tag(&self, text: &str) -> String {
        self.paint("1;94", text)
    }

    fn status(&self, status: AssetStatus) -> String {
        let upper = status.as_str().to_ascii_uppercase();
        self.paint(status_color_code(status), &format!("[{upper}]"))
    }
}

fn status_color_code(status: AssetStatus) -> &'static str {
    match status {
        AssetStatus::Present => "32",
        AssetStatus::Manual => "36",
        AssetStatus::Absent => "90",
    }
}
