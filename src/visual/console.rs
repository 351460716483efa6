//! Plain-text rendering of reports and raw rows.
//!
//! Everything here builds a `String`; the session decides where it goes.

use std::fmt::Write;
use std::time::Duration;

use colored::Colorize;

use crate::data::Schema;
use crate::data::pager::Page;
use crate::data::stats::{
    DurationStats, Measure, StationStats, TimeStats, TripReport, UserStats, ValueCount,
};

const SEPARATOR_WIDTH: usize = 40;
const NO_DATA: &str = "No data";

/// One of the four report blocks, tagged for rendering.
pub enum Section<'r> {
    Time(&'r Measure<TimeStats>),
    Stations(&'r Measure<StationStats>),
    Duration(&'r DurationStats),
    Users(&'r UserStats),
}

impl Section<'_> {
    fn title(&self) -> &'static str {
        match self {
            Section::Time(_) => "Calculating The Most Frequent Times of Travel...",
            Section::Stations(_) => "Calculating The Most Popular Stations and Trip...",
            Section::Duration(_) => "Calculating Trip Duration...",
            Section::Users(_) => "Calculating User Stats...",
        }
    }
}

fn separator() -> String {
    "-".repeat(SEPARATOR_WIDTH)
}

fn format_hour(hour: u32) -> String {
    format!("{hour:02}:00")
}

/// `1h 02m 03s` style, keeping fractional seconds out of the way.
fn format_seconds(seconds: f64) -> String {
    let whole = seconds.round() as u64;
    let (hours, rest) = (whole / 3600, whole % 3600);
    let (minutes, secs) = (rest / 60, rest % 60);
    if hours > 0 {
        format!("{seconds:.1} s ({hours}h {minutes:02}m {secs:02}s)")
    } else {
        format!("{seconds:.1} s ({minutes}m {secs:02}s)")
    }
}

fn write_counts(out: &mut String, label: &str, counts: &[ValueCount]) {
    let _ = writeln!(out, "{label}:");
    if counts.is_empty() {
        let _ = writeln!(out, "  {NO_DATA}");
        return;
    }
    for entry in counts {
        let _ = writeln!(out, "  {:<20} {}", entry.value, entry.count);
    }
}

fn write_time(out: &mut String, stats: &Measure<TimeStats>) {
    let Measure::Value(stats) = stats else {
        let _ = writeln!(out, "{NO_DATA}");
        return;
    };
    if let Some(month) = &stats.most_common_month {
        let _ = writeln!(out, "Most Common Month: {month}");
    }
    if let Some(day) = &stats.most_common_day_of_week {
        let _ = writeln!(out, "Most Common Day of Week: {day}");
    }
    let _ = writeln!(
        out,
        "Most Common Start Hour: {}",
        format_hour(stats.most_common_start_hour)
    );
}

fn write_stations(out: &mut String, stats: &Measure<StationStats>) {
    let Measure::Value(stats) = stats else {
        let _ = writeln!(out, "{NO_DATA}");
        return;
    };
    let _ = writeln!(
        out,
        "Most Commonly Used Start Station: {}",
        stats.most_common_start_station
    );
    let _ = writeln!(
        out,
        "Most Commonly Used End Station: {}",
        stats.most_common_end_station
    );
    let _ = writeln!(
        out,
        "Most Frequent Trip: {} -> {}",
        stats.most_common_trip.start, stats.most_common_trip.end
    );
}

fn write_duration(out: &mut String, stats: &DurationStats) {
    let _ = writeln!(
        out,
        "Total Travel Time: {}",
        format_seconds(stats.total_travel_time)
    );
    match &stats.mean_travel_time {
        Measure::Value(mean) => {
            let _ = writeln!(out, "Mean Travel Time: {}", format_seconds(*mean));
        }
        Measure::NoData => {
            let _ = writeln!(out, "Mean Travel Time: {NO_DATA}");
        }
    }
}

fn write_users(out: &mut String, stats: &UserStats) {
    write_counts(out, "Counts of User Types", &stats.user_types);

    if let Some(gender) = &stats.gender {
        out.push('\n');
        write_counts(out, "Counts of Gender", gender);
    }

    if let Some(birth_year) = &stats.birth_year {
        out.push('\n');
        match birth_year {
            Measure::Value(years) => {
                let _ = writeln!(out, "Earliest Year of Birth: {}", years.earliest);
                let _ = writeln!(out, "Most Recent Year of Birth: {}", years.most_recent);
                let _ = writeln!(out, "Most Common Year of Birth: {}", years.most_common);
            }
            Measure::NoData => {
                let _ = writeln!(out, "Year of Birth: {NO_DATA}");
            }
        }
    }
}

/// Title, body, elapsed time and a closing separator.
pub fn render_section(section: &Section<'_>, elapsed: Duration) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n{}\n", section.title().bold());

    match section {
        Section::Time(stats) => write_time(&mut out, stats),
        Section::Stations(stats) => write_stations(&mut out, stats),
        Section::Duration(stats) => write_duration(&mut out, stats),
        Section::Users(stats) => write_users(&mut out, stats),
    }

    let _ = writeln!(out, "\nThis took {elapsed:.2?}.");
    let _ = writeln!(out, "{}", separator());
    out
}

/// Raw rows of one page. Optional columns only show when the dataset has them.
pub fn render_page(page: &Page<'_, '_>, schema: Schema) -> String {
    let Page::Rows { offset, rows } = page else {
        return "No more data to display.\n".to_string();
    };

    let mut out = String::new();
    for (i, trip) in rows.iter().enumerate() {
        let _ = writeln!(out, "{}", format!("#{}", offset + i).cyan());
        let _ = writeln!(out, "  Start Time:    {}", trip.start_time());
        if schema.has_end_time {
            match trip.end_time {
                Some(end) => {
                    let _ = writeln!(out, "  End Time:      {end}");
                }
                None => {
                    let _ = writeln!(out, "  End Time:      -");
                }
            }
        }
        let _ = writeln!(out, "  Trip Duration: {}", trip.trip_duration);
        let _ = writeln!(out, "  Start Station: {}", trip.start_station);
        let _ = writeln!(out, "  End Station:   {}", trip.end_station);
        let _ = writeln!(
            out,
            "  User Type:     {}",
            trip.user_type.as_deref().unwrap_or("-")
        );
        if schema.has_gender {
            let _ = writeln!(
                out,
                "  Gender:        {}",
                trip.gender.as_deref().unwrap_or("-")
            );
        }
        if schema.has_birth_year {
            let year = trip
                .birth_year
                .map_or_else(|| "-".to_string(), |y| y.to_string());
            let _ = writeln!(out, "  Birth Year:    {year}");
        }
    }
    out
}

pub fn render_report_json(report: &TripReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}
