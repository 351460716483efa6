//! Descriptive statistics over a filtered view.
//!
//! Each aggregator is independent and only reads the view. An empty view
//! never produces an error: the affected figures come back as
//! [`Measure::NoData`]. Figures for columns the city's dataset does not have
//! are left out of the report entirely (`None`).

use std::hash::Hash;

use indexmap::IndexMap;
use serde::Serialize;

use super::filters::FilteredView;

/// A computed figure, or an explicit marker that there was nothing to compute it from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Measure<T> {
    Value(T),
    NoData,
}

impl<T> Measure<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            Measure::Value(value) => Some(value),
            Measure::NoData => None,
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, Measure::NoData)
    }
}

impl<T> From<Option<T>> for Measure<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Measure::NoData, Measure::Value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

/// Occurrences per distinct value, keyed in order of first appearance.
///
/// Also tracks the mode while counting: the leader only changes when a value
/// strictly overtakes it, so on a tie the value that reached the top count
/// first wins.
struct Tally<T> {
    counts: IndexMap<T, usize>,
    /// (index into `counts`, count) of the current mode.
    leader: Option<(usize, usize)>,
}

impl<T: Hash + Eq> Tally<T> {
    fn count<I>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let mut counts: IndexMap<T, usize> = IndexMap::new();
        let mut leader: Option<(usize, usize)> = None;
        for value in values {
            let entry = counts.entry(value);
            let index = entry.index();
            let count = entry.or_insert(0);
            *count += 1;
            if leader.is_none_or(|(_, top)| *count > top) {
                leader = Some((index, *count));
            }
        }
        Self { counts, leader }
    }

    fn distinct(&self) -> usize {
        self.counts.len()
    }

    fn into_mode(mut self) -> Option<T> {
        let (index, _) = self.leader?;
        self.counts.swap_remove_index(index).map(|(value, _)| value)
    }
}

/// Most frequent value. Ties go to the value that reached the top count first.
pub fn mode<T, I>(values: I) -> Option<T>
where
    T: Hash + Eq,
    I: IntoIterator<Item = T>,
{
    Tally::count(values).into_mode()
}

/// Full distribution, most frequent first. Equal counts keep first-seen order.
pub fn value_counts<'a, I>(values: I) -> Vec<ValueCount>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: Vec<ValueCount> = Tally::count(values)
        .counts
        .into_iter()
        .map(|(value, count)| ValueCount {
            value: value.to_string(),
            count,
        })
        .collect();
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

// ============================================================================
// Time pattern
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeStats {
    /// Left out when the view only spans one month.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub most_common_month: Option<String>,
    /// Left out when the view only spans one day of the week.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub most_common_day_of_week: Option<String>,
    pub most_common_start_hour: u32,
}

pub fn time_stats(view: &FilteredView<'_>) -> Measure<TimeStats> {
    let Some(most_common_start_hour) = mode(view.iter().map(|t| t.hour())) else {
        return Measure::NoData;
    };

    let months = Tally::count(view.iter().map(|t| t.month_name()));
    let most_common_month = if months.distinct() > 1 {
        months.into_mode().map(str::to_string)
    } else {
        None
    };

    let days = Tally::count(view.iter().map(|t| t.day_name()));
    let most_common_day_of_week = if days.distinct() > 1 {
        days.into_mode().map(str::to_string)
    } else {
        None
    };

    Measure::Value(TimeStats {
        most_common_month,
        most_common_day_of_week,
        most_common_start_hour,
    })
}

// ============================================================================
// Stations
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StationPair {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationStats {
    pub most_common_start_station: String,
    pub most_common_end_station: String,
    pub most_common_trip: StationPair,
}

pub fn station_stats(view: &FilteredView<'_>) -> Measure<StationStats> {
    let start = mode(view.iter().map(|t| t.start_station.as_str()));
    let end = mode(view.iter().map(|t| t.end_station.as_str()));
    let trip = mode(
        view.iter()
            .map(|t| (t.start_station.as_str(), t.end_station.as_str())),
    );

    match (start, end, trip) {
        (Some(start), Some(end), Some((trip_start, trip_end))) => Measure::Value(StationStats {
            most_common_start_station: start.to_string(),
            most_common_end_station: end.to_string(),
            most_common_trip: StationPair {
                start: trip_start.to_string(),
                end: trip_end.to_string(),
            },
        }),
        _ => Measure::NoData,
    }
}

// ============================================================================
// Trip duration
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DurationStats {
    /// Seconds. Zero for an empty view.
    pub total_travel_time: f64,
    /// Seconds.
    pub mean_travel_time: Measure<f64>,
}

pub fn duration_stats(view: &FilteredView<'_>) -> DurationStats {
    let total_travel_time: f64 = view.iter().map(|t| t.trip_duration).sum();
    let mean_travel_time = (!view.is_empty())
        .then(|| total_travel_time / view.len() as f64)
        .into();

    DurationStats {
        total_travel_time,
        mean_travel_time,
    }
}

// ============================================================================
// Users
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BirthYearStats {
    pub earliest: i32,
    pub most_recent: i32,
    pub most_common: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserStats {
    pub user_types: Vec<ValueCount>,
    /// `None` when the dataset has no Gender column.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Vec<ValueCount>>,
    /// `None` when the dataset has no Birth Year column.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_year: Option<Measure<BirthYearStats>>,
}

fn birth_year_stats(view: &FilteredView<'_>) -> Measure<BirthYearStats> {
    let years: Vec<i32> = view.iter().filter_map(|t| t.birth_year).collect();
    let (Some(earliest), Some(most_recent), Some(most_common)) = (
        years.iter().copied().min(),
        years.iter().copied().max(),
        mode(years.iter().copied()),
    ) else {
        return Measure::NoData;
    };

    Measure::Value(BirthYearStats {
        earliest,
        most_recent,
        most_common,
    })
}

pub fn user_stats(view: &FilteredView<'_>) -> UserStats {
    let schema = view.schema();

    let user_types = value_counts(view.iter().filter_map(|t| t.user_type.as_deref()));
    let gender = schema
        .has_gender
        .then(|| value_counts(view.iter().filter_map(|t| t.gender.as_deref())));
    let birth_year = schema.has_birth_year.then(|| birth_year_stats(view));

    UserStats {
        user_types,
        gender,
        birth_year,
    }
}

// ============================================================================
// All four together
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripReport {
    pub time: Measure<TimeStats>,
    pub stations: Measure<StationStats>,
    pub duration: DurationStats,
    pub users: UserStats,
}

impl TripReport {
    pub fn compute(view: &FilteredView<'_>) -> Self {
        Self {
            time: time_stats(view),
            stations: station_stats(view),
            duration: duration_stats(view),
            users: user_stats(view),
        }
    }
}
