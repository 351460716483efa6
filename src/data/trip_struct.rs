use chrono::{Datelike, Month, NaiveDateTime, Timelike, Weekday};

use super::city::{City, month_name, weekday_name};

/// One bikeshare trip.
///
/// `month`, `day_of_week` and `hour` are derived from `start_time` when the
/// record is built and cannot be set independently of it.
#[derive(Debug, Clone, PartialEq)]
pub struct TripRecord {
    start_time: NaiveDateTime,
    month: Month,
    day_of_week: Weekday,
    hour: u32,
    pub end_time: Option<NaiveDateTime>,
    pub trip_duration: f64,
    pub start_station: String,
    pub end_station: String,
    pub user_type: Option<String>,
    pub gender: Option<String>,
    pub birth_year: Option<i32>,
}

impl TripRecord {
    pub fn new(
        start_time: NaiveDateTime,
        trip_duration: f64,
        start_station: impl Into<String>,
        end_station: impl Into<String>,
    ) -> Self {
        let month = Month::try_from(start_time.month() as u8)
            .expect("Datelike::month is always in 1..=12");
        Self {
            start_time,
            month,
            day_of_week: start_time.weekday(),
            hour: start_time.hour(),
            end_time: None,
            trip_duration,
            start_station: start_station.into(),
            end_station: end_station.into(),
            user_type: None,
            gender: None,
            birth_year: None,
        }
    }

    pub fn with_end_time(mut self, end_time: NaiveDateTime) -> Self {
        self.end_time = Some(end_time);
        self
    }

    pub fn with_user_type(mut self, user_type: impl Into<String>) -> Self {
        self.user_type = Some(user_type.into());
        self
    }

    pub fn with_gender(mut self, gender: impl Into<String>) -> Self {
        self.gender = Some(gender.into());
        self
    }

    pub fn with_birth_year(mut self, birth_year: i32) -> Self {
        self.birth_year = Some(birth_year);
        self
    }

    pub fn start_time(&self) -> NaiveDateTime {
        self.start_time
    }

    pub fn month(&self) -> Month {
        self.month
    }

    pub fn month_name(&self) -> &'static str {
        month_name(self.month)
    }

    pub fn day_of_week(&self) -> Weekday {
        self.day_of_week
    }

    pub fn day_name(&self) -> &'static str {
        weekday_name(self.day_of_week)
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }
}

/// Optional columns present in a city's dataset, read once from the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Schema {
    pub has_end_time: bool,
    pub has_gender: bool,
    pub has_birth_year: bool,
}

impl Schema {
    pub fn all() -> Self {
        Self {
            has_end_time: true,
            has_gender: true,
            has_birth_year: true,
        }
    }
}

/// All trips of one city, in file order. Never mutated after load.
#[derive(Debug, Clone)]
pub struct RecordStore {
    city: Option<City>,
    schema: Schema,
    records: Vec<TripRecord>,
}

impl RecordStore {
    pub fn new(city: Option<City>, schema: Schema, records: Vec<TripRecord>) -> Self {
        Self {
            city,
            schema,
            records,
        }
    }

    /// `None` when the store was built from an arbitrary reader.
    pub fn city(&self) -> Option<City> {
        self.city
    }

    pub fn schema(&self) -> Schema {
        self.schema
    }

    pub fn records(&self) -> &[TripRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
