use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;
use std::time::Instant;

use chrono::NaiveDateTime;
use serde::Deserialize;
use tracing::{debug, info};

use super::city::City;
use super::trip_struct::{RecordStore, Schema, TripRecord};
use crate::error::{Error, Result};

const REQUIRED_COLUMNS: [&str; 5] = [
    "Start Time",
    "Trip Duration",
    "Start Station",
    "End Station",
    "User Type",
];

const TIMESTAMP_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

/// One CSV row as it appears on disk. Unknown columns are ignored.
#[derive(Debug, Deserialize)]
struct RawTrip {
    #[serde(rename = "Start Time")]
    start_time: String,
    #[serde(rename = "End Time", default)]
    end_time: Option<String>,
    #[serde(rename = "Trip Duration")]
    trip_duration: String,
    #[serde(rename = "Start Station")]
    start_station: String,
    #[serde(rename = "End Station")]
    end_station: String,
    #[serde(rename = "User Type", default)]
    user_type: Option<String>,
    #[serde(rename = "Gender", default)]
    gender: Option<String>,
    #[serde(rename = "Birth Year", default)]
    birth_year: Option<String>,
}

pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required_station(row: usize, column: &str, value: String) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::data_format(row, format!("empty {column}")));
    }
    Ok(value.to_string())
}

fn into_record(row: usize, raw: RawTrip, schema: Schema) -> Result<TripRecord> {
    let start_time = parse_timestamp(&raw.start_time).ok_or_else(|| {
        Error::data_format(row, format!("unparsable Start Time '{}'", raw.start_time))
    })?;

    let trip_duration = raw.trip_duration.trim().parse::<f64>().map_err(|_| {
        Error::data_format(
            row,
            format!("unparsable Trip Duration '{}'", raw.trip_duration),
        )
    })?;
    if !trip_duration.is_finite() {
        return Err(Error::data_format(
            row,
            format!("non-finite Trip Duration '{}'", raw.trip_duration.trim()),
        ));
    }
    if trip_duration < 0.0 {
        return Err(Error::data_format(
            row,
            format!("negative Trip Duration {trip_duration}"),
        ));
    }

    let start_station = required_station(row, "Start Station", raw.start_station)?;
    let end_station = required_station(row, "End Station", raw.end_station)?;
    let mut trip = TripRecord::new(start_time, trip_duration, start_station, end_station);

    if schema.has_end_time {
        if let Some(end) = non_blank(raw.end_time) {
            let end_time = parse_timestamp(&end).ok_or_else(|| {
                Error::data_format(row, format!("unparsable End Time '{end}'"))
            })?;
            trip = trip.with_end_time(end_time);
        }
    }

    if let Some(user_type) = non_blank(raw.user_type) {
        trip = trip.with_user_type(user_type);
    }

    if schema.has_gender {
        if let Some(gender) = non_blank(raw.gender) {
            trip = trip.with_gender(gender);
        }
    }

    if schema.has_birth_year {
        if let Some(year) = non_blank(raw.birth_year) {
            // years are stored as floats, e.g. "1992.0"
            let parsed = year
                .parse::<f64>()
                .ok()
                .filter(|y| y.is_finite())
                .ok_or_else(|| {
                    Error::data_format(row, format!("unparsable Birth Year '{year}'"))
                })?;
            trip = trip.with_birth_year(parsed.trunc() as i32);
        }
    }

    Ok(trip)
}

fn read_trips<R: Read>(reader: R) -> Result<(Schema, Vec<TripRecord>)> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .buffer_capacity(128 * 1024)
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let has_column = |name: &str| headers.iter().any(|h| h == name);

    if let Some(missing) = REQUIRED_COLUMNS.iter().find(|c| !has_column(c)) {
        return Err(Error::data_format(0, format!("missing column '{missing}'")));
    }

    let schema = Schema {
        has_end_time: has_column("End Time"),
        has_gender: has_column("Gender"),
        has_birth_year: has_column("Birth Year"),
    };
    debug!(?schema, "dataset header read");

    let mut records = Vec::new();
    for (idx, result) in csv_reader.deserialize::<RawTrip>().enumerate() {
        let row = idx + 1;
        let raw = result.map_err(|e| Error::data_format(row, e.to_string()))?;
        records.push(into_record(row, raw, schema)?);
    }

    Ok((schema, records))
}

impl RecordStore {
    /// Parses a whole dataset from any CSV source. Fails on the first bad row.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let (schema, records) = read_trips(reader)?;
        Ok(RecordStore::new(None, schema, records))
    }
}

/// Loads the dataset backing `city` from `data_dir`.
pub fn load(city: City, data_dir: &Path) -> Result<RecordStore> {
    let path = data_dir.join(city.file_name());
    let file = match File::open(&path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(Error::DatasetNotFound(path));
        }
        Err(e) => return Err(e.into()),
    };

    let start_time = Instant::now();
    let buf_reader = BufReader::with_capacity(64 * 1024, file);
    let (schema, records) = read_trips(buf_reader)?;

    info!(
        city = %city,
        rows = records.len(),
        elapsed = ?start_time.elapsed(),
        "dataset loaded"
    );

    Ok(RecordStore::new(Some(city), schema, records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Month, Weekday};
    use std::fs;
    use tempfile::TempDir;

    const CHICAGO_SAMPLE: &str = "\
,Start Time,End Time,Trip Duration,Start Station,End Station,User Type,Gender,Birth Year
1423854,2017-06-23 15:09:32,2017-06-23 15:14:53,321,Wood St & Hubbard St,Damen Ave & Chicago Ave,Subscriber,Male,1992.0
955915,2017-05-25 18:19:03,2017-05-25 18:45:53,1610,Theater on the Lake,Sheffield Ave & Waveland Ave,Subscriber,Female,1992.0
9031,2017-01-04 08:27:49,2017-01-04 08:34:45,416,May St & Taylor St,Wood St & Taylor St,Customer,,
";

    const WASHINGTON_SAMPLE: &str = "\
,Start Time,End Time,Trip Duration,Start Station,End Station,User Type
1621326,2017-06-21 08:36:34,2017-06-21 08:44:43,489.066,14th & Belmont St NW,15th & K St NW,Subscriber
482740,2017-03-11 10:40:00,2017-03-11 10:46:00,402.549,Yuma St & Tenley Circle NW,Connecticut Ave & Yuma St NW,Subscriber
";

    #[test]
    fn test_parse_timestamp_layouts() {
        assert!(parse_timestamp("2017-06-23 15:09:32").is_some());
        assert!(parse_timestamp("2017-06-23 15:09:32.123").is_some());
        assert!(parse_timestamp("2017-06-23T15:09:32").is_some());
        assert!(parse_timestamp("2017-06-23 15:09").is_some());
        assert!(parse_timestamp("06/23/2017 15:09").is_some());
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("2017-13-40 15:09:32").is_none());
    }

    #[test]
    fn test_from_reader_full_schema() {
        let store = RecordStore::from_reader(CHICAGO_SAMPLE.as_bytes()).unwrap();

        assert_eq!(store.len(), 3);
        assert_eq!(store.schema(), Schema::all());
        assert!(store.city().is_none());

        let first = &store.records()[0];
        assert_eq!(first.month(), Month::June);
        assert_eq!(first.day_of_week(), Weekday::Fri);
        assert_eq!(first.hour(), 15);
        assert_eq!(first.trip_duration, 321.0);
        assert_eq!(first.start_station, "Wood St & Hubbard St");
        assert_eq!(first.gender.as_deref(), Some("Male"));
        assert_eq!(first.birth_year, Some(1992));
        assert!(first.end_time.is_some());

        // blank optional cells are missing values, not empty strings
        let last = &store.records()[2];
        assert_eq!(last.user_type.as_deref(), Some("Customer"));
        assert!(last.gender.is_none());
        assert!(last.birth_year.is_none());
    }

    #[test]
    fn test_from_reader_detects_missing_optional_columns() {
        let store = RecordStore::from_reader(WASHINGTON_SAMPLE.as_bytes()).unwrap();
        let schema = store.schema();

        assert!(schema.has_end_time);
        assert!(!schema.has_gender);
        assert!(!schema.has_birth_year);
        assert_eq!(store.records()[0].trip_duration, 489.066);
    }

    #[test]
    fn test_bad_start_time_fails_whole_load() {
        let data = "\
Start Time,Trip Duration,Start Station,End Station,User Type
2017-06-23 15:09:32,321,A,B,Subscriber
not a date,100,A,B,Subscriber
";
        let err = RecordStore::from_reader(data.as_bytes()).unwrap_err();
        match err {
            Error::DataFormat { row, message } => {
                assert_eq!(row, 2);
                assert!(message.contains("Start Time"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_required_column() {
        let data = "Start Time,Trip Duration,Start Station,User Type\n";
        let err = RecordStore::from_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::DataFormat { row: 0, .. }));
        assert!(err.to_string().contains("End Station"));
    }

    #[test]
    fn test_negative_duration_rejected() {
        let data = "\
Start Time,Trip Duration,Start Station,End Station,User Type
2017-06-23 15:09:32,-5,A,B,Subscriber
";
        let err = RecordStore::from_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::DataFormat { row: 1, .. }));
    }

    #[test]
    fn test_non_numeric_duration_rejected() {
        let data = "\
Start Time,Trip Duration,Start Station,End Station,User Type
2017-06-23 15:09:32,5,A,B,Subscriber
2017-06-23 15:10:32,ten,A,B,Subscriber
";
        let err = RecordStore::from_reader(data.as_bytes()).unwrap_err();
        match err {
            Error::DataFormat { row, message } => {
                assert_eq!(row, 2);
                assert!(message.contains("unparsable Trip Duration 'ten'"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_non_finite_duration_rejected() {
        let data = "\
Start Time,Trip Duration,Start Station,End Station,User Type
2017-06-23 15:09:32,NaN,A,B,Subscriber
";
        let err = RecordStore::from_reader(data.as_bytes()).unwrap_err();
        match err {
            Error::DataFormat { row, message } => {
                assert_eq!(row, 1);
                assert!(message.contains("non-finite"));
                assert!(!message.contains("negative"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_bad_end_time_fails_whole_load() {
        let data = "\
Start Time,End Time,Trip Duration,Start Station,End Station,User Type
2017-06-23 15:09:32,2017-06-23 15:14:53,321,A,B,Subscriber
2017-06-23 16:00:00,2017-06-23 16:05:00,300,A,B,Subscriber
2017-06-23 17:00:00,soon,300,A,B,Subscriber
";
        let err = RecordStore::from_reader(data.as_bytes()).unwrap_err();
        match err {
            Error::DataFormat { row, message } => {
                assert_eq!(row, 3);
                assert!(message.contains("End Time"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_bad_birth_year_fails_whole_load() {
        let data = "\
Start Time,Trip Duration,Start Station,End Station,User Type,Gender,Birth Year
2017-06-23 15:09:32,321,A,B,Subscriber,Male,1992.0
2017-06-23 16:00:00,300,A,B,Subscriber,Female,nineteen
";
        let err = RecordStore::from_reader(data.as_bytes()).unwrap_err();
        match err {
            Error::DataFormat { row, message } => {
                assert_eq!(row, 2);
                assert!(message.contains("Birth Year"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_station_rejected() {
        let data = "\
Start Time,Trip Duration,Start Station,End Station,User Type
2017-06-23 15:09:32,5,,B,Subscriber
";
        let err = RecordStore::from_reader(data.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("Start Station"));
    }

    #[test]
    fn test_load_from_data_dir() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("chicago.csv"), CHICAGO_SAMPLE).unwrap();

        let store = load(City::Chicago, dir.path()).unwrap();
        assert_eq!(store.city(), Some(City::Chicago));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_load_missing_dataset() {
        let dir = TempDir::new().unwrap();
        let err = load(City::Washington, dir.path()).unwrap_err();
        match err {
            Error::DatasetNotFound(path) => {
                assert!(path.ends_with("washington.csv"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
