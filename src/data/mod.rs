pub mod city;
pub mod data_lector;
pub mod filters;
pub mod pager;
pub mod stats;
pub mod trip_struct;

pub use city::{City, DayFilter, MonthFilter};
pub use data_lector::load;
pub use filters::{FilteredView, TripFilter, filter};
pub use pager::{Page, Pager};
pub use stats::TripReport;
pub use trip_struct::{RecordStore, Schema, TripRecord};

#[cfg(test)]
pub(crate) mod test_support {
    use super::data_lector::parse_timestamp;
    use super::trip_struct::{RecordStore, Schema, TripRecord};

    pub fn trip_at(start_time: &str, start: &str, end: &str) -> TripRecord {
        let start_time = parse_timestamp(start_time).expect("valid test timestamp");
        TripRecord::new(start_time, 60.0, start, end).with_user_type("Subscriber")
    }

    pub fn store_of(records: Vec<TripRecord>) -> RecordStore {
        RecordStore::new(None, Schema::all(), records)
    }

    pub fn store_with_schema(schema: Schema, records: Vec<TripRecord>) -> RecordStore {
        RecordStore::new(None, schema, records)
    }
}
