use tracing::debug;

use super::city::{DayFilter, MonthFilter};
use super::trip_struct::{RecordStore, Schema, TripRecord};

/// Month and day-of-week predicate. `All` on either side matches everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TripFilter {
    pub month: MonthFilter,
    pub day: DayFilter,
}

impl TripFilter {
    pub fn new(month: MonthFilter, day: DayFilter) -> Self {
        Self { month, day }
    }

    pub fn matches(&self, trip: &TripRecord) -> bool {
        let month_check = match self.month {
            MonthFilter::All => true,
            MonthFilter::Only(month) => trip.month() == month,
        };
        let day_check = match self.day {
            DayFilter::All => true,
            DayFilter::Only(day) => trip.day_of_week() == day,
        };

        month_check && day_check
    }
}

/// Trips of one store that passed a filter, in file order.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    schema: Schema,
    records: Vec<&'a TripRecord>,
}

impl<'a> FilteredView<'a> {
    /// Every record of the store, unfiltered.
    pub fn all(store: &'a RecordStore) -> Self {
        Self {
            schema: store.schema(),
            records: store.records().iter().collect(),
        }
    }

    /// Applies `filter` on top of this view.
    pub fn refine(&self, filter: TripFilter) -> FilteredView<'a> {
        FilteredView {
            schema: self.schema,
            records: self
                .records
                .iter()
                .copied()
                .filter(|trip| filter.matches(trip))
                .collect(),
        }
    }

    pub fn schema(&self) -> Schema {
        self.schema
    }

    pub fn records(&self) -> &[&'a TripRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a TripRecord> + '_ {
        self.records.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

pub fn filter(store: &RecordStore, month: MonthFilter, day: DayFilter) -> FilteredView<'_> {
    let view = FilteredView::all(store).refine(TripFilter::new(month, day));
    debug!(
        %month,
        %day,
        kept = view.len(),
        total = store.len(),
        "filter applied"
    );
    view
}
