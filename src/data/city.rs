use std::fmt;
use std::str::FromStr;

use chrono::{Month, Weekday};

use crate::error::Error;

const MONTH_NAMES: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

const WEEKDAY_NAMES: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// The datasets only cover the first half of the year.
pub const FILTER_MONTHS: [Month; 6] = [
    Month::January,
    Month::February,
    Month::March,
    Month::April,
    Month::May,
    Month::June,
];

pub fn month_name(month: Month) -> &'static str {
    MONTH_NAMES[month.number_from_month() as usize - 1]
}

pub fn weekday_name(day: Weekday) -> &'static str {
    WEEKDAY_NAMES[day.num_days_from_monday() as usize]
}

fn normalize(input: &str) -> String {
    input.trim().to_lowercase()
}

/// Cities with a bundled dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum City {
    Chicago,
    NewYorkCity,
    Washington,
}

impl City {
    pub const ALL: [City; 3] = [City::Chicago, City::NewYorkCity, City::Washington];

    pub fn id(self) -> &'static str {
        match self {
            City::Chicago => "chicago",
            City::NewYorkCity => "new_york_city",
            City::Washington => "washington",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            City::Chicago => "Chicago",
            City::NewYorkCity => "New York City",
            City::Washington => "Washington",
        }
    }

    /// Backing CSV file, relative to the configured data directory.
    pub fn file_name(self) -> &'static str {
        match self {
            City::Chicago => "chicago.csv",
            City::NewYorkCity => "new_york_city.csv",
            City::Washington => "washington.csv",
        }
    }
}

impl fmt::Display for City {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for City {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = normalize(s).replace(' ', "_");
        City::ALL
            .into_iter()
            .find(|city| city.id() == key)
            .ok_or_else(|| {
                Error::validation("city", s, &["chicago", "new york city", "washington"])
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MonthFilter {
    #[default]
    All,
    Only(Month),
}

impl fmt::Display for MonthFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonthFilter::All => f.write_str("all"),
            MonthFilter::Only(month) => f.write_str(month_name(*month)),
        }
    }
}

impl FromStr for MonthFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = normalize(s);
        if key == "all" {
            return Ok(MonthFilter::All);
        }
        FILTER_MONTHS
            .into_iter()
            .find(|month| month_name(*month) == key)
            .map(MonthFilter::Only)
            .ok_or_else(|| {
                let mut expected = vec!["all"];
                expected.extend(FILTER_MONTHS.iter().map(|m| month_name(*m)));
                Error::validation("month", s, &expected)
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DayFilter {
    #[default]
    All,
    Only(Weekday),
}

impl fmt::Display for DayFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayFilter::All => f.write_str("all"),
            DayFilter::Only(day) => f.write_str(weekday_name(*day)),
        }
    }
}

impl FromStr for DayFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = normalize(s);
        if key == "all" {
            return Ok(DayFilter::All);
        }
        WEEKDAYS
            .into_iter()
            .find(|day| weekday_name(*day) == key)
            .map(DayFilter::Only)
            .ok_or_else(|| {
                let mut expected = vec!["all"];
                expected.extend(WEEKDAY_NAMES);
                Error::validation("day", s, &expected)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_city_parse_accepts_spaces_and_case() {
        assert_eq!("Chicago".parse::<City>().unwrap(), City::Chicago);
        assert_eq!(
            "  New York City ".parse::<City>().unwrap(),
            City::NewYorkCity
        );
        assert_eq!(
            "new_york_city".parse::<City>().unwrap(),
            City::NewYorkCity
        );
        assert_eq!("WASHINGTON".parse::<City>().unwrap(), City::Washington);
    }

    #[test]
    fn test_city_parse_rejects_unknown() {
        let err = "boston".parse::<City>().unwrap_err();
        assert!(matches!(err, Error::Validation { field: "city", .. }));
    }

    #[test]
    fn test_city_file_table() {
        assert_eq!(City::Chicago.file_name(), "chicago.csv");
        assert_eq!(City::NewYorkCity.file_name(), "new_york_city.csv");
        assert_eq!(City::Washington.file_name(), "washington.csv");
    }

    #[test]
    fn test_month_filter_parse() {
        assert_eq!("all".parse::<MonthFilter>().unwrap(), MonthFilter::All);
        assert_eq!(
            "March".parse::<MonthFilter>().unwrap(),
            MonthFilter::Only(Month::March)
        );
        // only the first six months have data
        assert!("july".parse::<MonthFilter>().is_err());
        assert!("".parse::<MonthFilter>().is_err());
    }

    #[test]
    fn test_day_filter_parse() {
        assert_eq!("ALL".parse::<DayFilter>().unwrap(), DayFilter::All);
        assert_eq!(
            "sunday".parse::<DayFilter>().unwrap(),
            DayFilter::Only(Weekday::Sun)
        );
        assert_eq!(
            "Monday".parse::<DayFilter>().unwrap(),
            DayFilter::Only(Weekday::Mon)
        );
        assert!("funday".parse::<DayFilter>().is_err());
    }

    #[test]
    fn test_names_are_lowercase() {
        assert_eq!(month_name(Month::June), "june");
        assert_eq!(weekday_name(Weekday::Wed), "wednesday");
        assert_eq!(MonthFilter::Only(Month::May).to_string(), "may");
        assert_eq!(DayFilter::All.to_string(), "all");
    }
}
