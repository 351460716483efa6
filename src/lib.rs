//! Bikeshare trip analytics: load a city's trips, filter by month and day,
//! report travel statistics and page through the raw rows.

pub mod app;
pub mod config;
pub mod data;
pub mod error;
pub mod visual;

pub use config::Config;
pub use error::{Error, Result};
