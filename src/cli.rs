use clap::Parser;
use std::path::PathBuf;

use bikeshare::data::{City, DayFilter, MonthFilter};

#[derive(Parser, Debug)]
#[command(name = "bikeshare")]
#[command(author, version, about = "Explore US bikeshare trip data")]
pub struct Cli {
    /// Directory holding chicago.csv, new_york_city.csv and washington.csv
    #[arg(long, env = "BIKESHARE_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// JSON config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Raw rows shown per page
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Analyse this city once and exit instead of prompting
    #[arg(long)]
    pub city: Option<City>,

    /// Month filter for --city (all, january ... june)
    #[arg(long, default_value = "all")]
    pub month: MonthFilter,

    /// Day filter for --city (all, monday ... sunday)
    #[arg(long, default_value = "all")]
    pub day: DayFilter,

    /// Print the --city report as JSON
    #[arg(long)]
    pub json: bool,

    /// Raw rows to print after the --city report
    #[arg(long, default_value_t = 0)]
    pub rows: usize,
}
