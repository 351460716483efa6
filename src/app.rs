//! Interactive session: prompt, load, report, page through raw rows, restart.

use std::collections::VecDeque;
use std::io::{self, Write};
use std::str::FromStr;
use std::time::Instant;

use colored::Colorize;
use dialoguer::Input;
use tracing::{info, warn};

use crate::config::Config;
use crate::data::stats::{self, TripReport};
use crate::data::{City, DayFilter, FilteredView, MonthFilter, Pager, RecordStore, filter, load};
use crate::error::{Error, Result};
use crate::visual::{Section, render_page, render_report_json, render_section};

/// Source of the user's answers.
pub trait Prompter {
    fn ask(&mut self, prompt: &str) -> Result<String>;
}

/// Reads answers from the terminal.
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn ask(&mut self, prompt: &str) -> Result<String> {
        Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .map_err(|e| Error::Io(io::Error::other(e.to_string())))
    }
}

/// Replays a fixed list of answers, then fails with end-of-input.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&mut self, _prompt: &str) -> Result<String> {
        self.answers.pop_front().ok_or_else(|| {
            Error::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "no more scripted answers",
            ))
        })
    }
}

fn is_yes(answer: &str) -> bool {
    let answer = answer.trim();
    answer.eq_ignore_ascii_case("yes") || answer.eq_ignore_ascii_case("y")
}

/// Options for a single non-interactive pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct OneShot {
    pub month: MonthFilter,
    pub day: DayFilter,
    pub json: bool,
    /// Raw rows to print after the reports.
    pub rows: usize,
}

pub struct Session<P, W> {
    config: Config,
    prompter: P,
    out: W,
}

impl<P: Prompter, W: Write> Session<P, W> {
    pub fn new(config: Config, prompter: P, out: W) -> Self {
        Self {
            config,
            prompter,
            out,
        }
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Re-asks until the answer parses.
    fn ask_until_valid<T>(&mut self, prompt: &str) -> Result<T>
    where
        T: FromStr<Err = Error>,
    {
        loop {
            let answer = self.prompter.ask(prompt)?;
            match answer.parse::<T>() {
                Ok(value) => return Ok(value),
                Err(e) => {
                    warn!(answer = %answer.trim(), "rejected input");
                    writeln!(self.out, "{e}")?;
                }
            }
        }
    }

    fn ask_yes(&mut self, prompt: &str) -> Result<bool> {
        Ok(is_yes(&self.prompter.ask(prompt)?))
    }

    pub fn get_filters(&mut self) -> Result<(City, MonthFilter, DayFilter)> {
        writeln!(
            self.out,
            "{}",
            "Hello! Let's explore some US bikeshare data!".bold()
        )?;
        let city = self.ask_until_valid("City (chicago, new york city, washington)")?;
        let month = self.ask_until_valid("Month (all, january ... june)")?;
        let day = self.ask_until_valid("Day (all, monday ... sunday)")?;
        writeln!(self.out, "{}", "-".repeat(40))?;
        Ok((city, month, day))
    }

    fn load_store(&mut self, city: City) -> Result<RecordStore> {
        info!(
            city = %city,
            path = %self.config.dataset_path(city).display(),
            "loading dataset"
        );
        load(city, &self.config.data_dir)
    }

    fn print_reports(&mut self, view: &FilteredView<'_>) -> Result<()> {
        let started = Instant::now();
        let time = stats::time_stats(view);
        let text = render_section(&Section::Time(&time), started.elapsed());
        self.out.write_all(text.as_bytes())?;

        let started = Instant::now();
        let stations = stats::station_stats(view);
        let text = render_section(&Section::Stations(&stations), started.elapsed());
        self.out.write_all(text.as_bytes())?;

        let started = Instant::now();
        let duration = stats::duration_stats(view);
        let text = render_section(&Section::Duration(&duration), started.elapsed());
        self.out.write_all(text.as_bytes())?;

        let started = Instant::now();
        let users = stats::user_stats(view);
        let text = render_section(&Section::Users(&users), started.elapsed());
        self.out.write_all(text.as_bytes())?;

        Ok(())
    }

    fn page_through(&mut self, view: &FilteredView<'_>) -> Result<()> {
        let mut pager = Pager::with_page_size(view, self.config.page_size);
        while !pager.is_exhausted() {
            let wants_more = self.ask_yes("Would you like to view raw data? Enter yes or no")?;
            if !wants_more {
                pager.stop();
                break;
            }
            let text = render_page(&pager.next_page(), view.schema());
            self.out.write_all(text.as_bytes())?;
        }
        Ok(())
    }

    /// One analysis cycle for an already chosen city and filter.
    pub fn run_cycle(&mut self, city: City, month: MonthFilter, day: DayFilter) -> Result<()> {
        let store = self.load_store(city)?;
        let view = filter(&store, month, day);
        writeln!(
            self.out,
            "{} trips in {} (month: {month}, day: {day})",
            view.len(),
            city.display_name()
        )?;

        self.print_reports(&view)?;
        self.page_through(&view)
    }

    /// Prompts, analyses and offers a restart until the user declines.
    pub fn run(&mut self) -> Result<()> {
        loop {
            let (city, month, day) = self.get_filters()?;
            match self.run_cycle(city, month, day) {
                Ok(()) => {}
                Err(e @ (Error::DatasetNotFound(_) | Error::DataFormat { .. } | Error::Csv(_))) => {
                    warn!(error = %e, "analysis cycle aborted");
                    writeln!(self.out, "{} {e}", "✗".red())?;
                }
                Err(e) => return Err(e),
            }

            if !self.ask_yes("Would you like to restart? Enter yes or no")? {
                break;
            }
        }
        Ok(())
    }

    /// Single pass without prompts, used when the city comes from the command line.
    pub fn run_once(&mut self, city: City, options: OneShot) -> Result<()> {
        let store = self.load_store(city)?;
        let view = filter(&store, options.month, options.day);

        if options.json {
            let report = TripReport::compute(&view);
            writeln!(self.out, "{}", render_report_json(&report)?)?;
        } else {
            writeln!(
                self.out,
                "{} trips in {} (month: {}, day: {})",
                view.len(),
                city.display_name(),
                options.month,
                options.day
            )?;
            self.print_reports(&view)?;
        }

        if options.rows > 0 {
            let mut pager = Pager::with_page_size(&view, options.rows);
            let text = render_page(&pager.next_page(), view.schema());
            self.out.write_all(text.as_bytes())?;
        }

        Ok(())
    }
}
