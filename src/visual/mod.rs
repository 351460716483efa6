pub mod console;

pub use console::{Section, render_page, render_report_json, render_section};
