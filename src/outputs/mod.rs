//! Output writers.
//!
//! - [`csv_sink`]: the CSV results file, one header row followed by one row
//!   per scraped record

pub mod csv_sink;
