use std::fs;
use std::io::{self, Write};
use std::path::Path;

use crate::error::Result;
use crate::harness::Measured;
use crate::schema::BenchReport;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    /// `<repeat_count> <elapsed_seconds> <calls_per_repeat>` on one line.
    #[default]
    Text,
    /// The full run report.
    Json,
}

pub fn text_line(m: &Measured) -> String {
    format!(
        "{} {:.9} {}",
        m.repeat_count,
        m.elapsed_secs(),
        m.calls_per_repeat
    )
}

pub fn render(report: &BenchReport, format: Format) -> Result<String> {
    Ok(match format {
        Format::Text => text_line(&report.measurement.measured),
        Format::Json => serde_json::to_string_pretty(report)?,
    })
}

pub fn write_to<W: Write>(out: &mut W, report: &BenchReport, format: Format) -> Result<()> {
    let s = render(report, format)?;
    writeln!(out, "{s}")?;
    out.flush()?;
    Ok(())
}

/// Writes the report to `path`, or to stdout when there is none.
pub fn report(report: &BenchReport, format: Format, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            let s = render(report, format)?;
            fs::write(path, s + "\n")?;
        }
        None => write_to(&mut io::stdout().lock(), report, format)?,
    }
    Ok(())
}
