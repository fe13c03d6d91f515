use std::collections::HashMap;
use std::fmt;
use std::io::Write;
use std::str::FromStr;

use itertools::Itertools;

use crate::stream::{Stream, JOBS_PER_STREAM, STREAMS};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// One row of the job table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: usize,
    pub title: String,
    pub description: String,
    pub stream_id: &'static str,
}

impl Job {
    fn new(id: usize, stream: &Stream, n: usize) -> Job {
        let title = format!("{} {}", stream.name, n);
        let description = format!("Description of {}", title);
        Job {
            id,
            title,
            description,
            stream_id: stream.id,
        }
    }
}

impl fmt::Display for Job {
    // values are hardcoded and never hold a double quote, so nothing is escaped
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "INSERT INTO job VALUES({}, \"{}\", \"{}\", \"{}\");",
            self.id, self.title, self.description, self.stream_id
        )
    }
}

/// Every job in generation order: streams in listed order, 1..=JOBS_PER_STREAM within
/// each, ids counting up from 1 across the whole run.
pub fn jobs() -> impl Iterator<Item = Job> {
    STREAMS
        .iter()
        .cartesian_product(1..=JOBS_PER_STREAM)
        .enumerate()
        .map(|(i, (stream, n))| Job::new(i + 1, stream, n))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Sql,
    Csv,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sql" => Ok(OutputFormat::Sql),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("output format \"{}\" not understood - use sql or csv", s)),
        }
    }
}

pub const CSV_HEADER: [&str; 4] = ["id", "title", "description", "stream_id"];

#[derive(Debug, Default)]
pub struct WriteSummary {
    pub rows: usize,
    pub per_stream: HashMap<&'static str, usize>,
}

/// Writes all jobs to `writer` in the requested format.
///
/// The writer is flushed but not closed; finishing the underlying sink is up to the caller.
pub fn write_jobs<W: Write>(writer: &mut W, format: OutputFormat) -> Result<WriteSummary> {
    let mut summary = WriteSummary::default();
    match format {
        OutputFormat::Sql => {
            let mut line = String::with_capacity(128);
            for job in jobs() {
                line.clear();
                line.push_str(&job.to_string());
                line.push('\n');
                writer.write_all(line.as_bytes())?;
                summary.add(&job);
            }
            writer.flush()?;
        }
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(&mut *writer);
            wtr.write_record(&CSV_HEADER)?;
            for job in jobs() {
                let id = job.id.to_string();
                wtr.write_record(&[id.as_str(), job.title.as_str(), job.description.as_str(), job.stream_id])?;
                summary.add(&job);
            }
            wtr.flush()?;
        }
    }
    Ok(summary)
}

impl WriteSummary {
    fn add(&mut self, job: &Job) {
        self.rows += 1;
        *self.per_stream.entry(job.stream_id).or_insert(0) += 1;
    }
}
