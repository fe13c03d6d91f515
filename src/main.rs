use std::error::Error;
use std::time::{Duration, Instant};

use cpu_time::ProcessTime;
use prettytable::{format, Cell, Row, Table};

mod cli;
mod gen;
mod job;
mod stream;

use cli::get_cli;
use gen::{distro_format, mem_metric_digit, OutputSink};
use job::{write_jobs, WriteSummary};
use stream::{STREAMS, TOTAL_JOBS};

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {}", &err);
        std::process::exit(1);
    }
}

fn secs(d: Duration) -> f64 {
    (d.as_secs() as f64) + (d.subsec_nanos() as f64 / 1_000_000_000.0)
}

fn stream_table(summary: &WriteSummary) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);
    table.set_titles(Row::new(
        ["stream", "name", "first id", "last id", "rows"].iter().map(|t| Cell::new(t)).collect(),
    ));
    for s in STREAMS.iter() {
        let (first, last) = match s.id_range() {
            Some((f, l)) => (f.to_string(), l.to_string()),
            None => ("?".to_string(), "?".to_string()),
        };
        let rows = summary.per_stream.get(s.id).copied().unwrap_or(0);
        table.add_row(Row::new(vec![
            Cell::new(s.id),
            Cell::new(s.name),
            Cell::new(&first),
            Cell::new(&last),
            Cell::new(&rows.to_string()),
        ]));
    }
    table
}

fn run() -> Result<(), Box<dyn Error>> {
    let cfg = get_cli()?;
    let start_f = Instant::now();
    let startcpu = ProcessTime::now();

    let target = cfg.target();
    let mut sink = OutputSink::create(&target, cfg.compression)?;
    if cfg.verbose >= 1 {
        eprintln!("writing {} jobs as {:?} to {}  compression: {:?}", TOTAL_JOBS, cfg.format, &target, sink.compression());
    }

    let summary = write_jobs(&mut sink, cfg.format)
        .map_err(|err| format!("error writing jobs to {}, cause: {}", &target, err))?;
    if summary.rows != TOTAL_JOBS {
        Err(format!("wrote {} jobs but expected {}", summary.rows, TOTAL_JOBS))?;
    }
    let bytes = sink.finish()?;

    if cfg.verbose > 1 {
        eprintln!("rows per stream: {}", distro_format(&summary.per_stream, STREAMS.len(), 0));
    }
    if cfg.stats {
        stream_table(&summary).print(&mut std::io::stderr())?;
    }
    if cfg.verbose >= 1 || cfg.stats {
        let sec = secs(start_f.elapsed());
        let seccpu = secs(startcpu.elapsed());
        eprintln!(
            "output: {}  rows: {}  written: {}  time: {:.3}  cpu: {:.3}",
            &target,
            summary.rows,
            mem_metric_digit(bytes, 4),
            sec,
            seccpu
        );
    }
    Ok(())
}
