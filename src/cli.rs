use std::path::PathBuf;

use structopt::StructOpt;

use crate::gen::{Compression, OutputTarget};
use crate::job::OutputFormat;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

pub const DEFAULT_OUTPUT: &str = "generated_sql_jobs.txt";

#[derive(StructOpt, Debug, Clone)]
#[structopt(
global_settings(& [structopt::clap::AppSettings::ColoredHelp, structopt::clap::AppSettings::DeriveDisplayOrder]),
name = "sqljobs",
)]
/// Generate the dummy INSERT statements for the job table.
///
/// Writes 25 jobs for each of the 7 streams, ids 1 to 175, into generated_sql_jobs.txt
pub struct CliCfg {
    #[structopt(short = "o", long = "output", name = "output", parse(from_os_str), conflicts_with = "stdout")]
    /// Output file, truncated if it exists
    ///
    /// Defaults to generated_sql_jobs.txt in the working directory.
    /// Ending the name with .gz or .zst compresses the output unless -z says otherwise.
    pub output: Option<PathBuf>,

    #[structopt(long = "stdout", name = "stdout")]
    /// Write to standard out instead of a file
    pub stdout: bool,

    #[structopt(short = "F", long = "format", name = "format", default_value = "sql")]
    /// Output format: sql or csv
    ///
    /// sql writes one INSERT INTO job statement per line.
    /// csv writes a header of id,title,description,stream_id and then one row per job.
    pub format: OutputFormat,

    #[structopt(short = "z", long = "compression", name = "compression", default_value = "auto")]
    /// Compression: auto, none, gzip or zstd
    ///
    /// auto looks at the output file extension: .gz is gzip, .zst or .zstd is zstd
    pub compression: Compression,

    #[structopt(long = "stats")]
    /// Write a per stream summary and run stats to stderr
    pub stats: bool,

    #[structopt(short = "v", parse(from_occurrences))]
    /// Verbosity - use more than one v for greater detail
    pub verbose: usize,

    #[structopt(short = "E", long = "print_examples")]
    /// Print a few usage examples and exit
    pub print_examples: bool,
}

impl CliCfg {
    pub fn target(&self) -> OutputTarget {
        if self.stdout {
            OutputTarget::Stdout
        } else {
            OutputTarget::File(self.output.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT)))
        }
    }
}

fn print_examples() {
    println!("{}",
             r#"
    Here are a few examples for quick reference

    sqljobs                          # writes generated_sql_jobs.txt in the current directory
    sqljobs -o seed/jobs.sql         # same statements, different file
    sqljobs -o jobs.sql.gz           # gzip compressed, picked from the extension
    sqljobs --stdout | sqlite3 x.db  # pipe straight into a database shell
    sqljobs -F csv -o jobs.csv       # same rows as csv with a header line
    sqljobs --stats                  # print the id range of every stream when done
    "#);
}

/// Checks the parsed options for combinations structopt cannot express.
pub fn validate(cfg: CliCfg) -> Result<CliCfg> {
    if let OutputTarget::File(path) = cfg.target() {
        if path.as_os_str().is_empty() {
            Err("output file name is empty")?;
        }
        if path.is_dir() {
            Err(format!("output path \"{}\" is a directory", path.display()))?;
        }
    }
    if cfg.verbose == 1 {
        eprintln!("CLI options: {:?}", cfg);
    } else if cfg.verbose > 1 {
        eprintln!("CLI options: {:#?}", cfg);
    }
    Ok(cfg)
}

pub fn get_cli() -> Result<CliCfg> {
    let cfg: CliCfg = CliCfg::from_args();
    if cfg.print_examples {
        print_examples();
        std::process::exit(0);
    }
    validate(cfg)
}
