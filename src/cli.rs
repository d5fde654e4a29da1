//! Command-line front end: `rusty-facts --xls <file> --template <file>`.
use crate::pipeline::Conversion;
use crate::spreadsheet::open_spreadsheet;
use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "rusty-facts", version, about = "Convert an xlsx workbook into logic-program facts.")]
pub struct Args {
    /// Workbook to convert (.xlsx or .xlsm)
    #[arg(long, short = 'x', value_name = "FILE")]
    pub xls: PathBuf,

    /// Template declaring style and column types per sheet
    #[arg(long, short = 't', value_name = "FILE")]
    pub template: PathBuf,

    /// Write facts into FILE instead of standard output
    #[arg(long, short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// More log output (-v for info, -vv for debug)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Only log errors
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

impl Args {
    fn log_level(&self) -> &'static str {
        match (self.quiet, self.verbose) {
            (true, _) => "error",
            (false, 0) => "warn",
            (false, 1) => "info",
            (false, _) => "debug",
        }
    }
}

/// Installs the stderr log subscriber. `RUST_LOG` wins over the flags.
pub fn init_logging(args: &Args) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_level()));
    // a second install, as in tests, keeps the first one
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Converts the workbook and writes the facts. Nothing is written when any
/// stage fails.
pub fn run(args: &Args) -> Result<()> {
    let mut conversion = Conversion::new();
    conversion
        .load_template_file(&args.template)
        .with_context(|| format!("Invalid template '{}'", args.template.display()))?;

    let mut spreadsheet = open_spreadsheet(&args.xls)
        .with_context(|| format!("Cannot open workbook '{}'", args.xls.display()))?;
    let sheets = spreadsheet
        .read_sheets()
        .with_context(|| format!("Cannot read workbook '{}'", spreadsheet.name()))?;
    info!("Read {} sheets from '{}'", sheets.len(), spreadsheet.name());

    conversion.ingest(sheets)?;
    conversion.correct()?;
    let text = conversion.write()?;

    match &args.output {
        Some(path) => fs::write(path, text).with_context(|| format!("Cannot write '{}'", path.display()))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_args() {
        Args::command().debug_assert();
    }

    #[test]
    fn parse_args() {
        let args = Args::parse_from(["rusty-facts", "--xls", "in.xlsx", "-t", "in.tpl", "-vv"]);
        assert_eq!(args.xls, PathBuf::from("in.xlsx"));
        assert_eq!(args.template, PathBuf::from("in.tpl"));
        assert_eq!(args.output, None);
        assert_eq!(args.log_level(), "debug");

        let args = Args::parse_from(["rusty-facts", "-x", "in.xlsx", "-t", "in.tpl", "-q", "-o", "out.lp"]);
        assert_eq!(args.log_level(), "error");
        assert_eq!(args.output, Some(PathBuf::from("out.lp")));

        assert!(Args::try_parse_from(["rusty-facts", "--xls", "in.xlsx"]).is_err());
        assert!(Args::try_parse_from(["rusty-facts", "-x", "a.xlsx", "-t", "b", "-q", "-v"]).is_err());
    }
}
