pub mod compute;
pub mod config;
pub mod parallel;
pub mod partition;
pub mod report;
pub mod source;

use std::{
    io::{BufWriter, Write},
    time::Instant,
};

use anyhow::{bail, Context};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};

use crate::{config::Args, report::Report, source::Source};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    run(&args)
}

fn run(args: &Args) -> anyhow::Result<()> {
    let begin = Instant::now();
    let input = Source::open(&args.input, args.read_to_end)?;
    let opts = args.options();
    info!(
        path = %args.input.display(),
        len = input.len(),
        workers = opts.workers,
        "starting"
    );

    let begin_compute = Instant::now();
    let summary = parallel::aggregate(&input, &opts);
    let compute_ms = begin_compute.elapsed().as_millis() as u64;
    let counts = summary.counts;

    let report = Report::new(summary.totals);
    let out = report.to_string();
    match &args.output {
        Some(path) => std::fs::write(path, &out)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => {
            let mut stdout = BufWriter::with_capacity(2 * 1024 * 1024, std::io::stdout().lock());
            stdout.write_all(out.as_bytes())?;
            stdout.flush()?;
        }
    }

    info!(
        keys = report.rows().len(),
        records = counts.records,
        skipped = counts.skipped,
        compute_ms,
        total_ms = begin.elapsed().as_millis() as u64,
        "done"
    );

    if let Some(path) = &args.expected {
        let expected = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        if expected != out {
            bail!("output did not match {}", path.display());
        }
        info!("output matched {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args_for(dir: &std::path::Path, extra: &[&str]) -> Args {
        let input = dir.join("measurements.txt");
        let output = dir.join("result.txt");
        let mut argv = vec![
            "station-stats".to_string(),
            input.display().to_string(),
            "-o".to_string(),
            output.display().to_string(),
        ];
        argv.extend(extra.iter().map(|s| s.to_string()));
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_run_writes_report() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("measurements.txt"), "A;10.0\nB;-5.5\nA;20.0\n").unwrap();
        for extra in [&["-w", "1"][..], &["-w", "4", "--read-to-end"][..]] {
            run(&args_for(dir.path(), extra)).unwrap();
            assert_eq!(
                std::fs::read_to_string(dir.path().join("result.txt")).unwrap(),
                "A;10.0/15.0/20.0\nB;-5.5/-5.5/-5.5\n"
            );
        }
    }

    #[test]
    fn test_run_empty_input() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("measurements.txt"), "").unwrap();
        run(&args_for(dir.path(), &[])).unwrap();
        assert_eq!(std::fs::read_to_string(dir.path().join("result.txt")).unwrap(), "");
    }

    #[test]
    fn test_run_missing_input_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(run(&args_for(dir.path(), &[])).is_err());
    }

    #[test]
    fn test_run_checks_expected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("measurements.txt"), "X;1.0\n").unwrap();
        let expected = dir.path().join("result-expected.txt");
        let expected_arg = expected.display().to_string();

        std::fs::write(&expected, "X;1.0/1.0/1.0\n").unwrap();
        run(&args_for(dir.path(), &["--expected", &expected_arg])).unwrap();

        std::fs::write(&expected, "X;2.0/2.0/2.0\n").unwrap();
        let err = run(&args_for(dir.path(), &["--expected", &expected_arg])).unwrap_err();
        assert!(err.to_string().contains("did not match"));
    }
}
