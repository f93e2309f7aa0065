use std::{num::NonZeroUsize, path::PathBuf};

use clap::Parser;
use tracing::warn;

use crate::parallel::Options;

// one OS thread per partition, so keep a typo like `-w 100000` from asking for that many
pub const MAX_WORKERS: usize = 1024;

/// Computes min/mean/max per station over a `station;value` file.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Measurements file, one `key;value` record per line.
    pub input: PathBuf,

    /// Number of worker threads, at most 1024. Defaults to the available parallelism.
    #[arg(short, long, value_parser = parse_workers)]
    pub workers: Option<NonZeroUsize>,

    /// Byte separating the key from the value.
    #[arg(short, long, default_value = ";", value_parser = parse_separator)]
    pub separator: u8,

    /// Write the report here instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Read the whole file into memory instead of mapping it.
    #[arg(long)]
    pub read_to_end: bool,

    /// Compare the report with this file and fail if they differ.
    #[arg(long)]
    pub expected: Option<PathBuf>,
}

impl Args {
    pub fn options(&self) -> Options {
        Options {
            workers: self.workers.map_or_else(default_workers, NonZeroUsize::get),
            separator: self.separator,
        }
    }
}

fn parse_workers(s: &str) -> Result<NonZeroUsize, String> {
    let n = s
        .parse::<NonZeroUsize>()
        .map_err(|e| format!("invalid worker count {s:?}: {e}"))?;
    if n.get() > MAX_WORKERS {
        return Err(format!("at most {MAX_WORKERS} workers, got {n}"));
    }
    Ok(n)
}

fn parse_separator(s: &str) -> Result<u8, String> {
    match s.as_bytes() {
        [b] if b.is_ascii() && *b != b'\n' => Ok(*b),
        _ => Err(format!("separator must be a single ASCII byte other than newline, got {s:?}")),
    }
}

pub fn default_workers() -> usize {
    match std::thread::available_parallelism() {
        Ok(n) => n.get(),
        Err(e) => {
            warn!("couldn't query the available parallelism ({e}), going single-threaded");
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["station-stats", "measurements.txt"]).unwrap();
        assert_eq!(args.input, PathBuf::from("measurements.txt"));
        assert_eq!(args.separator, b';');
        assert!(args.output.is_none());
        assert!(!args.read_to_end);
        assert!(args.options().workers >= 1);
    }

    #[test]
    fn test_all_flags() {
        let args = Args::try_parse_from([
            "station-stats",
            "in.txt",
            "-w",
            "3",
            "-s",
            ",",
            "-o",
            "out.txt",
            "--read-to-end",
            "--expected",
            "expected.txt",
        ])
        .unwrap();
        assert_eq!(
            args.options(),
            Options {
                workers: 3,
                separator: b','
            }
        );
        assert_eq!(args.output, Some(PathBuf::from("out.txt")));
        assert_eq!(args.expected, Some(PathBuf::from("expected.txt")));
        assert!(args.read_to_end);
    }

    #[test]
    fn test_worker_cap_is_inclusive() {
        let args = Args::try_parse_from(["station-stats", "in.txt", "-w", "1024"]).unwrap();
        assert_eq!(args.options().workers, MAX_WORKERS);
    }

    #[test]
    fn test_bad_flags() {
        assert!(Args::try_parse_from(["station-stats"]).is_err());
        assert!(Args::try_parse_from(["station-stats", "in.txt", "-w", "0"]).is_err());
        assert!(Args::try_parse_from(["station-stats", "in.txt", "-w", "100000"]).is_err());
        assert!(Args::try_parse_from(["station-stats", "in.txt", "-w", "1025"]).is_err());
        assert!(Args::try_parse_from(["station-stats", "in.txt", "-s", ";;"]).is_err());
        assert!(Args::try_parse_from(["station-stats", "in.txt", "-s", "é"]).is_err());
    }
}
