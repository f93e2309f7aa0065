use std::time::Instant;

use tracing::debug;

use crate::compute::{process_chunk, AggMap, ChunkCounts};
use crate::partition::{align_start, plan, Partition};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    pub workers: usize,
    pub separator: u8,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            workers: 1,
            separator: b';',
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Summary {
    pub totals: AggMap,
    pub counts: ChunkCounts,
}

impl Summary {
    pub fn merge(&mut self, totals: AggMap, counts: ChunkCounts) {
        self.totals = merge_chunks(std::mem::take(&mut self.totals), totals);
        self.counts.add(counts);
    }
}

pub fn merge_chunks(mut a: AggMap, b: AggMap) -> AggMap {
    // fold the smaller map into the bigger one
    if a.len() < b.len() {
        return merge_chunks(b, a);
    }
    for (name, agg) in b {
        a.entry(name).or_default().merge(agg);
    }
    a
}

pub fn aggregate_partition(input: &[u8], part: Partition, separator: u8) -> (AggMap, ChunkCounts) {
    let mut totals = AggMap::default();
    let start = align_start(input, part.start);
    let counts = process_chunk(input, start, part.end, separator, &mut totals);
    (totals, counts)
}

pub fn aggregate(input: &[u8], opts: &Options) -> Summary {
    let begin = Instant::now();
    let parts = plan(input.len(), opts.workers);
    debug!(len = input.len(), workers = parts.len(), "planned partitions");

    let (tx, rx) = crossbeam::channel::unbounded::<(usize, AggMap, ChunkCounts)>();
    let summary = std::thread::scope(|scope| {
        for (i, part) in parts.iter().copied().enumerate() {
            let tx = tx.clone();
            let separator = opts.separator;
            scope.spawn(move || {
                let begin = Instant::now();
                let (totals, counts) = aggregate_partition(input, part, separator);
                debug!(
                    worker = i,
                    start = part.start,
                    end = part.end,
                    keys = totals.len(),
                    records = counts.records,
                    skipped = counts.skipped,
                    elapsed_ms = begin.elapsed().as_millis() as u64,
                    "worker done"
                );
                tx.send((i, totals, counts)).ok();
            });
        }
        // the receive loop below only ends once every sender is gone, ours included
        drop(tx);

        // merged in whatever order the workers finish
        let mut summary = Summary::default();
        for (_, totals, counts) in rx.iter() {
            summary.merge(totals, counts);
        }
        summary
    });

    debug!(
        keys = summary.totals.len(),
        records = summary.counts.records,
        skipped = summary.counts.skipped,
        elapsed_ms = begin.elapsed().as_millis() as u64,
        "aggregation done"
    );
    summary
}
