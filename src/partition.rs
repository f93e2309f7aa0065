#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition {
    pub start: usize,
    pub end: usize,
}

pub fn plan(len: usize, workers: usize) -> Vec<Partition> {
    if len == 0 {
        return Vec::new();
    }
    let workers = workers.clamp(1, len);
    let chunk_len = len / workers;
    (0..workers)
        .map(|i| Partition {
            start: i * chunk_len,
            // the last one absorbs the remainder
            end: if i == workers - 1 {
                len
            } else {
                (i + 1) * chunk_len
            },
        })
        .collect()
}

/// Moves `start` forward past the partial line it lands in. The skipped bytes belong to the
/// previous worker.
pub fn align_start(input: &[u8], start: usize) -> usize {
    if start == 0 || start >= input.len() {
        return start.min(input.len());
    }
    if input[start - 1] == b'\n' {
        return start;
    }
    match memchr::memchr(b'\n', &input[start..]) {
        Some(p) => start + p + 1,
        None => input.len(),
    }
}
