use rustc_hash::FxHashMap;
use smol_str::SmolStr;

// fixed point, one fractional digit: -12.3 is stored as -123
pub type N = i64;
pub type Sum = i128;
pub type StrImpl = SmolStr;
pub type AggMap = FxHashMap<StrImpl, Aggregate>;

// count == 0 means unseeded, the first value sets both min and max. no sentinels.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Aggregate {
    pub count: u64,
    pub sum: Sum,
    pub min: N,
    pub max: N,
}

impl Aggregate {
    pub fn new(num: N) -> Self {
        Self {
            count: 1,
            sum: num as Sum,
            min: num,
            max: num,
        }
    }

    #[inline]
    pub fn insert(&mut self, num: N) {
        self.merge(Aggregate::new(num));
    }

    #[inline]
    pub fn merge(&mut self, other: Aggregate) {
        if other.count == 0 {
            return;
        }
        if self.count == 0 {
            *self = other;
            return;
        }
        self.count += other.count;
        self.sum += other.sum;
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ChunkCounts {
    pub records: u64,
    pub skipped: u64,
}

impl ChunkCounts {
    pub fn add(&mut self, other: ChunkCounts) {
        self.records += other.records;
        self.skipped += other.skipped;
    }
}

/// Parses `-?[0-9]+(\.[0-9])?` into a value scaled by 10. Anything else is rejected.
pub fn parse_value(s: &[u8]) -> Option<N> {
    let (negative, digits) = match s {
        [b'-', t @ ..] => (true, t),
        t => (false, t),
    };

    let mut int_digits = 0;
    let mut acc: N = 0;
    let mut rest = digits;
    while let [c @ b'0'..=b'9', t @ ..] = rest {
        acc = acc.checked_mul(10)?.checked_add((c - b'0') as N)?;
        int_digits += 1;
        rest = t;
    }
    if int_digits == 0 {
        return None;
    }

    let frac = match rest {
        [] => 0,
        [b'.', c @ b'0'..=b'9'] => (c - b'0') as N,
        _ => return None,
    };
    let val = acc.checked_mul(10)?.checked_add(frac)?;
    Some(if negative { -val } else { val })
}

#[inline]
pub fn split_record(line: &[u8], separator: u8) -> Option<(&[u8], &[u8])> {
    let idx = memchr::memchr(separator, line)?;
    if idx == 0 || idx == line.len() - 1 {
        return None;
    }
    Some((&line[..idx], &line[idx + 1..]))
}

#[inline]
pub fn parse_record(line: &[u8], separator: u8) -> Option<(&str, N)> {
    let (key, value) = split_record(line, separator)?;
    let key = std::str::from_utf8(key).ok()?;
    Some((key, parse_value(value)?))
}

pub fn process_chunk(
    input: &[u8],
    start: usize,
    end: usize,
    separator: u8,
    totals: &mut AggMap,
) -> ChunkCounts {
    let mut counts = ChunkCounts::default();
    let end = end.min(input.len());
    let mut cursor = start;
    // a record that starts before `end` is read to its newline even if that's past `end`, the
    // next worker skips those bytes when it aligns its start
    while cursor < end {
        let line_end = memchr::memchr(b'\n', &input[cursor..]).map_or(input.len(), |p| cursor + p);
        let line = &input[cursor..line_end];
        cursor = line_end + 1;

        if line.is_empty() {
            continue;
        }
        let Some((key, val)) = parse_record(line, separator) else {
            counts.skipped += 1;
            continue;
        };
        counts.records += 1;

        // only allocate an owned key the first time we see it
        match totals.get_mut(key) {
            Some(agg) => agg.insert(val),
            None => {
                totals.insert(StrImpl::from(key), Aggregate::new(val));
            }
        }
    }
    counts
}
