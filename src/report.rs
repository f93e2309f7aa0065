use std::fmt;

use crate::compute::{AggMap, Aggregate, StrImpl, Sum, N};

// round half up towards +inf, i.e. floor(sum / count + 1/2)
pub fn mean(agg: &Aggregate) -> N {
    let count = agg.count.max(1) as Sum;
    (2 * agg.sum + count).div_euclid(2 * count) as N
}

pub struct Tenths(pub N);

impl fmt::Display for Tenths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{}", abs / 10, abs % 10)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    rows: Vec<(StrImpl, Aggregate)>,
}

impl Report {
    pub fn new(totals: AggMap) -> Self {
        let mut rows = totals
            .into_iter()
            // an unseeded aggregate has no mean to print
            .filter(|(_, agg)| agg.count > 0)
            .collect::<Vec<_>>();
        // str ordering is plain byte ordering
        rows.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        Self { rows }
    }

    pub fn rows(&self) -> &[(StrImpl, Aggregate)] {
        &self.rows
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (k, v) in &self.rows {
            writeln!(
                f,
                "{};{}/{}/{}",
                k,
                Tenths(v.min),
                Tenths(mean(v)),
                Tenths(v.max)
            )?;
        }
        Ok(())
    }
}
