use std::{fs::File, io::Read, ops::Deref, path::Path};

use anyhow::Context;
use memmap2::Mmap;
use tracing::debug;

/// A read-only view of the whole input file, either mapped or read into memory.
pub enum Source {
    Mapped(Mmap),
    Owned(Vec<u8>),
}

impl Source {
    pub fn open(path: &Path, read_to_end: bool) -> anyhow::Result<Self> {
        let mut file =
            File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
        let len = file
            .metadata()
            .with_context(|| format!("failed to stat {}", path.display()))?
            .len();

        // mapping a zero-length file isn't portable, and there's nothing to map anyway
        if len == 0 {
            return Ok(Source::Owned(Vec::new()));
        }

        if read_to_end {
            let mut input = Vec::with_capacity(len as usize);
            file.read_to_end(&mut input)
                .with_context(|| format!("failed to read {}", path.display()))?;
            debug!(len = input.len(), "read input into memory");
            return Ok(Source::Owned(input));
        }

        // SAFETY: the map is only ever read. If someone truncates the file while we're
        // scanning it we get SIGBUS, same as every other mmap reader.
        let mmap = unsafe { Mmap::map(&file) }
            .with_context(|| format!("failed to map {}", path.display()))?;
        debug!(len = mmap.len(), "mapped input");
        Ok(Source::Mapped(mmap))
    }
}

impl Deref for Source {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            Source::Mapped(m) => &m[..],
            Source::Owned(v) => &v[..],
        }
    }
}
