//! MIX archive writer and index reader.
//!
//! Layout (little-endian):
//! - `count: u16`, `data_size: u32`
//! - `count` index entries `(hash: u32, offset: u32, size: u32)` sorted by hash
//! - file bodies concatenated in input order
//!
//! Offsets are taken from input order before the index is sorted, so the
//! index and the body region are ordered differently.

use crate::error::{Error, Result};

pub const HEADER_LEN: usize = 6;
pub const ENTRY_LEN: usize = 12;

/// Filename hash used by the index: uppercase, then rotate-left-and-add.
pub fn mix_hash(name: &str) -> u32 {
    name.to_uppercase()
        .encode_utf16()
        .fold(0u32, |acc, c| acc.rotate_left(1).wrapping_add(u32::from(c)))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MixEntry {
    pub name: String,
    pub hash: u32,
    pub offset: u32,
    pub size: u32,
}

/// A built archive. Immutable once built and never empty.
#[derive(Debug, Clone)]
pub struct MixArchive {
    entries: Vec<MixEntry>,
    bytes: Vec<u8>,
}

impl MixArchive {
    pub fn build<N, B>(files: &[(N, B)]) -> Result<Self>
    where
        N: AsRef<str>,
        B: AsRef<[u8]>,
    {
        if files.is_empty() {
            return Err(Error::EmptyArchive);
        }
        let count = u16::try_from(files.len()).map_err(|_| Error::TooManyEntries {
            count: files.len(),
        })?;

        // pass 1: offsets in input order
        let mut entries = Vec::with_capacity(files.len());
        let mut data_size: u64 = 0;
        for (name, body) in files {
            let name = name.as_ref();
            let size = body.as_ref().len() as u64;
            let offset = u32::try_from(data_size).map_err(|_| Error::ArchiveTooLarge {
                size: data_size,
            })?;
            let size32 = u32::try_from(size).map_err(|_| Error::ArchiveTooLarge { size })?;
            entries.push(MixEntry {
                name: name.to_string(),
                hash: mix_hash(name),
                offset,
                size: size32,
            });
            data_size += size;
        }
        let data_size32 = u32::try_from(data_size).map_err(|_| Error::ArchiveTooLarge {
            size: data_size,
        })?;

        // pass 2: index by hash; stable sort keeps input order on ties
        let mut index: Vec<&MixEntry> = entries.iter().collect();
        index.sort_by_key(|e| e.hash);

        let mut w = Writer::with_capacity(HEADER_LEN + files.len() * ENTRY_LEN + data_size as usize);
        w.write_u16(count);
        w.write_u32(data_size32);
        for e in &index {
            w.write_u32(e.hash);
            w.write_u32(e.offset);
            w.write_u32(e.size);
        }
        for (_, body) in files {
            w.write_bytes(body.as_ref());
        }
        tracing::debug!(entries = entries.len(), data_size, "mix archive built");
        Ok(Self {
            entries,
            bytes: w.out,
        })
    }

    /// Entries in input order.
    pub fn entries(&self) -> &[MixEntry] {
        &self.entries
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Pack named blobs into archive bytes.
pub fn build_archive<N, B>(files: &[(N, B)]) -> Result<Vec<u8>>
where
    N: AsRef<str>,
    B: AsRef<[u8]>,
{
    MixArchive::build(files).map(MixArchive::into_bytes)
}

struct Writer {
    out: Vec<u8>,
}

impl Writer {
    fn with_capacity(n: usize) -> Self {
        Self {
            out: Vec::with_capacity(n),
        }
    }
    fn write_u16(&mut self, v: u16) {
        self.out.extend_from_slice(&v.to_le_bytes());
    }
    fn write_u32(&mut self, v: u32) {
        self.out.extend_from_slice(&v.to_le_bytes());
    }
    fn write_bytes(&mut self, b: &[u8]) {
        self.out.extend_from_slice(b);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexEntry {
    pub hash: u32,
    pub offset: u32,
    pub size: u32,
}

/// Index of an existing archive, as the game reads it.
#[derive(Debug, Clone)]
pub struct MixIndex {
    pub data_size: u32,
    pub entries: Vec<IndexEntry>,
    data_start: usize,
}

impl MixIndex {
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut r = Reader { data, pos: 0 };
        let count = r.read_u16()? as usize;
        let data_size = r.read_u32()?;
        let mut entries = Vec::with_capacity(count);
        for _ in 0..count {
            entries.push(IndexEntry {
                hash: r.read_u32()?,
                offset: r.read_u32()?,
                size: r.read_u32()?,
            });
        }
        let data_start = r.pos;
        let available = data.len() - data_start;
        if available < data_size as usize {
            return Err(Error::Truncated {
                offset: data.len(),
                needed: data_size as usize - available,
            });
        }
        for e in &entries {
            if u64::from(e.offset) + u64::from(e.size) > u64::from(data_size) {
                return Err(Error::BadIndex {
                    hash: e.hash,
                    offset: e.offset,
                    size: e.size,
                });
            }
        }
        Ok(Self {
            data_size,
            entries,
            data_start,
        })
    }

    pub fn lookup(&self, name: &str) -> Option<&IndexEntry> {
        let hash = mix_hash(name);
        self.entries.iter().find(|e| e.hash == hash)
    }

    /// Body of `name` inside `data` (the same bytes this index was parsed from).
    pub fn find<'a>(&self, data: &'a [u8], name: &str) -> Option<&'a [u8]> {
        let e = self.lookup(name)?;
        let start = self.data_start + e.offset as usize;
        data.get(start..start + e.size as usize)
    }
}

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self.pos + n;
        if end > self.data.len() {
            return Err(Error::Truncated {
                offset: self.pos,
                needed: end - self.data.len(),
            });
        }
        let s = &self.data[self.pos..end];
        self.pos = end;
        Ok(s)
    }
    fn read_u16(&mut self) -> Result<u16> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }
    fn read_u32(&mut self) -> Result<u32> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }
}
