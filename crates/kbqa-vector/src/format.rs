//! Binary layout of a flat index file (all integers little-endian):
//!
//! ```text
//! magic   b"KBQV"
//! version u32      (1)
//! dim     u32
//! rows    u64
//! data    rows * dim f32, row-major
//! ```
//!
//! Row `i` is the embedding of line/element `i` of the chunk file produced by
//! the same ingestion run.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::fs;
use std::io::{BufWriter, Cursor, Read, Write};
use std::path::Path;

use kbqa_core::error::IndexError;
use kbqa_core::traits::VectorIndex;

use crate::flat::FlatIndex;

pub const MAGIC: &[u8; 4] = b"KBQV";
pub const VERSION: u32 = 1;
const HEADER_LEN: usize = 4 + 4 + 4 + 8;

pub fn read_flat_index(path: &Path) -> Result<FlatIndex, IndexError> {
    let bytes = fs::read(path)?;
    decode_flat_index(&bytes)
}

pub fn decode_flat_index(bytes: &[u8]) -> Result<FlatIndex, IndexError> {
    if bytes.len() < HEADER_LEN {
        return Err(IndexError::Corrupt(format!("file is {} bytes, shorter than the header", bytes.len())));
    }
    let mut cur = Cursor::new(bytes);
    let mut magic = [0u8; 4];
    cur.read_exact(&mut magic)?;
    if &magic != MAGIC {
        return Err(IndexError::Corrupt("bad magic".to_string()));
    }
    let version = cur.read_u32::<LittleEndian>()?;
    if version != VERSION {
        return Err(IndexError::Corrupt(format!("unsupported version {version}")));
    }
    let dim = cur.read_u32::<LittleEndian>()? as usize;
    let rows = usize::try_from(cur.read_u64::<LittleEndian>()?)
        .map_err(|_| IndexError::Corrupt("row count overflows usize".to_string()))?;

    let values = rows
        .checked_mul(dim)
        .ok_or_else(|| IndexError::Corrupt("rows * dim overflows".to_string()))?;
    let payload = bytes.len() - HEADER_LEN;
    if values.checked_mul(4) != Some(payload) {
        return Err(IndexError::Corrupt(format!("expected {values} f32 values for {rows}x{dim}, payload is {payload} bytes")));
    }

    let mut data = vec![0f32; values];
    cur.read_f32_into::<LittleEndian>(&mut data)?;
    FlatIndex::new(dim, data)
}

pub fn write_flat_index(path: &Path, index: &FlatIndex) -> Result<(), IndexError> {
    let dim = u32::try_from(index.dim())
        .map_err(|_| IndexError::Corrupt("dimension does not fit in u32".to_string()))?;
    let mut w = BufWriter::new(fs::File::create(path)?);
    w.write_all(MAGIC)?;
    w.write_u32::<LittleEndian>(VERSION)?;
    w.write_u32::<LittleEndian>(dim)?;
    w.write_u64::<LittleEndian>(index.row_count() as u64)?;
    for &x in index.vectors() {
        w.write_f32::<LittleEndian>(x)?;
    }
    w.flush()?;
    Ok(())
}
