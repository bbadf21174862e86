//! Durable on-disk schema for decoded telemetry.
//!
//! Decoded frames can be written to a record file as length-prefixed,
//! CRC-checked bincode records: `[len:u32-LE][crc32:u32-LE][payload]`. The
//! first record of a file is a [`FileHeader`]. The wire decoder itself never
//! touches this module; it exists for drivers and tooling that keep decoded
//! captures around.
use crate::model::Frame;
use anyhow::{Result, bail};
use crc32fast::Hasher as Crc32;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileHeader {
    pub version: u16,
    pub created_unix_ns: u128,
    /// Table or game label the capture was taken from.
    pub table: String,
    /// Capture origin (proxy name, feed host, ...).
    pub provider: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RecordFrame {
    Header(FileHeader),
    Frame(Frame),
}

pub fn write_record<W: Write>(w: &mut W, record: &RecordFrame) -> Result<()> {
    let payload = bincode::serialize(record)?;
    let mut hasher = Crc32::new();
    hasher.update(&payload);
    let crc = hasher.finalize();

    let len = payload.len() as u32;
    w.write_all(&len.to_le_bytes())?;
    w.write_all(&crc.to_le_bytes())?;
    w.write_all(&payload)?;
    Ok(())
}

/// Read the next record; `Ok(None)` at a clean end of file.
pub fn read_record<R: Read>(r: &mut R) -> Result<Option<RecordFrame>> {
    let mut word = [0u8; 4];
    match r.read_exact(&mut word) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    }
    let len = u32::from_le_bytes(word) as usize;
    r.read_exact(&mut word)?;
    let crc_on_file = u32::from_le_bytes(word);

    let mut payload = vec![0u8; len];
    r.read_exact(&mut payload)?;
    let mut hasher = Crc32::new();
    hasher.update(&payload);
    let crc_calc = hasher.finalize();
    if crc_calc != crc_on_file {
        bail!("CRC mismatch: file={crc_on_file:#x}, calc={crc_calc:#x}");
    }
    Ok(Some(bincode::deserialize(&payload)?))
}
