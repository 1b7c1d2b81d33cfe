//! N64P container parsing and serialization

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Cursor, Read, Write};
use std::path::Path;

use crate::{Error, Result};

/// Magic signature at the start of every container
pub const N64P_MAGIC: [u8; 4] = *b"N64P";

/// Only container version understood by this library
pub const N64P_VERSION: u8 = 1;

/// One byte-range overwrite
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchRecord {
    /// Image offset the payload is written to
    pub offset: u32,
    /// Bytes written at `offset`
    pub payload: Vec<u8>,
}

impl PatchRecord {
    /// Size of the offset/length pair preceding each payload
    pub const HEADER_SIZE: usize = 4 + 4;

    /// Create a record writing `payload` at `offset`
    pub fn new(offset: u32, payload: Vec<u8>) -> Self {
        Self { offset, payload }
    }

    /// Payload length as stored on disk
    pub fn length(&self) -> u32 {
        self.payload.len() as u32
    }

    /// One past the last byte this record writes
    pub fn end(&self) -> u64 {
        self.offset as u64 + self.payload.len() as u64
    }

    /// Encoded size of this record
    pub fn encoded_len(&self) -> usize {
        Self::HEADER_SIZE + self.payload.len()
    }
}

/// Parsed N64P patch container
///
/// Layout (all integers big-endian, densely packed):
///
/// | Offset | Size | Field         |
/// |--------|------|---------------|
/// | 0      | 4    | magic `N64P`  |
/// | 4      | 1    | version       |
/// | 5      | 20   | base SHA-1    |
/// | 25     | 20   | target SHA-1  |
/// | 45     | 4    | base size     |
/// | 49     | 4    | target size   |
/// | 53     | 4    | record count  |
/// | 57     | ...  | records       |
///
/// Each record is `offset: u32, length: u32, payload[length]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchContainer {
    /// Format version
    pub version: u8,
    /// SHA-1 of the canonical base image
    pub base_sha1: [u8; 20],
    /// SHA-1 of the patched image
    pub target_sha1: [u8; 20],
    /// Size of the base image
    pub base_size: u32,
    /// Size of the patched image
    pub target_size: u32,
    /// Records in application order
    pub records: Vec<PatchRecord>,
}

impl PatchContainer {
    /// Fixed header size in bytes
    pub const HEADER_SIZE: usize = 4 + 1 + 20 + 20 + 4 + 4 + 4; // 57 bytes

    /// Create an empty version 1 container
    pub fn new(base_sha1: [u8; 20], target_sha1: [u8; 20], base_size: u32, target_size: u32) -> Self {
        Self {
            version: N64P_VERSION,
            base_sha1,
            target_sha1,
            base_size,
            target_size,
            records: Vec::new(),
        }
    }

    /// Number of records
    pub fn record_count(&self) -> u32 {
        self.records.len() as u32
    }

    /// Base SHA-1 as lowercase hex
    pub fn base_sha1_hex(&self) -> String {
        hex::encode(self.base_sha1)
    }

    /// Target SHA-1 as lowercase hex
    pub fn target_sha1_hex(&self) -> String {
        hex::encode(self.target_sha1)
    }

    /// Parse a container, requiring every byte to be accounted for
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < Self::HEADER_SIZE {
            return Err(Error::patch_structure(format!(
                "patch too small: {} bytes, need at least {}",
                data.len(),
                Self::HEADER_SIZE
            )));
        }

        let mut reader = Cursor::new(data);

        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if magic != N64P_MAGIC {
            return Err(Error::patch_structure(format!(
                "invalid signature: expected {:?}, got {:02X?}",
                "N64P", magic
            )));
        }

        let version = reader.read_u8()?;
        if version != N64P_VERSION {
            return Err(Error::patch_structure(format!(
                "unsupported version {version}, expected {N64P_VERSION}"
            )));
        }

        let mut base_sha1 = [0u8; 20];
        reader.read_exact(&mut base_sha1)?;
        let mut target_sha1 = [0u8; 20];
        reader.read_exact(&mut target_sha1)?;

        let base_size = reader.read_u32::<BigEndian>()?;
        let target_size = reader.read_u32::<BigEndian>()?;
        let record_count = reader.read_u32::<BigEndian>()?;

        log::debug!(
            "N64P header: version={version}, base_size={base_size}, target_size={target_size}, records={record_count}"
        );

        // Cap the reservation by what the remaining bytes could possibly hold
        let remaining = data.len() - Self::HEADER_SIZE;
        let mut records =
            Vec::with_capacity((record_count as usize).min(remaining / PatchRecord::HEADER_SIZE));

        for index in 0..record_count {
            let position = reader.position() as usize;
            if data.len() - position < PatchRecord::HEADER_SIZE {
                return Err(Error::patch_structure(format!(
                    "record {index} header truncated at byte {position}: {} bytes left, need {}",
                    data.len() - position,
                    PatchRecord::HEADER_SIZE
                )));
            }

            let offset = reader.read_u32::<BigEndian>()?;
            let length = reader.read_u32::<BigEndian>()? as usize;

            let payload_start = reader.position() as usize;
            let available = data.len() - payload_start;
            if length > available {
                return Err(Error::patch_structure(format!(
                    "record {index} payload truncated at byte {payload_start}: declares {length} bytes, {available} left"
                )));
            }

            let payload = data[payload_start..payload_start + length].to_vec();
            reader.set_position((payload_start + length) as u64);
            records.push(PatchRecord { offset, payload });
        }

        let consumed = reader.position() as usize;
        if consumed != data.len() {
            return Err(Error::patch_structure(format!(
                "{} trailing bytes after record {record_count}",
                data.len() - consumed
            )));
        }

        Ok(Self {
            version,
            base_sha1,
            target_sha1,
            base_size,
            target_size,
            records,
        })
    }

    /// Read and parse a container file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::parse(&crate::io::read_file(path)?)
    }

    /// Exact serialized length
    pub fn encoded_len(&self) -> usize {
        Self::HEADER_SIZE
            + self
                .records
                .iter()
                .map(PatchRecord::encoded_len)
                .sum::<usize>()
    }

    /// Write the container to `writer`
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        if u32::try_from(self.records.len()).is_err() {
            return Err(Error::patch_structure(format!(
                "{} records exceed the u32 record count",
                self.records.len()
            )));
        }

        writer.write_all(&N64P_MAGIC)?;
        writer.write_u8(self.version)?;
        writer.write_all(&self.base_sha1)?;
        writer.write_all(&self.target_sha1)?;
        writer.write_u32::<BigEndian>(self.base_size)?;
        writer.write_u32::<BigEndian>(self.target_size)?;
        writer.write_u32::<BigEndian>(self.record_count())?;

        for (index, record) in self.records.iter().enumerate() {
            let length = u32::try_from(record.payload.len()).map_err(|_| {
                Error::patch_structure(format!(
                    "record {index} payload of {} bytes exceeds u32 length",
                    record.payload.len()
                ))
            })?;
            writer.write_u32::<BigEndian>(record.offset)?;
            writer.write_u32::<BigEndian>(length)?;
            writer.write_all(&record.payload)?;
        }

        Ok(())
    }

    /// Serialize the container into a new buffer
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::with_capacity(self.encoded_len());
        self.write_to(&mut buffer)?;
        Ok(buffer)
    }

    /// Aggregate figures about the records
    pub fn summary(&self) -> PatchSummary {
        let mut spans: Vec<(u64, u64)> = self
            .records
            .iter()
            .map(|r| (r.offset as u64, r.end()))
            .collect();
        spans.sort_unstable();

        let mut overlapping_records = 0;
        let mut covered_bytes = 0u64;
        let mut reach = 0u64;
        for &(start, end) in &spans {
            if start < reach {
                overlapping_records += 1;
            }
            if end > reach {
                covered_bytes += end - start.max(reach);
                reach = end;
            }
        }

        PatchSummary {
            record_count: self.records.len(),
            payload_bytes: self.records.iter().map(|r| r.payload.len() as u64).sum(),
            covered_bytes,
            lowest_offset: spans.first().map(|&(start, _)| start),
            highest_end: spans.iter().map(|&(_, end)| end).max(),
            overlapping_records,
            encoded_len: self.encoded_len(),
        }
    }
}

/// Figures reported by [`PatchContainer::summary`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchSummary {
    /// Number of records
    pub record_count: usize,
    /// Sum of all payload lengths
    pub payload_bytes: u64,
    /// Distinct image bytes written by at least one record
    pub covered_bytes: u64,
    /// Smallest record offset
    pub lowest_offset: Option<u64>,
    /// Largest record end
    pub highest_end: Option<u64>,
    /// Records starting inside an earlier record's range
    pub overlapping_records: usize,
    /// Serialized container size
    pub encoded_len: usize,
}
