//! ROM byte-order detection and normalization
//!
//! N64 dumps circulate in three byte orders. All of them carry the same
//! 4-byte PI domain header, so the order can be read off the first word:
//!
//! | Order         | Extension | Header bytes  |
//! |---------------|-----------|---------------|
//! | Big-endian    | `.z64`    | `80 37 12 40` |
//! | Byte-swapped  | `.v64`    | `37 80 40 12` |
//! | Word-reversed | `.n64`    | `40 12 37 80` |
//!
//! Everything downstream works on the big-endian (canonical) layout.

use std::fmt;

use crate::{Error, Result};

/// Header word of a big-endian image
pub const BIG_ENDIAN_MAGIC: [u8; 4] = [0x80, 0x37, 0x12, 0x40];

/// Header word of a byte-swapped image
pub const BYTE_SWAPPED_MAGIC: [u8; 4] = [0x37, 0x80, 0x40, 0x12];

/// Header word of a word-reversed image
pub const WORD_REVERSED_MAGIC: [u8; 4] = [0x40, 0x12, 0x37, 0x80];

/// Byte order of a ROM image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    /// Canonical layout (`.z64`)
    BigEndian,
    /// Adjacent bytes swapped (`.v64`)
    ByteSwapped,
    /// Bytes reversed within each 32-bit word (`.n64`)
    WordReversed,
    /// Header not recognized; treated as canonical
    Unknown,
}

impl ByteOrder {
    /// Detect the byte order from the image header
    pub fn detect(data: &[u8]) -> Self {
        let Some(header) = data.get(..4) else {
            return ByteOrder::Unknown;
        };

        match header {
            h if h == BIG_ENDIAN_MAGIC => ByteOrder::BigEndian,
            h if h == BYTE_SWAPPED_MAGIC => ByteOrder::ByteSwapped,
            h if h == WORD_REVERSED_MAGIC => ByteOrder::WordReversed,
            _ => ByteOrder::Unknown,
        }
    }

    /// Whether images in this order must be transformed before use
    pub fn needs_conversion(self) -> bool {
        matches!(self, ByteOrder::ByteSwapped | ByteOrder::WordReversed)
    }

    /// Conventional file extension for this order
    pub fn extension(self) -> Option<&'static str> {
        match self {
            ByteOrder::BigEndian => Some("z64"),
            ByteOrder::ByteSwapped => Some("v64"),
            ByteOrder::WordReversed => Some("n64"),
            ByteOrder::Unknown => None,
        }
    }

    /// Length granularity the transform for this order operates on
    fn unit(self) -> usize {
        match self {
            ByteOrder::ByteSwapped => 2,
            ByteOrder::WordReversed => 4,
            ByteOrder::BigEndian | ByteOrder::Unknown => 1,
        }
    }

    /// Rewrite `data` between canonical layout and this order
    ///
    /// Both transforms are involutions, so the same routine converts in
    /// either direction.
    fn transform(self, data: &[u8]) -> Result<Vec<u8>> {
        let unit = self.unit();
        if data.len() % unit != 0 {
            return Err(Error::Format {
                order: self,
                length: data.len(),
                required_multiple: unit,
            });
        }

        let mut out = data.to_vec();
        match self {
            ByteOrder::ByteSwapped => out.chunks_exact_mut(2).for_each(|pair| pair.swap(0, 1)),
            ByteOrder::WordReversed => out.chunks_exact_mut(4).for_each(<[u8]>::reverse),
            ByteOrder::BigEndian | ByteOrder::Unknown => {}
        }
        Ok(out)
    }

    /// Convert a canonical image into this byte order
    ///
    /// `Unknown` has no defined layout and returns the input unchanged.
    pub fn convert(self, canonical: &[u8]) -> Result<Vec<u8>> {
        self.transform(canonical)
    }
}

impl fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ByteOrder::BigEndian => write!(f, "big-endian (.z64)"),
            ByteOrder::ByteSwapped => write!(f, "byte-swapped (.v64)"),
            ByteOrder::WordReversed => write!(f, "word-reversed (.n64)"),
            ByteOrder::Unknown => write!(f, "unknown"),
        }
    }
}

/// Image brought into canonical byte order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedImage {
    /// Canonical image bytes
    pub data: Vec<u8>,
    /// Byte order detected on the input
    pub detected: ByteOrder,
}

impl NormalizedImage {
    /// Original byte order if a conversion was applied
    pub fn converted_from(&self) -> Option<ByteOrder> {
        self.detected.needs_conversion().then_some(self.detected)
    }
}

/// Detect the byte order of `data` and return it in canonical layout
///
/// The input is consumed. When a transform applies, the result is a fresh
/// buffer and the input is dropped; otherwise the input is returned as is.
pub fn normalize(data: Vec<u8>) -> Result<NormalizedImage> {
    let detected = ByteOrder::detect(&data);

    let data = if detected.needs_conversion() {
        log::debug!("Normalizing {} image of {} bytes", detected, data.len());
        detected.transform(&data)?
    } else {
        if detected == ByteOrder::Unknown {
            log::warn!("Unrecognized ROM header, processing image as big-endian");
        }
        data
    };

    Ok(NormalizedImage { data, detected })
}
