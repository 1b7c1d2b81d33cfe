//! Image digests
//!
//! Every image passing through the pipeline is fingerprinted with four
//! digests. MD5, SHA-1 and CRC-32 are asserted against profiles; SHA-256 is
//! computed and reported alongside them.

use md5::{Digest, Md5};
use sha1::Sha1;
use sha2::Sha256;
use std::fmt;

/// Reflected CRC-32 polynomial (IEEE 802.3)
pub const CRC32_POLYNOMIAL: u32 = 0xEDB8_8320;

/// Lookup table for byte-at-a-time CRC-32, generated at compile time
pub static CRC32_TABLE: [u32; 256] = build_crc32_table();

const fn build_crc32_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u32;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 1 != 0 {
                (crc >> 1) ^ CRC32_POLYNOMIAL
            } else {
                crc >> 1
            };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

/// Compute the CRC-32 of `data`
pub fn crc32(data: &[u8]) -> u32 {
    !data.iter().fold(0xFFFF_FFFF_u32, |crc, &byte| {
        CRC32_TABLE[((crc ^ byte as u32) & 0xFF) as usize] ^ (crc >> 8)
    })
}

/// Digest algorithms tracked for every image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DigestKind {
    /// MD5 (128-bit)
    Md5,
    /// SHA-1 (160-bit)
    Sha1,
    /// SHA-256 (256-bit)
    Sha256,
    /// CRC-32 (IEEE)
    Crc32,
}

impl DigestKind {
    /// Digests that gate the pipeline
    pub const ASSERTED: [DigestKind; 3] = [DigestKind::Md5, DigestKind::Sha1, DigestKind::Crc32];

    /// Display name
    pub fn name(self) -> &'static str {
        match self {
            DigestKind::Md5 => "MD5",
            DigestKind::Sha1 => "SHA-1",
            DigestKind::Sha256 => "SHA-256",
            DigestKind::Crc32 => "CRC-32",
        }
    }

    /// Length of the lowercase hex rendering
    pub fn hex_len(self) -> usize {
        match self {
            DigestKind::Md5 => 32,
            DigestKind::Sha1 => 40,
            DigestKind::Sha256 => 64,
            DigestKind::Crc32 => 8,
        }
    }
}

/// Digests of one image, as lowercase hex
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DigestSet {
    /// MD5 digest
    pub md5: String,
    /// SHA-1 digest
    pub sha1: String,
    /// SHA-256 digest
    pub sha256: String,
    /// CRC-32, 8 hex characters
    pub crc32: String,
}

impl DigestSet {
    /// Compute all digests over `data`
    pub fn compute(data: &[u8]) -> Self {
        log::debug!("Computing digests over {} bytes", data.len());

        Self {
            md5: hex::encode(Md5::digest(data)),
            sha1: hex::encode(Sha1::digest(data)),
            sha256: hex::encode(Sha256::digest(data)),
            crc32: format!("{:08x}", crc32(data)),
        }
    }

    /// Value for a given digest kind
    pub fn get(&self, kind: DigestKind) -> &str {
        match kind {
            DigestKind::Md5 => &self.md5,
            DigestKind::Sha1 => &self.sha1,
            DigestKind::Sha256 => &self.sha256,
            DigestKind::Crc32 => &self.crc32,
        }
    }
}

impl fmt::Display for DigestSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "MD5:     {}", self.md5)?;
        writeln!(f, "SHA-1:   {}", self.sha1)?;
        writeln!(f, "SHA-256: {}", self.sha256)?;
        write!(f, "CRC-32:  {}", self.crc32)
    }
}

/// Compute every digest over `data`
pub fn digest_all(data: &[u8]) -> DigestSet {
    DigestSet::compute(data)
}
