//! Error types for the N64 patch library

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::digest::{DigestKind, DigestSet};
use crate::format::ByteOrder;
use crate::profile::ExpectedProfile;

/// Result type alias for patch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for patch operations
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Image cannot be normalized from its detected byte order
    #[error(
        "Cannot normalize {order} image: length {length} is not a multiple of {required_multiple}"
    )]
    Format {
        /// Byte order detected from the header
        order: ByteOrder,
        /// Image length in bytes
        length: usize,
        /// Length granularity the transform needs
        required_multiple: usize,
    },

    /// Image length does not match the expected profile
    #[error("Image size mismatch: expected {expected} bytes, got {actual} (byte order: {})", conversion_note(.converted_from))]
    Size {
        /// Size from the expected profile
        expected: u64,
        /// Size of the (normalized) image
        actual: u64,
        /// Original byte order if the image was normalized
        converted_from: Option<ByteOrder>,
    },

    /// Base image digests do not match the expected base profile
    #[error("Base image {0}")]
    Checksum(Box<DigestMismatch>),

    /// Patch container is structurally invalid
    #[error("Invalid patch container: {0}")]
    PatchStructure(String),

    /// Patch container targets a different base/target pair
    #[error(
        "Patch does not match profile: {field} expected {expected}, got {actual} (byte order: {})\n{base_digests}",
        conversion_note(.converted_from)
    )]
    PatchMismatch {
        /// Container field that disagreed
        field: &'static str,
        /// Value from the profile
        expected: String,
        /// Value carried by the container
        actual: String,
        /// Digests computed over the verified base image
        base_digests: Box<DigestSet>,
        /// Original byte order if the base image was normalized
        converted_from: Option<ByteOrder>,
    },

    /// A patch record reaches past the end of the image
    #[error(
        "Record {index} out of bounds: offset {offset} + length {length} exceeds image length {image_len} (byte order: {})",
        conversion_note(.converted_from)
    )]
    Bounds {
        /// Position of the record in the container
        index: usize,
        /// Record offset
        offset: u32,
        /// Record payload length
        length: u32,
        /// Length of the image being patched
        image_len: usize,
        /// Original byte order if the base image was normalized
        converted_from: Option<ByteOrder>,
    },

    /// Patched image digests do not match the expected target profile
    #[error("Output image {0}")]
    OutputVerification(Box<DigestMismatch>),

    /// Output file could not be written
    #[error("Cannot write output {}: {source}", path.display())]
    Output {
        /// Destination that was being written
        path: PathBuf,
        /// Underlying failure
        #[source]
        source: io::Error,
    },

    /// Profile table could not be loaded or has no usable entry
    #[error("Profile error: {0}")]
    Profile(String),
}

impl Error {
    /// Create a new PatchStructure error
    pub fn patch_structure<S: Into<String>>(msg: S) -> Self {
        Error::PatchStructure(msg.into())
    }

    /// Create a new Output error for `path`
    pub fn output<P: Into<PathBuf>>(path: P, source: io::Error) -> Self {
        Error::Output {
            path: path.into(),
            source,
        }
    }

    /// Create a new Profile error
    pub fn profile<S: Into<String>>(msg: S) -> Self {
        Error::Profile(msg.into())
    }

    /// Check if this error indicates a corrupted or mismatched input
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            Error::Format { .. }
                | Error::Size { .. }
                | Error::Checksum(_)
                | Error::PatchStructure(_)
                | Error::PatchMismatch { .. }
        )
    }

    /// Process exit code for this error
    ///
    /// `1` missing input, `2` base image rejected, `3` output rejected,
    /// `99` everything else.
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::Io(e) if e.kind() == io::ErrorKind::NotFound => 1,
            Error::Format { .. }
            | Error::Size { .. }
            | Error::Checksum(_)
            | Error::PatchMismatch { .. } => 2,
            Error::Bounds { .. } | Error::OutputVerification(_) => 3,
            _ => 99,
        }
    }
}

/// Full digest comparison attached to checksum failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestMismatch {
    /// Digest kinds that disagreed with the profile
    pub failed: Vec<DigestKind>,
    /// Profile the image was checked against
    pub expected: ExpectedProfile,
    /// Digests computed over the image
    pub actual: DigestSet,
    /// Original byte order if the image was normalized before hashing
    pub converted_from: Option<ByteOrder>,
}

impl fmt::Display for DigestMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let failed: Vec<&str> = self.failed.iter().map(|k| k.name()).collect();
        writeln!(f, "checksum verification failed ({})", failed.join(", "))?;
        writeln!(f, "  byte order: {}", conversion_note(&self.converted_from))?;
        for kind in DigestKind::ASSERTED {
            let status = if self.failed.contains(&kind) {
                "MISMATCH"
            } else {
                "ok"
            };
            writeln!(
                f,
                "  {:<7} expected {}  computed {}  [{status}]",
                kind.name(),
                self.expected.get(kind).unwrap_or("-"),
                self.actual.get(kind),
            )?;
        }
        write!(
            f,
            "  {:<7} computed {}  (informational)",
            DigestKind::Sha256.name(),
            self.actual.sha256
        )
    }
}

fn conversion_note(converted_from: &Option<ByteOrder>) -> String {
    match converted_from {
        Some(order) => format!("converted from {order}"),
        None => "no conversion applied".to_string(),
    }
}
