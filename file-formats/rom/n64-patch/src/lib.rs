//! # n64_patch - Verified N64 ROM patching
//!
//! Applies N64P patch containers to Nintendo 64 ROM images, with digest
//! verification of the input before any byte is changed and of the output
//! before anything is written.
//!
//! ## Features
//!
//! - Byte-order detection and normalization (`.z64`, `.v64`, `.n64`)
//! - MD5, SHA-1, SHA-256 and CRC-32 fingerprints
//! - Strict N64P container parsing, serialization and creation
//! - Title/revision profile tables loaded from YAML
//! - All-or-nothing output writes
//!
//! ## Examples
//!
//! ### Patching a dump
//!
//! ```no_run
//! use n64_patch::{PipelineConfig, PipelinePaths, ProfileTable, VerificationPipeline};
//!
//! # fn main() -> Result<(), n64_patch::Error> {
//! let table = ProfileTable::from_path("profiles.yaml")?;
//! let title = table.select(None, None)?;
//!
//! let pipeline = VerificationPipeline::new(PipelineConfig::from(title));
//! let report = pipeline.execute(&PipelinePaths::with_defaults("dump.v64"))?;
//!
//! println!("converted: {}", report.converted());
//! println!("{}", report.output_digests);
//! # Ok(())
//! # }
//! ```
//!
//! ### Creating a patch
//!
//! ```no_run
//! use n64_patch::{format::normalize, patch::PatchBuilder};
//!
//! # fn main() -> Result<(), n64_patch::Error> {
//! let base = normalize(std::fs::read("base.z64")?)?;
//! let target = normalize(std::fs::read("target.z64")?)?;
//!
//! let patch = PatchBuilder::new(&base.data, &target.data).build()?;
//! std::fs::write("patch.n64p", patch.to_bytes()?)?;
//! # Ok(())
//! # }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod digest;
pub mod error;
pub mod format;
pub mod io;
pub mod patch;
pub mod profile;
pub mod verify;

// Re-export commonly used types
pub use digest::{DigestKind, DigestSet, digest_all};
pub use error::{DigestMismatch, Error, Result};
pub use format::{ByteOrder, NormalizedImage, normalize};
pub use patch::{PatchBuilder, PatchContainer, PatchRecord, apply_patch};
pub use profile::{ExpectedProfile, ProfileRole, ProfileTable, TitleProfile};
pub use verify::{
    PipelineConfig, PipelineOutcome, PipelinePaths, PipelineReport, VerificationPipeline,
    VerifiedBase,
};
