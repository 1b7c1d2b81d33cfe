//! N64P patch containers
//!
//! An N64P patch is a flat list of byte-range overwrites, framed by the
//! SHA-1 digests and sizes of the image pair it was built from. Records are
//! applied in order to a copy of the canonical (big-endian) base image.
//!
//! ```rust,no_run
//! use n64_patch::patch::{PatchContainer, apply_patch};
//!
//! let patch = PatchContainer::from_path("patch.n64p")?;
//! let base = std::fs::read("base.z64")?;
//! let patched = apply_patch(&patch, &base)?;
//! # Ok::<(), n64_patch::Error>(())
//! ```
//!
//! [`apply_patch`] performs no digest checks. Use
//! [`VerificationPipeline`](crate::VerificationPipeline) to patch with the
//! input and output gates in place.

mod apply;
mod container;
mod diff;

pub use apply::apply_patch;
pub use container::{N64P_MAGIC, N64P_VERSION, PatchContainer, PatchRecord, PatchSummary};
pub use diff::{DEFAULT_MERGE_GAP, PatchBuilder};
