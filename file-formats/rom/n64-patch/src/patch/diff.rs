//! Building containers from a base/target pair

use sha1::{Digest, Sha1};

use super::container::{PatchContainer, PatchRecord};
use crate::{Error, Result};

/// Default number of unchanged bytes absorbed between two changed runs
///
/// Splitting a record costs one record header, so gaps up to that size are
/// cheaper to carry inline.
pub const DEFAULT_MERGE_GAP: usize = PatchRecord::HEADER_SIZE;

/// Derives an N64P container turning `base` into `target`
///
/// Both images must be canonical and of equal length; records only
/// overwrite bytes.
#[derive(Debug, Clone)]
pub struct PatchBuilder<'a> {
    base: &'a [u8],
    target: &'a [u8],
    merge_gap: usize,
}

impl<'a> PatchBuilder<'a> {
    /// Create a builder for the given image pair
    pub fn new(base: &'a [u8], target: &'a [u8]) -> Self {
        Self {
            base,
            target,
            merge_gap: DEFAULT_MERGE_GAP,
        }
    }

    /// Set how many unchanged bytes may sit inside a single record
    pub fn merge_gap(mut self, gap: usize) -> Self {
        self.merge_gap = gap;
        self
    }

    /// Compute the records and wrap them in a container
    pub fn build(self) -> Result<PatchContainer> {
        if self.base.len() != self.target.len() {
            return Err(Error::Size {
                expected: self.base.len() as u64,
                actual: self.target.len() as u64,
                converted_from: None,
            });
        }

        let size = u32::try_from(self.base.len()).map_err(|_| {
            Error::patch_structure(format!(
                "image of {} bytes exceeds the 32-bit size field",
                self.base.len()
            ))
        })?;

        let mut container = PatchContainer::new(
            Sha1::digest(self.base).into(),
            Sha1::digest(self.target).into(),
            size,
            size,
        );
        container.records = self.diff_runs();

        log::debug!(
            "Built patch with {} records ({} payload bytes)",
            container.records.len(),
            container.summary().payload_bytes
        );

        Ok(container)
    }

    fn diff_runs(&self) -> Vec<PatchRecord> {
        let (base, target) = (self.base, self.target);
        let len = base.len();
        let mut records = Vec::new();
        let mut pos = 0;

        while pos < len {
            if base[pos] == target[pos] {
                pos += 1;
                continue;
            }

            let start = pos;
            let mut end = pos + 1;
            let mut cursor = end;
            while cursor < len {
                if base[cursor] != target[cursor] {
                    end = cursor + 1;
                } else if cursor + 1 - end > self.merge_gap {
                    break;
                }
                cursor += 1;
            }

            // Image length fits in u32, checked by the caller
            records.push(PatchRecord::new(start as u32, target[start..end].to_vec()));
            pos = end;
        }

        records
    }
}
