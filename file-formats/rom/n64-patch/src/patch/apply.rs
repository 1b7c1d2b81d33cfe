//! Patch application logic

use super::container::{PatchContainer, PatchRecord};
use crate::{Error, Result};

/// Apply a container to a base image
///
/// The base is never modified: records are written into a copy, in
/// container order, so later records win where ranges overlap. A record
/// reaching past the end of the image fails the whole application and the
/// partially written copy is dropped.
///
/// Bounds errors carry no byte-order note; the pipeline attaches one.
/// No digest checks happen here; see [`VerificationPipeline`] for the
/// verified path.
///
/// [`VerificationPipeline`]: crate::verify::VerificationPipeline
pub fn apply_patch(patch: &PatchContainer, base_data: &[u8]) -> Result<Vec<u8>> {
    let mut candidate = base_data.to_vec();

    log::debug!(
        "Applying {} records to {} byte image",
        patch.records.len(),
        candidate.len()
    );

    for (index, record) in patch.records.iter().enumerate() {
        apply_record(&mut candidate, index, record)?;
    }

    Ok(candidate)
}

fn apply_record(image: &mut [u8], index: usize, record: &PatchRecord) -> Result<()> {
    let start = record.offset as usize;
    let end = record.end();

    if end > image.len() as u64 {
        log::debug!("Record {index} out of bounds, discarding candidate image");
        return Err(Error::Bounds {
            index,
            offset: record.offset,
            length: record.length(),
            image_len: image.len(),
            converted_from: None,
        });
    }

    image[start..end as usize].copy_from_slice(&record.payload);
    Ok(())
}
