//! Verified patch application
//!
//! The pipeline gates every mutation behind digest checks:
//!
//! 1. detect and normalize the base image byte order
//! 2. check the base size against the base profile
//! 3. check the base digests against the base profile
//! 4. check that the container was built for this base/target pair
//! 5. apply the records to a copy of the base
//! 6. check the patched digests against the target profile
//! 7. write the output, only if every step above passed
//!
//! Any failure ends the run. Nothing is written on failure.

use std::io;
use std::path::{Path, PathBuf};

use crate::digest::DigestSet;
use crate::error::DigestMismatch;
use crate::format::{ByteOrder, NormalizedImage, normalize};
use crate::io::{read_file, same_file, write_atomic};
use crate::patch::{PatchContainer, apply_patch};
use crate::profile::{ExpectedProfile, TitleProfile};
use crate::{Error, Result};

/// Default name of the patch blob, resolved against the working directory
pub const DEFAULT_PATCH_FILE: &str = "patch.n64p";

/// Default output file name, placed next to the input image
pub const DEFAULT_OUTPUT_FILE: &str = "patched.z64";

/// Profiles the pipeline verifies against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Expected input image
    pub base: ExpectedProfile,
    /// Expected output image
    pub target: ExpectedProfile,
}

impl PipelineConfig {
    /// Create a configuration from a base/target profile pair
    pub fn new(base: ExpectedProfile, target: ExpectedProfile) -> Self {
        Self { base, target }
    }
}

impl From<&TitleProfile> for PipelineConfig {
    fn from(entry: &TitleProfile) -> Self {
        Self::new(entry.base.clone(), entry.target.clone())
    }
}

/// File locations for a pipeline run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelinePaths {
    /// Base image to read
    pub input: PathBuf,
    /// N64P container to read
    pub patch: PathBuf,
    /// Where the verified output is written
    pub output: PathBuf,
}

impl PipelinePaths {
    /// Paths with the patch and output locations defaulted
    pub fn with_defaults<P: AsRef<Path>>(input: P) -> Self {
        let input = input.as_ref().to_path_buf();
        let output = default_output_path(&input);
        Self {
            input,
            patch: PathBuf::from(DEFAULT_PATCH_FILE),
            output,
        }
    }
}

/// Sibling output path for an input image
pub fn default_output_path(input: &Path) -> PathBuf {
    input.with_file_name(DEFAULT_OUTPUT_FILE)
}

/// What a successful run observed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    /// Byte order detected on the input image
    pub detected: ByteOrder,
    /// Digests of the normalized base image
    pub base_digests: DigestSet,
    /// Digests of the patched image
    pub output_digests: DigestSet,
    /// Number of records applied
    pub records_applied: usize,
}

impl PipelineReport {
    /// Whether the input had to be converted to big-endian
    pub fn converted(&self) -> bool {
        self.detected.needs_conversion()
    }
}

/// Verified output image with its report
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    /// Patched, verified image bytes
    pub image: Vec<u8>,
    /// Run details
    pub report: PipelineReport,
}

/// Base image that passed the input gates
#[derive(Debug, Clone)]
pub struct VerifiedBase {
    /// Canonical image bytes
    pub image: NormalizedImage,
    /// Digests of the canonical bytes
    pub digests: DigestSet,
}

/// Runs the detect, verify, apply, verify, persist sequence
#[derive(Debug, Clone)]
pub struct VerificationPipeline {
    config: PipelineConfig,
}

impl VerificationPipeline {
    /// Create a pipeline for a base/target profile pair
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Profiles in use
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Steps 1 to 3: normalize the base image and check size and digests
    pub fn verify_base(&self, raw: Vec<u8>) -> Result<VerifiedBase> {
        let image = normalize(raw)?;
        let expected = &self.config.base;

        if image.converted_from().is_some() {
            log::info!("Converted base image from {}", image.detected);
        }

        if image.data.len() as u64 != expected.size {
            return Err(Error::Size {
                expected: expected.size,
                actual: image.data.len() as u64,
                converted_from: image.converted_from(),
            });
        }

        let digests = DigestSet::compute(&image.data);
        let failed = expected.mismatches(&digests);
        expected.check_sha256("Base image", &digests);
        if !failed.is_empty() {
            return Err(Error::Checksum(Box::new(DigestMismatch {
                failed,
                expected: expected.clone(),
                actual: digests,
                converted_from: image.converted_from(),
            })));
        }

        log::info!("Base image verified ({} bytes)", image.data.len());
        Ok(VerifiedBase { image, digests })
    }

    /// Step 4: check that the container targets the configured image pair
    ///
    /// Digests are compared case-insensitively since profiles built in code
    /// may carry uppercase hex.
    pub fn check_container(&self, verified: &VerifiedBase, patch: &PatchContainer) -> Result<()> {
        let (base, target) = (&self.config.base, &self.config.target);

        let checks = [
            ("base SHA-1", base.sha1.clone(), patch.base_sha1_hex()),
            ("target SHA-1", target.sha1.clone(), patch.target_sha1_hex()),
            ("base size", base.size.to_string(), patch.base_size.to_string()),
            (
                "target size",
                target.size.to_string(),
                patch.target_size.to_string(),
            ),
        ];

        for (field, expected, actual) in checks {
            if !expected.trim().eq_ignore_ascii_case(&actual) {
                return Err(Error::PatchMismatch {
                    field,
                    expected,
                    actual,
                    base_digests: Box::new(verified.digests.clone()),
                    converted_from: verified.image.converted_from(),
                });
            }
        }

        log::info!("Patch header matches profile");
        Ok(())
    }

    /// Step 6: check the patched image against the target profile
    pub fn verify_output(
        &self,
        candidate: &[u8],
        converted_from: Option<ByteOrder>,
    ) -> Result<DigestSet> {
        let expected = &self.config.target;
        let digests = DigestSet::compute(candidate);
        let failed = expected.mismatches(&digests);
        expected.check_sha256("Output image", &digests);

        if !failed.is_empty() {
            return Err(Error::OutputVerification(Box::new(DigestMismatch {
                failed,
                expected: expected.clone(),
                actual: digests,
                converted_from,
            })));
        }

        log::info!("Output image verified");
        Ok(digests)
    }

    /// Steps 1 to 6 on in-memory inputs
    pub fn run(&self, raw_base: Vec<u8>, patch: &PatchContainer) -> Result<PipelineOutcome> {
        let base = self.verify_base(raw_base)?;
        self.check_container(&base, patch)?;

        let candidate = apply_patch(patch, &base.image.data).map_err(|err| match err {
            Error::Bounds {
                index,
                offset,
                length,
                image_len,
                ..
            } => Error::Bounds {
                index,
                offset,
                length,
                image_len,
                converted_from: base.image.converted_from(),
            },
            other => other,
        })?;
        let output_digests = self.verify_output(&candidate, base.image.converted_from())?;

        Ok(PipelineOutcome {
            image: candidate,
            report: PipelineReport {
                detected: base.image.detected,
                base_digests: base.digests,
                output_digests,
                records_applied: patch.records.len(),
            },
        })
    }

    /// Full run against files, writing the output only on success
    ///
    /// The container is parsed and structurally validated before the base
    /// image is examined. An output path naming the input file is refused
    /// up front.
    pub fn execute(&self, paths: &PipelinePaths) -> Result<PipelineReport> {
        if same_file(&paths.input, &paths.output) {
            return Err(Error::output(
                &paths.output,
                io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    "output would replace the input image",
                ),
            ));
        }

        let raw_base = read_file(&paths.input)?;
        let patch = PatchContainer::parse(&read_file(&paths.patch)?)?;

        let outcome = self.run(raw_base, &patch)?;
        write_atomic(&paths.output, &outcome.image)?;

        log::info!("Wrote patched image to {}", paths.output.display());
        Ok(outcome.report)
    }
}
