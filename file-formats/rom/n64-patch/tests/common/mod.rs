//! Common test utilities and fixtures

#![allow(dead_code)]

use n64_patch::format::BIG_ENDIAN_MAGIC;
use n64_patch::{ExpectedProfile, PatchBuilder, PatchContainer, PipelineConfig};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Size of the synthetic ROMs used across tests
pub const TEST_ROM_SIZE: usize = 4096;

/// Create a temporary directory for tests
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Canonical (big-endian) ROM image with a valid header
pub fn generate_rom(size: usize) -> Vec<u8> {
    let mut data: Vec<u8> = (0..size)
        .map(|i| (i.wrapping_mul(31) ^ (i >> 8)) as u8)
        .collect();
    data[..4].copy_from_slice(&BIG_ENDIAN_MAGIC);
    data
}

/// Target image derived from `base` by a few scattered edits
pub fn generate_target(base: &[u8]) -> Vec<u8> {
    let mut target = base.to_vec();
    target[0x40..0x54].copy_from_slice(b"TRANSLATED TITLE    ");
    target[0x400] ^= 0xFF;
    for byte in &mut target[0x800..0x900] {
        *byte = byte.wrapping_add(1);
    }
    let last = target.len() - 1;
    target[last] ^= 0x01;
    target
}

/// Standard fixture: base, target, and the container between them
pub struct Fixture {
    pub base: Vec<u8>,
    pub target: Vec<u8>,
    pub patch: PatchContainer,
}

impl Fixture {
    pub fn new() -> Self {
        let base = generate_rom(TEST_ROM_SIZE);
        let target = generate_target(&base);
        let patch = PatchBuilder::new(&base, &target)
            .build()
            .expect("Failed to build fixture patch");
        Self {
            base,
            target,
            patch,
        }
    }

    pub fn config(&self) -> PipelineConfig {
        PipelineConfig::new(
            ExpectedProfile::from_image(&self.base),
            ExpectedProfile::from_image(&self.target),
        )
    }
}

/// Create a test file with specific content
pub fn create_test_file(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).expect("Failed to write test file");
    path
}
