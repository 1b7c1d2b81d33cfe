//! Digest engine behaviour on ROM-sized buffers

use crate::common::{TEST_ROM_SIZE, generate_rom};
use n64_patch::digest::crc32;
use n64_patch::digest_all;

#[test]
fn test_crc32_matches_crc32fast() {
    let data = generate_rom(TEST_ROM_SIZE);
    assert_eq!(crc32(&data), crc32fast::hash(&data));

    for len in [0, 1, 3, 255, 1024] {
        assert_eq!(
            crc32(&data[..len]),
            crc32fast::hash(&data[..len]),
            "CRC mismatch for {len} byte prefix"
        );
    }
}

#[test]
fn test_digests_are_deterministic() {
    let data = generate_rom(TEST_ROM_SIZE);
    assert_eq!(digest_all(&data), digest_all(&data.clone()));
}

#[test]
fn test_single_byte_flip_changes_every_digest() {
    let data = generate_rom(TEST_ROM_SIZE);
    let original = digest_all(&data);

    for position in [0, 1, 2048, TEST_ROM_SIZE - 1] {
        let mut flipped = data.clone();
        flipped[position] ^= 0x01;
        let changed = digest_all(&flipped);

        assert_ne!(changed.crc32, original.crc32, "crc32 at {position}");
        assert_ne!(changed.md5, original.md5, "md5 at {position}");
        assert_ne!(changed.sha1, original.sha1, "sha1 at {position}");
        assert_ne!(changed.sha256, original.sha256, "sha256 at {position}");
    }
}
