//! End-to-end pipeline runs against files on disk

use crate::common::{Fixture, create_test_file, temp_dir};
use n64_patch::{
    ByteOrder, DigestKind, DigestSet, Error, PatchContainer, PipelinePaths, VerificationPipeline,
};

struct Workspace {
    _dir: tempfile::TempDir,
    paths: PipelinePaths,
}

fn workspace(image: &[u8], patch: &[u8]) -> Workspace {
    let dir = temp_dir();
    let input = create_test_file(dir.path(), "input.rom", image);
    let patch = create_test_file(dir.path(), "patch.n64p", patch);
    let output = dir.path().join("patched.z64");
    Workspace {
        paths: PipelinePaths {
            input,
            patch,
            output,
        },
        _dir: dir,
    }
}

#[test]
fn test_canonical_base_produces_target() {
    let fixture = Fixture::new();
    let ws = workspace(&fixture.base, &fixture.patch.to_bytes().unwrap());

    let report = VerificationPipeline::new(fixture.config())
        .execute(&ws.paths)
        .expect("pipeline should succeed");

    let written = std::fs::read(&ws.paths.output).unwrap();
    assert_eq!(written, fixture.target);
    assert_eq!(DigestSet::compute(&written), report.output_digests);
    assert!(fixture.config().target.matches(&report.output_digests));
    assert!(!report.converted());
    assert_eq!(report.records_applied, fixture.patch.records.len());
}

#[test]
fn test_swapped_and_reversed_dumps_produce_canonical_target() {
    let fixture = Fixture::new();

    for order in [ByteOrder::ByteSwapped, ByteOrder::WordReversed] {
        let dump = order.convert(&fixture.base).unwrap();
        let ws = workspace(&dump, &fixture.patch.to_bytes().unwrap());

        let report = VerificationPipeline::new(fixture.config())
            .execute(&ws.paths)
            .expect("pipeline should succeed");

        assert_eq!(report.detected, order);
        assert!(report.converted());
        assert_eq!(std::fs::read(&ws.paths.output).unwrap(), fixture.target);
        // The input file is never rewritten
        assert_eq!(std::fs::read(&ws.paths.input).unwrap(), dump);
    }
}

#[test]
fn test_corrupted_payload_fails_output_gate_and_writes_nothing() {
    let fixture = Fixture::new();
    let mut patch = fixture.patch.clone();
    patch.records[0].payload[0] ^= 0x01;
    let ws = workspace(&fixture.base, &patch.to_bytes().unwrap());

    let err = VerificationPipeline::new(fixture.config())
        .execute(&ws.paths)
        .unwrap_err();

    match &err {
        Error::OutputVerification(mismatch) => {
            assert!(mismatch.failed.contains(&DigestKind::Crc32));
            assert!(mismatch.failed.contains(&DigestKind::Md5));
            assert!(mismatch.failed.contains(&DigestKind::Sha1));
            assert_eq!(mismatch.converted_from, None);
        }
        other => panic!("expected output verification error, got {other:?}"),
    }
    assert_eq!(err.exit_code(), 3);
    assert!(!ws.paths.output.exists());
}

#[test]
fn test_truncated_patch_fails_before_image_is_examined() {
    let fixture = Fixture::new();
    let bytes = fixture.patch.to_bytes().unwrap();
    // Cut in the middle of the first record payload
    let cut = PatchContainer::HEADER_SIZE + 8 + 1;
    let ws = workspace(&fixture.base, &bytes[..cut]);
    // An empty image would fail the size gate; the container must fail first
    std::fs::write(&ws.paths.input, b"").unwrap();

    let err = VerificationPipeline::new(fixture.config())
        .execute(&ws.paths)
        .unwrap_err();

    assert!(matches!(err, Error::PatchStructure(_)), "{err:?}");
    assert!(!ws.paths.output.exists());
}

#[test]
fn test_wrong_length_image_is_size_error() {
    let fixture = Fixture::new();
    let mut image = fixture.base.clone();
    image.extend_from_slice(&[0; 4]);
    let ws = workspace(&image, &fixture.patch.to_bytes().unwrap());

    let err = VerificationPipeline::new(fixture.config())
        .execute(&ws.paths)
        .unwrap_err();

    assert!(matches!(err, Error::Size { .. }), "{err:?}");
    assert_eq!(err.exit_code(), 2);
    assert!(!ws.paths.output.exists());
}

#[test]
fn test_modified_base_reports_all_digests() {
    let fixture = Fixture::new();
    let mut image = ByteOrder::ByteSwapped.convert(&fixture.base).unwrap();
    image[100] ^= 0xFF;
    let ws = workspace(&image, &fixture.patch.to_bytes().unwrap());

    let err = VerificationPipeline::new(fixture.config())
        .execute(&ws.paths)
        .unwrap_err();

    assert_eq!(err.exit_code(), 2);
    let message = err.to_string();
    let Error::Checksum(mismatch) = err else {
        panic!("expected checksum error, got {message}");
    };

    assert_eq!(mismatch.converted_from, Some(ByteOrder::ByteSwapped));
    assert!(message.contains("converted from byte-swapped"));
    for value in [
        &mismatch.actual.md5,
        &mismatch.actual.sha1,
        &mismatch.actual.sha256,
        &mismatch.actual.crc32,
    ] {
        assert!(message.contains(value.as_str()), "{value} missing from report");
    }
    assert!(message.contains(&mismatch.expected.md5));
    assert!(!ws.paths.output.exists());
}

#[test]
fn test_out_of_bounds_record_is_fatal() {
    let fixture = Fixture::new();
    let mut patch = fixture.patch.clone();
    patch
        .records
        .push(n64_patch::PatchRecord::new(fixture.base.len() as u32 - 2, vec![0; 4]));
    let ws = workspace(&fixture.base, &patch.to_bytes().unwrap());

    let err = VerificationPipeline::new(fixture.config())
        .execute(&ws.paths)
        .unwrap_err();

    assert!(matches!(err, Error::Bounds { .. }), "{err:?}");
    assert!(!ws.paths.output.exists());
}

#[test]
fn test_missing_input_is_not_found() {
    let fixture = Fixture::new();
    let ws = workspace(&fixture.base, &fixture.patch.to_bytes().unwrap());
    std::fs::remove_file(&ws.paths.input).unwrap();

    let err = VerificationPipeline::new(fixture.config())
        .execute(&ws.paths)
        .unwrap_err();
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn test_existing_output_survives_failure() {
    let fixture = Fixture::new();
    let mut image = fixture.base.clone();
    image[10] ^= 1;
    let ws = workspace(&image, &fixture.patch.to_bytes().unwrap());
    std::fs::write(&ws.paths.output, b"previous result").unwrap();

    assert!(
        VerificationPipeline::new(fixture.config())
            .execute(&ws.paths)
            .is_err()
    );
    assert_eq!(std::fs::read(&ws.paths.output).unwrap(), b"previous result");
}

#[test]
fn test_unwritable_output_is_not_a_missing_input() {
    let fixture = Fixture::new();
    let mut ws = workspace(&fixture.base, &fixture.patch.to_bytes().unwrap());
    ws.paths.output = ws.paths.input.with_file_name("nodir").join("out.z64");

    let err = VerificationPipeline::new(fixture.config())
        .execute(&ws.paths)
        .unwrap_err();

    assert!(matches!(err, Error::Output { .. }), "{err:?}");
    assert_eq!(err.exit_code(), 99);
    assert!(!ws.paths.output.exists());
}

#[test]
fn test_output_naming_the_input_is_refused() {
    let fixture = Fixture::new();
    let mut ws = workspace(&fixture.base, &fixture.patch.to_bytes().unwrap());
    let dir = ws.paths.input.parent().unwrap().to_path_buf();
    let input = dir.join("patched.z64");
    std::fs::rename(&ws.paths.input, &input).unwrap();
    ws.paths = PipelinePaths {
        patch: ws.paths.patch.clone(),
        ..PipelinePaths::with_defaults(&input)
    };
    assert_eq!(ws.paths.output, input);

    let err = VerificationPipeline::new(fixture.config())
        .execute(&ws.paths)
        .unwrap_err();

    assert!(matches!(err, Error::Output { .. }), "{err:?}");
    assert_eq!(std::fs::read(&input).unwrap(), fixture.base);
}
