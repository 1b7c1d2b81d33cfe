//! N64P container parsing against built patches

use crate::common::Fixture;
use n64_patch::{Error, PatchContainer, PatchRecord};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

#[test]
fn test_built_patch_survives_serialization() {
    let fixture = Fixture::new();
    let bytes = fixture.patch.to_bytes().unwrap();

    assert_eq!(bytes.len(), fixture.patch.encoded_len());
    assert_eq!(PatchContainer::parse(&bytes).unwrap(), fixture.patch);
}

#[test]
fn test_every_truncation_is_rejected() {
    let bytes = Fixture::new().patch.to_bytes().unwrap();

    for len in 0..bytes.len() {
        match PatchContainer::parse(&bytes[..len]) {
            Err(Error::PatchStructure(_)) => {}
            other => panic!("truncation to {len} bytes gave {other:?}"),
        }
    }
}

#[test]
fn test_record_count_must_match_records() {
    let mut bytes = Fixture::new().patch.to_bytes().unwrap();
    let count = u32::from_be_bytes(bytes[53..57].try_into().unwrap());

    bytes[53..57].copy_from_slice(&(count - 1).to_be_bytes());
    let err = PatchContainer::parse(&bytes).unwrap_err();
    assert!(err.to_string().contains("trailing bytes"), "{err}");

    bytes[53..57].copy_from_slice(&(count + 1).to_be_bytes());
    let err = PatchContainer::parse(&bytes).unwrap_err();
    assert!(err.to_string().contains("header truncated"), "{err}");
}

fn arb_record() -> impl Strategy<Value = PatchRecord> {
    (any::<u32>(), proptest::collection::vec(any::<u8>(), 0..64))
        .prop_map(|(offset, payload)| PatchRecord::new(offset, payload))
}

fn arb_container() -> impl Strategy<Value = PatchContainer> {
    (
        any::<[u8; 20]>(),
        any::<[u8; 20]>(),
        any::<u32>(),
        any::<u32>(),
        proptest::collection::vec(arb_record(), 0..16),
    )
        .prop_map(|(base_sha1, target_sha1, base_size, target_size, records)| {
            let mut container = PatchContainer::new(base_sha1, target_sha1, base_size, target_size);
            container.records = records;
            container
        })
}

proptest! {
    #[test]
    fn prop_parse_inverts_serialize(container in arb_container()) {
        let bytes = container.to_bytes().unwrap();
        prop_assert_eq!(bytes.len(), container.encoded_len());
        prop_assert_eq!(PatchContainer::parse(&bytes).unwrap(), container);
    }
}
