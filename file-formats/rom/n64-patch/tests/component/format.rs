//! Byte-order detection and normalization across whole images

use crate::common::{TEST_ROM_SIZE, generate_rom};
use n64_patch::{ByteOrder, Error, normalize};
use proptest::prelude::*;

#[test]
fn test_all_orders_normalize_to_same_bytes() {
    let canonical = generate_rom(TEST_ROM_SIZE);

    for order in [
        ByteOrder::BigEndian,
        ByteOrder::ByteSwapped,
        ByteOrder::WordReversed,
    ] {
        let dumped = order.convert(&canonical).expect("conversion failed");
        assert_eq!(ByteOrder::detect(&dumped), order);

        let image = normalize(dumped).expect("normalize failed");
        assert_eq!(image.detected, order);
        assert_eq!(image.data, canonical, "{order} did not normalize");
    }
}

#[test]
fn test_normalize_is_idempotent() {
    let canonical = generate_rom(TEST_ROM_SIZE);
    let swapped = ByteOrder::WordReversed.convert(&canonical).unwrap();

    let once = normalize(swapped).unwrap();
    let twice = normalize(once.data.clone()).unwrap();
    assert_eq!(twice.detected, ByteOrder::BigEndian);
    assert_eq!(twice.data, once.data);
}

#[test]
fn test_word_reversed_odd_length_is_an_error() {
    let mut image = ByteOrder::WordReversed
        .convert(&generate_rom(64))
        .unwrap();
    image.truncate(62);

    let err = normalize(image).unwrap_err();
    assert!(matches!(err, Error::Format { length: 62, .. }));
    assert_eq!(err.exit_code(), 2);
}

proptest! {
    #[test]
    fn prop_orders_are_format_invariant(words in proptest::collection::vec(any::<u32>(), 1..256)) {
        let mut canonical: Vec<u8> = words.iter().flat_map(|w| w.to_be_bytes()).collect();
        canonical[..4].copy_from_slice(&n64_patch::format::BIG_ENDIAN_MAGIC);

        let from_swapped = normalize(ByteOrder::ByteSwapped.convert(&canonical).unwrap()).unwrap();
        let from_reversed = normalize(ByteOrder::WordReversed.convert(&canonical).unwrap()).unwrap();
        let from_canonical = normalize(canonical.clone()).unwrap();

        prop_assert_eq!(&from_swapped.data, &canonical);
        prop_assert_eq!(&from_reversed.data, &canonical);
        prop_assert_eq!(&from_canonical.data, &canonical);
    }
}
