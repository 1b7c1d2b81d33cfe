//! Profile tables loaded from disk

use crate::common::{Fixture, create_test_file, temp_dir};
use n64_patch::{
    DigestSet, Error, ExpectedProfile, ProfileRole, ProfileTable, TitleProfile,
};

#[test]
fn test_table_round_trips_through_yaml_file() {
    let fixture = Fixture::new();
    let table = ProfileTable::new(vec![TitleProfile {
        title: "fixture".to_string(),
        revision: "1.0".to_string(),
        base: ExpectedProfile::from_image(&fixture.base),
        target: ExpectedProfile::from_image(&fixture.target),
    }])
    .unwrap();

    let dir = temp_dir();
    let path = create_test_file(
        dir.path(),
        "profiles.yaml",
        table.to_yaml_string().unwrap().as_bytes(),
    );

    let loaded = ProfileTable::from_path(&path).unwrap();
    assert_eq!(loaded, table);

    let (entry, role) = loaded
        .identify(
            fixture.target.len() as u64,
            &DigestSet::compute(&fixture.target),
        )
        .unwrap();
    assert_eq!(entry.title, "fixture");
    assert_eq!(role, ProfileRole::Target);
}

#[test]
fn test_missing_table_is_not_found() {
    let dir = temp_dir();
    let err = ProfileTable::from_path(dir.path().join("absent.yaml")).unwrap_err();
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn test_invalid_yaml_is_profile_error() {
    let err = ProfileTable::from_yaml_str("titles: [ {").unwrap_err();
    assert!(matches!(err, Error::Profile(_)));
}

#[test]
fn test_multiple_titles_need_selection() {
    let fixture = Fixture::new();
    let entry = |title: &str, revision: &str| TitleProfile {
        title: title.to_string(),
        revision: revision.to_string(),
        base: ExpectedProfile::from_image(&fixture.base),
        target: ExpectedProfile::from_image(&fixture.target),
    };
    let table = ProfileTable::new(vec![entry("alpha", "1.0"), entry("alpha", "1.1")]).unwrap();

    assert!(table.select(None, None).is_err());
    assert!(table.select(Some("alpha"), None).is_err());
    assert_eq!(
        table.select(Some("alpha"), Some("1.1")).unwrap().revision,
        "1.1"
    );
}
