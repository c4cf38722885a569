#![forbid(unsafe_code)]

use std::fs;

use guestpark_contracts::ContractViolation;
use guestpark_storage::{load_parking_config, StoreError};

#[test]
fn at_config_store_01_loads_and_validates_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(
        &path,
        r#"{"email":"guest@example.com","location":"loc_1","tenant":"unit_204",
            "token":"s3cret","policy":"pol_guest","space":"G-12",
            "duration":"PT24H","tel":"5550100"}"#,
    )
    .unwrap();
    let config = load_parking_config(&path).unwrap();
    assert_eq!(config.location, "loc_1");
    assert_eq!(config.viewpoint, None);
    assert!(!format!("{config:?}").contains("s3cret"));
}

#[test]
fn at_config_store_02_blank_field_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(
        &path,
        r#"{"email":"guest@example.com","location":" ","tenant":"unit_204",
            "token":"s3cret","policy":"pol_guest","space":"G-12",
            "duration":"PT24H","tel":"5550100"}"#,
    )
    .unwrap();
    assert!(matches!(
        load_parking_config(&path),
        Err(StoreError::Contract(ContractViolation::InvalidValue {
            field: "parking_config.location",
            ..
        }))
    ));
}

#[test]
fn at_config_store_03_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        load_parking_config(&dir.path().join("absent.json")),
        Err(StoreError::Io { .. })
    ));
}
