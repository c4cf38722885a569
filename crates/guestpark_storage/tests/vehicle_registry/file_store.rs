#![forbid(unsafe_code)]

use std::fs;

use guestpark_contracts::registry::{LocalVehicleRecord, VehicleRegistry};
use guestpark_storage::{JsonFileVehicleStore, StoreError, VehicleRegistryStore};

fn record(plate: &str, label: &str, owner: &str) -> LocalVehicleRecord {
    LocalVehicleRecord {
        vehicle: plate.to_string(),
        notes: label.to_string(),
        name: owner.to_string(),
        display_value: label.to_string(),
    }
}

#[test]
fn at_file_store_01_missing_or_blank_file_is_empty_registry() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vehicles.json");
    let store = JsonFileVehicleStore::new(&path);
    assert!(store.read().unwrap().is_empty());

    fs::write(&path, "  \n").unwrap();
    assert!(store.read().unwrap().is_empty());
}

#[test]
fn at_file_store_02_write_then_read_keeps_key_order() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileVehicleStore::new(dir.path().join("nested/db/vehicles.json"));

    let mut registry = VehicleRegistry::new();
    registry.insert("zed-van", record("ZZZ1", "Zed's Van", "Zed Li"));
    registry.insert("ann-mini", record("AAA1", "Ann's Mini", "Ann Lee"));
    store.write(&registry).unwrap();

    let back = store.read().unwrap();
    let keys: Vec<&str> = back.keys().collect();
    assert_eq!(keys, vec!["zed-van", "ann-mini"]);
    assert_eq!(back, registry);

    let raw = fs::read_to_string(store.path()).unwrap();
    assert!(raw.contains("\"displayValue\": \"Zed's Van\""));
    assert!(raw.contains('\n'));
    assert!(!store.path().with_extension("tmp").exists());
}

#[test]
fn at_file_store_03_reads_registry_written_by_hand() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vehicles.json");
    fs::write(
        &path,
        r#"{"john-tesla-model-3":{"vehicle":"8FBY787","notes":"John's Tesla Model 3",
            "name":"John Doe","displayValue":"John's Tesla Model 3"}}"#,
    )
    .unwrap();
    let registry = JsonFileVehicleStore::new(&path).read().unwrap();
    assert_eq!(
        registry.get("john-tesla-model-3").map(|r| r.vehicle.as_str()),
        Some("8FBY787")
    );
}

#[test]
fn at_file_store_04_corrupt_file_is_json_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vehicles.json");
    fs::write(&path, "[1,2,3]").unwrap();
    assert!(matches!(
        JsonFileVehicleStore::new(&path).read(),
        Err(StoreError::Json { .. })
    ));
}

#[test]
fn at_file_store_05_last_writer_wins() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileVehicleStore::new(dir.path().join("vehicles.json"));

    let snapshot_a = store.read().unwrap();
    let snapshot_b = store.read().unwrap();

    let mut a = snapshot_a;
    a.insert("ann-mini", record("AAA1", "Ann's Mini", "Ann Lee"));
    let mut b = snapshot_b;
    b.insert("bob-van", record("BBB1", "Bob's Van", "Bob Ray"));

    store.write(&a).unwrap();
    store.write(&b).unwrap();

    let keys: Vec<String> = store.read().unwrap().keys().map(str::to_string).collect();
    assert_eq!(keys, vec!["bob-van".to_string()]);
}
