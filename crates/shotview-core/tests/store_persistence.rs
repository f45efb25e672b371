//! Base-host persistence through the file-backed key-value store.

use shotview_core::config::ShotviewConfig;
use shotview_core::store::BASE_HOST_KEY;
use shotview_core::{
    Error, InitialPayload, JsonFileStore, KeyValueStore, RunStore, StartupOptions, StorageError,
};

fn payload_with_host(host: &str) -> InitialPayload {
    InitialPayload::from_json(&format!(r#"{{"config": {{"baseHost": "{host}"}}}}"#))
        .expect("payload")
}

#[test]
fn base_host_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state").join("hosts.json");

    let mut store = RunStore::new(
        Some(payload_with_host("configured.example")),
        StartupOptions::default(),
        Box::new(JsonFileStore::open(&path).unwrap()),
    );
    assert_eq!(store.state().view.base_host, "configured.example");
    store
        .dispatch_json(
            r#"{"type": "VIEW_UPDATE_BASE_HOST", "payload": {"host": "https://review.example:9000"}}"#,
        )
        .unwrap();
    assert!(path.exists());
    assert!(!path.with_extension("json.tmp").exists());

    let reopened = RunStore::new(
        Some(payload_with_host("configured.example")),
        StartupOptions::default(),
        Box::new(JsonFileStore::open(&path).unwrap()),
    );
    let view = &reopened.state().view;
    assert_eq!(view.base_host, "https://review.example:9000");
    assert_eq!(view.parsed_host.host, "review.example:9000");
    assert_eq!(view.parsed_host.protocol.as_deref(), Some("https:"));
}

#[test]
fn file_keeps_unrelated_keys() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hosts.json");
    std::fs::write(&path, r#"{"other": "value"}"#).unwrap();

    let mut store = JsonFileStore::open(&path).unwrap();
    store.set(BASE_HOST_KEY, "h.example").unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["other"], "value");
    assert_eq!(raw[BASE_HOST_KEY], "h.example");
}

#[test]
fn corrupt_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hosts.json");
    std::fs::write(&path, "not json").unwrap();

    let err = JsonFileStore::open(&path).unwrap_err();
    assert!(matches!(err, Error::Storage(StorageError::Corrupt { .. })));
}

#[test]
fn config_points_store_at_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hosts.json");
    let config_path = dir.path().join("shotview.toml");
    std::fs::write(
        &config_path,
        format!(
            "[storage]\nhost_store_path = {:?}\n\n[view]\nfiltered_browsers = [\"chrome\"]\n",
            path.display().to_string()
        ),
    )
    .unwrap();

    let config = ShotviewConfig::load_or_default(Some(&config_path)).unwrap();
    let mut host_store = config.open_host_store().unwrap();
    host_store.set(BASE_HOST_KEY, "stored.example").unwrap();

    let store = RunStore::new(None, config.startup_options(), host_store);
    assert_eq!(store.state().view.base_host, "stored.example");
    assert_eq!(store.state().view.filtered_browsers, vec!["chrome".to_string()]);
    assert!(path.exists());
}
