use std::fs;

use voxel_terrain::{settings::SettingsError, Settings};

#[test]
fn missing_file_falls_back_to_defaults() {
    let directory = tempfile::tempdir().expect("tempdir");
    let path = directory.path().join("settings.json");

    assert!(matches!(Settings::read(&path), Err(SettingsError::Io { .. })));
    assert_eq!(Settings::load(&path), Settings::default());
}

#[test]
fn malformed_file_falls_back_to_defaults() {
    let directory = tempfile::tempdir().expect("tempdir");
    let path = directory.path().join("settings.json");
    fs::write(&path, "{ renderDistance: ").expect("write");

    assert!(matches!(Settings::read(&path), Err(SettingsError::Parse(_))));
    assert_eq!(Settings::load(&path), Settings::default());
}

#[test]
fn written_settings_are_read_back() {
    let directory = tempfile::tempdir().expect("tempdir");
    let path = directory.path().join("settings.json");
    let settings = Settings {
        seed: Some(1234),
        render_distance: 4,
        enable_culling: true,
        worker_threads: Some(3),
        ..Settings::default()
    };
    fs::write(&path, serde_json::to_string_pretty(&settings).expect("serialize")).expect("write");

    assert_eq!(Settings::load(&path), settings);
}

#[test]
fn partial_file_keeps_other_defaults() {
    let directory = tempfile::tempdir().expect("tempdir");
    let path = directory.path().join("settings.json");
    fs::write(&path, r#"{ "renderDistance": 2, "enableCulling": 1 }"#).expect("write");

    let settings = Settings::load(&path);
    assert_eq!(settings.render_distance, 2);
    assert!(settings.enable_culling);
    assert_eq!(settings.far_clip, Settings::default().far_clip);
    assert_eq!(settings.seed, None);
}

#[test]
fn one_bad_field_keeps_the_valid_ones() {
    let directory = tempfile::tempdir().expect("tempdir");
    let path = directory.path().join("settings.json");
    fs::write(
        &path,
        r#"{ "renderDistance": "far", "enableCulling": 1, "seed": 9, "nearClip": 0.25 }"#,
    )
    .expect("write");

    let settings = Settings::load(&path);
    assert_eq!(settings.render_distance, Settings::default().render_distance);
    assert!(settings.enable_culling);
    assert_eq!(settings.seed, Some(9));
    assert_eq!(settings.resolved_seed(), 9);
    assert_eq!(settings.near_clip, 0.25);
}
