//! Integration tests for the base model folder

mod common;

use common::{keychain_plate, write_plate};
use spotify_keychain::config::{GeneratorConfig, StlFormat};
use spotify_keychain::mesh::stl::save_stl;
use spotify_keychain::models::{discover_base_models, load_base_model, ModelFormat};
use spotify_keychain::KeychainError;

#[test]
fn test_missing_folder_is_created_empty() {
    let dir = tempfile::tempdir().unwrap();
    let folder = dir.path().join("base_models");

    let models = discover_base_models(&folder).unwrap();
    assert!(models.is_empty());
    assert!(folder.is_dir());
}

#[test]
fn test_only_model_files_are_listed() {
    let dir = tempfile::tempdir().unwrap();
    write_plate(dir.path(), "round.stl");
    std::fs::write(dir.path().join("square.STEP"), "ISO-10303-21;").unwrap();
    std::fs::write(dir.path().join("heart.stp"), "ISO-10303-21;").unwrap();
    std::fs::write(dir.path().join("round.toml"), "depth = 3.0").unwrap();
    std::fs::write(dir.path().join("readme.md"), "# models").unwrap();
    std::fs::create_dir(dir.path().join("archive.stl")).unwrap();

    let models = discover_base_models(dir.path()).unwrap();
    let listed: Vec<_> = models.iter().map(|m| (m.name.as_str(), m.format)).collect();
    assert_eq!(
        listed,
        vec![
            ("heart.stp", ModelFormat::Step),
            ("round.stl", ModelFormat::Stl),
            ("square.STEP", ModelFormat::Step),
        ]
    );
}

#[test]
fn test_ascii_and_binary_plates_load_the_same() {
    let dir = tempfile::tempdir().unwrap();
    let binary = write_plate(dir.path(), "binary.stl");
    let ascii = dir.path().join("ascii.stl");
    save_stl(&keychain_plate(), &ascii, StlFormat::Ascii).unwrap();

    let a = load_base_model(&binary).unwrap();
    let b = load_base_model(&ascii).unwrap();
    assert_eq!(a.face_count(), 12);
    assert_eq!(b.face_count(), 12);
    common::assert_float_eq(a.volume(), 60.0 * 15.0 * 3.0, 1e-3);
    common::assert_float_eq(b.volume(), a.volume(), 1e-3);
}

#[test]
fn test_unknown_extension_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plate.obj");
    std::fs::write(&path, "o plate").unwrap();

    let err = load_base_model(&path).unwrap_err();
    assert!(matches!(err, KeychainError::UnsupportedFormat { extension } if extension == "obj"));
}

#[test]
fn test_deleted_model_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_base_model(&dir.path().join("gone.stl")).unwrap_err();
    assert!(matches!(err, KeychainError::BaseModelNotFound { .. }));
}

#[test]
fn test_layout_override_only_touches_named_fields() {
    let dir = tempfile::tempdir().unwrap();
    let model = write_plate(dir.path(), "slim.stl");
    std::fs::write(dir.path().join("slim.toml"), "pitch = 1.5\nslot_width = 0.8\n").unwrap();

    let base = GeneratorConfig::default();
    let config = base.for_base_model(&model);
    assert_eq!(config.layout.pitch, 1.5);
    assert_eq!(config.layout.slot_width, 0.8);
    assert_eq!(config.layout.depth, base.layout.depth);
    assert_eq!(config.scan, base.scan);
}

#[test]
fn test_broken_override_is_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let model = write_plate(dir.path(), "odd.stl");
    std::fs::write(dir.path().join("odd.toml"), "pitch = \"wide\"").unwrap();

    let base = GeneratorConfig::default();
    assert_eq!(base.for_base_model(&model).layout, base.layout);
}
