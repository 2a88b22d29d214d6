use super::*;

#[test]
fn builtin_catalog_is_used_without_a_path() {
    let catalog = load_catalog(&Settings::default()).expect("builtin");
    assert_eq!(catalog.len(), 4);
}

#[test]
fn unreadable_catalog_path_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let settings = Settings {
        catalog_path: Some(dir.path().join("missing.toml")),
        ..Settings::default()
    };
    let err = load_catalog(&settings).expect_err("missing catalog");
    assert!(format!("{err:#}").contains("failed to read catalog"));
}
