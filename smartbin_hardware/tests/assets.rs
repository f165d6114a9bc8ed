use rstest::rstest;
use smartbin_hardware::DirAssetStore;
use smartbin_traits::AssetStore;
use std::fs;
use std::io::ErrorKind;
use tempfile::tempdir;

#[test]
fn fetches_file_from_root() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("dashboard.html"), "<h1>bin</h1>").unwrap();
    let store = DirAssetStore::new(dir.path());
    assert_eq!(store.fetch("dashboard.html").unwrap(), b"<h1>bin</h1>");
}

#[rstest]
#[case("missing.html")]
#[case("../secret")]
#[case("/etc/passwd")]
#[case("")]
fn unavailable_names_are_not_found(#[case] name: &str) {
    let dir = tempdir().unwrap();
    let store = DirAssetStore::new(dir.path());
    let err = store.fetch(name).expect_err("should not resolve");
    assert_eq!(err.kind(), ErrorKind::NotFound);
}
