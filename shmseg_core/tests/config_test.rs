// Segment configuration loaded from disk and used to build handles
use shmseg_core::{SegmentConfig, SharedMemory, ShmError};
use std::io::Write;

fn write_config(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_config_and_create_segment() {
    let name = format!("/shmseg_cfg_{}", uuid::Uuid::new_v4().simple());
    let file = write_config(&format!(
        "name = \"{}\"\nsize = 512\nmode = 0o640\n",
        name
    ));

    let config = SegmentConfig::load(file.path()).unwrap();
    assert_eq!(config.name, name);
    assert!(config.exclusive);

    let shm = SharedMemory::create(&config.name, config.create_options()).unwrap();
    assert_eq!(shm.size(), 512);
    assert!(shm.is_created());
}

#[test]
fn test_load_missing_file_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = SegmentConfig::load(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ShmError::Config(_)));
}

#[test]
fn test_load_malformed_file_is_config_error() {
    let file = write_config("name = [1, 2");
    let err = SegmentConfig::load(file.path()).unwrap_err();
    assert!(matches!(err, ShmError::Config(_)));
}
