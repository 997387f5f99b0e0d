use super::*;
use tempfile::tempdir;

#[test]
fn write_then_remove_if_present_round_trips() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("keeper.pid");
    write(&path, 1234).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "1234\n");
    remove_if_present(&path);
    assert!(!path.exists());
}

#[test]
fn remove_if_present_on_a_missing_path_does_not_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("never-written.pid");
    remove_if_present(&path);
}
