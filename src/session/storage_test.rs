use super::*;

fn scratch_dir(name: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("clinica-storage-{name}-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

// =============================================================
// MemoryStorage
// =============================================================

#[test]
fn memory_storage_clones_share_entries() {
    let storage = MemoryStorage::new();
    let other = storage.clone();
    storage.save("auth-storage", "{}").unwrap();
    assert_eq!(other.load("auth-storage").unwrap().as_deref(), Some("{}"));
}

#[test]
fn memory_storage_remove_is_idempotent() {
    let storage = MemoryStorage::new().with_entry("k", "v");
    storage.remove("k").unwrap();
    storage.remove("k").unwrap();
    assert!(storage.load("k").unwrap().is_none());
}

// =============================================================
// FileStorage
// =============================================================

#[test]
fn file_storage_missing_key_loads_none() {
    let storage = FileStorage::new(scratch_dir("missing"));
    assert!(storage.load("auth-storage").unwrap().is_none());
}

#[test]
fn file_storage_persists_across_instances() {
    let dir = scratch_dir("persist");
    FileStorage::new(&dir).save("auth-storage", r#"{"state":{}}"#).unwrap();
    let reopened = FileStorage::new(&dir);
    assert_eq!(reopened.load("auth-storage").unwrap().as_deref(), Some(r#"{"state":{}}"#));
    reopened.remove("auth-storage").unwrap();
    assert!(reopened.load("auth-storage").unwrap().is_none());
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn file_storage_overwrites_previous_value() {
    let dir = scratch_dir("overwrite");
    let storage = FileStorage::new(&dir);
    storage.save("auth-storage", "first-and-longer").unwrap();
    storage.save("auth-storage", "second").unwrap();
    assert_eq!(storage.load("auth-storage").unwrap().as_deref(), Some("second"));
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn file_storage_concurrent_writers_never_corrupt_the_blob() {
    let dir = scratch_dir("concurrent");
    let writers: Vec<_> = (0..4)
        .map(|writer| {
            let storage = FileStorage::new(&dir);
            std::thread::spawn(move || {
                for n in 0..25 {
                    let blob = format!(r#"{{"state":{{"writer":{writer},"n":{n},"pad":"{}"}},"version":0}}"#, "x".repeat(256));
                    storage.save("auth-storage", &blob).unwrap();
                }
            })
        })
        .collect();
    for writer in writers {
        writer.join().unwrap();
    }

    let raw = FileStorage::new(&dir).load("auth-storage").unwrap().unwrap();
    let blob: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(blob["state"]["n"], 24);
    let leftovers: Vec<_> = std::fs::read_dir(&dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name != "auth-storage.json")
        .collect();
    assert!(leftovers.is_empty(), "temporary files left behind: {leftovers:?}");
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn file_storage_rejects_path_like_keys() {
    let storage = FileStorage::new(scratch_dir("keys"));
    assert!(matches!(storage.save("../escape", "x"), Err(StorageError::InvalidKey(_))));
    assert!(matches!(storage.load(""), Err(StorageError::InvalidKey(_))));
}

#[cfg(unix)]
#[test]
fn file_storage_writes_owner_only_file() {
    use std::os::unix::fs::PermissionsExt;

    let dir = scratch_dir("mode");
    let storage = FileStorage::new(&dir);
    storage.save("auth-storage", "secret").unwrap();
    let mode = std::fs::metadata(dir.join("auth-storage.json")).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
    let _ = std::fs::remove_dir_all(dir);
}
