use hb_core::{BatteryError, Result};
use serde::de::DeserializeOwned;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Replace `path` with `bytes` so readers see the old or the new contents,
/// never a prefix of the new ones.
///
/// Each call writes through its own uniquely named temp file in the target
/// directory, so concurrent writers never share a partially written file.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let write_err = |source| BatteryError::StorageWrite { path: path.to_path_buf(), source };

    let parent = path.parent().filter(|p| !p.as_os_str().is_empty());
    if let Some(dir) = parent {
        fs::create_dir_all(dir).map_err(write_err)?;
    }

    let mut prefix: OsString = OsString::from(".");
    prefix.push(path.file_name().unwrap_or_default());
    prefix.push(".");

    // Dropping the temp file on any early return removes it.
    let mut temp = tempfile::Builder::new()
        .prefix(&prefix)
        .suffix(".tmp")
        .tempfile_in(parent.unwrap_or_else(|| Path::new(".")))
        .map_err(write_err)?;
    temp.write_all(bytes).map_err(write_err)?;
    temp.as_file().sync_all().map_err(write_err)?;
    temp.persist(path).map_err(|e| write_err(e.error))?;

    // Persist the rename itself; not every platform can open a directory.
    if let Some(dir) = parent {
        if let Ok(handle) = File::open(dir) {
            let _ = handle.sync_all();
        }
    }
    Ok(())
}

/// Read and decode a JSON file.  `Ok(None)` when the file does not exist.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let raw = match fs::read(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(BatteryError::StorageRead { path: path.to_path_buf(), source });
        }
    };

    serde_json::from_slice(&raw)
        .map(Some)
        .map_err(|e| BatteryError::StorageCorrupt {
            path:   path.to_path_buf(),
            reason: e.to_string(),
        })
}

/// Move an undecodable file aside as `<name>.corrupt` for later inspection.
pub(crate) fn quarantine(path: &Path) {
    let target = sibling(path, ".corrupt");
    match fs::rename(path, &target) {
        Ok(()) => tracing::warn!("Moved unreadable '{}' to '{}'", path.display(), target.display()),
        Err(e) => tracing::warn!("Could not preserve unreadable '{}': {e}", path.display()),
    }
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(dir: &Path) -> Vec<String> {
        let mut names = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect::<Vec<_>>();
        names.sort();
        names
    }

    #[test]
    fn write_replaces_contents_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");

        write_atomic(&path, b"[1]").unwrap();
        write_atomic(&path, b"[1, 2]").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "[1, 2]");
        assert_eq!(entries(dir.path()), ["data.json"]);
    }

    #[test]
    fn write_creates_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("data.json");

        write_atomic(&path, b"{}").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn failed_write_cleans_up_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        // A non-empty directory on the target path makes the final rename fail.
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), "x").unwrap();

        let err = write_atomic(&path, b"[2]").unwrap_err();

        assert!(matches!(err, BatteryError::StorageWrite { .. }));
        assert_eq!(entries(dir.path()), ["data.json"]);
        assert_eq!(fs::read_to_string(path.join("keep")).unwrap(), "x");
    }

    #[test]
    fn concurrent_writers_never_expose_partial_files() {
        use std::sync::atomic::{AtomicBool, Ordering};
        use std::sync::Arc;

        let dir = tempfile::tempdir().unwrap();
        let path = Arc::new(dir.path().join("data.json"));
        let small = serde_json::to_vec(&vec![1_u32; 16]).unwrap();
        let large = serde_json::to_vec(&vec![2_u32; 50_000]).unwrap();
        write_atomic(&path, &small).unwrap();

        let done = Arc::new(AtomicBool::new(false));
        let writers = [small, large]
            .into_iter()
            .map(|bytes| {
                let path = Arc::clone(&path);
                std::thread::spawn(move || {
                    for _ in 0..200 {
                        write_atomic(&path, &bytes).unwrap();
                    }
                })
            })
            .collect::<Vec<_>>();

        let reader = {
            let (path, done) = (Arc::clone(&path), Arc::clone(&done));
            std::thread::spawn(move || {
                let mut bad = 0;
                while !done.load(Ordering::Acquire) {
                    if read_json::<Vec<u32>>(&path).map_or(true, |v| v.is_none()) {
                        bad += 1;
                    }
                }
                bad
            })
        };

        for writer in writers {
            writer.join().unwrap();
        }
        done.store(true, Ordering::Release);

        assert_eq!(reader.join().unwrap(), 0);
        assert_eq!(entries(dir.path()), ["data.json"]);
    }

    #[test]
    fn read_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let value: Option<Vec<i32>> = read_json(&dir.path().join("absent.json")).unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn read_garbage_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "[{\"startLevel\": 9").unwrap();

        let err = read_json::<Vec<i32>>(&path).unwrap_err();
        assert!(matches!(err, BatteryError::StorageCorrupt { .. }));
    }

    #[test]
    fn quarantine_moves_file_aside() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "nope").unwrap();

        quarantine(&path);

        assert!(!path.exists());
        assert_eq!(fs::read_to_string(dir.path().join("bad.json.corrupt")).unwrap(), "nope");
    }
}
