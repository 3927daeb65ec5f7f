use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::error::{FileSystemError, FileSystemResult};

/// Creates a directory structure if it doesn't exist.
///
/// # Errors
///
/// * [`FileSystemError::Directory`] if the directory could not be created.
/// * [`FileSystemError::NotADirectory`] if the path exists but is not a directory.
pub fn ensure_dir_exists<P: AsRef<Path>>(path: P) -> FileSystemResult<()> {
    let path = path.as_ref();
    if !path.exists() {
        fs::create_dir_all(path).map_err(|err| {
            FileSystemError::Directory {
                path: path.to_path_buf(),
                action: "create",
                source: err,
            }
        })?;
    } else if !path.is_dir() {
        return Err(FileSystemError::NotADirectory {
            path: path.to_path_buf(),
        });
    }

    Ok(())
}

/// Writes `contents` to `path` so that readers only ever see the old file or
/// the complete new one.
///
/// The data is written to a hidden sibling file, flushed to disk and then
/// renamed over the destination. The sibling is removed if any step fails.
pub fn write_atomic<P: AsRef<Path>>(path: P, contents: &[u8]) -> FileSystemResult<()> {
    let path = path.as_ref();
    let tmp_path = temp_sibling(path);

    let result = (|| {
        let mut file = File::create(&tmp_path)?;
        file.write_all(contents)?;
        file.sync_all()
    })();

    if let Err(err) = result {
        let _ = fs::remove_file(&tmp_path);
        return Err(FileSystemError::File {
            path: tmp_path,
            action: "write",
            source: err,
        });
    }

    fs::rename(&tmp_path, path).map_err(|err| {
        let _ = fs::remove_file(&tmp_path);
        FileSystemError::File {
            path: path.to_path_buf(),
            action: "publish",
            source: err,
        }
    })
}

/// Lists the immediate sub-directories of `path`, sorted by file name.
///
/// A missing `path` yields an empty list.
pub fn list_dirs<P: AsRef<Path>>(path: P) -> FileSystemResult<Vec<PathBuf>> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(Vec::new());
    }

    let entries = fs::read_dir(path).map_err(|err| {
        FileSystemError::Directory {
            path: path.to_path_buf(),
            action: "read",
            source: err,
        }
    })?;

    let mut dirs: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|entry| entry.is_dir())
        .collect();
    dirs.sort();

    Ok(dirs)
}

fn temp_sibling(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{file_name}.tmp"))
}
