use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors writing the generated site to disk.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to create directory '{path}': {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to copy '{from}' to '{to}': {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Atomically writes a file using the write-to-temp-then-rename pattern.
///
/// A reader (or a web server) never sees a half-written page: the old file
/// stays in place until the new one is complete and synced.
pub fn write_atomic(dst: &Path, content: &[u8]) -> Result<(), OutputError> {
    use std::time::{SystemTime, UNIX_EPOCH};
    let random_suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let temp_path = dst.with_extension(format!("tmp.{:016x}", random_suffix));

    let write_err = |source| OutputError::Write {
        path: dst.to_path_buf(),
        source,
    };

    let mut temp_file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true) // Fails if the temp name is taken instead of clobbering it
        .open(&temp_path)
        .map_err(write_err)?;

    let written = temp_file
        .write_all(content)
        .and_then(|()| temp_file.sync_all());
    drop(temp_file);

    if let Err(e) = written {
        let _ = std::fs::remove_file(&temp_path);
        return Err(write_err(e));
    }

    // On Windows, rename fails if destination exists, so remove it first
    #[cfg(windows)]
    if dst.exists() {
        if let Err(e) = std::fs::remove_file(dst) {
            let _ = std::fs::remove_file(&temp_path);
            return Err(write_err(e));
        }
    }

    std::fs::rename(&temp_path, dst).map_err(|e| {
        let _ = std::fs::remove_file(&temp_path);
        write_err(e)
    })
}

/// Creates a directory and its parents.
pub fn ensure_dir(path: &Path) -> Result<(), OutputError> {
    std::fs::create_dir_all(path).map_err(|source| OutputError::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}

/// Copies the static asset tree from `src` into `dst`.
///
/// A missing `src` is not an error: the site works without a stylesheet,
/// it just looks plain. Returns the number of files copied.
pub fn copy_static(src: &Path, dst: &Path) -> Result<usize, OutputError> {
    if !src.is_dir() {
        tracing::warn!(path = %src.display(), "Static directory not found, skipping asset copy");
        return Ok(0);
    }
    copy_tree(src, dst)
}

fn copy_tree(src: &Path, dst: &Path) -> Result<usize, OutputError> {
    ensure_dir(dst)?;

    let copy_err = |from: &Path, source| OutputError::Copy {
        from: from.to_path_buf(),
        to: dst.to_path_buf(),
        source,
    };

    let mut copied = 0;
    for entry in std::fs::read_dir(src).map_err(|e| copy_err(src, e))? {
        let entry = entry.map_err(|e| copy_err(src, e))?;
        let from = entry.path();
        let to = dst.join(entry.file_name());

        if from.is_dir() {
            copied += copy_tree(&from, &to)?;
        } else {
            let bytes = std::fs::read(&from).map_err(|e| copy_err(&from, e))?;
            write_atomic(&to, &bytes)?;
            copied += 1;
        }
    }

    Ok(copied)
}
