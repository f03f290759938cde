//! Filesystem storage backend, the production default.
//!
//! Each key is one file directly inside the storage directory. Writes go to a
//! uniquely named hidden sibling first and are renamed over the target, so a
//! value is always replaced as a whole and concurrent writers never share a
//! temporary file. On Unix the directory is created with mode
//! `0700` and every file with mode `0600`.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::{StorageBackend, StorageError};

/// A storage backend that maps keys onto files in a single directory.
///
/// Construction does no I/O; the directory is created on the first write.
///
/// # Examples
///
/// ```no_run
/// # use namaste_storage::{FileBackend, StorageBackend};
/// let backend = FileBackend::new("/home/me/.namaste-cloud");
/// backend.put("config.json", br#"{"active_cloud":"aws"}"#).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Create a backend rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory this backend stores its files in.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the storage directory if needed. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::CreateDir`] if the directory cannot be created
    /// or its permissions cannot be restricted.
    pub fn ensure_dir(&self) -> Result<(), StorageError> {
        let create_err = |e: std::io::Error| StorageError::CreateDir {
            path: self.dir.display().to_string(),
            reason: e.to_string(),
        };

        let mut builder = fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(0o700);
        }
        builder.create(&self.dir).map_err(create_err)?;

        // `mode` only applies to directories that did not exist yet.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.dir, fs::Permissions::from_mode(0o700)).map_err(create_err)?;
        }
        Ok(())
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let invalid = |reason: &str| StorageError::InvalidKey {
            key: key.to_owned(),
            reason: reason.to_owned(),
        };
        if key.is_empty() {
            return Err(invalid("key is empty"));
        }
        if key == "." || key == ".." || key.contains(['/', '\\']) {
            return Err(invalid("key must be a plain file name"));
        }
        Ok(self.dir.join(key))
    }

    /// Create an owner-only temporary file next to the target for `key`.
    fn temp_file(&self, key: &str) -> std::io::Result<NamedTempFile> {
        let tmp = tempfile::Builder::new()
            .prefix(&format!(".{key}."))
            .suffix(".tmp")
            .tempfile_in(&self.dir)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tmp.as_file()
                .set_permissions(fs::Permissions::from_mode(0o600))?;
        }
        Ok(tmp)
    }
}

impl StorageBackend for FileBackend {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read(&path) {
            Ok(bytes) => {
                debug!(path = %path.display(), len = bytes.len(), "read storage file");
                Ok(Some(bytes))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Read {
                key: key.to_owned(),
                reason: format!("{}: {e}", path.display()),
            }),
        }
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        self.ensure_dir()?;

        let write_err = |e: std::io::Error| StorageError::Write {
            key: key.to_owned(),
            reason: format!("{}: {e}", path.display()),
        };

        // Dropping `tmp` on any error below removes the temporary file.
        let mut tmp = self.temp_file(key).map_err(write_err)?;
        tmp.write_all(value).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        tmp.persist(&path).map_err(|e| write_err(e.error))?;

        debug!(path = %path.display(), len = value.len(), "wrote storage file");
        Ok(())
    }

    fn exists(&self, key: &str) -> Result<bool, StorageError> {
        let path = self.path_for(key)?;
        path.try_exists().map_err(|e| StorageError::Read {
            key: key.to_owned(),
            reason: format!("{}: {e}", path.display()),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn backend() -> (tempfile::TempDir, FileBackend) {
        let tmp = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(tmp.path().join("vault"));
        (tmp, backend)
    }

    #[test]
    fn new_does_not_touch_disk() {
        let (_tmp, backend) = backend();
        assert!(!backend.dir().exists());
    }

    #[test]
    fn get_from_missing_directory_returns_none() {
        let (_tmp, backend) = backend();
        assert_eq!(backend.get("config.json").unwrap(), None);
        assert!(!backend.exists("config.json").unwrap());
    }

    #[test]
    fn put_creates_directory_and_file() {
        let (_tmp, backend) = backend();
        backend.put("keyfile", &[7u8; 32]).unwrap();
        assert_eq!(backend.get("keyfile").unwrap(), Some(vec![7u8; 32]));
        assert!(backend.exists("keyfile").unwrap());
    }

    #[test]
    fn put_replaces_whole_file() {
        let (_tmp, backend) = backend();
        backend.put("credentials.enc", b"a much longer first value").unwrap();
        backend.put("credentials.enc", b"short").unwrap();
        assert_eq!(backend.get("credentials.enc").unwrap(), Some(b"short".to_vec()));
    }

    #[test]
    fn put_leaves_no_temp_file_behind() {
        let (_tmp, backend) = backend();
        backend.put("config.json", b"{}").unwrap();
        let names: Vec<_> = fs::read_dir(backend.dir())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["config.json".to_owned()]);
    }

    #[test]
    fn ensure_dir_is_idempotent() {
        let (_tmp, backend) = backend();
        backend.ensure_dir().unwrap();
        backend.ensure_dir().unwrap();
        assert!(backend.dir().is_dir());
    }

    #[test]
    fn rejects_keys_that_escape_the_directory() {
        let (_tmp, backend) = backend();
        for key in ["", "..", "../keyfile", "sub/keyfile"] {
            assert!(
                matches!(backend.put(key, b"x"), Err(StorageError::InvalidKey { .. })),
                "key {key:?} should be rejected"
            );
        }
    }

    #[test]
    fn concurrent_writers_never_mix_values() {
        let (_tmp, backend) = backend();
        backend.ensure_dir().unwrap();

        let values: Vec<Vec<u8>> = (0u8..8).map(|i| vec![i; 64 * 1024]).collect();
        std::thread::scope(|s| {
            for value in &values {
                let backend = backend.clone();
                s.spawn(move || {
                    for _ in 0..10 {
                        backend.put("credentials.enc", value).unwrap();
                    }
                });
            }
        });

        let stored = backend.get("credentials.enc").unwrap().unwrap();
        assert!(values.contains(&stored), "stored value is a mix of writers");
        let names: Vec<_> = fs::read_dir(backend.dir())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["credentials.enc".to_owned()]);
    }

    #[cfg(unix)]
    #[test]
    fn files_and_directory_are_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let (_tmp, backend) = backend();
        backend.put("keyfile", &[1u8; 32]).unwrap();

        let dir_mode = fs::metadata(backend.dir()).unwrap().permissions().mode() & 0o777;
        let file_mode = fs::metadata(backend.dir().join("keyfile"))
            .unwrap()
            .permissions()
            .mode()
            & 0o777;
        assert_eq!(dir_mode, 0o700);
        assert_eq!(file_mode, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn existing_directory_permissions_are_tightened() {
        use std::os::unix::fs::PermissionsExt;

        let (_tmp, backend) = backend();
        fs::create_dir_all(backend.dir()).unwrap();
        fs::set_permissions(backend.dir(), fs::Permissions::from_mode(0o755)).unwrap();

        backend.put("config.json", b"{}").unwrap();
        let dir_mode = fs::metadata(backend.dir()).unwrap().permissions().mode() & 0o777;
        assert_eq!(dir_mode, 0o700);
    }
}
