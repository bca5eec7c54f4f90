// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Filesystem operations for the project directory.
//!
//! The project file is plain JSON. Secrets inside it are encrypted by the
//! caller (see [`crate::crypto`]) before they reach this module, so nothing
//! here ever handles key material in the clear.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};

use super::ProjectPaths;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Cannot access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} does not hold the expected JSON: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Missing file or record, described for the user.
    #[error("{0} not found")]
    NotFound(String),

    #[error("Key pair with tag \"{0}\" already exists")]
    DuplicateTag(String),
}

impl StorageError {
    fn io(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            return Self::NotFound(format!("File {}", path.display()));
        }
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn json(path: &Path, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.to_path_buf(),
            source,
        }
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

/// File access scoped to a project directory.
#[derive(Debug, Clone)]
pub struct ProjectStorage {
    paths: ProjectPaths,
}

impl ProjectStorage {
    pub fn new(paths: ProjectPaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &ProjectPaths {
        &self.paths
    }

    pub fn read_json<T: DeserializeOwned>(&self, path: impl AsRef<Path>) -> StorageResult<T> {
        let path = self.paths.resolve(path);
        let raw = fs::read(&path).map_err(|e| StorageError::io(&path, e))?;
        serde_json::from_slice(&raw).map_err(|e| StorageError::json(&path, e))
    }

    /// Pretty JSON with a trailing newline. The document is staged next to
    /// `path` and renamed over it, so readers never see a partial file.
    pub fn write_json<T: Serialize>(&self, path: impl AsRef<Path>, value: &T) -> StorageResult<()> {
        let path = self.paths.resolve(path);
        let mut document = serde_json::to_string_pretty(value).map_err(|e| StorageError::json(&path, e))?;
        document.push('\n');

        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| StorageError::io(dir, e))?;
        }

        let staged = staging_path(&path);
        fs::write(&staged, document).map_err(|e| StorageError::io(&staged, e))?;
        fs::rename(&staged, &path).map_err(|e| {
            let _ = fs::remove_file(&staged);
            StorageError::io(&path, e)
        })
    }

    pub fn exists(&self, path: impl AsRef<Path>) -> bool {
        self.paths.resolve(path).is_file()
    }

    /// Text content without surrounding whitespace (PEM files, passphrases).
    pub fn read_text(&self, path: impl AsRef<Path>) -> StorageResult<String> {
        let path = self.paths.resolve(path);
        let text = fs::read_to_string(&path).map_err(|e| StorageError::io(&path, e))?;
        Ok(text.trim().to_string())
    }

    pub fn read_raw(&self, path: impl AsRef<Path>) -> StorageResult<Vec<u8>> {
        let path = self.paths.resolve(path);
        fs::read(&path).map_err(|e| StorageError::io(&path, e))
    }
}

/// `dir/.name.tmp` for `dir/name`.
fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.tmp"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    fn test_storage() -> (tempfile::TempDir, ProjectStorage) {
        let dir = tempfile::tempdir().expect("create temp dir");
        let storage = ProjectStorage::new(ProjectPaths::new(dir.path()));
        (dir, storage)
    }

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct TestData {
        id: String,
        value: i32,
    }

    #[test]
    fn write_and_read_json() {
        let (_dir, storage) = test_storage();
        let data = TestData {
            id: "test-1".to_string(),
            value: 42,
        };

        storage.write_json("nested/test.json", &data).unwrap();

        let read: TestData = storage.read_json("nested/test.json").unwrap();
        assert_eq!(read, data);
        assert!(!storage.exists("nested/.test.json.tmp"));

        let written = fs::read_to_string(storage.paths().resolve("nested/test.json")).unwrap();
        assert!(written.ends_with("}\n"));
    }

    #[test]
    fn read_text_trims_content() {
        let (dir, storage) = test_storage();
        fs::write(dir.path().join("key.pem"), "\n  -----BEGIN-----\n").unwrap();

        assert_eq!(storage.read_text("key.pem").unwrap(), "-----BEGIN-----");
    }

    #[test]
    fn missing_file_is_not_found() {
        let (_dir, storage) = test_storage();

        let result = storage.read_json::<TestData>("missing.json");
        match result {
            Err(StorageError::NotFound(what)) => assert!(what.ends_with("missing.json")),
            other => panic!("unexpected result: {other:?}"),
        }

        let result = storage.read_raw("missing.bin");
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn malformed_json_is_json_error() {
        let (dir, storage) = test_storage();
        fs::write(dir.path().join("broken.json"), "{ not json").unwrap();

        let result = storage.read_json::<TestData>("broken.json");
        match result {
            Err(StorageError::Json { path, .. }) => assert!(path.ends_with("broken.json")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn directory_in_place_of_file_is_io_error() {
        let (dir, storage) = test_storage();
        fs::create_dir(dir.path().join("project.json")).unwrap();

        let result = storage.read_raw("project.json");
        assert!(matches!(result, Err(StorageError::Io { .. })));

        let result = storage.write_json("project.json", &serde_json::json!({}));
        assert!(matches!(result, Err(StorageError::Io { .. })));
        assert!(!storage.exists(".project.json.tmp"));
    }
}
