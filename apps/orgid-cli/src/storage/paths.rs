// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Path utilities for the project directory layout.

use std::path::{Path, PathBuf};

/// Default name of the project file inside the project directory.
pub const PROJECT_FILE_NAME: &str = "orgid.json";

/// Storage path utilities for a project directory.
#[derive(Debug, Clone)]
pub struct ProjectPaths {
    root: PathBuf,
    file_name: String,
}

impl Default for ProjectPaths {
    fn default() -> Self {
        Self::new(".")
    }
}

impl ProjectPaths {
    /// Create paths rooted at the given project directory.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            file_name: PROJECT_FILE_NAME.to_string(),
        }
    }

    /// Use a custom project file name.
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    /// Root directory of the project.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path to the project JSON file.
    pub fn project_file(&self) -> PathBuf {
        self.root.join(&self.file_name)
    }

    /// Resolve a user-supplied path against the project root.
    ///
    /// Absolute paths are returned unchanged.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// Default location of an ORG.JSON template for a freshly minted ORGiD.
    pub fn org_json(&self, org_id_hex: &str) -> PathBuf {
        self.root.join(format!("orgJson.{}.json", short_id(org_id_hex)))
    }

    /// Default location of an ORGiD VC generated from an ORG.JSON file.
    pub fn org_id_vc(&self, org_json: &Path) -> PathBuf {
        let stem = org_json
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("orgJson");
        let parent = org_json.parent().unwrap_or(&self.root);
        parent.join(format!("{stem}.vc.json"))
    }
}

fn short_id(org_id_hex: &str) -> &str {
    let trimmed = org_id_hex.trim_start_matches("0x");
    &trimmed[..trimmed.len().min(10)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_paths_use_current_dir() {
        let paths = ProjectPaths::default();
        assert_eq!(paths.root(), Path::new("."));
        assert_eq!(paths.project_file(), PathBuf::from("./orgid.json"));
    }

    #[test]
    fn custom_file_name() {
        let paths = ProjectPaths::new("/tmp/project").with_file_name("custom.json");
        assert_eq!(paths.project_file(), PathBuf::from("/tmp/project/custom.json"));
    }

    #[test]
    fn resolve_keeps_absolute_paths() {
        let paths = ProjectPaths::new("/tmp/project");
        assert_eq!(paths.resolve("/etc/key.pem"), PathBuf::from("/etc/key.pem"));
        assert_eq!(
            paths.resolve("keys/pub.pem"),
            PathBuf::from("/tmp/project/keys/pub.pem")
        );
    }

    #[test]
    fn generated_document_paths() {
        let paths = ProjectPaths::new("/tmp/project");
        let org_json = paths.org_json("0xabcdef0123456789abcdef");
        assert_eq!(org_json, PathBuf::from("/tmp/project/orgJson.abcdef0123.json"));
        assert_eq!(
            paths.org_id_vc(&org_json),
            PathBuf::from("/tmp/project/orgJson.abcdef0123.vc.json")
        );
    }
}
