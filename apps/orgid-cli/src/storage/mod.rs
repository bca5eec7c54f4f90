// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Project Storage Module
//!
//! All persistent state lives in one JSON project file inside the project
//! directory, next to the ORG.JSON and ORGiD VC documents it references.
//!
//! ## Storage Layout
//!
//! ```text
//! <project>/
//!   orgid.json               # keys, orgIds, deployments, apiKeys, networkProviders
//!   orgJson.<id>.json        # ORG.JSON documents (bootstrap output)
//!   orgJson.<id>.vc.json     # signed ORGiD VCs
//! ```
//!
//! ## Important Notes
//!
//! - Private keys, KMS credentials and encrypted config values are stored
//!   as ciphertext produced by [`crate::crypto::secret`]
//! - The project file is rewritten wholesale on every change

pub mod paths;
pub mod project;
pub mod project_fs;

pub use paths::{ProjectPaths, PROJECT_FILE_NAME};
pub use project::{
    ConfigKind, ConfigRecord, DeploymentRecord, Jwk, KeyRecord, KeyType, OrgIdRecord,
    ProjectFile, ProjectStore, PublicKeyRef,
};
pub use project_fs::{ProjectStorage, StorageError, StorageResult};
