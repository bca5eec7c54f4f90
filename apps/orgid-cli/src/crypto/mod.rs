// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Symmetric protection of secrets stored in the project file.

pub mod secret;

pub use secret::{decrypt, encrypt, validate_passphrase, SecretError};
