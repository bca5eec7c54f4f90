// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Claims of ORGiD auth tokens.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Lifetime of a token issued without an explicit expiration.
pub const DEFAULT_LIFETIME: Duration = Duration::hours(1);

/// Claims carried by an auth JWT.
///
/// `iat` and `exp` are Unix timestamps in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthClaims {
    /// Issuer DID URL (`did:orgid:...#key`)
    pub iss: String,
    /// Audience DID
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<Vec<String>>,
}

impl AuthClaims {
    /// Build claims issued at `now`.
    ///
    /// `expiration` is the absolute expiry; it defaults to
    /// [`DEFAULT_LIFETIME`] from `now`.
    pub fn new(
        issuer: &str,
        audience: &str,
        scope: Option<Vec<String>>,
        expiration: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Self {
        let exp = expiration.unwrap_or(now + DEFAULT_LIFETIME);
        Self {
            iss: issuer.to_string(),
            aud: audience.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            scope,
        }
    }
}

/// Split a `--scope` value on commas, dropping empty entries.
pub fn parse_scope(raw: &str) -> Option<Vec<String>> {
    let scope: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    (!scope.is_empty()).then_some(scope)
}
