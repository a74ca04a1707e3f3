// Copyright 2023 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

//! Attestation token verifiers.
//!
//! [`OfflineVerifier`] runs the whole pipeline locally: it parses the token,
//! checks the signature against the leaf certificate in `x5c`, checks the
//! certificate validity and that it was issued to [`ATTESTATION_HOSTNAME`],
//! and finally maps the claims.  With the `online` feature,
//! [`OnlineVerifier`] delegates the signature check to the attestation
//! service instead; it does not validate certificates or hostname and must
//! not be used to make production trust decisions.
//!
//! Both report failure as `None`: the absence of a statement means the
//! attestation must not be trusted.

pub use self::offline::OfflineVerifier;
#[cfg(feature = "online")]
pub use self::online::{OnlineConfig, OnlineVerifier, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT};
pub use self::trust::dns_names;

use crate::token::AttestationStatement;

mod offline;
#[cfg(feature = "online")]
mod online;
mod trust;

/// The name the signing certificate must be issued to
pub const ATTESTATION_HOSTNAME: &str = "attest.android.com";

/// A strategy for verifying attestation tokens.
pub trait IAttestationVerifier {
    /// Verify `token` and return its claims, or `None` if it cannot be
    /// trusted for whatever reason
    fn verify(&self, token: &str) -> Option<AttestationStatement>;
}

/// Verify `token` offline, with no pinned roots.
pub fn verify(token: &str) -> Option<AttestationStatement> {
    OfflineVerifier::new().verify(token)
}
