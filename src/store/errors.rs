// Copyright 2023 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

/// Failures while loading pinned roots or building a verifier from them.
#[derive(thiserror::Error, PartialEq, Eq)]
pub enum Error {
    /// The input does not decode to certificates
    #[error("Cannot decode trust anchor: {0}")]
    Decode(String),
    /// A certificate that cannot act as a root, or an empty set of roots
    #[error("Trust anchor rejected: {0}")]
    Rejected(String),
    #[error("Trust store error: {0}")]
    Crypto(String),
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Decode(e) | Error::Rejected(e) | Error::Crypto(e) => {
                write!(f, "{}", e)
            }
        }
    }
}
