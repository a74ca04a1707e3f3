// Copyright 2023 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

/// Failure kinds of the verification pipeline.  At the public boundary they
/// all collapse into "no statement", but each stage reports its own kind so
/// that callers and logs can tell them apart.
#[derive(thiserror::Error, PartialEq, Eq)]
pub enum Error {
    #[error("Malformed token: {0}")]
    MalformedToken(String),
    #[error("Missing signing keys: {0}")]
    MissingSigningKeys(String),
    #[error("Invalid certificate: {0}")]
    InvalidCertificate(String),
    #[error("Signature invalid: {0}")]
    SignatureInvalid(String),
    #[error("Certificate invalid: {0}")]
    CertificateInvalid(String),
    #[error("Hostname mismatch: {0}")]
    HostnameMismatch(String),
    #[cfg(feature = "online")]
    #[error("Remote verification failed: {0}")]
    Remote(String),
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::MalformedToken(e)
            | Error::MissingSigningKeys(e)
            | Error::InvalidCertificate(e)
            | Error::SignatureInvalid(e)
            | Error::CertificateInvalid(e)
            | Error::HostnameMismatch(e) => {
                write!(f, "{}", e)
            }
            #[cfg(feature = "online")]
            Error::Remote(e) => write!(f, "{}", e),
        }
    }
}
