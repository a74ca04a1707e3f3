// Copyright 2023-2025 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

use super::errors::Error;
use super::ITrustAnchorStore;
use openssl::hash::MessageDigest;
use openssl::x509::{X509Ref, X509VerifyResult, X509};
use std::collections::HashMap;
use tracing::debug;

/// SHA-256 fingerprint of the DER encoding of a certificate
fn fingerprint(cert: &X509Ref) -> Result<[u8; 32], Error> {
    let d = cert
        .digest(MessageDigest::sha256())
        .map_err(|e| Error::Crypto(e.to_string()))?;

    let mut fp = [0u8; 32];
    fp.copy_from_slice(&d);

    Ok(fp)
}

/// The store where the pinned roots are stashed.  Roots are keyed by their
/// SHA-256 fingerprint, so loading the same root twice keeps one copy.  The
/// store is filled before verification starts and
/// only read afterwards.
#[derive(Debug)]
pub struct MemoTrustAnchorStore {
    p: HashMap<[u8; 32], X509>,
}

impl Default for MemoTrustAnchorStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoTrustAnchorStore {
    /// Returns a new empty TrustAnchorStore
    pub fn new() -> Self {
        Self {
            p: Default::default(),
        }
    }

    /// Add to an existing (and possibly empty) TrustAnchorStore the root
    /// certificates found in the given PEM bundle
    pub fn load_pem(&mut self, pem: &str) -> Result<(), Error> {
        let certs =
            X509::stack_from_pem(pem.as_bytes()).map_err(|e| Error::Decode(e.to_string()))?;

        if certs.is_empty() {
            return Err(Error::Decode("no certificate found in PEM".to_string()));
        }

        for cert in certs {
            self.add(cert)?;
        }

        Ok(())
    }

    /// Add a single root certificate.  Only self-issued certificates can act
    /// as trust anchors.
    pub fn add(&mut self, cert: X509) -> Result<(), Error> {
        if cert.issued(&cert) != X509VerifyResult::OK {
            return Err(Error::Rejected(
                "not a self-issued certificate".to_string(),
            ));
        }

        let fp = fingerprint(&cert)?;

        debug!(fingerprint = %hex::encode(fp), "loaded trust anchor");

        self.p.insert(fp, cert);

        Ok(())
    }

    pub fn len(&self) -> usize {
        self.p.len()
    }

    pub fn is_empty(&self) -> bool {
        self.p.is_empty()
    }
}

impl ITrustAnchorStore for MemoTrustAnchorStore {
    fn anchors(&self) -> Vec<X509> {
        self.p.values().cloned().collect()
    }
}
