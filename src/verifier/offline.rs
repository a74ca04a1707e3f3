// Copyright 2023 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

use super::trust;
use super::{IAttestationVerifier, ATTESTATION_HOSTNAME};
use crate::store::{self, ITrustAnchorStore};
use crate::token::{verify_signature, AttestationStatement, CertificateChain, CompactJws, Error};
use openssl::x509::store::{X509Store, X509StoreBuilder};
use tracing::{debug, trace, warn};

/// Verification progress.  Stages only move forward; the first failure ends
/// the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Received,
    Parsed,
    ChainExtracted,
    SignatureVerified,
    TrustAndHostnameVerified,
    ClaimsMapped,
    Done,
}

/// Verifies attestation tokens locally, without contacting the attestation
/// service.
pub struct OfflineVerifier {
    /// Pinned roots.  When absent, the `x5c` chain is checked for internal
    /// consistency only.
    anchors: Option<X509Store>,
    pinned: usize,
}

impl Default for OfflineVerifier {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for OfflineVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OfflineVerifier")
            .field("pinned", &self.pinned)
            .finish()
    }
}

impl OfflineVerifier {
    /// Return a verifier that checks the leaf certificate and the links of
    /// the embedded chain, but does not require a known root.
    pub fn new() -> Self {
        Self {
            anchors: None,
            pinned: 0,
        }
    }

    /// Return a verifier that, in addition, requires the embedded chain to
    /// validate to one of the roots in `tas`.
    pub fn with_trust_anchors(tas: &impl ITrustAnchorStore) -> Result<Self, store::Error> {
        let anchors = tas.anchors();

        if anchors.is_empty() {
            return Err(store::Error::Rejected(
                "no trust anchors in store".to_string(),
            ));
        }

        let pinned = anchors.len();

        let mut b = X509StoreBuilder::new().map_err(|e| store::Error::Crypto(e.to_string()))?;
        for ta in anchors {
            b.add_cert(ta)
                .map_err(|e| store::Error::Crypto(e.to_string()))?;
        }

        Ok(Self {
            anchors: Some(b.build()),
            pinned,
        })
    }

    /// Run the whole pipeline on `token` and report why it failed, if it
    /// did.  The statement is only returned once every check has passed.
    pub fn verify_token(&self, token: &str) -> Result<AttestationStatement, Error> {
        let mut stage = Stage::Received;

        self.run(token, &mut stage).map_err(|e| {
            warn!(last_stage = ?stage, error = %e, "attestation verification failed");
            e
        })
    }

    fn run(&self, token: &str, stage: &mut Stage) -> Result<AttestationStatement, Error> {
        let jws = CompactJws::parse(token)?;
        *stage = Stage::Parsed;
        trace!(alg = ?jws.alg(), "token parsed");

        let chain = CertificateChain::from_header(&jws.header)?;
        *stage = Stage::ChainExtracted;
        trace!(certs = chain.len(), "certificate chain extracted");

        verify_signature(&jws.signing_input, &jws.signature, chain.leaf(), jws.alg())?;
        *stage = Stage::SignatureVerified;
        trace!("signature verified");

        trust::check_validity(&chain, self.anchors.as_deref())?;
        trust::check_hostname(chain.leaf(), ATTESTATION_HOSTNAME)?;
        *stage = Stage::TrustAndHostnameVerified;
        trace!(pinned = self.pinned, "certificate and hostname verified");

        let s = AttestationStatement::from_verified_claims(jws.payload);
        *stage = Stage::ClaimsMapped;
        debug!(
            package = s.apk_package_name(),
            timestamp_ms = s.timestamp_ms(),
            "attestation verified"
        );

        *stage = Stage::Done;
        Ok(s)
    }
}

impl IAttestationVerifier for OfflineVerifier {
    fn verify(&self, token: &str) -> Option<AttestationStatement> {
        self.verify_token(token).ok()
    }
}
