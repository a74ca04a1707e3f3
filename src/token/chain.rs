// Copyright 2023 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

use super::base64;
use super::errors::Error;
use super::jws::X5C_HEADER;
use openssl::x509::{X509Ref, X509};
use serde_json::{Map, Value};

/// The signer's certificate chain as carried in the `x5c` header parameter.
/// Order is preserved: index 0 is the leaf, whose key signs the token.
#[derive(Debug)]
pub struct CertificateChain {
    certs: Vec<X509>,
}

impl CertificateChain {
    /// Extract and decode the certificate chain from a JWS header
    pub fn from_header(header: &Map<String, Value>) -> Result<CertificateChain, Error> {
        let entries = match header.get(X5C_HEADER) {
            None => {
                return Err(Error::MissingSigningKeys(
                    "x5c header parameter not found".to_string(),
                ))
            }
            Some(Value::Array(a)) => a,
            Some(_) => {
                return Err(Error::MissingSigningKeys(
                    "x5c header parameter MUST be array".to_string(),
                ))
            }
        };

        if entries.is_empty() {
            return Err(Error::MissingSigningKeys(
                "x5c header parameter is empty".to_string(),
            ));
        }

        let mut certs = Vec::with_capacity(entries.len());

        for (i, v) in entries.iter().enumerate() {
            let b64 = v.as_str().ok_or_else(|| {
                Error::InvalidCertificate(format!("x5c[{i}] MUST be a base64 string"))
            })?;

            let der = base64::decode_std(b64)
                .map_err(|e| Error::InvalidCertificate(format!("x5c[{i}]: {e}")))?;

            let cert = X509::from_der(&der)
                .map_err(|e| Error::InvalidCertificate(format!("x5c[{i}]: {e}")))?;

            certs.push(cert);
        }

        Ok(CertificateChain { certs })
    }

    /// The signing certificate
    pub fn leaf(&self) -> &X509Ref {
        // non-emptiness is enforced by from_header
        &self.certs[0]
    }

    pub fn certs(&self) -> &[X509] {
        &self.certs
    }

    pub fn len(&self) -> usize {
        self.certs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.certs.is_empty()
    }
}
