// Copyright 2023 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

use super::IAttestationVerifier;
use crate::token::{AttestationStatement, CompactJws, Error};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_ENDPOINT: &str =
    "https://www.googleapis.com/androidcheck/v1/attestations/verify";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Where and how to reach the remote verification service
#[derive(Debug, Clone)]
pub struct OnlineConfig {
    /// The verification endpoint, without query parameters
    pub endpoint: String,
    /// API key, sent as the `key` query parameter
    pub api_key: String,
    /// Overall request timeout
    pub timeout: Duration,
}

impl OnlineConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: api_key.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Serialize)]
struct VerificationRequest<'a> {
    #[serde(rename = "signedAttestation")]
    signed_attestation: &'a str,
}

#[derive(Deserialize, Debug)]
struct VerificationResponse {
    #[serde(rename = "isValidSignature")]
    is_valid_signature: Option<bool>,
    error: Option<ErrorResponse>,
}

#[derive(Deserialize, Debug)]
struct ErrorResponse {
    code: Option<i64>,
    message: Option<String>,
}

/// Asks the attestation service whether the token signature is valid.
///
/// Only the signature is checked, remotely: neither the certificate chain
/// nor the hostname is validated.  Use it for testing, not to make trust
/// decisions.
#[derive(Debug)]
pub struct OnlineVerifier {
    config: OnlineConfig,
    client: Client,
}

impl OnlineVerifier {
    pub fn new(config: OnlineConfig) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Remote(format!("building HTTP client: {e}")))?;

        warn!("online verification does not validate the signing certificate");

        Ok(Self { config, client })
    }

    pub fn verify_token(&self, token: &str) -> Result<AttestationStatement, Error> {
        // reject garbage before going to the network
        let jws = CompactJws::parse(token)?;

        let resp = self
            .client
            .post(&self.config.endpoint)
            .query(&[("key", self.config.api_key.as_str())])
            .json(&VerificationRequest {
                signed_attestation: token,
            })
            .send()
            // the URL carries the API key
            .map_err(|e| Error::Remote(format!("network error: {}", e.without_url())))?;

        let status = resp.status();
        let body = resp
            .text()
            .map_err(|e| Error::Remote(format!("reading response: {}", e.without_url())))?;

        debug!(%status, "verification service responded");

        interpret_response(&body)?;

        if !status.is_success() {
            return Err(Error::Remote(format!("HTTP status {status}")));
        }

        Ok(AttestationStatement::from_verified_claims(jws.payload))
    }
}

impl IAttestationVerifier for OnlineVerifier {
    fn verify(&self, token: &str) -> Option<AttestationStatement> {
        self.verify_token(token)
            .map_err(|e| warn!(error = %e, "online attestation verification failed"))
            .ok()
    }
}

/// Anything short of an explicit `"isValidSignature": true` is a failure.
fn interpret_response(body: &str) -> Result<(), Error> {
    let r: VerificationResponse = serde_json::from_str(body)
        .map_err(|e| Error::Remote(format!("decoding response: {e}")))?;

    if let Some(e) = r.error {
        return Err(Error::Remote(format!(
            "service error {}: {}",
            e.code.unwrap_or_default(),
            e.message.unwrap_or_default()
        )));
    }

    match r.is_valid_signature {
        Some(true) => Ok(()),
        Some(false) => Err(Error::Remote(
            "the service could not verify the signature".to_string(),
        )),
        None => Err(Error::Remote(
            "isValidSignature missing from response".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil;

    #[test]
    fn request_body() {
        let j = serde_json::to_string(&VerificationRequest {
            signed_attestation: "a.b.c",
        })
        .unwrap();

        assert_eq!(j, r#"{"signedAttestation":"a.b.c"}"#);
    }

    #[test]
    fn response_valid() {
        assert!(interpret_response(r#"{"isValidSignature": true}"#).is_ok());
    }

    #[test]
    fn response_invalid() {
        for body in [
            r#"{"isValidSignature": false}"#,
            r#"{}"#,
            r#"{"isValidSignature": "true"}"#,
            r#"{"isValidSignature": true, "error": {"code": 400, "message": "API key not valid"}}"#,
            r#"{"error": {"code": 403, "message": "forbidden", "status": "PERMISSION_DENIED"}}"#,
            "<html>",
        ] {
            let r = interpret_response(body);
            assert!(matches!(r, Err(Error::Remote(_))), "{body}");
        }
    }

    #[test]
    fn malformed_token_is_rejected_locally() {
        let mut config = OnlineConfig::new("no-key");
        // unroutable: any network access would fail with Remote instead
        config.endpoint = "http://127.0.0.1:9/".to_string();
        let v = OnlineVerifier::new(config).unwrap();

        let r = v.verify_token("not.a-token");
        assert!(matches!(r, Err(Error::MalformedToken(_))));
        assert!(v.verify("not.a-token").is_none());
    }

    #[test]
    fn network_error_hides_api_key() {
        const KEY: &str = "SECRET-API-KEY-123";

        let mut config = OnlineConfig::new(KEY);
        config.endpoint = "http://127.0.0.1:9/".to_string();
        let v = OnlineVerifier::new(config).unwrap();

        let e = v.verify_token(&testutil::good_token()).unwrap_err();

        assert!(matches!(e, Error::Remote(_)));
        assert!(!e.to_string().contains(KEY), "{e}");
        assert!(!format!("{e:?}").contains(KEY), "{e:?}");
    }

    #[test]
    fn default_config() {
        let c = OnlineConfig::new("k");

        assert_eq!(c.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(c.timeout, DEFAULT_TIMEOUT);
        assert_eq!(c.api_key, "k");
    }
}
