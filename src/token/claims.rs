// Copyright 2023 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

use super::base64;
use serde::Serialize;
use serde_json::{Map, Value};
use serde_with::base64::Base64;

const NONCE_CLAIM: &str = "nonce";
const TIMESTAMP_CLAIM: &str = "timestampMs";
const APK_PACKAGE_NAME_CLAIM: &str = "apkPackageName";
const APK_DIGEST_CLAIM: &str = "apkDigestSha256";
const APK_CERT_DIGEST_CLAIM: &str = "apkCertificateDigestSha256";
const CTS_PROFILE_MATCH_CLAIM: &str = "ctsProfileMatch";
const BASIC_INTEGRITY_CLAIM: &str = "basicIntegrity";
const EVALUATION_TYPE_CLAIM: &str = "evaluationType";
const ADVICE_CLAIM: &str = "advice";

type Setter = fn(&mut AttestationStatement, &Value);

/// Known claims and how to decode them.  Absent claims are never visited and
/// keep their zero value; so do claims that fail to decode.
const DECODERS: [(&str, Setter); 9] = [
    (NONCE_CLAIM, AttestationStatement::set_nonce),
    (TIMESTAMP_CLAIM, AttestationStatement::set_timestamp_ms),
    (APK_PACKAGE_NAME_CLAIM, AttestationStatement::set_apk_package_name),
    (APK_DIGEST_CLAIM, AttestationStatement::set_apk_digest_sha256),
    (APK_CERT_DIGEST_CLAIM, AttestationStatement::set_apk_certificate_digest_sha256),
    (CTS_PROFILE_MATCH_CLAIM, AttestationStatement::set_cts_profile_match),
    (BASIC_INTEGRITY_CLAIM, AttestationStatement::set_basic_integrity),
    (EVALUATION_TYPE_CLAIM, AttestationStatement::set_evaluation_type),
    (ADVICE_CLAIM, AttestationStatement::set_advice),
];

/// The claims of a verified attestation token.
///
/// A statement can only be obtained from a verifier, after the token's
/// signature, certificate and hostname checks have passed.
#[serde_with::serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttestationStatement {
    /// The nonce provided when running the attestation on the device
    #[serde_as(as = "Base64")]
    nonce: Vec<u8>,

    /// Time of the attestation, in milliseconds since the UNIX epoch
    timestamp_ms: i64,

    /// Package name of the calling APK
    apk_package_name: String,

    /// SHA-256 digest of the calling APK
    #[serde_as(as = "Base64")]
    apk_digest_sha256: Vec<u8>,

    /// SHA-256 digest of the APK signing certificate
    #[serde_as(as = "Base64")]
    apk_certificate_digest_sha256: Vec<u8>,

    /// Whether the device matches a CTS-compatible profile
    cts_profile_match: bool,

    /// Whether the device has basic integrity
    basic_integrity: bool,

    /// Comma-separated evaluation types, e.g., "BASIC,HARDWARE_BACKED"
    evaluation_type: String,

    /// Hints on how to recover from a failed check
    advice: String,

    /// The claims-set as transmitted
    #[serde(skip)]
    claims: Map<String, Value>,
}

impl AttestationStatement {
    /// Map a verified claims-set.  Decoding is lenient: a malformed or
    /// missing claim yields the zero value for that field.
    pub(crate) fn from_verified_claims(claims: Map<String, Value>) -> Self {
        let mut s = AttestationStatement::default();

        for (name, set) in DECODERS.iter() {
            if let Some(v) = claims.get(*name) {
                set(&mut s, v);
            }
        }

        s.claims = claims;

        s
    }

    pub fn nonce(&self) -> &[u8] {
        &self.nonce
    }

    pub fn timestamp_ms(&self) -> i64 {
        self.timestamp_ms
    }

    pub fn apk_package_name(&self) -> &str {
        &self.apk_package_name
    }

    pub fn apk_digest_sha256(&self) -> &[u8] {
        &self.apk_digest_sha256
    }

    pub fn apk_certificate_digest_sha256(&self) -> &[u8] {
        &self.apk_certificate_digest_sha256
    }

    pub fn cts_profile_match(&self) -> bool {
        self.cts_profile_match
    }

    pub fn basic_integrity(&self) -> bool {
        self.basic_integrity
    }

    pub fn evaluation_type(&self) -> &str {
        &self.evaluation_type
    }

    pub fn advice(&self) -> &str {
        &self.advice
    }

    /// All claims as found in the token payload, including those not modeled
    /// by this type
    pub fn claims(&self) -> &Map<String, Value> {
        &self.claims
    }

    pub fn claim(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }

    fn set_nonce(&mut self, v: &Value) {
        self.nonce = to_binary(v);
    }

    fn set_timestamp_ms(&mut self, v: &Value) {
        self.timestamp_ms = to_integer(v);
    }

    fn set_apk_package_name(&mut self, v: &Value) {
        self.apk_package_name = to_text(v).unwrap_or_default();
    }

    fn set_apk_digest_sha256(&mut self, v: &Value) {
        self.apk_digest_sha256 = to_binary(v);
    }

    fn set_apk_certificate_digest_sha256(&mut self, v: &Value) {
        self.apk_certificate_digest_sha256 = to_binary(v);
    }

    fn set_cts_profile_match(&mut self, v: &Value) {
        self.cts_profile_match = to_bool(v);
    }

    fn set_basic_integrity(&mut self, v: &Value) {
        self.basic_integrity = to_bool(v);
    }

    fn set_evaluation_type(&mut self, v: &Value) {
        self.evaluation_type = to_text(v).unwrap_or_default();
    }

    fn set_advice(&mut self, v: &Value) {
        self.advice = to_text(v).unwrap_or_default();
    }
}

/// The claim rendered as text, the way it was transmitted.  Arrays (e.g., the
/// certificate digests) are represented by their first entry.
fn to_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(a) => a.first().and_then(to_text),
        Value::Null | Value::Object(_) => None,
    }
}

fn to_binary(v: &Value) -> Vec<u8> {
    to_text(v)
        .and_then(|s| base64::decode_any(&s))
        .unwrap_or_default()
}

fn to_integer(v: &Value) -> i64 {
    match v {
        Value::Number(n) => n.as_i64().unwrap_or(0),
        _ => to_text(v)
            .and_then(|s| s.trim().parse::<i64>().ok())
            .unwrap_or(0),
    }
}

fn to_bool(v: &Value) -> bool {
    match v {
        Value::Bool(b) => *b,
        _ => to_text(v)
            .map(|s| s.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(false),
    }
}
