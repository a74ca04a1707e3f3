// Copyright 2023 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

//! Test fixtures: a throwaway PKI and a JWS signer, generated with OpenSSL
//! once per test binary.

use base64::{engine::general_purpose, Engine as _};
use openssl::asn1::Asn1Time;
use openssl::bn::BigNum;
use openssl::ec::{EcGroup, EcKey};
use openssl::ecdsa::EcdsaSig;
use openssl::hash::MessageDigest;
use openssl::nid::Nid;
use openssl::pkey::{PKey, PKeyRef, Private};
use openssl::rsa::{Padding, Rsa};
use openssl::sign::{RsaPssSaltlen, Signer};
use openssl::x509::extension::{BasicConstraints, SubjectAlternativeName};
use openssl::x509::{X509NameBuilder, X509Ref, X509};
use serde_json::{json, Value};
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::verifier::ATTESTATION_HOSTNAME;

pub struct Fixtures {
    pub ca_key: PKey<Private>,
    pub ca: X509,
    /// an unrelated root, never used to issue anything in the chains below
    pub other_ca: X509,
    pub rsa_key: PKey<Private>,
    pub rsa_leaf: X509,
    pub ec_key: PKey<Private>,
    pub ec_leaf: X509,
    pub ec384_key: PKey<Private>,
    pub ec384_leaf: X509,
    pub ed_key: PKey<Private>,
    pub ed_leaf: X509,
}

static FIXTURES: OnceLock<Fixtures> = OnceLock::new();

pub fn fixtures() -> &'static Fixtures {
    FIXTURES.get_or_init(|| {
        let ca_key = rsa_key();
        let ca = root_cert(&ca_key, "Test Attestation Root");

        let other_ca_key = rsa_key();
        let other_ca = root_cert(&other_ca_key, "Unrelated Root");

        let rsa_key = rsa_key();
        let rsa_leaf = LeafSpec::new(ATTESTATION_HOSTNAME).issue(&rsa_key, &ca, &ca_key);

        let ec_key = generate_ec_key(Nid::X9_62_PRIME256V1);
        let ec_leaf = LeafSpec::new(ATTESTATION_HOSTNAME).issue(&ec_key, &ca, &ca_key);

        let ec384_key = generate_ec_key(Nid::SECP384R1);
        let ec384_leaf = LeafSpec::new(ATTESTATION_HOSTNAME).issue(&ec384_key, &ca, &ca_key);

        let ed_key = PKey::generate_ed25519().unwrap();
        let ed_leaf = LeafSpec::new(ATTESTATION_HOSTNAME).issue(&ed_key, &ca, &ca_key);

        Fixtures {
            ca_key,
            ca,
            other_ca,
            rsa_key,
            rsa_leaf,
            ec_key,
            ec_leaf,
            ec384_key,
            ec384_leaf,
            ed_key,
            ed_leaf,
        }
    })
}

fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}

const DAY: i64 = 24 * 60 * 60;

pub fn rsa_key() -> PKey<Private> {
    PKey::from_rsa(Rsa::generate(2048).unwrap()).unwrap()
}

fn generate_ec_key(curve: Nid) -> PKey<Private> {
    PKey::from_ec_key(EcKey::generate(&EcGroup::from_curve_name(curve).unwrap()).unwrap()).unwrap()
}

fn name(cn: &str) -> openssl::x509::X509Name {
    let mut b = X509NameBuilder::new().unwrap();
    b.append_entry_by_nid(Nid::COMMONNAME, cn).unwrap();
    b.build()
}

fn serial() -> openssl::asn1::Asn1Integer {
    let mut bn = BigNum::new().unwrap();
    bn.rand(64, openssl::bn::MsbOption::MAYBE_ZERO, false).unwrap();
    bn.to_asn1_integer().unwrap()
}

pub fn root_cert(key: &PKeyRef<Private>, cn: &str) -> X509 {
    let mut b = X509::builder().unwrap();
    let n = name(cn);

    b.set_version(2).unwrap();
    b.set_serial_number(&serial()).unwrap();
    b.set_subject_name(&n).unwrap();
    b.set_issuer_name(&n).unwrap();
    b.set_pubkey(key).unwrap();
    b.set_not_before(&Asn1Time::from_unix(now() - DAY).unwrap())
        .unwrap();
    b.set_not_after(&Asn1Time::from_unix(now() + 365 * DAY).unwrap())
        .unwrap();
    b.append_extension(BasicConstraints::new().critical().ca().build().unwrap())
        .unwrap();
    b.sign(key, MessageDigest::sha256()).unwrap();

    b.build()
}

/// Describes a leaf certificate to be issued by a test CA
pub struct LeafSpec<'a> {
    pub common_name: Option<&'a str>,
    pub dns_names: Vec<&'a str>,
    pub not_before: i64,
    pub not_after: i64,
}

impl<'a> LeafSpec<'a> {
    /// A currently valid leaf with both CN and SAN set to `host`
    pub fn new(host: &'a str) -> Self {
        Self {
            common_name: Some(host),
            dns_names: vec![host],
            not_before: now() - DAY,
            not_after: now() + 30 * DAY,
        }
    }

    pub fn expired(mut self) -> Self {
        self.not_before = now() - 30 * DAY;
        self.not_after = now() - DAY;
        self
    }

    pub fn not_yet_valid(mut self) -> Self {
        self.not_before = now() + DAY;
        self.not_after = now() + 30 * DAY;
        self
    }

    pub fn issue(
        &self,
        key: &PKeyRef<Private>,
        issuer: &X509Ref,
        issuer_key: &PKeyRef<Private>,
    ) -> X509 {
        let mut b = X509::builder().unwrap();

        b.set_version(2).unwrap();
        b.set_serial_number(&serial()).unwrap();
        let n = match self.common_name {
            Some(cn) => name(cn),
            None => name_without_cn(),
        };
        b.set_subject_name(&n).unwrap();
        b.set_issuer_name(issuer.subject_name()).unwrap();
        b.set_pubkey(key).unwrap();
        b.set_not_before(&Asn1Time::from_unix(self.not_before).unwrap())
            .unwrap();
        b.set_not_after(&Asn1Time::from_unix(self.not_after).unwrap())
            .unwrap();

        if !self.dns_names.is_empty() {
            let mut san = SubjectAlternativeName::new();
            for dns in &self.dns_names {
                san.dns(dns);
            }
            let san = san.build(&b.x509v3_context(Some(issuer), None)).unwrap();
            b.append_extension(san).unwrap();
        }

        b.sign(issuer_key, MessageDigest::sha256()).unwrap();

        b.build()
    }
}

fn name_without_cn() -> openssl::x509::X509Name {
    let mut b = X509NameBuilder::new().unwrap();
    b.append_entry_by_nid(Nid::ORGANIZATIONNAME, "Nameless Inc")
        .unwrap();
    b.build()
}

/// standard base64 of the DER encoding, as found in `x5c`
pub fn der_b64(cert: &X509Ref) -> String {
    general_purpose::STANDARD.encode(cert.to_der().unwrap())
}

pub fn b64url(v: &[u8]) -> String {
    general_purpose::URL_SAFE_NO_PAD.encode(v)
}

/// Produce a JWS signature over `input` in the wire format for `alg`
pub fn sign(alg: &str, key: &PKeyRef<Private>, input: &[u8]) -> Vec<u8> {
    if alg == "EdDSA" {
        let mut s = Signer::new_without_digest(key).unwrap();
        return s.sign_oneshot_to_vec(input).unwrap();
    }

    let (md, coordinate_len) = match &alg[2..] {
        "256" => (MessageDigest::sha256(), 32),
        "384" => (MessageDigest::sha384(), 48),
        "512" => (MessageDigest::sha512(), 66),
        _ => panic!("no test signer for {alg}"),
    };

    let mut s = Signer::new(md, key).unwrap();

    match &alg[..2] {
        "RS" | "ES" => {}
        "PS" => {
            s.set_rsa_padding(Padding::PKCS1_PSS).unwrap();
            s.set_rsa_pss_saltlen(RsaPssSaltlen::DIGEST_LENGTH).unwrap();
            s.set_rsa_mgf1_md(md).unwrap();
        }
        _ => panic!("no test signer for {alg}"),
    }

    s.update(input).unwrap();
    let sig = s.sign_to_vec().unwrap();

    if !alg.starts_with("ES") {
        return sig;
    }

    // DER ECDSA-Sig-Value to JWS r || s
    let sig = EcdsaSig::from_der(&sig).unwrap();
    let mut raw = sig.r().to_vec_padded(coordinate_len).unwrap();
    raw.extend(sig.s().to_vec_padded(coordinate_len).unwrap());
    raw
}

/// Assemble a compact JWS from an arbitrary header and payload
pub fn make_token_with_header(
    header: &Value,
    payload: &Value,
    alg: &str,
    key: &PKeyRef<Private>,
) -> String {
    let h = b64url(header.to_string().as_bytes());
    let p = b64url(payload.to_string().as_bytes());
    let sig = sign(alg, key, format!("{h}.{p}").as_bytes());

    format!("{h}.{p}.{}", b64url(&sig))
}

/// Assemble a compact JWS carrying `chain` in `x5c`
pub fn make_token(alg: &str, key: &PKeyRef<Private>, chain: &[&X509], payload: &Value) -> String {
    let x5c: Vec<String> = chain.iter().map(|c| der_b64(c)).collect();
    let header = json!({ "alg": alg, "x5c": x5c });

    make_token_with_header(&header, payload, alg, key)
}

/// A payload resembling what the attestation service issues
pub fn sample_claims() -> Value {
    json!({
        "nonce": "R2Rra24vSGtzSGRhb2Rla2tqYWJrYg==",
        "timestampMs": 1611644438128i64,
        "apkPackageName": "com.example.android.safetynetsample",
        "apkDigestSha256": "3q2+7wABAgM=",
        "ctsProfileMatch": true,
        "apkCertificateDigestSha256": ["AAECAwQFBgc="],
        "basicIntegrity": true,
        "evaluationType": "BASIC"
    })
}

/// The default good token: RS256, leaf + root in `x5c`
pub fn good_token() -> String {
    let f = fixtures();
    make_token("RS256", &f.rsa_key, &[&f.rsa_leaf, &f.ca], &sample_claims())
}
