// Copyright 2023 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

//! Android SafetyNet attestation token verification.
//!
//! This crate provides an API to decode and verify the signed attestation
//! statements (compact JWS) produced by the SafetyNet Attestation API.
//!
//! The API allows:
//! * Decoding the compact JWS and its embedded `x5c` certificate chain
//! * Cryptographically verifying the token signature against the leaf
//!   certificate, the certificate validity and its binding to
//!   `attest.android.com`
//! * Optionally requiring the chain to reach a set of pinned roots
//! * Extracting the claims into an [`token::AttestationStatement`]
//!
//! Deciding whether the extracted claims are acceptable (nonce, package
//! name, integrity verdicts) is left to the caller.
//!
//! ```no_run
//! let token = std::fs::read_to_string("token.jws").expect("reading token");
//!
//! match safetynet::verifier::verify(&token) {
//!     Some(s) => println!("CTS profile match: {}", s.cts_profile_match()),
//!     None => println!("do not trust this device"),
//! }
//! ```

pub mod store;
pub mod token;
pub mod verifier;

#[cfg(test)]
pub(crate) mod testutil;
