// Copyright 2023 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

//! The token module provides the building blocks of the verification
//! pipeline: decoding the compact JWS ([`CompactJws`]), extracting the signer
//! certificates ([`CertificateChain`]), checking the signature
//! ([`verify_signature`]) and mapping the claims-set into an
//! [`AttestationStatement`].
//!
//! Most users want [`crate::verifier::verify`] instead, which sequences these
//! steps and adds the certificate and hostname checks.
//!
//! # Example
//!
//! ```no_run
//! use safetynet::token::{verify_signature, CertificateChain, CompactJws};
//!
//! # fn main() -> Result<(), safetynet::token::Error> {
//! let token = std::fs::read_to_string("token.jws").expect("reading token");
//!
//! let jws = CompactJws::parse(&token)?;
//! let chain = CertificateChain::from_header(&jws.header)?;
//!
//! // proves possession of the leaf key, not that the leaf is trustworthy
//! verify_signature(&jws.signing_input, &jws.signature, chain.leaf(), jws.alg())?;
//! # Ok(())
//! # }
//! ```

pub use self::chain::CertificateChain;
pub use self::claims::AttestationStatement;
pub use self::errors::Error;
pub use self::jws::CompactJws;
pub use self::signature::verify_signature;

mod base64;
mod chain;
mod claims;
mod errors;
mod jws;
mod signature;
