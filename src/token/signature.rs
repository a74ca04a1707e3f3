// Copyright 2023 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

use super::errors::Error;
use jsonwebtoken::Algorithm;
use openssl::bn::BigNum;
use openssl::ecdsa::EcdsaSig;
use openssl::error::ErrorStack;
use openssl::hash::MessageDigest;
use openssl::nid::Nid;
use openssl::pkey::{Id, PKey, Public};
use openssl::rsa::Padding;
use openssl::sign::{RsaPssSaltlen, Verifier};
use openssl::x509::X509Ref;
use std::str::FromStr;

/// Verify `signature` over the JWS signing input using the public key of the
/// leaf certificate and the algorithm named in the JWS header.  This says
/// nothing about whether the certificate itself can be trusted.
pub fn verify_signature(
    signing_input: &[u8],
    signature: &[u8],
    leaf: &X509Ref,
    alg: Option<&str>,
) -> Result<(), Error> {
    let alg = alg.ok_or(Error::SignatureInvalid(
        "alg header parameter not found".to_string(),
    ))?;

    let alg = Algorithm::from_str(alg)
        .map_err(|e| Error::SignatureInvalid(format!("unknown algorithm {alg}: {e}")))?;

    let pkey = leaf
        .public_key()
        .map_err(|e| Error::SignatureInvalid(format!("leaf public key: {e}")))?;

    let (d, s) = (signing_input, signature);

    let ok = match alg {
        Algorithm::RS256 => verify_rsa(&pkey, MessageDigest::sha256(), false, d, s),
        Algorithm::RS384 => verify_rsa(&pkey, MessageDigest::sha384(), false, d, s),
        Algorithm::RS512 => verify_rsa(&pkey, MessageDigest::sha512(), false, d, s),
        Algorithm::PS256 => verify_rsa(&pkey, MessageDigest::sha256(), true, d, s),
        Algorithm::PS384 => verify_rsa(&pkey, MessageDigest::sha384(), true, d, s),
        Algorithm::PS512 => verify_rsa(&pkey, MessageDigest::sha512(), true, d, s),
        Algorithm::ES256 => verify_ecdsa(&pkey, EcParams::P256, d, s),
        Algorithm::ES384 => verify_ecdsa(&pkey, EcParams::P384, d, s),
        Algorithm::EdDSA => verify_eddsa(&pkey, d, s),
        a => {
            // HMAC keys cannot come out of a certificate
            return Err(Error::SignatureInvalid(format!(
                "unsupported algorithm {a:?}"
            )));
        }
    }?;

    if !ok {
        return Err(Error::SignatureInvalid(format!(
            "{alg:?} signature does not match the leaf certificate key"
        )));
    }

    Ok(())
}

fn expect_key_type(pkey: &PKey<Public>, want: Id, name: &str) -> Result<(), Error> {
    if pkey.id() != want {
        return Err(Error::SignatureInvalid(format!(
            "leaf certificate key is not {name}"
        )));
    }
    Ok(())
}

fn crypto_error(e: ErrorStack) -> Error {
    Error::SignatureInvalid(format!("crypto error: {e}"))
}

fn verify_rsa(
    pkey: &PKey<Public>,
    md: MessageDigest,
    pss: bool,
    data: &[u8],
    signature: &[u8],
) -> Result<bool, Error> {
    expect_key_type(pkey, Id::RSA, "RSA")?;

    let mut verifier = Verifier::new(md, pkey).map_err(crypto_error)?;

    if pss {
        verifier
            .set_rsa_padding(Padding::PKCS1_PSS)
            .map_err(crypto_error)?;
        verifier
            .set_rsa_pss_saltlen(RsaPssSaltlen::DIGEST_LENGTH)
            .map_err(crypto_error)?;
        verifier.set_rsa_mgf1_md(md).map_err(crypto_error)?;
    }

    verifier.update(data).map_err(crypto_error)?;

    // a malformed signature shows up as an error rather than `false`
    Ok(verifier.verify(signature).unwrap_or(false))
}

#[derive(Clone, Copy)]
enum EcParams {
    P256,
    P384,
}

impl EcParams {
    fn curve(self) -> Nid {
        match self {
            EcParams::P256 => Nid::X9_62_PRIME256V1,
            EcParams::P384 => Nid::SECP384R1,
        }
    }

    fn digest(self) -> MessageDigest {
        match self {
            EcParams::P256 => MessageDigest::sha256(),
            EcParams::P384 => MessageDigest::sha384(),
        }
    }

    fn coordinate_len(self) -> usize {
        match self {
            EcParams::P256 => 32,
            EcParams::P384 => 48,
        }
    }
}

fn verify_ecdsa(
    pkey: &PKey<Public>,
    params: EcParams,
    data: &[u8],
    signature: &[u8],
) -> Result<bool, Error> {
    expect_key_type(pkey, Id::EC, "EC")?;

    let curve = pkey.ec_key().map_err(crypto_error)?.group().curve_name();
    if curve != Some(params.curve()) {
        return Err(Error::SignatureInvalid(format!(
            "leaf certificate curve {curve:?} does not match algorithm"
        )));
    }

    let n = params.coordinate_len();
    if signature.len() != 2 * n {
        return Err(Error::SignatureInvalid(format!(
            "ECDSA signature: expecting {} bytes, got {}",
            2 * n,
            signature.len()
        )));
    }

    // JWS carries r || s, OpenSSL wants a DER ECDSA-Sig-Value
    let r = BigNum::from_slice(&signature[..n]).map_err(crypto_error)?;
    let s = BigNum::from_slice(&signature[n..]).map_err(crypto_error)?;
    let der = EcdsaSig::from_private_components(r, s)
        .and_then(|sig| sig.to_der())
        .map_err(crypto_error)?;

    let mut verifier = Verifier::new(params.digest(), pkey).map_err(crypto_error)?;
    verifier.update(data).map_err(crypto_error)?;

    Ok(verifier.verify(&der).unwrap_or(false))
}

fn verify_eddsa(pkey: &PKey<Public>, data: &[u8], signature: &[u8]) -> Result<bool, Error> {
    expect_key_type(pkey, Id::ED25519, "Ed25519")?;

    let mut verifier = Verifier::new_without_digest(pkey).map_err(crypto_error)?;

    Ok(verifier.verify_oneshot(signature, data).unwrap_or(false))
}
