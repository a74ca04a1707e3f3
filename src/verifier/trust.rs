// Copyright 2023 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

use crate::token::{CertificateChain, Error};
use openssl::asn1::Asn1Time;
use openssl::error::ErrorStack;
use openssl::nid::Nid;
use openssl::stack::Stack;
use openssl::x509::store::X509StoreRef;
use openssl::x509::{X509Ref, X509StoreContext, X509VerifyResult};
use std::cmp::Ordering;

fn cert_error(e: ErrorStack) -> Error {
    Error::CertificateInvalid(format!("crypto error: {e}"))
}

/// Check that the signer certificate can be relied upon:
/// * the leaf is within its validity window
/// * each certificate in `x5c` is issued and signed by the next one, and a
///   self-issued tail carries a good self-signature
/// * if `anchors` is given, the chain validates up to one of them
///
/// Without anchors, nothing ties the chain to a known root.
pub fn check_validity(
    chain: &CertificateChain,
    anchors: Option<&X509StoreRef>,
) -> Result<(), Error> {
    check_validity_window(chain.leaf())?;
    check_links(chain)?;

    if let Some(store) = anchors {
        check_anchors(chain, store)?;
    }

    Ok(())
}

fn check_validity_window(leaf: &X509Ref) -> Result<(), Error> {
    let now = Asn1Time::days_from_now(0).map_err(cert_error)?;

    if leaf.not_before().compare(&now).map_err(cert_error)? == Ordering::Greater {
        return Err(Error::CertificateInvalid(format!(
            "leaf certificate not valid before {}",
            leaf.not_before()
        )));
    }

    if leaf.not_after().compare(&now).map_err(cert_error)? == Ordering::Less {
        return Err(Error::CertificateInvalid(format!(
            "leaf certificate expired on {}",
            leaf.not_after()
        )));
    }

    Ok(())
}

fn check_links(chain: &CertificateChain) -> Result<(), Error> {
    let certs = chain.certs();

    for (i, pair) in certs.windows(2).enumerate() {
        let (subject, issuer) = (&pair[0], &pair[1]);

        let r = issuer.issued(subject);
        if r != X509VerifyResult::OK {
            return Err(Error::CertificateInvalid(format!(
                "x5c[{i}] is not issued by x5c[{}]: {}",
                i + 1,
                r.error_string()
            )));
        }

        let key = issuer.public_key().map_err(cert_error)?;
        if !subject.verify(&key).map_err(cert_error)? {
            return Err(Error::CertificateInvalid(format!(
                "x5c[{i}] signature does not verify with the key of x5c[{}]",
                i + 1
            )));
        }
    }

    // the tail may be a root: if so, its self-signature must hold too
    if let Some(tail) = certs.last() {
        if tail.issued(tail) == X509VerifyResult::OK {
            let key = tail.public_key().map_err(cert_error)?;
            if !tail.verify(&key).map_err(cert_error)? {
                return Err(Error::CertificateInvalid(
                    "self-signature of the last x5c certificate does not verify".to_string(),
                ));
            }
        }
    }

    Ok(())
}

fn check_anchors(chain: &CertificateChain, store: &X509StoreRef) -> Result<(), Error> {
    let mut untrusted = Stack::new().map_err(cert_error)?;
    for c in chain.certs().iter().skip(1) {
        untrusted.push(c.clone()).map_err(cert_error)?;
    }

    let mut ctx = X509StoreContext::new().map_err(cert_error)?;
    let (ok, r) = ctx
        .init(store, chain.leaf(), &untrusted, |c| {
            Ok((c.verify_cert()?, c.error()))
        })
        .map_err(cert_error)?;

    if !ok {
        return Err(Error::CertificateInvalid(format!(
            "chain does not validate to a pinned root: {}",
            r.error_string()
        )));
    }

    Ok(())
}

/// The names the leaf certificate is issued to: the DNS entries of its
/// subjectAltName or, when there are none, the subject Common Name.
pub fn dns_names(leaf: &X509Ref) -> Vec<String> {
    let sans: Vec<String> = leaf
        .subject_alt_names()
        .map(|names| {
            names
                .iter()
                .filter_map(|n| n.dnsname().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();

    if !sans.is_empty() {
        return sans;
    }

    leaf.subject_name()
        .entries_by_nid(Nid::COMMONNAME)
        .next()
        .and_then(|e| e.data().as_utf8().ok())
        .map(|s| vec![s.to_string()])
        .unwrap_or_default()
}

/// Check that the leaf is issued to `expected`.  Any of its DNS names may
/// match; names are compared ASCII case-insensitively.
pub fn check_hostname(leaf: &X509Ref, expected: &str) -> Result<(), Error> {
    let names = dns_names(leaf);

    if names.iter().any(|n| n.eq_ignore_ascii_case(expected)) {
        return Ok(());
    }

    if names.is_empty() {
        return Err(Error::HostnameMismatch(
            "certificate carries no DNS name".to_string(),
        ));
    }

    Err(Error::HostnameMismatch(format!(
        "certificate issued to {}, expecting {expected}",
        names.join(", ")
    )))
}
