// Copyright 2023 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

use openssl::x509::X509;

/// Interface to the store where the pinned root certificates are stashed.
pub trait ITrustAnchorStore {
    /// Return all the trust anchors in the store
    fn anchors(&self) -> Vec<X509>;
}
