// Copyright 2023 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

//! Pinned root certificates.  When configured, the offline verifier requires
//! the token's `x5c` chain to validate up to one of them.

pub use self::errors::Error;
pub use self::itrustanchorstore::ITrustAnchorStore;
pub use self::memo_trustanchorstore::MemoTrustAnchorStore;

mod errors;
mod itrustanchorstore;
mod memo_trustanchorstore;
