// SPDX-License-Identifier: Apache-2.0

use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    DecodeError, Engine as _,
};

const INDIFFERENT: GeneralPurposeConfig = GeneralPurposeConfig::new()
    .with_encode_padding(false)
    .with_decode_padding_mode(DecodePaddingMode::Indifferent);

/// base64url, used by the JWS segments.  Padding is tolerated but not needed.
const URL_SAFE: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, INDIFFERENT);

/// standard alphabet, used by `x5c` entries and most claims
const STANDARD: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, INDIFFERENT);

/// decodes bytes from a base64url-encoded JWS segment
pub fn decode_segment(v: &str) -> Result<Vec<u8>, DecodeError> {
    URL_SAFE.decode(v)
}

/// decodes bytes from a standard base64 string, e.g., a DER certificate in
/// the `x5c` header parameter
pub fn decode_std(v: &str) -> Result<Vec<u8>, DecodeError> {
    STANDARD.decode(v.trim())
}

/// decodes a binary claim, accepting either alphabet.  Claims are produced by
/// a remote service so we don't insist on one of them.
pub fn decode_any(v: &str) -> Option<Vec<u8>> {
    let v = v.trim();

    STANDARD.decode(v).or_else(|_| URL_SAFE.decode(v)).ok()
}
