// Copyright 2023 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

use super::base64;
use super::errors::Error;
use serde_json::{Map, Value};

pub const ALG_HEADER: &str = "alg";
pub const X5C_HEADER: &str = "x5c";

/// A JWS in compact serialization, split and decoded but not yet verified.
#[derive(Debug)]
pub struct CompactJws {
    /// Decoded protected header
    pub header: Map<String, Value>,
    /// Decoded payload (the claims-set)
    pub payload: Map<String, Value>,
    /// Raw signature bytes
    pub signature: Vec<u8>,
    /// The JWS Signing Input, i.e., the *encoded* header and payload
    /// segments joined by a dot
    pub signing_input: Vec<u8>,
}

impl CompactJws {
    /// Parse a compact-serialized JWS.  Nothing is verified at this stage.
    pub fn parse(token: &str) -> Result<CompactJws, Error> {
        let segments: Vec<&str> = token.trim().split('.').collect();

        if segments.len() != 3 {
            return Err(Error::MalformedToken(format!(
                "expecting 3 segments, got {}",
                segments.len()
            )));
        }

        let (h, p, s) = (segments[0], segments[1], segments[2]);

        let header = decode_object(h, "header")?;
        let payload = decode_object(p, "payload")?;

        let signature = base64::decode_segment(s)
            .map_err(|e| Error::MalformedToken(format!("signature: {e}")))?;

        let signing_input = format!("{h}.{p}").into_bytes();

        Ok(CompactJws {
            header,
            payload,
            signature,
            signing_input,
        })
    }

    /// The signing algorithm name, if the header carries one as text
    pub fn alg(&self) -> Option<&str> {
        self.header.get(ALG_HEADER).and_then(Value::as_str)
    }
}

fn decode_object(segment: &str, what: &str) -> Result<Map<String, Value>, Error> {
    let buf = base64::decode_segment(segment)
        .map_err(|e| Error::MalformedToken(format!("{what}: {e}")))?;

    match serde_json::from_slice(&buf) {
        Ok(Value::Object(m)) => Ok(m),
        Ok(_) => Err(Error::MalformedToken(format!(
            "{what}: expecting JSON object"
        ))),
        Err(e) => Err(Error::MalformedToken(format!("{what}: {e}"))),
    }
}
