//! RFC 3161 timestamp-authority round-trip (§4.8 step 4).
//!
//! The signer only ever needs to (a) build a `TimeStampReq` over a message
//! digest and (b) treat whatever bytes the authority sends back as an
//! opaque blob to be hashed — it never parses the `TimeStampResp`. The DER
//! encoding below covers exactly the fields RFC 3161 §2.4.1 requires for a
//! minimal request (version, messageImprint, nonce); no external ASN.1
//! crate is pulled in for a handful of fixed-shape TLVs.

use provtool_core::ProvtoolError;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// id-sha256, 2.16.840.1.101.3.4.2.1
const OID_SHA256: &[u8] = &[0x06, 0x09, 0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02, 0x01];

fn der_len(len: usize) -> Vec<u8> {
    if len < 0x80 {
        vec![len as u8]
    } else {
        let bytes = len.to_be_bytes();
        let significant: Vec<u8> = bytes.iter().copied().skip_while(|&b| b == 0).collect();
        let mut out = vec![0x80 | significant.len() as u8];
        out.extend(significant);
        out
    }
}

fn der_tlv(tag: u8, content: &[u8]) -> Vec<u8> {
    let mut out = vec![tag];
    out.extend(der_len(content.len()));
    out.extend_from_slice(content);
    out
}

fn der_sequence(parts: &[&[u8]]) -> Vec<u8> {
    let content: Vec<u8> = parts.concat();
    der_tlv(0x30, &content)
}

fn der_integer_u8(value: u8) -> Vec<u8> {
    der_tlv(0x02, &[value])
}

fn der_null() -> Vec<u8> {
    vec![0x05, 0x00]
}

fn der_octet_string(bytes: &[u8]) -> Vec<u8> {
    der_tlv(0x04, bytes)
}

fn der_boolean(value: bool) -> Vec<u8> {
    der_tlv(0x01, &[if value { 0xff } else { 0x00 }])
}

/// Build a minimal `TimeStampReq` DER encoding:
/// ```text
/// TimeStampReq ::= SEQUENCE {
///   version       INTEGER { v1(1) },
///   messageImprint MessageImprint,
///   nonce         INTEGER OPTIONAL,
///   certReq       BOOLEAN DEFAULT FALSE }
/// MessageImprint ::= SEQUENCE { hashAlgorithm AlgorithmIdentifier, hashedMessage OCTET STRING }
/// ```
pub fn build_timestamp_query(message_digest: &[u8; 32], nonce: u64) -> Vec<u8> {
    let algorithm_identifier = der_sequence(&[OID_SHA256, &der_null()]);
    let message_imprint = der_sequence(&[&algorithm_identifier, &der_octet_string(message_digest)]);
    let version = der_integer_u8(1);
    let nonce_bytes = nonce.to_be_bytes();
    let nonce_der = der_tlv(0x02, &nonce_bytes);
    let cert_req = der_boolean(true);

    der_sequence(&[&version, &message_imprint, &nonce_der, &cert_req])
}

/// Capability a signer depends on: round-trip a message digest to a
/// timestamp authority and get back the raw reply bytes. Split out as a
/// trait so signing can be tested without a live network endpoint.
pub trait TimestampAuthority {
    fn query(&self, message_digest: &[u8; 32]) -> Result<Vec<u8>, ProvtoolError>;
}

/// The real, HTTP-backed authority (§5: synchronous, single blocking POST,
/// default client timeout; failures surface as `SignerError`).
pub struct HttpTimestampAuthority {
    url: String,
    client: reqwest::blocking::Client,
}

impl HttpTimestampAuthority {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::blocking::Client::new(),
        }
    }
}

impl TimestampAuthority for HttpTimestampAuthority {
    fn query(&self, message_digest: &[u8; 32]) -> Result<Vec<u8>, ProvtoolError> {
        let mut nonce_bytes = [0u8; 8];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);
        let nonce = u64::from_be_bytes(nonce_bytes);
        let query = build_timestamp_query(message_digest, nonce);

        let response = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/timestamp-query")
            .body(query)
            .send()
            .map_err(|e| ProvtoolError::SignerError(format!("timestamp authority unreachable: {e}")))?;

        if !response.status().is_success() {
            return Err(ProvtoolError::SignerError(format!(
                "timestamp authority returned status {}",
                response.status()
            )));
        }

        response
            .bytes()
            .map(|b| b.to_vec())
            .map_err(|e| ProvtoolError::SignerError(format!("reading timestamp reply: {e}")))
    }
}

pub fn sha256_digest(bytes: &[u8]) -> [u8; 32] {
    let out = Sha256::digest(bytes);
    let mut arr = [0u8; 32];
    arr.copy_from_slice(&out);
    arr
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockAuthority {
        reply: Vec<u8>,
    }

    impl TimestampAuthority for MockAuthority {
        fn query(&self, _message_digest: &[u8; 32]) -> Result<Vec<u8>, ProvtoolError> {
            Ok(self.reply.clone())
        }
    }

    #[test]
    fn query_encodes_a_well_formed_der_sequence() {
        let digest = sha256_digest(b"hello");
        let query = build_timestamp_query(&digest, 42);
        assert_eq!(query[0], 0x30); // outer SEQUENCE tag
        assert!(query.len() > 40);
    }

    #[test]
    fn mock_authority_round_trips_reply() {
        let authority = MockAuthority {
            reply: b"timestampreply".to_vec(),
        };
        let digest = sha256_digest(b"anything");
        let reply = authority.query(&digest).unwrap();
        assert_eq!(reply, b"timestampreply");
    }
}
