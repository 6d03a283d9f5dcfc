//! Detached signature protocol (§4.8): sign an already-persisted container
//! with RSA-PSS, round-trip an RFC 3161 timestamp, and emit the signed
//! container plus the two blobs it references.

use provtool_core::hash::Sha256Digest;
use provtool_core::ProvtoolError;
use rsa::{RsaPrivateKey, RsaPublicKey};
use serde_json::{json, Value};

use crate::pss::{sign_pss_sha256, verify_pss_sha256};
use crate::timestamp::TimestampAuthority;

pub struct SignedOutput {
    /// The re-canonicalized container with `signature` attached.
    pub signed_container_bytes: Vec<u8>,
    /// `SHA256(signed_container_bytes)` — a *new* container id, distinct
    /// from the entity id the container still carries (signing never
    /// rewrites the entity key).
    pub new_cid: String,
    pub signature_bytes: Vec<u8>,
    pub timestamp_reply: Vec<u8>,
}

/// Sign `raw_bytes` (the bytes of a persisted, unsigned container) as
/// `family_name given_name`, using `authority` for the timestamp
/// round-trip.
pub fn sign_container(
    raw_bytes: &[u8],
    private_key: &RsaPrivateKey,
    family_name: &str,
    given_name: &str,
    authority: &dyn TimestampAuthority,
) -> Result<SignedOutput, ProvtoolError> {
    let mut document: Value = serde_json::from_slice(raw_bytes)?;

    let signature_bytes = sign_pss_sha256(private_key, raw_bytes)?;
    let signature_hash = Sha256Digest::of(&signature_bytes).to_hex();

    let ts_digest = crate::timestamp::sha256_digest(raw_bytes);
    let timestamp_reply = authority.query(&ts_digest)?;
    let timestamp_hash = Sha256Digest::of(&timestamp_reply).to_hex();

    let signature_field = json!({
        "person:familyName": family_name,
        "person:givenName": given_name,
        "provtool:signature": signature_hash,
        "provtool:timestampsignature": timestamp_hash,
    });
    document
        .as_object_mut()
        .ok_or_else(|| ProvtoolError::SignerError("container is not a JSON object".into()))?
        .insert("signature".into(), signature_field);

    let signed_container_bytes = provtool_canon::canonicalize(&document)?;
    let new_cid = Sha256Digest::of(&signed_container_bytes).to_hex();

    Ok(SignedOutput {
        signed_container_bytes,
        new_cid,
        signature_bytes,
        timestamp_reply,
    })
}

/// Verify a signed container against the signer's public key: recompute
/// the sign-hash (§4.8 "Sign-hash rule": strip `signature`, re-canonicalize)
/// and check the stored PSS signature against it.
///
/// `original_raw_bytes` is the pre-signature container bytes the signature
/// was computed over (the caller is expected to have them, or to have
/// verified `sign_hash(signed) == SHA256(canonical(original))` separately).
pub fn verify_signed_container(
    public_key: &RsaPublicKey,
    original_raw_bytes: &[u8],
    signature_bytes: &[u8],
) -> Result<(), ProvtoolError> {
    verify_pss_sha256(public_key, original_raw_bytes, signature_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timestamp::TimestampAuthority;
    use provtool_codec::sign_hash_bytes;

    struct MockAuthority;
    impl TimestampAuthority for MockAuthority {
        fn query(&self, _digest: &[u8; 32]) -> Result<Vec<u8>, ProvtoolError> {
            Ok(b"timestampreply".to_vec())
        }
    }

    fn test_key() -> RsaPrivateKey {
        let mut rng = rand::thread_rng();
        RsaPrivateKey::new(&mut rng, 2048).unwrap()
    }

    #[test]
    fn signing_stores_expected_timestamp_hash_and_verifies() {
        let raw = serde_json::to_vec(&json!({"entity": {"abc": {}}, "activity": {}, "agent": {}, "prefix": {}}))
            .unwrap();
        let key = test_key();
        let pubkey = RsaPublicKey::from(&key);

        let out = sign_container(&raw, &key, "Lovelace", "Ada", &MockAuthority).unwrap();

        let expected_ts_hash = Sha256Digest::of(b"timestampreply").to_hex();
        let signed_doc: Value = serde_json::from_slice(&out.signed_container_bytes).unwrap();
        assert_eq!(
            signed_doc["signature"]["provtool:timestampsignature"].as_str().unwrap(),
            expected_ts_hash
        );

        verify_signed_container(&pubkey, &raw, &out.signature_bytes).unwrap();
    }

    #[test]
    fn sign_hash_matches_regardless_of_signature_presence() {
        let raw = serde_json::to_vec(&json!({"entity": {"abc": {}}, "activity": {}, "agent": {}, "prefix": {}}))
            .unwrap();
        let key = test_key();
        let out = sign_container(&raw, &key, "Lovelace", "Ada", &MockAuthority).unwrap();

        let raw_value: Value = serde_json::from_slice(&raw).unwrap();
        let signed_value: Value = serde_json::from_slice(&out.signed_container_bytes).unwrap();

        assert_eq!(
            sign_hash_bytes(&raw_value).unwrap(),
            sign_hash_bytes(&signed_value).unwrap()
        );
    }
}
