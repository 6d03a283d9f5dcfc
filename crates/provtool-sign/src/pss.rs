//! RSA-PSS (MGF1-SHA256, maximum salt length) signing and verification
//! (§4.8). Salt length is computed to the RFC 3447 maximum for the key
//! size rather than left at the library default (which defaults to the
//! digest length) — the spec is explicit that signatures use the maximum.

use rsa::pss::Pss;
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256};

use provtool_core::ProvtoolError;

/// `emLen - hLen - 2`, the maximum PSS salt length for a given modulus size
/// (RFC 3447 §9.1.1) with a SHA-256 digest (`hLen = 32`).
fn max_salt_len(modulus_len_bytes: usize) -> usize {
    modulus_len_bytes.saturating_sub(2 + 32)
}

/// Sign `message`'s SHA-256 digest with RSA-PSS/MGF1-SHA256 at maximum salt
/// length. Returns the raw signature bytes.
pub fn sign_pss_sha256(private_key: &RsaPrivateKey, message: &[u8]) -> Result<Vec<u8>, ProvtoolError> {
    let digest = Sha256::digest(message);
    let salt_len = max_salt_len(private_key.size());
    let padding = Pss::new_with_salt::<Sha256>(salt_len);
    let mut rng = rand::thread_rng();
    private_key
        .sign_with_rng(&mut rng, padding, &digest)
        .map_err(|e| ProvtoolError::SignerError(format!("PSS signing failed: {e}")))
}

/// Verify a PSS signature produced by [`sign_pss_sha256`] against
/// `message`'s SHA-256 digest.
pub fn verify_pss_sha256(
    public_key: &RsaPublicKey,
    message: &[u8],
    signature: &[u8],
) -> Result<(), ProvtoolError> {
    let digest = Sha256::digest(message);
    let salt_len = max_salt_len(public_key.size());
    let padding = Pss::new_with_salt::<Sha256>(salt_len);
    public_key
        .verify(padding, &digest, signature)
        .map_err(|_| ProvtoolError::SignerError("PSS verification failed".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> RsaPrivateKey {
        let mut rng = rand::thread_rng();
        RsaPrivateKey::new(&mut rng, 2048).unwrap()
    }

    #[test]
    fn signature_verifies_against_original_message() {
        let key = test_key();
        let pubkey = RsaPublicKey::from(&key);
        let sig = sign_pss_sha256(&key, b"hello provenance").unwrap();
        verify_pss_sha256(&pubkey, b"hello provenance", &sig).unwrap();
    }

    #[test]
    fn signature_rejects_tampered_message() {
        let key = test_key();
        let pubkey = RsaPublicKey::from(&key);
        let sig = sign_pss_sha256(&key, b"hello provenance").unwrap();
        assert!(verify_pss_sha256(&pubkey, b"goodbye provenance", &sig).is_err());
    }
}
