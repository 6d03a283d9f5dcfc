//! Loading the signer's RSA private key from a PEM file on disk (the
//! `--private` flag of the `sign` CLI surface, §6.3).

use std::path::Path;

use provtool_core::ProvtoolError;
use rsa::pkcs8::DecodePrivateKey;
use rsa::RsaPrivateKey;
use zeroize::Zeroizing;

pub fn load_private_key_pem(path: &Path) -> Result<RsaPrivateKey, ProvtoolError> {
    let pem = Zeroizing::new(std::fs::read_to_string(path)?);
    RsaPrivateKey::from_pkcs8_pem(&pem)
        .map_err(|e| ProvtoolError::SignerError(format!("reading private key {}: {e}", path.display())))
}
