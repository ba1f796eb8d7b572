//! ECDSA signature with strict DER serialization and RFC6979 nonces.
//!
//! Every signature this crate produces is low-S, so it passes the
//! standardness rules nodes apply before relaying a transaction.

use k256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use k256::ecdsa;

use crate::ec::private_key::PrivateKey;
use crate::ec::public_key::PublicKey;
use crate::PrimitivesError;

/// Required digest length for signing and verification.
const DIGEST_LEN: usize = 32;

/// An ECDSA signature with R and S components.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    r: [u8; 32],
    s: [u8; 32],
}

impl Signature {
    /// Create a signature from raw R and S 32-byte big-endian arrays.
    pub fn new(r: [u8; 32], s: [u8; 32]) -> Self {
        Signature { r, s }
    }

    /// The R component.
    pub fn r(&self) -> &[u8; 32] {
        &self.r
    }

    /// The S component.
    pub fn s(&self) -> &[u8; 32] {
        &self.s
    }

    /// Parse a strict DER-encoded ECDSA signature.
    ///
    /// Expected format: `0x30 <len> 0x02 <r_len> <r> 0x02 <s_len> <s>`.
    /// The sighash type byte that follows a signature inside a script must
    /// already be stripped.
    pub fn from_der(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        let sig = ecdsa::Signature::from_der(bytes)
            .map_err(|e| PrimitivesError::InvalidSignature(format!("malformed DER: {}", e)))?;
        Ok(Self::from_k256(&sig))
    }

    /// Serialize the signature in DER format, normalizing S to the lower
    /// half of the curve order.
    pub fn to_der(&self) -> Result<Vec<u8>, PrimitivesError> {
        let sig = self.to_k256()?;
        let sig = sig.normalize_s().unwrap_or(sig);
        Ok(sig.to_der().as_bytes().to_vec())
    }

    /// Sign a 32-byte digest with the given private key.
    ///
    /// # Arguments
    /// * `hash` - The digest to sign; the caller has already hashed the message.
    /// * `priv_key` - The signing key.
    ///
    /// # Returns
    /// A deterministic low-S signature, or an error for a digest of the wrong length.
    pub fn sign(hash: &[u8], priv_key: &PrivateKey) -> Result<Self, PrimitivesError> {
        if hash.len() != DIGEST_LEN {
            return Err(PrimitivesError::InvalidSignature(format!(
                "digest must be {} bytes, got {}",
                DIGEST_LEN,
                hash.len()
            )));
        }
        let sig: ecdsa::Signature = priv_key
            .signing_key()
            .sign_prehash(hash)
            .map_err(|e| PrimitivesError::InvalidSignature(e.to_string()))?;
        let sig = sig.normalize_s().unwrap_or(sig);
        Ok(Self::from_k256(&sig))
    }

    /// Verify this signature against a 32-byte digest and a public key.
    ///
    /// High-S signatures are rejected.
    pub fn verify(&self, hash: &[u8], pub_key: &PublicKey) -> bool {
        if hash.len() != DIGEST_LEN {
            return false;
        }
        match self.to_k256() {
            Ok(sig) => pub_key.verifying_key().verify_prehash(hash, &sig).is_ok(),
            Err(_) => false,
        }
    }

    fn from_k256(sig: &ecdsa::Signature) -> Self {
        let (r, s) = sig.split_bytes();
        Signature {
            r: r.into(),
            s: s.into(),
        }
    }

    fn to_k256(&self) -> Result<ecdsa::Signature, PrimitivesError> {
        ecdsa::Signature::from_scalars(self.r, self.s)
            .map_err(|e| PrimitivesError::InvalidSignature(e.to_string()))
    }
}
