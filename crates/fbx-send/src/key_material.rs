//! Decoded signing key and the address it controls.

use std::fmt;

use fbx_primitives::ec::{PrivateKey, PublicKey};
use fbx_script::{Address, NetworkParams};
use fbx_transaction::template::p2pkh;

use crate::SendError;

/// A private key together with the public key encoding and address it was
/// exported for.
#[derive(Clone)]
pub struct KeyMaterial {
    private_key: PrivateKey,
    public_key: PublicKey,
    compressed: bool,
    address: Address,
}

impl KeyMaterial {
    /// Decode a WIF secret for `network`.
    ///
    /// # Returns
    /// The key material, or `InvalidSecret` for malformed Base58, a bad
    /// checksum, a bad length or compression flag, an invalid scalar, or a
    /// version byte from another network.
    pub fn decode(secret: &str, network: &NetworkParams) -> Result<Self, SendError> {
        let decoded = PrivateKey::from_wif(secret, network.wif).map_err(|e| {
            SendError::InvalidSecret {
                reason: e.to_string(),
                source: Some(e),
            }
        })?;
        let public_key = decoded.key.pub_key();
        let address = Address::from_public_key(&public_key, decoded.compressed, network);
        Ok(KeyMaterial {
            private_key: decoded.key,
            public_key,
            compressed: decoded.compressed,
            address,
        })
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Whether the compressed public key encoding is hashed and pushed.
    pub fn compressed(&self) -> bool {
        self.compressed
    }

    /// The pay-to-key-hash address of this key; also the change address.
    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn public_key_hash(&self) -> [u8; 20] {
        self.address.hash
    }

    /// A SIGHASH_ALL P2PKH unlocker for this key.
    pub fn unlocker(&self) -> p2pkh::P2PKH {
        p2pkh::unlock(self.private_key.clone(), self.compressed, None)
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("address", &self.address.address_string)
            .field("compressed", &self.compressed)
            .finish_non_exhaustive()
    }
}
