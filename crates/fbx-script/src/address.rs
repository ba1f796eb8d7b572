/// Base58Check address handling.
///
/// An address is a one-byte network version followed by a 20-byte hash.
/// Which version bytes are acceptable is decided by `NetworkParams`, never
/// by hard-coded constants, so the same code serves any Bitcoin-family
/// ledger.

use std::fmt;

use fbx_primitives::base58;
use fbx_primitives::ec::PublicKey;
use fbx_primitives::PrimitivesError;

use crate::network::NetworkParams;
use crate::script::Script;
use crate::ScriptError;

/// What the 20-byte hash of an address commits to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddressKind {
    /// Hash160 of a public key.
    PubKeyHash,
    /// Hash160 of a redeem script.
    ScriptHash,
}

/// A legacy Base58Check address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Address {
    /// The Base58Check address string.
    pub address_string: String,
    /// The 20-byte hash the address commits to.
    pub hash: [u8; 20],
    /// Whether `hash` is a key hash or a script hash.
    pub kind: AddressKind,
}

impl Address {
    /// Parse a Base58Check-encoded address string for the given network.
    ///
    /// # Arguments
    /// * `addr` - The Base58Check address string.
    /// * `params` - The network whose version bytes are acceptable.
    ///
    /// # Returns
    /// An `Address`, or an error if the string is malformed, has the wrong
    /// length, or carries a version byte from another network.
    pub fn from_string(addr: &str, params: &NetworkParams) -> Result<Self, ScriptError> {
        let addr = addr.trim();
        let (version, body) = base58::check_decode_versioned(addr).map_err(|e| {
            ScriptError::InvalidAddress {
                address: addr.to_string(),
                reason: match e {
                    PrimitivesError::ChecksumMismatch => "checksum mismatch".to_string(),
                    other => other.to_string(),
                },
            }
        })?;

        let hash: [u8; 20] = body
            .as_slice()
            .try_into()
            .map_err(|_| ScriptError::InvalidAddressLength(addr.to_string()))?;

        let kind = if version == params.pub_key_hash {
            AddressKind::PubKeyHash
        } else if version == params.script_hash {
            AddressKind::ScriptHash
        } else {
            return Err(ScriptError::WrongNetwork {
                address: addr.to_string(),
                version,
            });
        };

        Ok(Address {
            address_string: addr.to_string(),
            hash,
            kind,
        })
    }

    /// Create a pay-to-key-hash address from a 20-byte key hash.
    pub fn from_public_key_hash(hash: &[u8; 20], params: &NetworkParams) -> Self {
        Self::encode(hash, AddressKind::PubKeyHash, params.pub_key_hash)
    }

    /// Create the pay-to-key-hash address of a public key.
    ///
    /// # Arguments
    /// * `compressed` - Which SEC1 encoding to hash; must match the
    ///   encoding later pushed in the unlocking script.
    pub fn from_public_key(pub_key: &PublicKey, compressed: bool, params: &NetworkParams) -> Self {
        Self::from_public_key_hash(&pub_key.hash160(compressed), params)
    }

    fn encode(hash: &[u8; 20], kind: AddressKind, version: u8) -> Self {
        let mut payload = Vec::with_capacity(21);
        payload.push(version);
        payload.extend_from_slice(hash);
        Address {
            address_string: base58::check_encode(&payload),
            hash: *hash,
            kind,
        }
    }

    /// The locking script that pays this address.
    pub fn locking_script(&self) -> Script {
        match self.kind {
            AddressKind::PubKeyHash => Script::p2pkh_lock(&self.hash),
            AddressKind::ScriptHash => Script::p2sh_lock(&self.hash),
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.address_string)
    }
}
