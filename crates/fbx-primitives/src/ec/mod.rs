/// Elliptic curve cryptography on secp256k1.
///
/// Provides private keys with WIF decoding, public keys in compressed and
/// uncompressed SEC1 form, and DER-encoded ECDSA signatures.

pub mod private_key;
pub mod public_key;
pub mod signature;

pub use private_key::{PrivateKey, WifKey};
pub use public_key::PublicKey;
pub use signature::Signature;
