/// Fairbrix SDK - Cryptographic primitives, hashing, and wire utilities.
///
/// This crate provides the foundational building blocks for the Fairbrix SDK:
/// - Hash functions (SHA-256, SHA-256d, RIPEMD-160, Hash160)
/// - Chain hash type for transaction identification
/// - Elliptic curve cryptography (secp256k1 keys, DER signatures, WIF)
/// - Variable-length integer encoding and wire reader/writer
/// - Base58 and Base58Check encoding/decoding
/// - Exact decimal coin amounts

pub mod hash;
pub mod chainhash;
pub mod util;
pub mod base58;
pub mod ec;
pub mod amount;

mod error;
pub use error::PrimitivesError;
