/// Fairbrix SDK - Transaction building, signing, and serialization.
///
/// Provides the legacy (pre-segwit) transaction type with inputs, outputs,
/// signature hash computation, a P2PKH signing template, and binary/hex
/// serialization.

pub mod transaction;
pub mod input;
pub mod output;
pub mod sighash;
pub mod template;

mod error;
pub use error::TransactionError;
pub use transaction::Transaction;
pub use input::TransactionInput;
pub use output::TransactionOutput;
