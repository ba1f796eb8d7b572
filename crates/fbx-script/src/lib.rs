/// Fairbrix SDK - Script building, addresses and network parameters.
///
/// Provides the `Script` type, opcode definitions, script chunk parsing,
/// Base58Check address handling, and the `NetworkParams` record that binds
/// version bytes to a ledger.

pub mod script;
pub mod opcodes;
pub mod chunk;
pub mod address;
pub mod network;

mod error;
pub use error::ScriptError;
pub use script::Script;
pub use address::{Address, AddressKind};
pub use chunk::ScriptChunk;
pub use network::NetworkParams;
