/// Fairbrix SDK - Client-side send engine.
///
/// Turns "pay this amount to this address from this secret" into a signed
/// legacy transaction and hands it to a node:
/// - key decoding bound to the configured network
/// - first-fit selection of a single funding output
/// - platform fee and change arithmetic in integer satoshis
/// - one-input P2PKH transaction assembly and signing
/// - broadcast, or delegation to the node's own wallet
///
/// Node access goes through the `fbx-rpc` traits, so the flow runs the same
/// against a live node or an in-memory double.

mod error;
pub use error::{ErrorKind, SendError};

pub mod amount;
pub mod config;
pub mod key_material;
pub mod fee;
pub mod coin_selection;
pub mod builder;
pub mod signer;
pub mod flow;

pub use builder::{FundingInput, OutputRole, PlannedOutput, UnsignedTransaction};
pub use config::{FeePercent, SendConfig, SendMode};
pub use fee::{FeeBreakdown, FeeQuote};
pub use flow::{send, FlowOutcome, FlowState, SendFlow, SendReceipt, SendRequest};
pub use key_material::KeyMaterial;
pub use signer::SignedTransaction;
