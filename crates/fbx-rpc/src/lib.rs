#![deny(missing_docs)]

//! # fbx-rpc
//!
//! JSON-RPC 1.0 client for a Fairbrix node (or the HTTPS proxy in front of
//! one). Covers the calls a light client needs to spend from a single key:
//! UTXO lookup, parent transaction fetch, address validation, broadcast,
//! and the node-wallet `sendtoaddress` shortcut.
//!
//! Each capability is also exposed as a small async trait so the send
//! engine can be driven by an in-memory double in tests.
//!
//! # Example
//!
//! ```no_run
//! use fbx_rpc::{RpcClient, RpcConfig};
//!
//! let client = RpcClient::new(RpcConfig {
//!     url: "http://127.0.0.1:8645".to_string(),
//!     user: Some("rpcuser".to_string()),
//!     password: Some("rpcpass".to_string()),
//!     ..Default::default()
//! })
//! .unwrap();
//! ```

pub mod client;
pub mod error;
pub mod types;


pub use client::{AddressValidator, Broadcaster, NodeWallet, RpcClient, UtxoSource};
pub use error::RpcError;
pub use types::{AddressValidation, RpcConfig, UnspentEntry, Utxo, DEFAULT_RPC_URL};
