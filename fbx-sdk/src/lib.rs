#![deny(missing_docs)]

//! Fairbrix SDK - Complete SDK.
//!
//! Re-exports all Fairbrix SDK components for convenient single-crate usage.

pub use fbx_primitives as primitives;
pub use fbx_script as script;
pub use fbx_transaction as transaction;
pub use fbx_rpc as rpc;
pub use fbx_send as send;
