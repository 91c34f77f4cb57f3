#![deny(missing_docs)]

//! Avalanche transaction SDK.
//!
//! Re-exports the primitives, the shared transaction codec and the three
//! chain crates for single-crate usage.

pub use avax_primitives as primitives;
pub use avax_transaction as transaction;
pub use avax_avm as avm;
pub use avax_platformvm as platformvm;
pub use avax_evm as evm;
