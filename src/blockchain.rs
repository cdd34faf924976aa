// Thin re-export module: the ledger lives in `blockchain/core.rs`, split into
// chain management and link validation.

pub mod core;
pub use core::*;
