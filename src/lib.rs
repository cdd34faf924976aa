//! Blockchain Demo - a teaching blockchain held entirely in memory
//!
//! # Architecture
//!
//! ## Core Ledger
//! - [`blockchain`] - Blocks, the ledger, and hash-link verification
//! - [`transaction`] - Transaction type
//!
//! ## Hashing
//! - [`crypto`] - SHA-256 helpers and the standalone text hashing utility
//! - [`canonical`] - Deterministic JSON encoding hashed for every block
//!
//! ## Mining
//! - [`miner`] - Random-proof "mining" of pending transactions
//!
//! ## Front Ends
//! - [`session`] - One independent ledger per user session
//! - `api` - REST API (feature `api`)
//! - [`cli`] - Shell command parsing and table rendering
//!
//! ## Configuration & Utilities
//! - [`config`] - Configuration management
//! - [`error`] - Error types

#![forbid(unsafe_code)]

// ============================================================================
// Core Ledger
// ============================================================================
pub mod blockchain;
pub mod transaction;

// ============================================================================
// Hashing
// ============================================================================
pub mod canonical;
pub mod crypto;

// ============================================================================
// Mining
// ============================================================================
pub mod miner;

// ============================================================================
// Front Ends
// ============================================================================
#[cfg(feature = "api")]
pub mod api;
pub mod cli;
pub mod session;

// ============================================================================
// Configuration & Utilities
// ============================================================================
pub mod config;
pub mod error;
