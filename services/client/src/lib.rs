//! services/client/src/lib.rs
//!
//! Library surface of the Brochura client: configuration, the persisted
//! session store, one HTTP adapter per product backend, and the generation
//! orchestration built on the `brochura_core` ports.

pub mod adapters;
pub mod config;
pub mod error;
pub mod flow;
pub mod session;
