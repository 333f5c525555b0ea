//! # mostrador-cache: Local Durable Cache
//!
//! Browser-grade local persistence, done the Rust way: a SQLite database
//! holding named key-value partitions. The cache plays two roles:
//!
//! 1. **Offline mirror** — every successful remote load is mirrored here
//!    so the application keeps working without a network.
//! 2. **Durable queue** — sales completed offline wait here until the
//!    network monitor replays them to the gateway.
//!
//! ## Failure Semantics
//! A failed read or write rejects with a typed [`CacheError`]; callers
//! fall back to treating the partition as empty. There is no corruption
//! recovery and no quota handling beyond what SQLite provides.
//!
//! ## Module Organization
//! - [`pool`] - Connection pool, schema versioning and migration
//! - [`kv`] - Partitions, key validation, generic JSON storage
//! - [`queue`] - Pending-sale queue and cart save/restore
//! - [`error`] - Cache error types

pub mod error;
pub mod kv;
pub mod pool;
pub mod queue;

pub use error::{CacheError, CacheResult};
pub use kv::Partition;
pub use pool::{CacheConfig, LocalCache};
