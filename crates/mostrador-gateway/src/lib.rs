//! # mostrador-gateway: Remote Data Gateway
//!
//! The boundary between Mostrador and the hosted Postgres-compatible data
//! service (PostgREST-style row API).
//!
//! ## Architecture Position
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                      mostrador-store                             │
//! │          load_* / checkout / sync_pending_sales                  │
//! └────────────────────────────┬─────────────────────────────────────┘
//!                              │ canonical records only
//! ┌────────────────────────────▼─────────────────────────────────────┐
//! │               ★ mostrador-gateway (THIS CRATE) ★                 │
//! │                                                                  │
//! │  catalog │ inventory │ sales │ transfers │ expenses              │
//! │  ─────────────────────────────────────────────────               │
//! │                      wire.rs (row mapping)                       │
//! │                      client.rs (HTTP core)                       │
//! └────────────────────────────┬─────────────────────────────────────┘
//!                              │ snake_case rows, /rest/v1/<table>
//!                              ▼
//!                     hosted data service
//! ```
//!
//! ## Boundary Rules
//! 1. The wire row vocabulary (`*_cents`, `*_milli` columns) lives only in
//!    [`wire`]; callers see canonical records.
//! 2. Timestamps on inserts are stamped gateway-side, never trusted from
//!    the caller.
//! 3. The sale insert is idempotent on `client_token`, which is what makes
//!    offline replay safe to interrupt and retry.

// =============================================================================
// Module Declarations
// =============================================================================

mod catalog;
mod client;
mod config;
mod error;
mod expenses;
mod inventory;
mod sales;
mod transfers;
mod wire;

// =============================================================================
// Re-exports
// =============================================================================

pub use client::Gateway;
pub use config::GatewayConfig;
pub use error::{GatewayError, GatewayResult};
