//! # mostrador-store: Application State Store
//!
//! The single logical writer of Mostrador's application state, composing
//! the pure core, the local cache and the remote gateway into the
//! offline-first behavior the register depends on.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  ★ mostrador-store (THIS CRATE) ★                       │
//! │                                                                         │
//! │   ┌──────────┐  ┌───────────┐  ┌──────────┐  ┌─────────────────────┐  │
//! │   │  state   │  │ checkout  │  │   sync   │  │      network        │  │
//! │   │ load_*   │  │ FEFO plan │  │ replay   │  │ Connectivity watch  │  │
//! │   │ mirrors  │  │ + queue   │  │ queue    │  │ + monitor task      │  │
//! │   └────┬─────┘  └─────┬─────┘  └────┬─────┘  └──────────┬──────────┘  │
//! │        │              │             │                    │             │
//! └────────┼──────────────┼─────────────┼────────────────────┼─────────────┘
//!          ▼              ▼             ▼                    ▼
//!   mostrador-core  mostrador-cache  mostrador-gateway  (RemoteBackend)
//! ```
//!
//! ## Offline-First Contract
//! - Reads: remote-first, mirrored to the cache; connectivity failures
//!   fall back to the mirror, never to an error.
//! - Checkout: always succeeds locally when stock allows; the sale lands
//!   on the server immediately (online) or waits in a durable queue
//!   (offline).
//! - Replay: idempotent on the sale's client token; interrupt it anywhere
//!   and re-run safely.

// =============================================================================
// Module Declarations
// =============================================================================

mod cart;
mod catalog;
mod checkout;
mod error;
mod ledger;
mod logging;
mod network;
mod source;
mod state;
mod sync;
mod transfers;

// =============================================================================
// Re-exports
// =============================================================================

pub use checkout::CheckoutTender;
pub use error::{StoreError, StoreResult};
pub use logging::init_logging;
pub use network::{Connectivity, NetworkMonitor};
pub use source::{unreachable_error, RemoteBackend};
pub use state::{AppState, AppStore, Session};
pub use sync::SyncReport;
pub use transfers::{ReceivedLot, TransferRequestLine};
