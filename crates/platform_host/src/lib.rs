//! Typed host-domain contracts used by the desktop runtime.
//!
//! This crate is the boundary for collaborators the runtime does not own: durable account
//! storage keyed by username, the viewport/layout provider, and time helpers. Concrete stores are
//! swapped in by the host binary; the in-memory adapters here back tests and headless sessions.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod storage;
pub mod time;
pub mod viewport;

pub use storage::accounts::{
    account_storage_key, AccountRecord, AccountStore, AccountStoreFuture, MemoryAccountStore,
    NoopAccountStore, ACCOUNT_KEY_PREFIX,
};
pub use time::{next_monotonic_timestamp_ms, unix_time_ms_now};
pub use viewport::{FixedViewport, Viewport, ViewportProvider};
