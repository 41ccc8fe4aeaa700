//! Durable storage contracts and adapters.

pub mod accounts;
