//! The version/master state machine: append-only ledgers of immutable resume
//! snapshots, with exactly one live (master) version per ledger at any time.
//!
//! Both the main resume ledger and the locked-profile ledgers run through the
//! same store; they differ only in which versions table they live in.

pub mod archive;
pub mod handlers;
pub mod store;

#[cfg(test)]
mod scenarios;
