//! Locked profiles: named, independently versioned forks of the master
//! resume. Content is copied by value at fork and refresh time; edits to the
//! master never reach a locked ledger on their own.

pub mod handlers;
pub mod manager;
