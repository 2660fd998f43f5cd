//! Unauthenticated read path: permanent public links into the version store.
//! Numbered links resolve to the same content forever; un-numbered links
//! float to whatever is currently master.

pub mod handlers;
pub mod resolver;
