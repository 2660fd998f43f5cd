//! View analytics. The write path is append-only and fire-and-forget: a
//! public resolution never waits on, or fails because of, its view record.
//! The read side is a handful of owner-facing aggregations.

pub mod events;
pub mod handlers;
pub mod reports;
