//! Usage: OAuth callback coordination for the Hosted UI login page.
//!
//! Detection and URL cleanup are strictly synchronous; the exchange and the
//! directory sync are the only asynchronous suspension points.

pub(crate) mod callback;
pub(crate) mod complete;
pub(crate) mod error_map;
pub(crate) mod login;
pub(crate) mod page;
