//! `tether-protocol` — outbound request envelopes emitted by the client.
//!
//! Wire framing belongs to the transport; this crate only fixes the shape
//! of what the scheduler hands to it.

pub mod request;

pub use request::{Command, Request};
