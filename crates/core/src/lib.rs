//! Domain logic shared by the persistence, insights, and HTTP crates.
//!
//! Nothing in this crate performs I/O: the reactivation decisions and the
//! summary builders operate on plain values so they can be tested without a
//! database or a network.

pub mod analysis;
pub mod error;
pub mod projects;
pub mod types;
