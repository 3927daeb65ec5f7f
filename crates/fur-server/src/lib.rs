//! HTTP boundary of the fur package registry.
//!
//! The `fur` binary wires configuration and logging around [`routes::build`];
//! the library half exists so the router can be driven directly in tests.

pub mod error;
pub mod routes;
pub mod state;
