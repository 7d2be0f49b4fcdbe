//! Clipsight HTTP service and logging setup.
//!
//! The binary wires these into the `clipsight` CLI; integration tests build
//! the router directly over a model-free embedding provider.

pub mod logging;
pub mod server;
