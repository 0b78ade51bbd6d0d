//! # leasecheck common
//!
//! Shared vocabulary of the verification engine: the expectation model,
//! observed network state, scenario results, the error taxonomy and the
//! capability traits the engine drives the operating system through.
//!
//! Nothing in here performs IO. Concrete capabilities live in
//! `leasecheck-core`, so everything declared here can be exercised against
//! fakes.

pub mod config;
pub mod error;
pub mod expectation;
pub mod network;
pub mod report;
pub mod system;
pub mod utils;
