//! # leasecheck core
//!
//! The verification engine. A [`runner::CatalogRunner`] walks an ordered
//! [`catalog::Catalog`] and hands each scenario to the [`verifier::Verifier`],
//! which forces a fresh lease through the [`driver::ConvergenceDriver`], polls
//! the [`observer::StateObserver`] until the interface has converged and
//! compares what it sees with the scenario's expectation model.
//!
//! The engine reaches the host only through the capability traits of
//! `leasecheck_common::system`; [`system`] provides the implementations
//! backed by `ip`, `dhclient`, procfs and the OS resolver.

pub mod catalog;
pub mod driver;
pub mod observer;
pub mod runner;
pub mod system;
pub mod verifier;
