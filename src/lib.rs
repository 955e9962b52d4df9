//! coinbot: indicator-driven crypto trading bot core.
//!
//! Hexagonal architecture: domain logic in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`], the command surface in [`cli`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
