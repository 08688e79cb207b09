//! # Leadflow
//!
//! HTTP API, CLI and configuration for the Leadflow lead tracking server.
//! The lifecycle rules live in `leadflow-core`; this crate wires them to
//! the outside world.

pub mod api;
pub mod cli;
pub mod config;
