//! Cinestream - media delivery server
//!
//! This library crate exposes the server for integration testing. The player
//! engine lives in the `cinestream-player` crate.

pub mod config;
pub mod server;
pub mod streaming;
