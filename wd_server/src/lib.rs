//! Wager duel server library.
//!
//! Exposes the HTTP/WebSocket front end, configuration loading, logging
//! setup and metrics so the binary and the integration tests share them.

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
