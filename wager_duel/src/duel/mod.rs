//! Duel module running a match behind an async actor.
//!
//! ## Architecture
//!
//! The match runs in a single Tokio task with an mpsc message inbox and a
//! one-second tick interval. Transports talk to it through a cloneable
//! [`DuelHandle`] and receive their notifications on a per-connection
//! channel registered when they join.
//!
//! ## Example
//!
//! ```no_run
//! use wager_duel::duel::{DuelActor, DuelConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let (actor, handle) = DuelActor::new(DuelConfig::default());
//!     tokio::spawn(actor.run());
//!
//!     let snapshot = handle.state().await.unwrap();
//!     println!("{}", snapshot.phase);
//! }
//! ```

pub mod actor;
pub mod config;
pub mod messages;

pub use actor::{DuelActor, DuelHandle};
pub use config::{DuelConfig, RoundSpeed};
pub use messages::{DuelMessage, DuelResponse};
