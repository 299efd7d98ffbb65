//! Single-owner worker for [`jsbridge_core::Bridge`].
//!
//! Embedding platforms deliver "document ready", "script loaded" and
//! `respond(key, result)` notifications on whatever thread their script
//! interface runs on, while host code issues calls from its own threads. This
//! crate moves the bridge onto one tokio task and turns every operation into a
//! command on an ordered queue:
//! * [`spawn_bridge`]: start the task and get a [`BridgeHandle`]
//! * [`BridgeHandle`]: cloneable, non-blocking command port plus async `call`
//!   and `snapshot` helpers
//!
//! With a call timeout configured, the task also sweeps expired calls on a
//! timer and fails them with [`jsbridge_core::CallError::TimedOut`].

#![warn(missing_docs)]

mod command;
pub mod error;
mod handle;
mod join;
mod spawn;
mod worker;

pub use error::{Error, Result};
pub use handle::BridgeHandle;
pub use worker::spawn_bridge;
