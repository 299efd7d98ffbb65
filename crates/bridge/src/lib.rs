//! Call correlation and readiness sequencing for embedded script environments.
//!
//! A host (native code embedding a web view or any other script engine)
//! invokes script-side functions through a [`Bridge`]. The bridge:
//! * holds calls back until the hosted document and every queued support
//!   script have loaded ([`ReadinessGate`])
//! * tags each call with a fresh [`CallId`] and submits it as the literal
//!   expression `function(id, argument)`
//! * keeps each call in a [`RequestRegistry`] until the script side answers
//!   with `respond(id, result)`, then runs the caller's completion exactly once
//!
//! The bridge is synchronous and runtime-free. Hosts whose notifications arrive
//! on several threads drive it through the `jsbridge-worker` crate.

#![warn(missing_docs)]

pub mod bridge;
pub mod config;
pub mod error;
pub mod gate;
pub mod host;
pub mod id;
pub mod loader;
pub mod queue;
pub mod registry;
pub mod wire;

pub use bridge::{Bridge, BridgeSnapshot, Clock, ResponseOutcome};
pub use config::BridgeConfig;
pub use error::{CallError, Error, Result};
pub use gate::{ReadinessGate, ScriptProgress};
pub use host::{EvaluatorHost, Host, HostEvent, RecordingHost};
pub use id::{CallId, IdAllocator};
pub use registry::{CallStage, Completion, RequestRegistry};
pub use wire::{Instruction, ResponseKey, ScriptLocator};
