//! Error types for the bridge worker.

use jsbridge_core::CallError;
use thiserror::Error;

/// Errors surfaced by [`BridgeHandle`](crate::BridgeHandle).
#[derive(Debug, Error)]
pub enum Error {
	/// The worker task has stopped; the command was not delivered.
	#[error("bridge worker stopped")]
	Stopped,

	/// The worker dropped the call without completing it.
	#[error("call dropped without completion")]
	Dropped,

	/// No tokio runtime was available to host the worker.
	#[error("no tokio runtime available for the bridge worker")]
	NoRuntime,

	/// The call completed with a failure.
	#[error(transparent)]
	Call(#[from] CallError),
}

/// Result type for worker operations.
pub type Result<T> = std::result::Result<T, Error>;
