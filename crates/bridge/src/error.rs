//! Error types for the bridge core.

use std::time::Duration;

use thiserror::Error;

use crate::id::CallId;

/// Errors raised by bridge core operations.
#[derive(Debug, Error)]
pub enum Error {
	/// The identifier space is used up; a new call cannot be correlated.
	#[error("call identifiers exhausted")]
	IdsExhausted,

	/// A script-loaded notification arrived with no script load outstanding.
	#[error("script-loaded notification with no script load pending")]
	SpuriousScriptLoad,

	/// The configuration document could not be parsed.
	#[error("bridge config parse error: {0}")]
	Config(#[from] toml::de::Error),

	/// The configuration parsed but holds an unusable value.
	#[error("invalid bridge config: {0}")]
	InvalidConfig(String),
}

/// Result type for bridge core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure delivered to a call completion instead of a result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallError {
	/// No response arrived within the configured call timeout.
	#[error("call {id} timed out after {elapsed:?}")]
	TimedOut {
		/// Identifier of the expired call.
		id: CallId,
		/// Time between invocation and expiry.
		elapsed: Duration,
	},

	/// The bridge was torn down while the call was outstanding.
	#[error("call {id} abandoned before a response arrived")]
	Abandoned {
		/// Identifier of the abandoned call.
		id: CallId,
	},
}

impl CallError {
	/// Returns the identifier of the failed call.
	pub fn id(&self) -> CallId {
		match self {
			Self::TimedOut { id, .. } | Self::Abandoned { id } => *id,
		}
	}
}
