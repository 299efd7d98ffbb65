//! Bridge configuration.

use std::time::Duration;

use serde::Deserialize;

use crate::wire::EMPTY_ARGUMENT;
use crate::{Error, Result};

/// Tunables for one bridge instance.
///
/// Every field has a default, so an empty document is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BridgeConfig {
	/// Fail calls with no response after this many milliseconds. Unset keeps
	/// unanswered calls outstanding forever.
	pub call_timeout_ms: Option<u64>,
	/// Period of the worker's timeout sweep.
	pub sweep_interval_ms: u64,
	/// Log responses that match no outstanding call.
	pub diagnose_unroutable: bool,
	/// Literal sent in place of an absent or empty argument.
	pub empty_argument: String,
}

impl Default for BridgeConfig {
	fn default() -> Self {
		Self {
			call_timeout_ms: None,
			sweep_interval_ms: 250,
			diagnose_unroutable: false,
			empty_argument: EMPTY_ARGUMENT.to_owned(),
		}
	}
}

impl BridgeConfig {
	/// Parses and validates a TOML document.
	pub fn from_toml_str(source: &str) -> Result<Self> {
		let config: Self = toml::from_str(source)?;
		config.validate()?;
		Ok(config)
	}

	/// Rejects values the bridge cannot operate with.
	pub fn validate(&self) -> Result<()> {
		if self.call_timeout_ms == Some(0) {
			return Err(Error::InvalidConfig("call_timeout_ms must be > 0".into()));
		}
		if self.sweep_interval_ms == 0 {
			return Err(Error::InvalidConfig("sweep_interval_ms must be > 0".into()));
		}
		if self.empty_argument.is_empty() {
			return Err(Error::InvalidConfig("empty_argument must not be empty".into()));
		}
		Ok(())
	}

	/// Sets the call timeout.
	#[must_use]
	pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
		self.call_timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX).max(1));
		self
	}

	/// Enables logging of responses that match no outstanding call.
	#[must_use]
	pub fn with_unroutable_diagnostics(mut self, enabled: bool) -> Self {
		self.diagnose_unroutable = enabled;
		self
	}

	/// Call timeout, if enabled.
	pub fn call_timeout(&self) -> Option<Duration> {
		self.call_timeout_ms.map(Duration::from_millis)
	}

	/// Timeout sweep period.
	pub fn sweep_interval(&self) -> Duration {
		Duration::from_millis(self.sweep_interval_ms)
	}
}
