//! Scenario files: an ordered list of bridge operations.
//!
//! ```toml
//! [config]
//! call_timeout_ms = 500
//!
//! [[step]]
//! op = "load_script"
//! locator = "file:///lib.js"
//!
//! [[step]]
//! op = "invoke"
//! function = "lib.greet"
//! argument = "'world'"
//!
//! [[step]]
//! op = "document_ready"
//! ```

use anyhow::Context;
use jsbridge_core::BridgeConfig;
use serde::Deserialize;

/// One operation applied to the bridge during replay.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
	/// Host invokes a script function.
	Invoke {
		function: String,
		argument: Option<String>,
	},
	/// Host queues a support script.
	LoadScript { locator: String },
	/// Host reports the document loaded.
	DocumentReady,
	/// Script side reports one support script loaded.
	ScriptLoaded,
	/// Script side answers `respond(key, result)`.
	Respond { key: String, result: String },
	/// Scenario time moves forward by `advance_ms` and expired calls are swept.
	Expire { advance_ms: u64 },
}

/// A parsed scenario file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
	/// Inline bridge configuration, overridden by `--config`.
	#[serde(default)]
	pub config: Option<BridgeConfig>,
	/// Operations in replay order.
	#[serde(default, rename = "step")]
	pub steps: Vec<Step>,
}

impl Scenario {
	/// Parses a scenario document.
	pub fn from_toml_str(source: &str) -> anyhow::Result<Self> {
		let scenario: Self = toml::from_str(source).context("invalid scenario")?;
		if let Some(config) = &scenario.config {
			config.validate().context("invalid [config] table")?;
		}
		Ok(scenario)
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn parses_every_step_kind() {
		let scenario = Scenario::from_toml_str(
			r#"
			[config]
			call_timeout_ms = 50

			[[step]]
			op = "load_script"
			locator = "a.js"

			[[step]]
			op = "invoke"
			function = "foo"

			[[step]]
			op = "invoke"
			function = "bar"
			argument = "[1, 2]"

			[[step]]
			op = "document_ready"

			[[step]]
			op = "script_loaded"

			[[step]]
			op = "respond"
			key = "1"
			result = "ok"

			[[step]]
			op = "expire"
			advance_ms = 100
			"#,
		)
		.unwrap();

		assert_eq!(scenario.config.and_then(|c| c.call_timeout_ms), Some(50));
		assert_eq!(
			scenario.steps,
			vec![
				Step::LoadScript { locator: "a.js".into() },
				Step::Invoke {
					function: "foo".into(),
					argument: None
				},
				Step::Invoke {
					function: "bar".into(),
					argument: Some("[1, 2]".into())
				},
				Step::DocumentReady,
				Step::ScriptLoaded,
				Step::Respond {
					key: "1".into(),
					result: "ok".into()
				},
				Step::Expire { advance_ms: 100 },
			]
		);
	}

	#[test]
	fn rejects_unknown_ops_and_bad_config() {
		assert!(Scenario::from_toml_str("[[step]]\nop = \"reload\"").is_err());
		assert!(Scenario::from_toml_str("[config]\nsweep_interval_ms = 0").is_err());
	}
}
