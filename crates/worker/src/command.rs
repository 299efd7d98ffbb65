use jsbridge_core::{BridgeSnapshot, Completion, ScriptLocator};
use tokio::sync::oneshot;

/// One operation queued for the worker's bridge.
pub(crate) enum Command {
	Invoke {
		function: String,
		argument: Option<String>,
		completion: Completion,
	},
	LoadScript(ScriptLocator),
	DocumentReady,
	ScriptLoaded,
	Respond {
		key: String,
		result: String,
	},
	Snapshot(oneshot::Sender<BridgeSnapshot>),
}

impl Command {
	pub(crate) const fn name(&self) -> &'static str {
		match self {
			Self::Invoke { .. } => "invoke",
			Self::LoadScript(_) => "load_script",
			Self::DocumentReady => "document_ready",
			Self::ScriptLoaded => "script_loaded",
			Self::Respond { .. } => "respond",
			Self::Snapshot(_) => "snapshot",
		}
	}
}
