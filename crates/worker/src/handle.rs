use std::sync::Arc;

use jsbridge_core::{BridgeSnapshot, CallError, ScriptLocator};
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

use crate::command::Command;
use crate::join::JoinCtrl;
use crate::{Error, Result};

/// Cloneable handle to a bridge owned by a worker task.
///
/// Host code keeps one clone for issuing calls and hands others to whatever
/// receives notifications from the script side; every method only enqueues a
/// command, so all of them may be called from any thread.
#[derive(Clone)]
pub struct BridgeHandle {
	tx: mpsc::UnboundedSender<Command>,
	cancel: CancellationToken,
	join: Arc<JoinCtrl>,
}

impl BridgeHandle {
	pub(crate) fn new(tx: mpsc::UnboundedSender<Command>, cancel: CancellationToken, join: Arc<JoinCtrl>) -> Self {
		Self { tx, cancel, join }
	}

	fn send(&self, command: Command) -> Result<()> {
		self.tx.send(command).map_err(|_| Error::Stopped)
	}

	/// Invokes `function`, running `on_success` with the result text.
	pub fn invoke(
		&self,
		function: impl Into<String>,
		argument: Option<String>,
		on_success: impl FnOnce(String) + Send + 'static,
	) -> Result<()> {
		self.invoke_with(function, argument, move |result| match result {
			Ok(text) => on_success(text),
			Err(err) => tracing::debug!(error = %err, "bridge.call.failed"),
		})
	}

	/// Invokes `function`, reporting success or failure to `completion`.
	pub fn invoke_with(
		&self,
		function: impl Into<String>,
		argument: Option<String>,
		completion: impl FnOnce(std::result::Result<String, CallError>) + Send + 'static,
	) -> Result<()> {
		self.send(Command::Invoke {
			function: function.into(),
			argument,
			completion: Box::new(completion),
		})
	}

	/// Invokes `function` and waits for its result.
	pub async fn call(&self, function: impl Into<String>, argument: Option<String>) -> Result<String> {
		let (tx, rx) = oneshot::channel();
		self.invoke_with(function, argument, move |result| {
			let _ = tx.send(result);
		})?;
		match rx.await {
			Ok(result) => Ok(result?),
			Err(_) => Err(Error::Dropped),
		}
	}

	/// Queues a support script.
	pub fn load_script(&self, locator: impl Into<ScriptLocator>) -> Result<()> {
		self.send(Command::LoadScript(locator.into()))
	}

	/// Forwards the host's "document finished loading" notification.
	pub fn document_ready(&self) -> Result<()> {
		self.send(Command::DocumentReady)
	}

	/// Forwards one "script loaded" notification from the script side.
	pub fn script_loaded(&self) -> Result<()> {
		self.send(Command::ScriptLoaded)
	}

	/// Forwards one `respond(key, result)` call from the script side.
	pub fn respond(&self, key: impl Into<String>, result: impl Into<String>) -> Result<()> {
		self.send(Command::Respond {
			key: key.into(),
			result: result.into(),
		})
	}

	/// Returns the bridge state after every command sent before this one.
	pub async fn snapshot(&self) -> Result<BridgeSnapshot> {
		let (tx, rx) = oneshot::channel();
		self.send(Command::Snapshot(tx))?;
		rx.await.map_err(|_| Error::Stopped)
	}

	/// Returns true once the worker task no longer accepts commands.
	pub fn is_stopped(&self) -> bool {
		self.tx.is_closed()
	}

	/// Stops the worker and waits for it to exit.
	///
	/// Commands still queued are discarded. Calls the bridge already accepted
	/// complete with [`CallError::Abandoned`].
	pub async fn shutdown(&self) {
		self.cancel.cancel();
		self.join.join().await;
	}
}
