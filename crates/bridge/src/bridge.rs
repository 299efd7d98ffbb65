//! The bridge core: invocation, readiness sequencing and response routing.

use std::time::Instant;

use crate::config::BridgeConfig;
use crate::error::CallError;
use crate::gate::{ReadinessGate, ScriptProgress};
use crate::host::Host;
use crate::id::{CallId, IdAllocator};
use crate::loader::ScriptLoader;
use crate::queue::{DispatchQueue, QueuedCall};
use crate::registry::RequestRegistry;
use crate::wire::{self, ResponseKey, ScriptLocator};
use crate::Result;


/// Source of the instants recorded for call timeouts.
pub type Clock = Box<dyn Fn() -> Instant + Send>;

/// What [`Bridge::handle_response`] did with one inbound response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseOutcome {
	/// The response completed the call with this identifier.
	Resolved(CallId),
	/// The response was a diagnostic message forwarded to the host log.
	Logged,
	/// The key matched no outstanding call and was dropped.
	Ignored,
}

/// Point-in-time view of the bridge state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeSnapshot {
	/// The hosted document has loaded.
	pub document_ready: bool,
	/// No gating script load is outstanding.
	pub scripts_ready: bool,
	/// Injected scripts that have not reported loading.
	pub pending_script_loads: usize,
	/// Scripts waiting for the document before injection.
	pub queued_scripts: usize,
	/// Calls waiting for the gate.
	pub queued_calls: usize,
	/// Calls invoked but not yet resolved, queued ones included.
	pub outstanding_calls: usize,
	/// Identifier the next call will receive.
	pub next_id: Option<CallId>,
}

/// Correlation and sequencing engine between a host and its script environment.
///
/// All state is owned by one value and mutated through `&mut self`; callers
/// that receive notifications on several threads serialize them through a
/// single owner (see the `jsbridge-worker` crate).
pub struct Bridge<H: Host> {
	host: H,
	config: BridgeConfig,
	clock: Clock,
	ids: IdAllocator,
	gate: ReadinessGate,
	scripts: ScriptLoader,
	queue: DispatchQueue,
	registry: RequestRegistry,
}

impl<H: Host> Bridge<H> {
	/// Creates a bridge with the default configuration.
	pub fn new(host: H) -> Self {
		Self::with_config(host, BridgeConfig::default())
	}

	/// Creates a bridge with an explicit configuration.
	pub fn with_config(host: H, config: BridgeConfig) -> Self {
		Self {
			host,
			config,
			clock: Box::new(Instant::now),
			ids: IdAllocator::new(),
			gate: ReadinessGate::new(),
			scripts: ScriptLoader::new(),
			queue: DispatchQueue::new(),
			registry: RequestRegistry::new(),
		}
	}

	/// Replaces the clock used to timestamp calls.
	#[must_use]
	pub fn with_clock(mut self, clock: impl Fn() -> Instant + Send + 'static) -> Self {
		self.clock = Box::new(clock);
		self
	}

	/// Returns the host collaborator.
	pub fn host(&self) -> &H {
		&self.host
	}

	/// Returns the host collaborator mutably.
	pub fn host_mut(&mut self) -> &mut H {
		&mut self.host
	}

	/// Returns the active configuration.
	pub fn config(&self) -> &BridgeConfig {
		&self.config
	}

	/// Invokes `function` with a success-only handler.
	///
	/// Timeouts and teardown are logged and otherwise swallowed; use
	/// [`Bridge::invoke_with`] to observe them.
	pub fn invoke(
		&mut self,
		function: impl Into<String>,
		argument: Option<String>,
		on_success: impl FnOnce(String) + Send + 'static,
	) -> Result<CallId> {
		self.invoke_with(function, argument, move |result| match result {
			Ok(text) => on_success(text),
			Err(err) => tracing::debug!(error = %err, "bridge.call.failed"),
		})
	}

	/// Invokes `function` and reports the outcome to `completion`.
	///
	/// The call is queued and submitted as soon as the gate is open, possibly
	/// before this returns. Fails only when identifiers are exhausted.
	pub fn invoke_with(
		&mut self,
		function: impl Into<String>,
		argument: Option<String>,
		completion: impl FnOnce(std::result::Result<String, CallError>) + Send + 'static,
	) -> Result<CallId> {
		let id = self.ids.next().inspect_err(|err| tracing::warn!(error = %err, "bridge.invoke.rejected"))?;
		let function = function.into();
		let argument = wire::normalize_argument(argument, &self.config.empty_argument);

		self.registry.insert(id, function.clone(), (self.clock)(), Box::new(completion));
		tracing::trace!(call_id = %id, function = %function, queued = self.queue.len() + 1, "bridge.invoke");
		self.queue.push(QueuedCall { id, function, argument });
		self.drain_dispatch();
		Ok(id)
	}

	/// Queues a support script and injects it if the document is ready.
	pub fn load_script(&mut self, locator: impl Into<ScriptLocator>) {
		self.scripts.enqueue(locator.into(), &mut self.gate);
		self.scripts.drain(&mut self.gate, &mut self.host);
	}

	/// Handles the host's "document finished loading" notification.
	///
	/// Repeated notifications do not change the gate but still flush any
	/// queued scripts or calls.
	pub fn document_ready(&mut self) {
		if self.gate.mark_document_ready() {
			tracing::debug!(queued_scripts = self.scripts.len(), queued_calls = self.queue.len(), "bridge.gate.document_ready");
		}
		self.scripts.drain(&mut self.gate, &mut self.host);
		self.drain_dispatch();
	}

	/// Handles one "script loaded" notification from the script side.
	///
	/// A notification with no script load outstanding is rejected with
	/// [`Error::SpuriousScriptLoad`](crate::Error::SpuriousScriptLoad) and
	/// changes nothing.
	pub fn script_loaded(&mut self) -> Result<ScriptProgress> {
		let progress = self
			.gate
			.finish_script_load()
			.inspect_err(|err| tracing::warn!(error = %err, "bridge.script.loaded.rejected"))?;
		match progress {
			ScriptProgress::Pending { remaining } => {
				tracing::trace!(remaining, "bridge.script.loaded");
			}
			ScriptProgress::Complete => {
				tracing::debug!(gate_open = self.gate.is_open(), "bridge.gate.scripts_ready");
				self.drain_dispatch();
			}
		}
		Ok(progress)
	}

	/// Routes one response from the script side.
	///
	/// A decimal key naming an outstanding call completes that call; the
	/// `log` key forwards `result` to the host log; anything else is dropped.
	pub fn handle_response(&mut self, key: &str, result: impl Into<String>) -> ResponseOutcome {
		let result = result.into();
		match ResponseKey::parse(key) {
			ResponseKey::Call(id) if self.registry.contains(id) => {
				self.registry.resolve(id, result);
				ResponseOutcome::Resolved(id)
			}
			ResponseKey::Log => {
				self.host.log(&result);
				ResponseOutcome::Logged
			}
			parsed => {
				if self.config.diagnose_unroutable {
					tracing::debug!(key, kind = ?parsed, "bridge.response.unroutable");
				}
				ResponseOutcome::Ignored
			}
		}
	}

	/// Fails every call older than the configured timeout, measured at `now`.
	///
	/// Expired calls still waiting for the gate leave the dispatch queue too.
	/// A no-op without a configured timeout.
	pub fn expire_at(&mut self, now: Instant) -> Vec<CallId> {
		let Some(timeout) = self.config.call_timeout() else {
			return Vec::new();
		};
		let expired = self.registry.expire(now, timeout);
		if !expired.is_empty() {
			let queued = self.queue.len();
			self.queue.retain(|call| self.registry.contains(call.id));
			let dropped = queued - self.queue.len();
			if dropped > 0 {
				tracing::trace!(dropped, "bridge.dispatch.pruned");
			}
		}
		expired
	}

	/// [`Bridge::expire_at`] using the bridge clock.
	pub fn expire(&mut self) -> Vec<CallId> {
		self.expire_at((self.clock)())
	}

	/// Returns true when calls are dispatched immediately.
	pub fn is_ready(&self) -> bool {
		self.gate.is_open()
	}

	/// Returns true if `id` has been invoked and not yet resolved.
	pub fn is_outstanding(&self, id: CallId) -> bool {
		self.registry.contains(id)
	}

	/// Captures the current state.
	pub fn snapshot(&self) -> BridgeSnapshot {
		BridgeSnapshot {
			document_ready: self.gate.document_ready(),
			scripts_ready: self.gate.scripts_ready(),
			pending_script_loads: self.gate.pending_script_loads(),
			queued_scripts: self.scripts.len(),
			queued_calls: self.queue.len(),
			outstanding_calls: self.registry.len(),
			next_id: self.ids.peek(),
		}
	}

	fn drain_dispatch(&mut self) -> usize {
		if !self.gate.is_open() {
			return 0;
		}
		let mut sent = 0;
		while let Some(call) = self.queue.pop() {
			if !self.registry.mark_dispatched(call.id) {
				tracing::trace!(call_id = %call.id, "bridge.dispatch.skip_settled");
				continue;
			}
			let instruction = call.instruction();
			tracing::trace!(call_id = %call.id, function = %call.function, "bridge.dispatch");
			self.host.evaluate(&instruction);
			sent += 1;
		}
		if sent > 0 {
			tracing::debug!(sent, outstanding = self.registry.len(), "bridge.dispatch.drained");
		}
		sent
	}
}
