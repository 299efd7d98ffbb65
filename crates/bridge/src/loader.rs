//! Support script queue.

use std::collections::VecDeque;

use crate::gate::ReadinessGate;
use crate::host::Host;
use crate::wire::ScriptLocator;

/// FIFO of support scripts awaiting injection.
///
/// Scripts are injected back-to-back as soon as the document is ready; their
/// completions are tracked by count on the [`ReadinessGate`], not by identity.
#[derive(Debug, Default)]
pub struct ScriptLoader {
	queue: VecDeque<ScriptLocator>,
}

impl ScriptLoader {
	/// Creates an empty loader.
	pub fn new() -> Self {
		Self::default()
	}

	/// Queues `locator` and closes the gate's script half if it has not opened yet.
	pub fn enqueue(&mut self, locator: ScriptLocator, gate: &mut ReadinessGate) {
		gate.expect_script();
		self.queue.push_back(locator);
	}

	/// Injects every queued script if the document is ready.
	///
	/// Returns the number of scripts handed to the host.
	pub fn drain<H: Host + ?Sized>(&mut self, gate: &mut ReadinessGate, host: &mut H) -> usize {
		let mut injected = 0;
		while gate.document_ready() {
			let Some(locator) = self.queue.pop_front() else {
				break;
			};
			gate.begin_script_load();
			tracing::trace!(locator = %locator, pending = gate.pending_script_loads(), "bridge.script.inject");
			host.inject_script(&locator);
			injected += 1;
		}
		injected
	}

	/// Number of scripts not yet injected.
	pub fn len(&self) -> usize {
		self.queue.len()
	}

	/// Returns true when no script waits for injection.
	pub fn is_empty(&self) -> bool {
		self.queue.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::host::{HostEvent, RecordingHost};

	#[test]
	fn holds_scripts_until_document_ready() {
		let mut loader = ScriptLoader::new();
		let mut gate = ReadinessGate::new();
		let mut host = RecordingHost::new();

		loader.enqueue("a.js".into(), &mut gate);
		loader.enqueue("b.js".into(), &mut gate);
		assert_eq!(loader.drain(&mut gate, &mut host), 0);
		assert!(host.events().is_empty());
		assert!(!gate.scripts_ready());

		gate.mark_document_ready();
		assert_eq!(loader.drain(&mut gate, &mut host), 2);
		assert_eq!(host.take(), vec![HostEvent::Inject("a.js".into()), HostEvent::Inject("b.js".into())]);
		assert_eq!(gate.pending_script_loads(), 2);
		assert!(loader.is_empty());
	}
}
