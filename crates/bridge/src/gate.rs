//! Readiness gate: document load plus support script loads.

use crate::{Error, Result};

/// Progress reported after one script-loaded notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptProgress {
	/// Injected scripts are still loading.
	Pending {
		/// Script loads still outstanding.
		remaining: usize,
	},
	/// The last outstanding script finished loading.
	Complete,
}

/// Composite readiness state deciding whether calls may be dispatched.
///
/// The gate is open iff the document is ready and no support script that was
/// queued before opening is still loading. Once open it stays open: scripts
/// queued afterwards are injected and counted, but do not hold calls back.
#[derive(Debug, Clone)]
pub struct ReadinessGate {
	document_ready: bool,
	scripts_ready: bool,
	pending_script_loads: usize,
}

impl Default for ReadinessGate {
	fn default() -> Self {
		Self {
			document_ready: false,
			scripts_ready: true,
			pending_script_loads: 0,
		}
	}
}

impl ReadinessGate {
	/// Creates a closed gate with no scripts to wait for.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns true when queued calls may be dispatched.
	pub fn is_open(&self) -> bool {
		self.document_ready && self.scripts_ready
	}

	/// Returns true once the hosted document has loaded.
	pub fn document_ready(&self) -> bool {
		self.document_ready
	}

	/// Returns true when no gating script load is outstanding.
	pub fn scripts_ready(&self) -> bool {
		self.scripts_ready
	}

	/// Number of injected scripts that have not reported loading.
	pub fn pending_script_loads(&self) -> usize {
		self.pending_script_loads
	}

	/// Records that the hosted document finished loading.
	///
	/// Returns true only for the first notification.
	pub fn mark_document_ready(&mut self) -> bool {
		let first = !self.document_ready;
		self.document_ready = true;
		first
	}

	/// Records that a support script was queued.
	pub fn expect_script(&mut self) {
		if !self.is_open() {
			self.scripts_ready = false;
		}
	}

	/// Records that a support script was handed to the host for injection.
	pub fn begin_script_load(&mut self) {
		self.pending_script_loads += 1;
	}

	/// Records one script-loaded notification.
	///
	/// Notifications beyond the number of injected scripts are rejected and
	/// leave the gate untouched.
	pub fn finish_script_load(&mut self) -> Result<ScriptProgress> {
		if self.pending_script_loads == 0 {
			return Err(Error::SpuriousScriptLoad);
		}
		self.pending_script_loads -= 1;
		if self.pending_script_loads > 0 {
			return Ok(ScriptProgress::Pending {
				remaining: self.pending_script_loads,
			});
		}
		self.scripts_ready = true;
		Ok(ScriptProgress::Complete)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn opens_on_document_alone_without_scripts() {
		let mut gate = ReadinessGate::new();
		assert!(!gate.is_open());
		assert!(gate.mark_document_ready());
		assert!(gate.is_open());
		assert!(!gate.mark_document_ready(), "second notification is not a transition");
		assert!(gate.is_open());
	}

	#[test]
	fn waits_for_every_injected_script() {
		let mut gate = ReadinessGate::new();
		gate.expect_script();
		gate.expect_script();
		gate.mark_document_ready();
		gate.begin_script_load();
		gate.begin_script_load();
		assert!(!gate.is_open());

		assert_eq!(gate.finish_script_load().unwrap(), ScriptProgress::Pending { remaining: 1 });
		assert!(!gate.is_open());
		assert_eq!(gate.finish_script_load().unwrap(), ScriptProgress::Complete);
		assert!(gate.is_open());
	}

	#[test]
	fn rejects_load_notifications_past_zero() {
		let mut gate = ReadinessGate::new();
		gate.expect_script();
		assert!(matches!(gate.finish_script_load(), Err(Error::SpuriousScriptLoad)));
		assert!(!gate.scripts_ready());
		assert_eq!(gate.pending_script_loads(), 0);

		gate.mark_document_ready();
		gate.begin_script_load();
		gate.finish_script_load().unwrap();
		assert!(matches!(gate.finish_script_load(), Err(Error::SpuriousScriptLoad)));
		assert_eq!(gate.pending_script_loads(), 0);
		assert!(gate.is_open());
	}

	#[test]
	fn late_scripts_do_not_close_an_open_gate() {
		let mut gate = ReadinessGate::new();
		gate.mark_document_ready();
		assert!(gate.is_open());
		gate.expect_script();
		gate.begin_script_load();
		assert!(gate.is_open());
		assert_eq!(gate.finish_script_load().unwrap(), ScriptProgress::Complete);
		assert!(gate.is_open());
	}
}
