//! Host collaborator seam.
//!
//! The bridge never touches a renderer directly. Everything it needs from the
//! embedding platform goes through [`Host`]; everything the platform needs to
//! tell the bridge (document ready, script loaded, responses) comes back in
//! through [`Bridge`](crate::Bridge) methods.

use crate::wire::{self, Instruction, ScriptLocator};

/// Capabilities the bridge consumes from its embedding platform.
pub trait Host {
	/// Loads a support script into the hosted document.
	///
	/// The host must arrange for [`Bridge::script_loaded`](crate::Bridge::script_loaded)
	/// to be called once the script finishes loading.
	fn inject_script(&mut self, locator: &ScriptLocator);

	/// Executes one instruction in the script environment. Nothing is awaited.
	fn evaluate(&mut self, instruction: &Instruction);

	/// Receives a diagnostic message forwarded by the script side.
	fn log(&mut self, message: &str) {
		tracing::info!(target: "jsbridge::script", "{message}");
	}
}

impl<H: Host + ?Sized> Host for &mut H {
	fn inject_script(&mut self, locator: &ScriptLocator) {
		(**self).inject_script(locator);
	}

	fn evaluate(&mut self, instruction: &Instruction) {
		(**self).evaluate(instruction);
	}

	fn log(&mut self, message: &str) {
		(**self).log(message);
	}
}

impl<H: Host + ?Sized> Host for Box<H> {
	fn inject_script(&mut self, locator: &ScriptLocator) {
		(**self).inject_script(locator);
	}

	fn evaluate(&mut self, instruction: &Instruction) {
		(**self).evaluate(instruction);
	}

	fn log(&mut self, message: &str) {
		(**self).log(message);
	}
}

/// Host built from a single "evaluate this text" capability.
///
/// Scripts are injected by evaluating a snippet that appends a `<script>`
/// element whose `onload` runs the configured loaded notification.
pub struct EvaluatorHost<F> {
	evaluate: F,
	loaded_notification: String,
}

impl<F> EvaluatorHost<F>
where
	F: FnMut(String),
{
	/// Wraps `evaluate`, using [`wire::DEFAULT_LOADED_NOTIFICATION`].
	pub fn new(evaluate: F) -> Self {
		Self {
			evaluate,
			loaded_notification: wire::DEFAULT_LOADED_NOTIFICATION.to_owned(),
		}
	}

	/// Overrides the expression injected scripts run once loaded.
	#[must_use]
	pub fn with_loaded_notification(mut self, expression: impl Into<String>) -> Self {
		self.loaded_notification = expression.into();
		self
	}
}

impl<F> Host for EvaluatorHost<F>
where
	F: FnMut(String),
{
	fn inject_script(&mut self, locator: &ScriptLocator) {
		(self.evaluate)(wire::script_injection(locator, &self.loaded_notification));
	}

	fn evaluate(&mut self, instruction: &Instruction) {
		(self.evaluate)(instruction.as_str().to_owned());
	}
}

/// One interaction observed by a [`RecordingHost`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
	/// A script was handed over for injection.
	Inject(String),
	/// An instruction was submitted for evaluation.
	Evaluate(String),
	/// A diagnostic message was forwarded.
	Log(String),
}

/// Host that records every interaction in order.
#[derive(Debug, Default)]
pub struct RecordingHost {
	events: Vec<HostEvent>,
}

impl RecordingHost {
	/// Creates an empty recorder.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns recorded events in arrival order.
	pub fn events(&self) -> &[HostEvent] {
		&self.events
	}

	/// Removes and returns recorded events.
	pub fn take(&mut self) -> Vec<HostEvent> {
		std::mem::take(&mut self.events)
	}

	/// Returns the instructions evaluated so far.
	pub fn evaluated(&self) -> Vec<&str> {
		self.events
			.iter()
			.filter_map(|event| match event {
				HostEvent::Evaluate(text) => Some(text.as_str()),
				_ => None,
			})
			.collect()
	}
}

impl Host for RecordingHost {
	fn inject_script(&mut self, locator: &ScriptLocator) {
		self.events.push(HostEvent::Inject(locator.as_str().to_owned()));
	}

	fn evaluate(&mut self, instruction: &Instruction) {
		self.events.push(HostEvent::Evaluate(instruction.as_str().to_owned()));
	}

	fn log(&mut self, message: &str) {
		self.events.push(HostEvent::Log(message.to_owned()));
	}
}
