//! Dispatch queue for calls waiting on the readiness gate.

use std::collections::VecDeque;

use crate::id::CallId;
use crate::wire::Instruction;

/// A call waiting to be submitted to the script environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedCall {
	/// Identifier the response must carry.
	pub id: CallId,
	/// Script-side function to invoke.
	pub function: String,
	/// Pre-serialized argument, already normalized.
	pub argument: String,
}

impl QueuedCall {
	/// Serializes the call for evaluation.
	pub fn instruction(&self) -> Instruction {
		Instruction::call(&self.function, self.id, &self.argument)
	}
}

/// FIFO of calls; positions never change.
#[derive(Debug, Default)]
pub struct DispatchQueue {
	calls: VecDeque<QueuedCall>,
}

impl DispatchQueue {
	/// Creates an empty queue.
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends a call at the tail.
	pub fn push(&mut self, call: QueuedCall) {
		self.calls.push_back(call);
	}

	/// Removes the head call.
	pub fn pop(&mut self) -> Option<QueuedCall> {
		self.calls.pop_front()
	}

	/// Keeps only the calls for which `keep` returns true, in order.
	pub fn retain(&mut self, keep: impl FnMut(&QueuedCall) -> bool) {
		self.calls.retain(keep);
	}

	/// Number of waiting calls.
	pub fn len(&self) -> usize {
		self.calls.len()
	}

	/// Returns true when nothing waits.
	pub fn is_empty(&self) -> bool {
		self.calls.is_empty()
	}
}
