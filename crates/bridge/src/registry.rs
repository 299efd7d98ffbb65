//! Registry of outstanding calls keyed by identifier.

use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

use crate::error::CallError;
use crate::id::CallId;

/// Completion handler for one call. Invoked at most once.
pub type Completion = Box<dyn FnOnce(Result<String, CallError>) + Send + 'static>;

/// Lifecycle stage of an outstanding call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallStage {
	/// Waiting in the dispatch queue.
	Queued,
	/// Submitted to the script environment, awaiting its response.
	Dispatched,
}

struct PendingCall {
	function: String,
	stage: CallStage,
	issued_at: Instant,
	completion: Completion,
}

impl fmt::Debug for PendingCall {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("PendingCall")
			.field("function", &self.function)
			.field("stage", &self.stage)
			.field("issued_at", &self.issued_at)
			.finish_non_exhaustive()
	}
}

/// Outstanding calls from invocation until resolution.
///
/// Without a timeout, a call that never receives a response stays here for
/// the lifetime of the registry. Dropping the registry completes every
/// remaining call with [`CallError::Abandoned`].
#[derive(Debug, Default)]
pub struct RequestRegistry {
	calls: HashMap<CallId, PendingCall>,
}

impl RequestRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a freshly invoked call.
	pub fn insert(&mut self, id: CallId, function: String, issued_at: Instant, completion: Completion) {
		let previous = self.calls.insert(
			id,
			PendingCall {
				function,
				stage: CallStage::Queued,
				issued_at,
				completion,
			},
		);
		debug_assert!(previous.is_none(), "call identifier {id} registered twice");
	}

	/// Marks a call as submitted. Returns false if the call is no longer registered.
	pub fn mark_dispatched(&mut self, id: CallId) -> bool {
		match self.calls.get_mut(&id) {
			Some(call) => {
				call.stage = CallStage::Dispatched;
				true
			}
			None => false,
		}
	}

	/// Removes the call and hands `result` to its completion.
	///
	/// Returns false when no call with this identifier is outstanding.
	pub fn resolve(&mut self, id: CallId, result: String) -> bool {
		let Some(call) = self.calls.remove(&id) else {
			return false;
		};
		tracing::trace!(call_id = %id, function = %call.function, stage = ?call.stage, "bridge.call.resolved");
		(call.completion)(Ok(result));
		true
	}

	/// Fails every call issued at least `timeout` before `now`.
	///
	/// Expired calls are completed in identifier order and returned.
	pub fn expire(&mut self, now: Instant, timeout: Duration) -> Vec<CallId> {
		let mut expired: Vec<CallId> = self
			.calls
			.iter()
			.filter(|(_, call)| now.saturating_duration_since(call.issued_at) >= timeout)
			.map(|(id, _)| *id)
			.collect();
		expired.sort_unstable();
		for id in &expired {
			let Some(call) = self.calls.remove(id) else {
				continue;
			};
			let elapsed = now.saturating_duration_since(call.issued_at);
			tracing::warn!(call_id = %id, function = %call.function, stage = ?call.stage, ?elapsed, "bridge.call.timed_out");
			(call.completion)(Err(CallError::TimedOut { id: *id, elapsed }));
		}
		expired
	}

	/// Returns the stage of an outstanding call.
	pub fn stage(&self, id: CallId) -> Option<CallStage> {
		self.calls.get(&id).map(|call| call.stage)
	}

	/// Returns true if the call is outstanding.
	pub fn contains(&self, id: CallId) -> bool {
		self.calls.contains_key(&id)
	}

	/// Number of outstanding calls.
	pub fn len(&self) -> usize {
		self.calls.len()
	}

	/// Returns true when no call is outstanding.
	pub fn is_empty(&self) -> bool {
		self.calls.is_empty()
	}
}

impl Drop for RequestRegistry {
	fn drop(&mut self) {
		if self.calls.is_empty() {
			return;
		}
		let mut calls: Vec<_> = self.calls.drain().collect();
		calls.sort_unstable_by_key(|(id, _)| *id);
		tracing::debug!(outstanding = calls.len(), "bridge.registry.abandon");
		for (id, call) in calls {
			(call.completion)(Err(CallError::Abandoned { id }));
		}
	}
}

#[cfg(test)]
mod tests {
	use std::sync::{Arc, Mutex};

	use super::*;

	type Seen = Arc<Mutex<Vec<(CallId, Result<String, CallError>)>>>;

	fn id(raw: u64) -> CallId {
		CallId::new(raw).unwrap()
	}

	fn recorder(seen: &Seen, call: CallId) -> Completion {
		let seen = Arc::clone(seen);
		Box::new(move |result| seen.lock().unwrap().push((call, result)))
	}

	#[test]
	fn resolves_once_and_removes_entry() {
		let seen = Seen::default();
		let mut registry = RequestRegistry::new();
		let now = Instant::now();
		registry.insert(id(1), "foo".into(), now, recorder(&seen, id(1)));

		assert!(registry.resolve(id(1), "bar".into()));
		assert!(!registry.resolve(id(1), "again".into()));
		assert!(registry.is_empty());
		assert_eq!(*seen.lock().unwrap(), vec![(id(1), Ok("bar".to_string()))]);
	}

	#[test]
	fn expiry_only_touches_old_calls() {
		let seen = Seen::default();
		let mut registry = RequestRegistry::new();
		let start = Instant::now();
		registry.insert(id(1), "old".into(), start, recorder(&seen, id(1)));
		registry.insert(id(2), "new".into(), start + Duration::from_secs(5), recorder(&seen, id(2)));

		let expired = registry.expire(start + Duration::from_secs(6), Duration::from_secs(3));
		assert_eq!(expired, vec![id(1)]);
		assert!(registry.contains(id(2)));
		assert_eq!(
			*seen.lock().unwrap(),
			vec![(
				id(1),
				Err(CallError::TimedOut {
					id: id(1),
					elapsed: Duration::from_secs(6)
				})
			)]
		);
	}

	#[test]
	fn drop_abandons_outstanding_calls() {
		let seen = Seen::default();
		{
			let mut registry = RequestRegistry::new();
			let now = Instant::now();
			registry.insert(id(2), "b".into(), now, recorder(&seen, id(2)));
			registry.insert(id(1), "a".into(), now, recorder(&seen, id(1)));
			assert!(registry.mark_dispatched(id(1)));
			assert_eq!(registry.stage(id(1)), Some(CallStage::Dispatched));
			assert_eq!(registry.stage(id(2)), Some(CallStage::Queued));
		}
		let seen = seen.lock().unwrap();
		assert_eq!(
			*seen,
			vec![
				(id(1), Err(CallError::Abandoned { id: id(1) })),
				(id(2), Err(CallError::Abandoned { id: id(2) })),
			]
		);
	}
}
