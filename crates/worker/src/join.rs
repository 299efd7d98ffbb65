use tokio::sync::{Mutex, Notify};
use tokio::task::JoinHandle;

/// Join coordination for the worker task.
///
/// Any number of handle clones may request shutdown; one of them awaits the
/// task while the others wait for it to report completion.
enum JoinState {
	/// Task still owned; the first joiner takes it.
	Handle(JoinHandle<()>),
	/// A joiner is awaiting the task.
	Joining,
	/// Task has completed.
	Done,
}

pub(crate) struct JoinCtrl {
	state: Mutex<JoinState>,
	done: Notify,
}

impl JoinCtrl {
	pub(crate) fn new(handle: JoinHandle<()>) -> Self {
		Self {
			state: Mutex::new(JoinState::Handle(handle)),
			done: Notify::new(),
		}
	}

	/// Waits until the worker task has finished. Safe to call from many clones.
	pub(crate) async fn join(&self) {
		loop {
			let handle = {
				let mut state = self.state.lock().await;
				match std::mem::replace(&mut *state, JoinState::Joining) {
					JoinState::Done => {
						*state = JoinState::Done;
						return;
					}
					JoinState::Joining => {
						// Register before unlocking so the leader's wakeup cannot be missed.
						let notified = self.done.notified();
						drop(state);
						notified.await;
						continue;
					}
					JoinState::Handle(handle) => handle,
				}
			};
			if let Err(err) = handle.await {
				tracing::warn!(error = %err, "worker.join_failed");
			}
			*self.state.lock().await = JoinState::Done;
			self.done.notify_waiters();
			return;
		}
	}
}
