//! The task that owns a bridge and applies queued commands in order.

use std::sync::Arc;
use std::time::Duration;

use jsbridge_core::{Bridge, BridgeConfig, Host};
use tokio::sync::mpsc;
use tokio::time::{Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::command::Command;
use crate::handle::BridgeHandle;
use crate::join::JoinCtrl;
use crate::{Result, spawn};

fn runtime_now() -> std::time::Instant {
	tokio::time::Instant::now().into_std()
}

/// Moves a new bridge over `host` onto a dedicated task.
///
/// Every operation on the returned handle, including notifications coming
/// from the script side, is applied by that task in arrival order. When a
/// call timeout is configured the task also sweeps expired calls every
/// [`BridgeConfig::sweep_interval`].
pub fn spawn_bridge<H>(host: H, config: BridgeConfig) -> Result<BridgeHandle>
where
	H: Host + Send + 'static,
{
	let sweep = config.call_timeout().map(|_| config.sweep_interval());
	let bridge = Bridge::with_config(host, config).with_clock(runtime_now);
	let (tx, rx) = mpsc::unbounded_channel();
	let cancel = CancellationToken::new();
	let task = spawn::spawn("bridge", run(bridge, rx, cancel.clone(), sweep))?;
	Ok(BridgeHandle::new(tx, cancel, Arc::new(JoinCtrl::new(task))))
}

async fn run<H>(mut bridge: Bridge<H>, mut rx: mpsc::UnboundedReceiver<Command>, cancel: CancellationToken, sweep: Option<Duration>)
where
	H: Host + Send + 'static,
{
	tracing::info!(call_timeout = ?bridge.config().call_timeout(), "bridge.worker.started");
	let mut sweep = sweep.map(|period| {
		let mut interval = tokio::time::interval(period);
		interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
		interval
	});

	loop {
		tokio::select! {
			biased;

			_ = cancel.cancelled() => break,

			command = rx.recv() => match command {
				Some(command) => apply(&mut bridge, command),
				None => break,
			},

			_ = next_sweep(&mut sweep) => {
				let expired = bridge.expire();
				if !expired.is_empty() {
					tracing::debug!(expired = expired.len(), "bridge.worker.sweep");
				}
			}
		}
	}

	tracing::info!(outstanding = bridge.snapshot().outstanding_calls, "bridge.worker.stopped");
}

async fn next_sweep(sweep: &mut Option<Interval>) {
	match sweep {
		Some(interval) => {
			interval.tick().await;
		}
		None => std::future::pending::<()>().await,
	}
}

fn apply<H: Host>(bridge: &mut Bridge<H>, command: Command) {
	tracing::trace!(command = command.name(), "bridge.worker.command");
	match command {
		Command::Invoke {
			function,
			argument,
			completion,
		} => {
			// Exhaustion is logged by the bridge; dropping the completion tells the caller.
			let _ = bridge.invoke_with(function, argument, completion);
		}
		Command::LoadScript(locator) => bridge.load_script(locator),
		Command::DocumentReady => bridge.document_ready(),
		Command::ScriptLoaded => {
			// Rejected notifications are logged by the bridge.
			let _ = bridge.script_loaded();
		}
		Command::Respond { key, result } => {
			bridge.handle_response(&key, result);
		}
		Command::Snapshot(reply) => {
			let _ = reply.send(bridge.snapshot());
		}
	}
}
