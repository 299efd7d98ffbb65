//! Replays a scenario against a bridge and records the resulting traffic.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc;
use std::time::{Duration, Instant};

use jsbridge_core::{Bridge, BridgeConfig, CallId, Host, Instruction, ResponseOutcome, ScriptLocator};

use crate::scenario::{Scenario, Step};

/// One observable event during replay, in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceLine {
	Invoked { id: CallId, function: String },
	Inject(String),
	Evaluate(String),
	Log(String),
	Resolved { id: CallId, result: String },
	Failed { id: CallId, error: String },
	Ignored { key: String },
	Rejected(String),
}

impl fmt::Display for TraceLine {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Invoked { id, function } => write!(f, "invoke   #{id} {function}"),
			Self::Inject(locator) => write!(f, "inject   {locator}"),
			Self::Evaluate(text) => write!(f, "eval     {text}"),
			Self::Log(message) => write!(f, "log      {message}"),
			Self::Resolved { id, result } => write!(f, "resolve  #{id} {result}"),
			Self::Failed { id, error } => write!(f, "fail     #{id} {error}"),
			Self::Ignored { key } => write!(f, "ignore   {key}"),
			Self::Rejected(reason) => write!(f, "reject   {reason}"),
		}
	}
}

struct TraceHost {
	trace: mpsc::Sender<TraceLine>,
}

impl TraceHost {
	fn push(&self, line: TraceLine) {
		let _ = self.trace.send(line);
	}
}

impl Host for TraceHost {
	fn inject_script(&mut self, locator: &ScriptLocator) {
		self.push(TraceLine::Inject(locator.to_string()));
	}

	fn evaluate(&mut self, instruction: &Instruction) {
		self.push(TraceLine::Evaluate(instruction.to_string()));
	}

	fn log(&mut self, message: &str) {
		self.push(TraceLine::Log(message.to_owned()));
	}
}

/// Scenario time: frozen except for `expire` steps.
#[derive(Clone)]
struct ReplayClock {
	start: Instant,
	elapsed_ms: Arc<AtomicU64>,
}

impl ReplayClock {
	fn new() -> Self {
		Self {
			start: Instant::now(),
			elapsed_ms: Arc::new(AtomicU64::new(0)),
		}
	}

	fn now(&self) -> Instant {
		self.start + Duration::from_millis(self.elapsed_ms.load(Ordering::Relaxed))
	}

	fn advance(&self, ms: u64) {
		self.elapsed_ms.fetch_add(ms, Ordering::Relaxed);
	}
}

/// Runs every step, then tears the bridge down.
///
/// Calls still outstanding at the end show up as abandoned failures.
pub fn replay(scenario: &Scenario, config: BridgeConfig) -> anyhow::Result<Vec<TraceLine>> {
	let (tx, rx) = mpsc::channel();
	let clock = ReplayClock::new();
	let bridge_clock = clock.clone();
	let mut bridge = Bridge::with_config(TraceHost { trace: tx.clone() }, config).with_clock(move || bridge_clock.now());
	for step in &scenario.steps {
		tracing::debug!(?step, "replay.step");
		apply(&mut bridge, &clock, step, &tx)?;
	}
	drop(bridge);
	drop(tx);
	Ok(rx.try_iter().collect())
}

fn apply(bridge: &mut Bridge<TraceHost>, clock: &ReplayClock, step: &Step, trace: &mpsc::Sender<TraceLine>) -> anyhow::Result<()> {
	match step {
		Step::Invoke { function, argument } => {
			let Some(id) = bridge.snapshot().next_id else {
				anyhow::bail!("call identifiers exhausted");
			};
			let _ = trace.send(TraceLine::Invoked {
				id,
				function: function.clone(),
			});
			let done = trace.clone();
			bridge.invoke_with(function.clone(), argument.clone(), move |result| {
				let line = match result {
					Ok(result) => TraceLine::Resolved { id, result },
					Err(err) => TraceLine::Failed { id, error: err.to_string() },
				};
				let _ = done.send(line);
			})?;
		}
		Step::LoadScript { locator } => bridge.load_script(locator.as_str()),
		Step::DocumentReady => bridge.document_ready(),
		Step::ScriptLoaded => {
			if let Err(err) = bridge.script_loaded() {
				let _ = trace.send(TraceLine::Rejected(err.to_string()));
			}
		}
		Step::Respond { key, result } => {
			if bridge.handle_response(key, result.as_str()) == ResponseOutcome::Ignored {
				let _ = trace.send(TraceLine::Ignored { key: key.clone() });
			}
		}
		Step::Expire { advance_ms } => {
			clock.advance(*advance_ms);
			bridge.expire();
		}
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	fn lines(scenario: &str) -> Vec<String> {
		let scenario = Scenario::from_toml_str(scenario).unwrap();
		let config = scenario.config.clone().unwrap_or_default();
		replay(&scenario, config).unwrap().iter().map(ToString::to_string).collect()
	}

	#[test]
	fn call_waits_for_document_then_resolves() {
		let trace = lines(
			r#"
			[[step]]
			op = "invoke"
			function = "foo"

			[[step]]
			op = "document_ready"

			[[step]]
			op = "respond"
			key = "1"
			result = "bar"

			[[step]]
			op = "respond"
			key = "1"
			result = "again"
			"#,
		);
		assert_eq!(trace, vec!["invoke   #1 foo", "eval     foo(1, '')", "resolve  #1 bar", "ignore   1"]);
	}

	#[test]
	fn scripts_then_calls_in_order() {
		let trace = lines(
			r#"
			[[step]]
			op = "load_script"
			locator = "A"

			[[step]]
			op = "load_script"
			locator = "B"

			[[step]]
			op = "invoke"
			function = "one"

			[[step]]
			op = "invoke"
			function = "two"
			argument = "'x'"

			[[step]]
			op = "document_ready"

			[[step]]
			op = "script_loaded"

			[[step]]
			op = "script_loaded"

			[[step]]
			op = "script_loaded"

			[[step]]
			op = "respond"
			key = "log"
			result = "hello"
			"#,
		);
		assert_eq!(
			trace,
			vec![
				"invoke   #1 one",
				"invoke   #2 two",
				"inject   A",
				"inject   B",
				"eval     one(1, '')",
				"eval     two(2, 'x')",
				"reject   script-loaded notification with no script load pending",
				"log      hello",
				"fail     #1 call 1 abandoned before a response arrived",
				"fail     #2 call 2 abandoned before a response arrived",
			]
		);
	}

	#[test]
	fn expire_fails_only_with_timeout_configured() {
		let trace = lines(
			r#"
			[config]
			call_timeout_ms = 100

			[[step]]
			op = "document_ready"

			[[step]]
			op = "invoke"
			function = "slow"

			[[step]]
			op = "expire"
			advance_ms = 50

			[[step]]
			op = "expire"
			advance_ms = 5000
			"#,
		);
		assert_eq!(trace.len(), 3, "{trace:?}");
		assert_eq!(trace[1], "eval     slow(1, '')");
		assert_eq!(trace[2], "fail     #1 call 1 timed out after 5.05s");
	}

	#[test]
	fn expire_steps_accumulate_time() {
		let trace = lines(
			r#"
			[config]
			call_timeout_ms = 100

			[[step]]
			op = "document_ready"

			[[step]]
			op = "invoke"
			function = "slow"

			[[step]]
			op = "expire"
			advance_ms = 60

			[[step]]
			op = "invoke"
			function = "fast"

			[[step]]
			op = "expire"
			advance_ms = 60

			[[step]]
			op = "respond"
			key = "1"
			result = "late"

			[[step]]
			op = "respond"
			key = "2"
			result = "ok"
			"#,
		);
		assert_eq!(
			trace,
			vec![
				"invoke   #1 slow",
				"eval     slow(1, '')",
				"invoke   #2 fast",
				"eval     fast(2, '')",
				"fail     #1 call 1 timed out after 120ms",
				"ignore   1",
				"resolve  #2 ok",
			]
		);
	}
}
