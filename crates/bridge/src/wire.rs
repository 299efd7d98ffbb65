//! Wire conventions shared with the script side.
//!
//! Outbound calls are literal call expressions of the form
//! `function(id, argument)`. Inbound responses arrive as a `(key, result)`
//! pair where `key` is either the decimal identifier of a dispatched call or
//! the literal [`LOG_KEY`].

use std::fmt;

use crate::id::CallId;

/// Response key the script side uses to forward diagnostic messages.
pub const LOG_KEY: &str = "log";

/// Argument literal substituted when a call carries no argument.
pub const EMPTY_ARGUMENT: &str = "''";

/// Expression run by an injected script's `onload` handler unless a host overrides it.
pub const DEFAULT_LOADED_NOTIFICATION: &str = "window.Android.scriptOnLoad()";

/// Location of a support script to inject into the hosted document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScriptLocator(String);

impl ScriptLocator {
	/// Creates a locator from any string-like value.
	pub fn new(locator: impl Into<String>) -> Self {
		Self(locator.into())
	}

	/// Returns the locator text.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl From<&str> for ScriptLocator {
	fn from(locator: &str) -> Self {
		Self::new(locator)
	}
}

impl From<String> for ScriptLocator {
	fn from(locator: String) -> Self {
		Self(locator)
	}
}

impl fmt::Display for ScriptLocator {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// One serialized call expression, ready for the host to evaluate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
	id: CallId,
	text: String,
}

impl Instruction {
	/// Builds `function(id, argument)`.
	///
	/// The argument is embedded verbatim; callers are responsible for quoting.
	pub fn call(function: &str, id: CallId, argument: &str) -> Self {
		Self {
			id,
			text: format!("{function}({id}, {argument})"),
		}
	}

	/// Identifier of the call this instruction carries.
	pub fn id(&self) -> CallId {
		self.id
	}

	/// Returns the instruction text.
	pub fn as_str(&self) -> &str {
		&self.text
	}

	/// Consumes the instruction, returning its text.
	pub fn into_string(self) -> String {
		self.text
	}
}

impl fmt::Display for Instruction {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.text)
	}
}

/// Replaces an absent or empty argument with `empty`.
pub fn normalize_argument(argument: Option<String>, empty: &str) -> String {
	match argument {
		Some(argument) if !argument.is_empty() => argument,
		_ => empty.to_owned(),
	}
}

/// Classification of an inbound response key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKey {
	/// A positive decimal identifier.
	Call(CallId),
	/// The diagnostic channel.
	Log,
	/// Anything else, including zero and negative numbers.
	Malformed,
}

impl ResponseKey {
	/// Classifies a raw key received from the script side.
	pub fn parse(raw: &str) -> Self {
		if let Some(id) = raw.parse::<u64>().ok().and_then(CallId::new) {
			return Self::Call(id);
		}
		if raw == LOG_KEY { Self::Log } else { Self::Malformed }
	}
}

/// Builds a snippet that appends a `<script>` element for `locator` to the
/// document head and runs `loaded_notification` once the script has loaded.
pub fn script_injection(locator: &ScriptLocator, loaded_notification: &str) -> String {
	let src = escape_single_quoted(locator.as_str());
	format!(
		"(function() {{var script=document.createElement('script'); script.type='text/javascript'; script.src='{src}'; \
		 script.onload=function(){{{loaded_notification}}}; document.getElementsByTagName('head').item(0).appendChild(script);}})()"
	)
}

fn escape_single_quoted(raw: &str) -> String {
	let mut out = String::with_capacity(raw.len());
	for ch in raw.chars() {
		match ch {
			'\\' => out.push_str("\\\\"),
			'\'' => out.push_str("\\'"),
			'\n' => out.push_str("\\n"),
			'\r' => out.push_str("\\r"),
			_ => out.push(ch),
		}
	}
	out
}
