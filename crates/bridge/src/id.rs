//! Call identifiers and their allocator.

use std::fmt;
use std::num::NonZeroU64;

use crate::{Error, Result};

/// Identifier correlating one dispatched call with its eventual response.
///
/// Always positive. Rendered on the wire as a plain decimal literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallId(NonZeroU64);

impl CallId {
	/// Wraps a raw identifier, rejecting zero.
	pub const fn new(raw: u64) -> Option<Self> {
		match NonZeroU64::new(raw) {
			Some(id) => Some(Self(id)),
			None => None,
		}
	}

	/// Returns the raw identifier.
	pub const fn get(self) -> u64 {
		self.0.get()
	}
}

impl fmt::Display for CallId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		self.0.fmt(f)
	}
}

/// Monotonic call identifier allocator.
///
/// Hands out 1, 2, 3, ... and never reuses a value. Once the last
/// representable identifier has been issued every further request fails with
/// [`Error::IdsExhausted`] instead of wrapping, since a wrapped identifier could
/// collide with a call that is still outstanding.
#[derive(Debug, Clone)]
pub struct IdAllocator {
	next: Option<NonZeroU64>,
}

impl Default for IdAllocator {
	fn default() -> Self {
		Self {
			next: Some(NonZeroU64::MIN),
		}
	}
}

impl IdAllocator {
	/// Creates an allocator whose first identifier is 1.
	pub fn new() -> Self {
		Self::default()
	}

	/// Allocates the next identifier.
	#[allow(clippy::should_implement_trait, reason = "convention")]
	pub fn next(&mut self) -> Result<CallId> {
		let id = self.next.ok_or(Error::IdsExhausted)?;
		self.next = id.checked_add(1);
		Ok(CallId(id))
	}

	/// Returns the identifier the next call to [`IdAllocator::next`] would yield.
	pub fn peek(&self) -> Option<CallId> {
		self.next.map(CallId)
	}

	#[cfg(test)]
	pub(crate) fn starting_at(first: NonZeroU64) -> Self {
		Self { next: Some(first) }
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn starts_at_one_and_increases() {
		let mut ids = IdAllocator::new();
		let issued: Vec<u64> = (0..5).map(|_| ids.next().map(CallId::get).unwrap()).collect();
		assert_eq!(issued, vec![1, 2, 3, 4, 5]);
		assert_eq!(ids.peek().map(CallId::get), Some(6));
	}

	#[test]
	fn exhaustion_is_reported_not_wrapped() {
		let mut ids = IdAllocator::starting_at(NonZeroU64::MAX);
		assert_eq!(ids.next().unwrap().get(), u64::MAX);
		assert!(matches!(ids.next(), Err(Error::IdsExhausted)));
		assert!(matches!(ids.next(), Err(Error::IdsExhausted)));
		assert!(ids.peek().is_none());
	}

	#[test]
	fn zero_is_not_an_identifier() {
		assert!(CallId::new(0).is_none());
		assert_eq!(CallId::new(42).map(|id| id.to_string()), Some("42".to_string()));
	}
}
