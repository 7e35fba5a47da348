// Copyright (c) 2023 Jonathan "Razordor" Alan Thomason

use std::{panic, sync::OnceLock};

use crate::{bootstrap::LoadResult, error::Error};

/// Run-once holder of a bootstrap's outcome.
///
/// The outcome is published exactly once, with the release/acquire ordering of
/// the underlying [`OnceLock`]; until then [`is_loaded`](Self::is_loaded)
/// reads `false`. Concurrent first callers of [`get_or_init`](Self::get_or_init)
/// block until the single initialisation finishes and then all observe the
/// same outcome.
///
/// # Examples
///
/// ```rust
/// # use gplnative::{sync::Readiness, bootstrap::LoadResult, error::Error};
/// static READY: Readiness = Readiness::new();
/// assert!(!READY.is_loaded());
/// let result = READY.get_or_init(|| LoadResult::NotLoaded(Error::Panicked));
/// assert!(!result.is_loaded());
/// ```
#[derive(Debug)]
pub struct Readiness {
	result: OnceLock<LoadResult>,
}

impl Readiness {
	#[inline]
	pub const fn new() -> Self {
		Self {
			result: OnceLock::new(),
		}
	}

	/// Runs `init` if no outcome has been published yet, otherwise returns the
	/// published one. A panic inside `init` is published as
	/// [`Error::Panicked`] instead of unwinding into the caller.
	pub fn get_or_init<F>(&self, init: F) -> &LoadResult
	where
		F: FnOnce() -> LoadResult,
	{
		self.result
			.get_or_init(|| match panic::catch_unwind(panic::AssertUnwindSafe(init)) {
				Ok(result) => result,
				Err(_) => {
					tracing::error!("native library bootstrap panicked");
					LoadResult::NotLoaded(Error::Panicked)
				}
			})
	}

	/// Returns `None` if the outcome is not published yet. Never blocks.
	#[inline]
	pub fn get(&self) -> Option<&LoadResult> {
		self.result.get()
	}

	/// Whether the library was loaded; `false` before the outcome is published.
	#[inline]
	pub fn is_loaded(&self) -> bool {
		self.result.get().map_or(false, LoadResult::is_loaded)
	}
}

impl Default for Readiness {
	fn default() -> Self {
		Self::new()
	}
}
