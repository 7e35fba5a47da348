// Copyright (c) 2023 Jonathan "Razordor" Alan Thomason
#[cfg(unix)]
pub(crate) mod unix;
#[cfg(windows)]
pub(crate) mod windows;

#[cfg(unix)]
use unix as imp;
#[cfg(windows)]
use windows as imp;

use std::{ffi, io, path::PathBuf, sync};

pub(crate) type Handle = *mut ffi::c_void;

/// Opens a shared library. Bare names go through the system search path,
/// absolute paths load the exact file.
#[inline]
pub(crate) unsafe fn dylib_open(path: &ffi::OsStr) -> io::Result<Handle> {
	imp::dylib_open(path)
}

static PENDING_REMOVAL: sync::Mutex<Vec<PathBuf>> = sync::Mutex::new(Vec::new());
static EXIT_HOOK: sync::Once = sync::Once::new();

/// Queues `path` for removal when the process exits normally.
pub(crate) fn remove_at_exit(path: PathBuf) {
	EXIT_HOOK.call_once(|| {
		if unsafe { imp::atexit(remove_pending) } != 0 {
			tracing::warn!("could not register the exit hook for temporary files");
		}
	});
	match PENDING_REMOVAL.lock() {
		Ok(mut pending) => pending.push(path),
		Err(poison) => poison.into_inner().push(path),
	}
}

extern "C" fn remove_pending() {
	let mut pending = match PENDING_REMOVAL.lock() {
		Ok(guard) => guard,
		Err(poison) => poison.into_inner(),
	};
	// Best effort: a subscriber may already be gone and nothing is left to retry.
	for path in pending.drain(..) {
		if let Err(e) = std::fs::remove_file(&path) {
			tracing::debug!(path = %path.display(), "could not remove temporary file: {e}");
		}
	}
}
