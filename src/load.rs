// Copyright (c) 2023 Jonathan "Razordor" Alan Thomason

use std::ffi::OsStr;
use std::io;

mod sys;

/// The run-time loader used by [`Bootstrap`](crate::bootstrap::Bootstrap).
/// `Loader` can also be used to make custom loaders.
///
/// # Safety
/// Loading a shared library runs its initialisers. Implementors must leave the
/// library resident for the rest of the process once `open` returned `Ok`.
pub unsafe trait Loader {
	/// Attempts to load a shared library.
	///
	/// `path` is either a bare decorated file name, resolved through the system
	/// library search path, or an absolute path to the exact file.
	unsafe fn open(&self, path: &OsStr) -> io::Result<()>;
}

/// The process' dynamic loader.
///
/// Libraries opened through `System` are never closed: their symbols stay
/// available to subsequent native calls without a handle.
#[derive(Debug, Default, Clone, Copy)]
pub struct System;

unsafe impl<L: Loader + ?Sized> Loader for &L {
	#[inline]
	unsafe fn open(&self, path: &OsStr) -> io::Result<()> {
		(**self).open(path)
	}
}
