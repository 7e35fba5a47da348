// Copyright (c) 2023 Jonathan "Razordor" Alan Thomason

use super::*;
use crate::os;

unsafe impl Loader for System {
	/// If successful, increments the reference count of the shared library and
	/// deliberately never decrements it.
	unsafe fn open(&self, path: &OsStr) -> io::Result<()> {
		os::dylib_open(path).map(|_handle| ())
	}
}
