// Copyright (c) 2023 Jonathan "Razordor" Alan Thomason
use std::os::windows::ffi::OsStrExt;
use std::{ffi, io, path, ptr};

use super::Handle;

mod c;

pub(crate) use c::atexit;

fn to_wide(path: &ffi::OsStr) -> Vec<u16> {
	path.encode_wide().chain(std::iter::once(0u16)).collect()
}

#[inline]
pub(crate) unsafe fn dylib_open(path: &ffi::OsStr) -> io::Result<Handle> {
	let wide_str: Vec<u16> = to_wide(path);
	// dependencies of an absolute path resolve next to it, not next to the executable.
	let flags = if path::Path::new(path).is_absolute() {
		c::LOAD_WITH_ALTERED_SEARCH_PATH
	} else {
		0
	};
	let handle = c::LoadLibraryExW(wide_str.as_ptr(), ptr::null_mut(), flags);
	if handle.is_null() {
		Err(io::Error::last_os_error())
	} else {
		Ok(handle)
	}
}
