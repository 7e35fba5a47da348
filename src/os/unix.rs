// Copyright (c) 2023 Jonathan "Razordor" Alan Thomason
use super::Handle;
use std::os::unix::ffi::OsStrExt;
use std::{ffi, io};

pub(crate) use libc::atexit;

#[cfg(not(any(target_os = "linux", target_os = "macos", target_env = "gnu")))]
use std::sync;

// `dlerror` keeps its message in a static buffer outside of glibc and the apple libc.
#[cfg(not(any(target_os = "linux", target_os = "macos", target_env = "gnu")))]
#[inline]
fn dylib_guard<'a>() -> sync::LockResult<sync::MutexGuard<'a, ()>> {
	static LOCK: sync::Mutex<()> = sync::Mutex::new(());
	LOCK.lock()
}

#[cfg(any(target_os = "linux", target_os = "macos", target_env = "gnu"))]
#[inline(always)]
fn dylib_guard() {}

unsafe fn dylib_error() -> io::Error {
	let msg = libc::dlerror();
	if msg.is_null() {
		io::Error::new(io::ErrorKind::Other, "unknown dynamic loader error")
	} else {
		let e = ffi::CStr::from_ptr(msg).to_string_lossy().into_owned();
		io::Error::new(io::ErrorKind::Other, e)
	}
}

unsafe fn map_result<F>(f: F) -> io::Result<Handle>
where
	F: FnOnce() -> Handle,
{
	let _lock = dylib_guard();
	let _ = libc::dlerror(); // clear existing errors
	let handle: Handle = f();
	if handle.is_null() {
		Err(dylib_error())
	} else {
		Ok(handle)
	}
}

// RTLD_GLOBAL so the symbols back later native calls without a handle.
pub(crate) unsafe fn dylib_open(path: &ffi::OsStr) -> io::Result<Handle> {
	let c_str = ffi::CString::new(path.as_bytes())?;
	map_result(|| libc::dlopen(c_str.as_ptr(), libc::RTLD_NOW | libc::RTLD_GLOBAL))
}
