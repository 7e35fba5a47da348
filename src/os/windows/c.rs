// Copyright (c) 2023 Jonathan "Razordor" Alan Thomason
#![allow(clippy::upper_case_acronyms)]
#![allow(non_snake_case)]

use std::ffi;
pub use std::os::windows::raw::HANDLE;

pub type HMODULE = HANDLE;
pub type PCWSTR = *const u16;
pub type DWORD = u32;

pub const LOAD_WITH_ALTERED_SEARCH_PATH: DWORD = 0x00000008u32;

extern "system" {
	pub fn LoadLibraryExW(lplibfilename: PCWSTR, hfile: HANDLE, dwflags: DWORD) -> HMODULE;
}

// provided by the C runtime std already links against.
extern "C" {
	pub fn atexit(cb: extern "C" fn()) -> ffi::c_int;
}
