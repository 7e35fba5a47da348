// Copyright (c) 2023 Jonathan "Razordor" Alan Thomason
use std::{
	env,
	ffi::{OsStr, OsString},
	path::PathBuf,
};

/// Ignore the embedded binaries and load from the library path instead.
pub const USE_LIBPATH_VAR: &str = "GPLCOMPRESSION_USE_LIBPATH";
/// Directories to scan manually, in place of the OS library search variable.
pub const LIBRARY_PATH_VAR: &str = "GPLCOMPRESSION_LIBRARY_PATH";
/// Libraries loaded by absolute path before anything else.
pub const PRELOAD_VAR: &str = "GPLCOMPRESSION_PRELOAD";
/// Directory the embedded binaries are laid out under.
pub const RESOURCE_ROOT_VAR: &str = "GPLCOMPRESSION_RESOURCE_ROOT";

/// The variable the OS dynamic loader consults for extra directories.
#[cfg(windows)]
pub const SEARCH_PATH_VAR: &str = "PATH";
#[cfg(target_os = "macos")]
pub const SEARCH_PATH_VAR: &str = "DYLD_LIBRARY_PATH";
#[cfg(target_os = "aix")]
pub const SEARCH_PATH_VAR: &str = "LIBPATH";
#[cfg(not(any(windows, target_os = "macos", target_os = "aix")))]
pub const SEARCH_PATH_VAR: &str = "LD_LIBRARY_PATH";

/// Bootstrap configuration. Read once, before the first load attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
	/// Skip the embedded binaries.
	pub use_lib_path: bool,
	/// Directories for the manual scan. `None` falls back to `search_path`.
	pub library_path: Option<Vec<PathBuf>>,
	/// The directories listed in [`SEARCH_PATH_VAR`] when the configuration
	/// was read.
	pub search_path: Vec<PathBuf>,
	/// Companion libraries loaded first; failures only get logged.
	pub preload: Vec<PathBuf>,
	/// Root of a [`ResourceDir`](crate::resource::ResourceDir). `None` uses the
	/// directory of the executable.
	pub resource_root: Option<PathBuf>,
}

impl Config {
	#[inline]
	pub fn new() -> Self {
		Self::default()
	}

	/// Reads the configuration from the process environment.
	#[inline]
	pub fn from_env() -> Self {
		Self::from_lookup(|key| env::var_os(key))
	}

	/// Reads the configuration through `lookup`.
	pub fn from_lookup<F>(lookup: F) -> Self
	where
		F: Fn(&str) -> Option<OsString>,
	{
		Self {
			use_lib_path: lookup(USE_LIBPATH_VAR)
				.map(|value| parse_bool(&value))
				.unwrap_or(false),
			library_path: lookup(LIBRARY_PATH_VAR)
				.filter(|value| !value.is_empty())
				.map(|value| split_paths(&value)),
			search_path: lookup(SEARCH_PATH_VAR)
				.map(|value| split_paths(&value))
				.unwrap_or_default(),
			preload: lookup(PRELOAD_VAR)
				.map(|value| split_paths(&value))
				.unwrap_or_default(),
			resource_root: lookup(RESOURCE_ROOT_VAR)
				.filter(|value| !value.is_empty())
				.map(PathBuf::from),
		}
	}

	pub fn use_lib_path(mut self, yes: bool) -> Self {
		self.use_lib_path = yes;
		self
	}

	pub fn library_path<I, P>(mut self, dirs: I) -> Self
	where
		I: IntoIterator<Item = P>,
		P: Into<PathBuf>,
	{
		self.library_path = Some(dirs.into_iter().map(Into::into).collect());
		self
	}

	pub fn preload<P: Into<PathBuf>>(mut self, path: P) -> Self {
		self.preload.push(path.into());
		self
	}

	pub fn resource_root<P: Into<PathBuf>>(mut self, root: P) -> Self {
		self.resource_root = Some(root.into());
		self
	}

	/// The directories the manual scan walks, in order.
	pub fn search_dirs(&self) -> &[PathBuf] {
		self.library_path.as_deref().unwrap_or(&self.search_path)
	}
}

/// `true` in any case means true; anything else, including garbage, is false.
fn parse_bool(value: &OsStr) -> bool {
	value
		.to_str()
		.map(|s| s.trim().eq_ignore_ascii_case("true"))
		.unwrap_or(false)
}

fn split_paths(value: &OsStr) -> Vec<PathBuf> {
	env::split_paths(value)
		.filter(|path| !path.as_os_str().is_empty())
		.collect()
}
