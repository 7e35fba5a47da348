// Copyright (c) 2023 Jonathan "Razordor" Alan Thomason
use std::env::consts::{DLL_PREFIX, DLL_SUFFIX};

use crate::platform::PlatformKey;

/// Root of the embedded binaries' virtual layout.
pub const RESOURCE_ROOT: &str = "/native";

const DYLIB: &str = ".dylib";
const JNILIB: &str = ".jnilib";

/// Decorates a logical library name following the host's shared library
/// naming convention, e.g. `gplcompression` becomes `libgplcompression.so`.
#[inline]
pub fn map_library_name(name: &str) -> String {
	format!("{DLL_PREFIX}{name}{DLL_SUFFIX}")
}

/// Virtual directory holding the embedded binaries for `key`.
#[inline]
pub fn resource_dir(key: &PlatformKey) -> String {
	format!("{RESOURCE_ROOT}/{key}/lib")
}

/// Where the embedded binary is expected, and what it is called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryCandidate {
	pub resource_dir: String,
	pub file_name: String,
	mac: bool,
}

impl LibraryCandidate {
	/// Resolves the candidate for the logical library `name` on `key`.
	pub fn resolve(name: &str, key: &PlatformKey) -> Self {
		Self::with_file_name(map_library_name(name), key)
	}

	/// Uses an already decorated file name.
	pub fn with_file_name(file_name: impl Into<String>, key: &PlatformKey) -> Self {
		Self {
			resource_dir: resource_dir(key),
			file_name: file_name.into(),
			mac: key.is_mac(),
		}
	}

	#[inline]
	pub fn resource_path(&self) -> String {
		format!("{}/{}", self.resource_dir, self.file_name)
	}

	/// The `.dylib`/`.jnilib` twin of this candidate on the Mac OS family.
	pub fn alternate(&self) -> Option<Self> {
		if !self.mac {
			return None;
		}
		let file_name = if let Some(stem) = self.file_name.strip_suffix(DYLIB) {
			format!("{stem}{JNILIB}")
		} else if let Some(stem) = self.file_name.strip_suffix(JNILIB) {
			format!("{stem}{DYLIB}")
		} else {
			return None;
		};
		Some(Self {
			file_name,
			..self.clone()
		})
	}
}
