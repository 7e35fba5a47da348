// Copyright (c) 2023 Jonathan "Razordor" Alan Thomason

//! Derives the key that selects the embedded binary for the host.

use std::{env, fmt};

/// Raw facts about the host the platform key is computed from.
///
/// The spellings follow the ones the packaging layout was historically built
/// with (`Linux`, `Mac OS X`, `amd64`, ...), not Rust's target names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostFacts {
	pub os_name: String,
	pub os_arch: String,
	/// Pointer width in bits, `"32"` or `"64"`.
	pub data_model: String,
	/// Value of the `OS` environment variable.
	pub os_env: Option<String>,
	/// Value of the `PLATFORM` environment variable.
	pub platform_env: Option<String>,
}

impl HostFacts {
	/// Reads the facts of the running process.
	pub fn current() -> Self {
		Self {
			os_name: os_name(env::consts::OS).to_owned(),
			os_arch: os_arch(env::consts::ARCH, env::consts::OS).to_owned(),
			data_model: data_model().to_owned(),
			os_env: env::var("OS").ok(),
			platform_env: env::var("PLATFORM").ok(),
		}
	}
}

fn os_name(os: &str) -> &str {
	match os {
		"linux" | "android" => "Linux",
		"macos" => "Mac OS X",
		"ios" => "iOS",
		"windows" => "Windows",
		"freebsd" => "FreeBSD",
		"openbsd" => "OpenBSD",
		"netbsd" => "NetBSD",
		"dragonfly" => "DragonFly",
		"solaris" | "illumos" => "SunOS",
		"aix" => "AIX",
		other => other,
	}
}

fn os_arch<'a>(arch: &'a str, os: &str) -> &'a str {
	match arch {
		"x86_64" if os == "macos" => "x86_64",
		"x86_64" => "amd64",
		"x86" => "i386",
		"powerpc64" => "ppc64",
		"powerpc" => "ppc",
		"sparc64" => "sparcv9",
		other => other,
	}
}

const fn data_model() -> &'static str {
	if cfg!(target_pointer_width = "64") {
		"64"
	} else if cfg!(target_pointer_width = "16") {
		"16"
	} else {
		"32"
	}
}

/// The two ways a platform exposes its architecture information.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsFamily {
	Posix,
	Windows,
}

impl OsFamily {
	pub fn of(os_name: &str) -> Self {
		if os_name.to_ascii_lowercase().contains("windows") {
			Self::Windows
		} else {
			Self::Posix
		}
	}
}

/// Identifies the host OS/architecture combination.
///
/// Missing facts become empty fields; rendering never fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformKey {
	Posix {
		os_name: String,
		os_arch: String,
		data_model: String,
	},
	Windows {
		os: String,
		platform: String,
	},
}

impl PlatformKey {
	/// Computes the key of the running process.
	#[inline]
	pub fn detect() -> Self {
		Self::from_facts(&HostFacts::current())
	}

	pub fn from_facts(facts: &HostFacts) -> Self {
		match OsFamily::of(&facts.os_name) {
			OsFamily::Windows => Self::Windows {
				os: facts.os_env.clone().unwrap_or_default(),
				platform: facts.platform_env.clone().unwrap_or_default(),
			},
			OsFamily::Posix => Self::Posix {
				os_name: facts.os_name.clone(),
				os_arch: facts.os_arch.clone(),
				data_model: facts.data_model.clone(),
			},
		}
	}

	#[inline]
	pub const fn family(&self) -> OsFamily {
		match self {
			Self::Posix { .. } => OsFamily::Posix,
			Self::Windows { .. } => OsFamily::Windows,
		}
	}

	/// Whether the key belongs to the Mac OS family, where `.dylib` and
	/// `.jnilib` are interchangeable.
	pub fn is_mac(&self) -> bool {
		match self {
			Self::Posix { os_name, .. } => os_name.contains("Mac"),
			Self::Windows { .. } => false,
		}
	}
}

impl fmt::Display for PlatformKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Posix {
				os_name,
				os_arch,
				data_model,
			} => write!(f, "{}-{os_arch}-{data_model}", os_name.replace(' ', "_")),
			Self::Windows { os, platform } => write!(f, "{os}-{platform}"),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn posix(os_name: &str, os_arch: &str, data_model: &str) -> HostFacts {
		HostFacts {
			os_name: os_name.to_owned(),
			os_arch: os_arch.to_owned(),
			data_model: data_model.to_owned(),
			..HostFacts::default()
		}
	}

	#[test]
	fn test_linux_key() {
		let key = PlatformKey::from_facts(&posix("Linux", "amd64", "64"));
		assert_eq!(key.family(), OsFamily::Posix);
		assert_eq!(key.to_string(), "Linux-amd64-64");
		assert!(!key.is_mac());
	}

	#[test]
	fn test_mac_key_replaces_spaces() {
		let key = PlatformKey::from_facts(&posix("Mac OS X", "x86_64", "64"));
		assert_eq!(key.to_string(), "Mac_OS_X-x86_64-64");
		assert!(key.is_mac());
	}

	#[test]
	fn test_windows_key_reads_env() {
		let facts = HostFacts {
			os_name: "Windows 10".to_owned(),
			os_env: Some("Windows_NT".to_owned()),
			platform_env: Some("x64".to_owned()),
			..posix("", "amd64", "64")
		};
		let key = PlatformKey::from_facts(&facts);
		assert_eq!(key.family(), OsFamily::Windows);
		assert_eq!(key.to_string(), "Windows_NT-x64");
	}

	#[test]
	fn test_windows_family_is_case_insensitive() {
		assert_eq!(OsFamily::of("WINDOWS SERVER 2019"), OsFamily::Windows);
		assert_eq!(OsFamily::of("windows"), OsFamily::Windows);
		assert_eq!(OsFamily::of("SunOS"), OsFamily::Posix);
	}

	#[test]
	fn test_missing_facts_are_empty() {
		let facts = HostFacts {
			os_name: "Windows".to_owned(),
			..HostFacts::default()
		};
		assert_eq!(PlatformKey::from_facts(&facts).to_string(), "-");
		assert_eq!(PlatformKey::from_facts(&HostFacts::default()).to_string(), "--");
	}

	#[test]
	fn test_current_facts() {
		let facts = HostFacts::current();
		assert!(!facts.os_name.is_empty());
		assert!(!facts.os_arch.is_empty());
		assert!(facts.data_model == "32" || facts.data_model == "64");
		if cfg!(target_os = "linux") {
			assert_eq!(facts.os_name, "Linux");
		}
		if cfg!(all(target_os = "linux", target_arch = "x86_64")) {
			assert_eq!(PlatformKey::detect().to_string(), "Linux-amd64-64");
		}
	}
}
