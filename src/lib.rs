// Copyright (c) 2023 Jonathan "Razordor" Alan Thomason
//! Makes the native `gplcompression` library available to the process before
//! anything calls into it.
//!
//! The bootstrap runs once per process and tries, in order:
//! 1. the embedded binary for the host platform, unpacked to a temporary file,
//! 2. the dynamic loader's own library search path,
//! 3. a manual scan of the configured library directories.
//!
//! Its outcome is published as a single flag, see [`is_native_code_loaded`].
//! A library that cannot be found leaves the flag `false`; the process keeps
//! running and callers are expected to degrade gracefully.
//!
//! ```no_run
//! if gplnative::is_native_code_loaded() {
//! 	// native codecs are available
//! }
//! ```
#![allow(clippy::missing_safety_doc)]

pub mod bootstrap;
pub mod candidate;
pub mod config;
pub mod error;
pub mod extract;
pub mod load;
mod os;
pub mod platform;
pub mod resource;
pub mod sync;

use bootstrap::{Bootstrap, LoadResult};
use config::Config;
use resource::{Chain, Resources, ResourceDir};

/// Logical name of the native compression library.
pub const LIBRARY_NAME: &str = "gplcompression";
/// Logical name of the LZO library the native library links against.
pub const LZO_LIBRARY_NAME: &str = "lzo2";

/// The result of a fallible gplnative operation.
pub type Result<T> = std::result::Result<T, error::Error>;

static NATIVE: sync::Readiness = sync::Readiness::new();

/// The decorated file name of [`LIBRARY_NAME`] on this host.
#[inline]
pub fn native_library_name() -> String {
	candidate::map_library_name(LIBRARY_NAME)
}

/// Runs the process-wide bootstrap if it has not run yet, with the
/// configuration read from the environment, and returns its outcome.
pub fn init() -> &'static LoadResult {
	NATIVE.get_or_init(|| {
		let config = Config::from_env();
		let dir = match config.resource_root {
			Some(ref root) => Some(ResourceDir::new(root)),
			None => ResourceDir::beside_executable()
				.map_err(|e| tracing::debug!("no resource directory: {e}"))
				.ok(),
		};
		let resources = Chain(dir.iter().map(|dir| dir as &dyn Resources).collect());
		Bootstrap::new(LIBRARY_NAME, config, &resources).run()
	})
}

/// Like [`init`], with explicit configuration and embedded binaries.
///
/// Only the first call of [`init`] or `init_with` in a process runs a
/// bootstrap; later calls return the published outcome and ignore their
/// arguments.
pub fn init_with(config: Config, resources: &dyn Resources) -> &'static LoadResult {
	NATIVE.get_or_init(|| Bootstrap::new(LIBRARY_NAME, config, resources).run())
}

/// Is the native library loaded?
///
/// Runs the bootstrap first if nothing has run it yet.
#[inline]
pub fn is_native_code_loaded() -> bool {
	init().is_loaded()
}

/// The process-wide readiness state, without triggering the bootstrap.
#[inline]
pub fn readiness() -> &'static sync::Readiness {
	&NATIVE
}
