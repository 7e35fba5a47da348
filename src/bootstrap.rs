// Copyright (c) 2023 Jonathan "Razordor" Alan Thomason

//! The load sequence: embedded binary, then the system library path, then a
//! manual scan of the configured directories. First success wins.

use std::{
	ffi::OsStr,
	fmt, io,
	path::{Path, PathBuf},
};

use crate::{
	candidate::{map_library_name, LibraryCandidate},
	config::Config,
	error::Error,
	extract,
	load::{Loader, System},
	platform::PlatformKey,
	resource::Resources,
	Result,
};

/// The fallback tier that produced the library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
	/// Unpacked from the embedded resources.
	Embedded,
	/// Found by the dynamic loader's own search.
	LibraryPath,
	/// Found by scanning the configured directories.
	Scan,
}

impl fmt::Display for Tier {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Embedded => "embedded binaries",
			Self::LibraryPath => "library path",
			Self::Scan => "manual library path scan",
		})
	}
}

/// Terminal state of a bootstrap.
#[derive(Debug)]
pub enum LoadResult {
	Loaded {
		tier: Tier,
		/// What was handed to the loader: a bare file name for
		/// [`Tier::LibraryPath`], an absolute path otherwise.
		path: PathBuf,
	},
	NotLoaded(Error),
}

impl LoadResult {
	#[inline]
	pub const fn is_loaded(&self) -> bool {
		matches!(self, Self::Loaded { .. })
	}

	#[inline]
	pub fn tier(&self) -> Option<Tier> {
		match self {
			Self::Loaded { tier, .. } => Some(*tier),
			Self::NotLoaded(_) => None,
		}
	}

	#[inline]
	pub fn error(&self) -> Option<&Error> {
		match self {
			Self::Loaded { .. } => None,
			Self::NotLoaded(e) => Some(e),
		}
	}
}

/// One run of the load sequence for a single library.
pub struct Bootstrap<'a, L: Loader = System> {
	library: &'a str,
	file_name: String,
	config: Config,
	platform: PlatformKey,
	resources: &'a dyn Resources,
	loader: L,
}

impl<'a> Bootstrap<'a, System> {
	/// A bootstrap for `library` on the running host, using the process' loader.
	pub fn new(library: &'a str, config: Config, resources: &'a dyn Resources) -> Self {
		Self::with_loader(library, config, resources, System)
	}
}

impl<'a, L: Loader> Bootstrap<'a, L> {
	pub fn with_loader(
		library: &'a str,
		config: Config,
		resources: &'a dyn Resources,
		loader: L,
	) -> Self {
		Self {
			library,
			file_name: map_library_name(library),
			config,
			platform: PlatformKey::detect(),
			resources,
			loader,
		}
	}

	/// Overrides the detected platform key.
	pub fn platform(mut self, platform: PlatformKey) -> Self {
		self.platform = platform;
		self
	}

	/// Overrides the decorated file name.
	pub fn file_name(mut self, file_name: impl Into<String>) -> Self {
		self.file_name = file_name.into();
		self
	}

	#[inline]
	pub fn loader(&self) -> &L {
		&self.loader
	}

	/// Runs the whole sequence. Never panics on a failed tier and never
	/// returns early with an error; the outcome is the returned value.
	pub fn run(&self) -> LoadResult {
		self.preload();
		tracing::info!(
			library = self.library,
			native_library = %self.file_name,
			"loading native library"
		);

		if self.config.use_lib_path {
			tracing::debug!("embedded binaries disabled by configuration");
		} else if let Some(path) = self.load_embedded() {
			return LoadResult::Loaded {
				tier: Tier::Embedded,
				path,
			};
		}

		match self.open(OsStr::new(&self.file_name)) {
			Ok(()) => {
				tracing::info!(
					"loaded native library [{}] from the library path",
					self.file_name
				);
				return LoadResult::Loaded {
					tier: Tier::LibraryPath,
					path: PathBuf::from(&self.file_name),
				};
			}
			Err(e) => tracing::warn!("{e}"),
		}

		match self.scan() {
			Ok(path) => LoadResult::Loaded {
				tier: Tier::Scan,
				path,
			},
			Err(e) => {
				tracing::error!("{e}");
				LoadResult::NotLoaded(e)
			}
		}
	}

	fn preload(&self) {
		for path in &self.config.preload {
			match self.open(path.as_os_str()) {
				Ok(()) => tracing::info!("loaded [{}]", path.display()),
				Err(e) => tracing::warn!("{e}"),
			}
		}
	}

	fn load_embedded(&self) -> Option<PathBuf> {
		let candidate = LibraryCandidate::with_file_name(self.file_name.as_str(), &self.platform);
		let binary = extract::extract(self.resources, &candidate)?;
		let path = binary.path().to_path_buf();
		let result = self.open(path.as_os_str());
		binary.release();
		match result {
			Ok(()) => {
				tracing::info!("loaded native library from the embedded binaries");
				Some(path)
			}
			Err(e) => {
				tracing::warn!("{e}");
				None
			}
		}
	}

	/// Walks the configured directories in order and loads the first
	/// `file_name` found directly inside one of them. Errors in one directory
	/// do not stop the walk; all of them are kept for the final report.
	pub fn scan(&self) -> Result<PathBuf> {
		let mut errors = Vec::new();
		for dir in self.config.search_dirs() {
			let candidate = match probe(dir, &self.file_name) {
				Ok(Some(candidate)) => candidate,
				Ok(None) => continue,
				Err(source) => {
					let e = Error::Probe {
						dir: dir.clone(),
						source,
					};
					tracing::warn!("{e}");
					errors.push(e);
					continue;
				}
			};
			match self.open(candidate.as_os_str()) {
				Ok(()) => {
					tracing::info!(
						"manually located and loaded native library [{}] from the library path",
						candidate.display()
					);
					return Ok(candidate);
				}
				Err(e) => {
					tracing::warn!("{e}");
					errors.push(e);
				}
			}
		}
		Err(Error::NotFoundAnywhere {
			library: self.file_name.clone(),
			errors,
		})
	}

	fn open(&self, path: &OsStr) -> Result<()> {
		unsafe { self.loader.open(path) }.map_err(|source| Error::Load {
			path: PathBuf::from(path),
			source,
		})
	}
}

/// `Ok(None)` when `dir` does not exist, is not a directory, or does not
/// hold `file_name`.
fn probe(dir: &Path, file_name: &str) -> io::Result<Option<PathBuf>> {
	if dir.as_os_str().is_empty() {
		return Ok(None);
	}
	let meta = match dir.metadata() {
		Ok(meta) => meta,
		Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
		Err(e) => return Err(e),
	};
	if !meta.is_dir() {
		return Ok(None);
	}
	let candidate = dir.join(file_name);
	if candidate.try_exists()? {
		Ok(Some(candidate))
	} else {
		Ok(None)
	}
}
