// Copyright (c) 2023 Jonathan "Razordor" Alan Thomason

//! Unpacks an embedded binary into a temporary file the dynamic loader can open.

use std::{
	fs,
	io::{self, Read, Write},
	path::Path,
};

use tempfile::TempPath;

use crate::{candidate::LibraryCandidate, error::Error, os, resource::Resources, Result};

const BUFFER_SIZE: usize = 8192;

/// An unpacked copy of an embedded binary.
///
/// The file is removed when this value is dropped.
#[derive(Debug)]
pub struct ExtractedBinary {
	path: TempPath,
}

impl ExtractedBinary {
	#[inline]
	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Removes the file once the loader is done with it.
	///
	/// A library that was already mapped stays usable on Unix. Where the OS
	/// refuses to remove a loaded image, removal is deferred to process exit.
	pub fn release(self) {
		let path = self.path.to_path_buf();
		if let Err(e) = self.path.close() {
			tracing::debug!(path = %path.display(), "deferring removal to exit: {e}");
			os::remove_at_exit(path);
		}
	}
}

/// Locates `candidate` in `resources` and copies it to a fresh temporary file.
///
/// Returns `None` if the resource does not exist or could not be unpacked;
/// unpacking failures are logged, the caller falls back to the library path
/// either way.
pub fn extract(resources: &dyn Resources, candidate: &LibraryCandidate) -> Option<ExtractedBinary> {
	match try_extract(resources, candidate) {
		Ok(Some(binary)) => {
			tracing::info!(path = %binary.path().display(), "temporary unpacked path");
			Some(binary)
		}
		Ok(None) => None,
		Err(e) => {
			tracing::error!("{e}");
			None
		}
	}
}

/// Like [`extract`], but surfaces unpacking failures.
pub fn try_extract(
	resources: &dyn Resources,
	candidate: &LibraryCandidate,
) -> Result<Option<ExtractedBinary>> {
	tracing::info!(
		dir = %candidate.resource_dir,
		file = %candidate.file_name,
		"attempting to load from embedded resources"
	);
	let Some((mut reader, found)) = open_resource(resources, candidate).map_err(Error::Extraction)?
	else {
		tracing::debug!(path = %candidate.resource_path(), "no embedded binary for this platform");
		return Ok(None);
	};
	unpack(&mut reader, &found.file_name)
		.map(|path| Some(ExtractedBinary { path }))
		.map_err(Error::Extraction)
}

fn open_resource<'r>(
	resources: &'r dyn Resources,
	candidate: &LibraryCandidate,
) -> io::Result<Option<(Box<dyn Read + 'r>, LibraryCandidate)>> {
	if let Some(reader) = resources.open(&candidate.resource_path())? {
		return Ok(Some((reader, candidate.clone())));
	}
	// one retry, with the other extension
	let Some(alternate) = candidate.alternate() else {
		return Ok(None);
	};
	Ok(resources
		.open(&alternate.resource_path())?
		.map(|reader| (reader, alternate)))
}

// Both the reader and the file handle are dropped on every path out of here.
// A failure part way through removes the partial file with the `NamedTempFile`.
fn unpack(reader: &mut dyn Read, file_name: &str) -> io::Result<TempPath> {
	let mut file = tempfile::Builder::new()
		.prefix("unpacked-")
		.suffix(&format!("-{file_name}"))
		.tempfile()?;

	let mut buffer = [0u8; BUFFER_SIZE];
	loop {
		let read = match reader.read(&mut buffer) {
			Ok(0) => break,
			Ok(read) => read,
			Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
			Err(e) => return Err(e),
		};
		file.write_all(&buffer[..read])?;
	}
	file.flush()?;
	set_executable(file.path())?;
	Ok(file.into_temp_path())
}

#[cfg(unix)]
fn set_executable(path: &Path) -> io::Result<()> {
	use std::os::unix::fs::PermissionsExt;
	// owner only
	fs::set_permissions(path, fs::Permissions::from_mode(0o700))
}

// Windows has no execute bit; the loader only needs the file to be readable.
#[cfg(not(unix))]
fn set_executable(_path: &Path) -> io::Result<()> {
	Ok(())
}
