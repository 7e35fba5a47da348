// Copyright (c) 2023 Jonathan "Razordor" Alan Thomason

//! Sources for the embedded binaries, addressed by slash separated virtual
//! paths such as `/native/Linux-amd64-64/lib/libgplcompression.so`.

use std::{
	fs, io,
	path::{Path, PathBuf},
};

/// A source of embedded resources.
pub trait Resources: Send + Sync {
	/// Opens the resource at the virtual `path`.
	///
	/// Returns `Ok(None)` if there is no such resource.
	fn open(&self, path: &str) -> io::Result<Option<Box<dyn io::Read + '_>>>;
}

/// Resources compiled into the binary.
///
/// # Examples
///
/// ```rust
/// # use gplnative::resource::*;
/// static NATIVE: Embedded = Embedded::new(&[
/// 	("/native/Linux-amd64-64/lib/libgplcompression.so", b"\x7fELF"),
/// ]);
/// assert!(NATIVE.open("/native/Linux-amd64-64/lib/libgplcompression.so").unwrap().is_some());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Embedded {
	entries: &'static [(&'static str, &'static [u8])],
}

impl Embedded {
	#[inline]
	pub const fn new(entries: &'static [(&'static str, &'static [u8])]) -> Self {
		Self { entries }
	}

	pub fn get(&self, path: &str) -> Option<&'static [u8]> {
		self.entries
			.iter()
			.find_map(|(name, bytes)| (*name == path).then_some(*bytes))
	}
}

impl Resources for Embedded {
	fn open(&self, path: &str) -> io::Result<Option<Box<dyn io::Read + '_>>> {
		Ok(self.get(path).map(|bytes| Box::new(bytes) as Box<dyn io::Read>))
	}
}

/// Resources laid out under a directory on the filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDir {
	root: PathBuf,
}

impl ResourceDir {
	#[inline]
	pub fn new<P: Into<PathBuf>>(root: P) -> Self {
		Self { root: root.into() }
	}

	/// The directory containing the current executable.
	pub fn beside_executable() -> io::Result<Self> {
		let exe = std::env::current_exe()?;
		match exe.parent() {
			Some(dir) => Ok(Self::new(dir)),
			None => Err(io::Error::new(
				io::ErrorKind::NotFound,
				"executable has no parent directory",
			)),
		}
	}

	#[inline]
	pub fn root(&self) -> &Path {
		&self.root
	}

	/// Maps a virtual path onto the filesystem. Empty and `.` components are
	/// dropped and `..` is refused.
	pub fn resolve(&self, path: &str) -> Option<PathBuf> {
		let mut resolved = self.root.clone();
		for component in path.split('/') {
			match component {
				"" | "." => {}
				".." => return None,
				name => resolved.push(name),
			}
		}
		Some(resolved)
	}
}

impl Resources for ResourceDir {
	fn open(&self, path: &str) -> io::Result<Option<Box<dyn io::Read + '_>>> {
		let Some(file_path) = self.resolve(path) else {
			return Ok(None);
		};
		match fs::metadata(&file_path) {
			Ok(meta) if meta.is_file() => Ok(Some(Box::new(fs::File::open(&file_path)?))),
			Ok(_) => Ok(None),
			Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
			Err(e) => Err(e),
		}
	}
}

/// Tries each source in order; the first one holding the resource wins.
pub struct Chain<'a>(pub Vec<&'a dyn Resources>);

impl Resources for Chain<'_> {
	fn open(&self, path: &str) -> io::Result<Option<Box<dyn io::Read + '_>>> {
		for source in &self.0 {
			if let Some(reader) = source.open(path)? {
				return Ok(Some(reader));
			}
		}
		Ok(None)
	}
}

/// A source holding nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct Empty;

impl Resources for Empty {
	#[inline]
	fn open(&self, _path: &str) -> io::Result<Option<Box<dyn io::Read + '_>>> {
		Ok(None)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Read;

	static TABLE: Embedded = Embedded::new(&[("/native/a/lib/liba.so", b"alpha")]);

	fn read_all(source: &dyn Resources, path: &str) -> Option<Vec<u8>> {
		let mut reader = source.open(path).unwrap()?;
		let mut buf = Vec::new();
		reader.read_to_end(&mut buf).unwrap();
		Some(buf)
	}

	#[test]
	fn test_embedded_lookup() {
		assert_eq!(read_all(&TABLE, "/native/a/lib/liba.so").unwrap(), b"alpha");
		assert!(read_all(&TABLE, "/native/b/lib/liba.so").is_none());
	}

	#[test]
	fn test_resource_dir() {
		let root = tempfile::tempdir().unwrap();
		let dir = root.path().join("native").join("a").join("lib");
		fs::create_dir_all(&dir).unwrap();
		fs::write(dir.join("liba.so"), b"beta").unwrap();

		let source = ResourceDir::new(root.path());
		assert_eq!(read_all(&source, "/native/a/lib/liba.so").unwrap(), b"beta");
		assert!(read_all(&source, "/native/a/lib/missing.so").is_none());
		// directories are not resources
		assert!(read_all(&source, "/native/a/lib").is_none());
		assert!(source.resolve("/native/../secret").is_none());
	}

	#[test]
	fn test_chain_order() {
		let root = tempfile::tempdir().unwrap();
		let dir = root.path().join("native").join("a").join("lib");
		fs::create_dir_all(&dir).unwrap();
		fs::write(dir.join("liba.so"), b"from disk").unwrap();
		let disk = ResourceDir::new(root.path());

		let chain = Chain(vec![&Empty as &dyn Resources, &TABLE, &disk]);
		assert_eq!(read_all(&chain, "/native/a/lib/liba.so").unwrap(), b"alpha");
		let chain = Chain(vec![&disk as &dyn Resources, &TABLE]);
		assert_eq!(read_all(&chain, "/native/a/lib/liba.so").unwrap(), b"from disk");
	}
}
