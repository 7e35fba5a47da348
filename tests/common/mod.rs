#![allow(dead_code)]

use std::{
	ffi::OsStr,
	fs, io,
	path::{Path, PathBuf},
	sync::{
		atomic::{AtomicUsize, Ordering},
		Arc, Mutex,
	},
};

use gplnative::{
	bootstrap::Bootstrap, config::Config, load::Loader, platform::PlatformKey, resource::*,
	LIBRARY_NAME,
};
use tracing_subscriber::{layer::Context, prelude::*, Layer};

pub const FILE_NAME: &str = "libgplcompression.so";
pub const RESOURCE_PATH: &str = "/native/Linux-amd64-64/lib/libgplcompression.so";
pub const PAYLOAD: &[u8] = b"\x7fELF not really a library";

pub static EMBEDDED: Embedded = Embedded::new(&[(RESOURCE_PATH, PAYLOAD)]);

pub fn linux() -> PlatformKey {
	PlatformKey::Posix {
		os_name: "Linux".to_owned(),
		os_arch: "amd64".to_owned(),
		data_model: "64".to_owned(),
	}
}

/// What the fake loader saw when it was asked to open a file.
#[derive(Debug, Clone)]
pub struct Opened {
	pub path: PathBuf,
	pub bytes: Vec<u8>,
	pub mode: u32,
}

/// A loader that pretends to load any existing file, and bare names only
/// when `system` is set.
#[derive(Debug, Default)]
pub struct FakeLoader {
	pub system: bool,
	pub reject_embedded: bool,
	pub reject: Vec<PathBuf>,
	pub attempts: Mutex<Vec<PathBuf>>,
	pub opened: Mutex<Vec<Opened>>,
}

impl FakeLoader {
	pub fn new(system: bool) -> Self {
		Self {
			system,
			..Self::default()
		}
	}

	pub fn attempts(&self) -> Vec<PathBuf> {
		self.attempts.lock().unwrap().clone()
	}

	pub fn opened(&self) -> Vec<Opened> {
		self.opened.lock().unwrap().clone()
	}
}

fn is_unpacked(path: &Path) -> bool {
	path.file_name()
		.map(|name| name.to_string_lossy().starts_with("unpacked-"))
		.unwrap_or(false)
}

#[cfg(unix)]
fn mode_of(meta: &fs::Metadata) -> u32 {
	use std::os::unix::fs::PermissionsExt;
	meta.permissions().mode() & 0o777
}

#[cfg(not(unix))]
fn mode_of(_meta: &fs::Metadata) -> u32 {
	0
}

unsafe impl Loader for FakeLoader {
	unsafe fn open(&self, path: &OsStr) -> io::Result<()> {
		let path = PathBuf::from(path);
		self.attempts.lock().unwrap().push(path.clone());
		if !path.is_absolute() {
			return if self.system {
				Ok(())
			} else {
				Err(io::Error::new(
					io::ErrorKind::NotFound,
					format!("{}: cannot open shared object file", path.display()),
				))
			};
		}
		if self.reject.contains(&path) || (self.reject_embedded && is_unpacked(&path)) {
			return Err(io::Error::new(io::ErrorKind::Other, "wrong ELF class"));
		}
		let meta = fs::metadata(&path)?;
		self.opened.lock().unwrap().push(Opened {
			bytes: fs::read(&path)?,
			mode: mode_of(&meta),
			path,
		});
		Ok(())
	}
}

pub fn bootstrap<'a>(
	config: Config,
	resources: &'a dyn Resources,
	loader: &'a FakeLoader,
) -> Bootstrap<'a, &'a FakeLoader> {
	Bootstrap::with_loader(LIBRARY_NAME, config, resources, loader)
		.platform(linux())
		.file_name(FILE_NAME)
}

/// Creates `dirs` under a fresh root; the library file is placed in the ones
/// flagged `true`.
pub fn lib_dirs(dirs: &[(&str, bool)]) -> (tempfile::TempDir, Vec<PathBuf>) {
	let root = tempfile::tempdir().unwrap();
	let paths = dirs
		.iter()
		.map(|(name, has_lib)| {
			let dir = root.path().join(name.trim_start_matches('/'));
			fs::create_dir_all(&dir).unwrap();
			if *has_lib {
				fs::write(dir.join(FILE_NAME), b"library").unwrap();
			}
			dir
		})
		.collect();
	(root, paths)
}

struct ErrorCounter(Arc<AtomicUsize>);

impl<S: tracing::Subscriber> Layer<S> for ErrorCounter {
	fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
		if *event.metadata().level() == tracing::Level::ERROR {
			self.0.fetch_add(1, Ordering::SeqCst);
		}
	}
}

/// Runs `f` and counts the error events it emits on this thread.
pub fn count_errors<T>(f: impl FnOnce() -> T) -> (T, usize) {
	let count = Arc::new(AtomicUsize::new(0));
	let subscriber = tracing_subscriber::registry().with(ErrorCounter(count.clone()));
	let out = tracing::subscriber::with_default(subscriber, f);
	(out, count.load(Ordering::SeqCst))
}
