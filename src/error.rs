// Copyright (c) 2023 Jonathan "Razordor" Alan Thomason
use std::{io, path::PathBuf};

use thiserror::Error;

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
	ExtractionFailure,
	LoadFailure,
	ProbeFailure,
	NotFoundAnywhere,
	Panicked,
}

#[derive(Debug, Error)]
pub enum Error {
	/// The embedded binary could not be copied to a temporary file.
	#[error("could not unpack the embedded binary: {0}")]
	Extraction(#[source] io::Error),
	/// The dynamic loader rejected `path`.
	#[error("could not load `{}`: {source}", .path.display())]
	Load {
		path: PathBuf,
		#[source]
		source: io::Error,
	},
	/// A configured search directory could not be inspected.
	#[error("could not probe `{}`: {source}", .dir.display())]
	Probe {
		dir: PathBuf,
		#[source]
		source: io::Error,
	},
	/// None of the fallback tiers produced a loadable library.
	#[error("could not locate native library `{library}`{}", summarize(.errors))]
	NotFoundAnywhere { library: String, errors: Vec<Error> },
	#[error("bootstrap panicked")]
	Panicked,
}

fn summarize(errors: &[Error]) -> String {
	match errors.last() {
		None => String::new(),
		Some(last) if errors.len() == 1 => format!(" (last error: {last})"),
		Some(last) => format!(" ({} errors, last: {last})", errors.len()),
	}
}

impl Error {
	#[inline]
	pub const fn kind(&self) -> ErrorKind {
		match self {
			Self::Extraction(_) => ErrorKind::ExtractionFailure,
			Self::Load { .. } => ErrorKind::LoadFailure,
			Self::Probe { .. } => ErrorKind::ProbeFailure,
			Self::NotFoundAnywhere { .. } => ErrorKind::NotFoundAnywhere,
			Self::Panicked => ErrorKind::Panicked,
		}
	}
}
