use crate::error::Result;

use std::fs::File;
use std::io::{self, Seek, SeekFrom, Write};
use std::path::Path;

use tempfile::NamedTempFile;

/// A copy of the original file, living next to it
///
/// The copy is removed on drop, unless it has been moved into place.
pub(super) struct StagedFile {
	temp: NamedTempFile,
}

impl StagedFile {
	/// Copy `original` into a temporary file in the same directory
	///
	/// Staying in the same directory keeps the final rename on one filesystem.
	pub(super) fn create(original: &Path) -> Result<Self> {
		let dir = match original.parent() {
			Some(parent) if !parent.as_os_str().is_empty() => parent,
			_ => Path::new("."),
		};

		let name = original
			.file_name()
			.map(|name| name.to_string_lossy())
			.unwrap_or_default();

		let mut temp = tempfile::Builder::new()
			.prefix(&format!(".{name}."))
			.suffix(".tmp")
			.tempfile_in(dir)?;

		let copied = io::copy(&mut File::open(original)?, temp.as_file_mut())?;
		temp.as_file_mut().rewind()?;

		log::debug!(
			"Staged {copied} bytes of `{}` at `{}`",
			original.display(),
			temp.path().display()
		);

		Ok(Self { temp })
	}

	pub(super) fn path(&self) -> &Path {
		self.temp.path()
	}

	pub(super) fn file_mut(&mut self) -> &mut File {
		self.temp.as_file_mut()
	}

	/// Flush the staged file, and rewind it for reading
	pub(super) fn finish(&mut self) -> Result<()> {
		let file = self.temp.as_file_mut();
		file.flush()?;
		file.sync_all()?;
		file.seek(SeekFrom::Start(0))?;
		Ok(())
	}

	/// Move the staged file to `destination`
	pub(super) fn persist(self, destination: &Path) -> Result<()> {
		self.temp.persist(destination).map_err(|e| e.error)?;
		Ok(())
	}

	/// Remove the staged file
	///
	/// This only fails if the file could not be deleted, which is logged and otherwise ignored.
	pub(super) fn discard(self) {
		let path = self.temp.path().to_path_buf();
		if let Err(e) = self.temp.close() {
			log::warn!("Failed to remove staged file `{}`: {e}", path.display());
		}
	}
}
