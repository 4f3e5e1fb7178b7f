use super::tagged_file::TaggedFile;
use crate::config::{ParseOptions, WriteOptions};
use crate::error::Result;
use crate::tag::TagType;
use crate::util::io::FileLike;

use std::fs::OpenOptions;
use std::io::{Read, Seek};
use std::path::Path;

/// Provides various methods for interaction with a file
pub trait AudioFile: Into<TaggedFile> {
	/// The struct the file uses for audio properties
	///
	/// Not all formats can use [`FileProperties`](crate::properties::FileProperties) since they may contain additional information
	type Properties;

	/// Read a file from a reader
	///
	/// # Errors
	///
	/// Errors depend on the file and tags being read. See [`TagError`](crate::error::TagError)
	///
	/// # Examples
	///
	/// ```rust,no_run
	/// use tagcraft::config::ParseOptions;
	/// use tagcraft::file::AudioFile;
	/// use tagcraft::flac::FlacFile;
	///
	/// # fn main() -> tagcraft::error::Result<()> {
	/// let mut file = std::fs::File::open("foo.flac")?;
	///
	/// let parsed_file = FlacFile::read_from(&mut file, ParseOptions::new())?;
	/// # Ok(()) }
	/// ```
	fn read_from<R>(reader: &mut R, parse_options: ParseOptions) -> Result<Self>
	where
		R: Read + Seek,
		Self: Sized;

	/// Attempts to write all tags to a path
	///
	/// This writes to the file directly. For a crash-safe write, go through a
	/// [`Registry`](crate::registry::Registry) instead.
	///
	/// # Errors
	///
	/// * `path` does not exist
	/// * `path` is not writable
	/// * See [`AudioFile::save_to`]
	fn save_to_path(&self, path: impl AsRef<Path>, write_options: WriteOptions) -> Result<()> {
		self.save_to(
			&mut OpenOptions::new().read(true).write(true).open(path)?,
			write_options,
		)
	}

	/// Attempts to write all tags to a file
	///
	/// # Errors
	///
	/// See [`TagExt::save_to`](crate::tag::TagExt::save_to), however this is applicable to every tag in the file.
	fn save_to<F>(&self, file: &mut F, write_options: WriteOptions) -> Result<()>
	where
		F: FileLike;

	/// Returns a reference to the file's properties
	fn properties(&self) -> &Self::Properties;

	/// Checks if the file contains any tags
	fn contains_tag(&self) -> bool;

	/// Checks if the file contains the given [`TagType`]
	fn contains_tag_type(&self, tag_type: TagType) -> bool;
}
