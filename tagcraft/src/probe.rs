//! Format-agnostic file parsing tools

use crate::config::ParseOptions;
use crate::error::Result;
use crate::file::{FileType, FileTypeGuessResult, TaggedFile};
use crate::flac::find_marker;
use crate::macros::err;
use crate::registry::handler_for;

use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, SeekFrom};
use std::path::Path;

/// A format agnostic reader
///
/// This provides a way to determine the [`FileType`] of a reader, for when a concrete
/// type is not known. For reading and writing files by path, prefer a
/// [`Registry`](crate::registry::Registry).
///
/// ## Usage
///
/// When reading from a path, the [`FileType`] will be inferred from the path, rather than the
/// open file.
///
/// ```rust,no_run
/// # fn main() -> tagcraft::error::Result<()> {
/// use tagcraft::file::FileType;
/// use tagcraft::probe::Probe;
///
/// let probe = Probe::open("path/to/my.wma")?;
///
/// // Inferred from the `wma` extension
/// assert_eq!(probe.file_type(), Some(FileType::Asf));
/// # Ok(())
/// # }
/// ```
///
/// When a path isn't available, or is unreliable, content-based detection is also possible.
///
/// ```rust
/// # fn main() -> tagcraft::error::Result<()> {
/// use std::io::Cursor;
/// use tagcraft::file::FileType;
/// use tagcraft::probe::Probe;
///
/// let mut data = Vec::new();
/// data.extend(b"RIFF\x04\0\0\0WAVE");
///
/// let probe = Probe::new(Cursor::new(data)).guess_file_type()?;
/// assert_eq!(probe.file_type(), Some(FileType::Wav));
/// # Ok(())
/// # }
/// ```
pub struct Probe<R: Read> {
	inner: R,
	options: Option<ParseOptions>,
	f_ty: Option<FileType>,
}

impl<R: Read> Probe<R> {
	/// Create a new `Probe`
	///
	/// Before creating a `Probe`, consider wrapping it in a [`BufReader`] for better
	/// performance.
	#[must_use]
	pub const fn new(reader: R) -> Self {
		Self {
			inner: reader,
			options: None,
			f_ty: None,
		}
	}

	/// Create a new `Probe` with a specified [`FileType`]
	///
	/// Use this when the file type is known, and content-based detection is unnecessary.
	pub fn with_file_type(reader: R, file_type: FileType) -> Self {
		Self {
			inner: reader,
			options: None,
			f_ty: Some(file_type),
		}
	}

	/// Returns the current [`FileType`]
	pub fn file_type(&self) -> Option<FileType> {
		self.f_ty
	}

	/// Set the [`FileType`] with which to read the file
	pub fn set_file_type(mut self, file_type: FileType) -> Self {
		self.f_ty = Some(file_type);
		self
	}

	/// Set the [`ParseOptions`] for the Probe
	#[must_use]
	pub fn options(mut self, options: ParseOptions) -> Self {
		self.options = Some(options);
		self
	}

	/// Extract the reader
	pub fn into_inner(self) -> R {
		self.inner
	}
}

impl Probe<BufReader<File>> {
	/// Opens a file for reading
	///
	/// This will initially guess the [`FileType`] from the path, but
	/// this can be overwritten with [`Probe::guess_file_type`] or [`Probe::set_file_type`]
	///
	/// # Errors
	///
	/// * `path` does not exist
	pub fn open<P>(path: P) -> Result<Self>
	where
		P: AsRef<Path>,
	{
		let path = path.as_ref();
		log::debug!("Probe: Opening `{}` for reading", path.display());

		let file_type = FileType::from_path(path);
		log::debug!("Probe: Guessed file type `{:?}` from extension", file_type);

		Ok(Self {
			inner: BufReader::new(File::open(path)?),
			options: None,
			f_ty: file_type,
		})
	}
}

impl<R: Read + Seek> Probe<R> {
	/// Attempts to get the [`FileType`] based on the data in the reader
	///
	/// On success, the file type will be replaced. If none could be determined, the
	/// previous file type is kept.
	///
	/// NOTE: The chance for succeeding is higher than [`FileType::from_buffer`], since an
	/// ID3v2 tag in front of a FLAC stream is skipped, along with up to
	/// [`ParseOptions::max_junk_bytes`] of junk after it.
	///
	/// # Errors
	///
	/// All errors that occur within this function are [`std::io::Error`].
	pub fn guess_file_type(mut self) -> std::io::Result<Self> {
		let max_junk_bytes = self
			.options
			.map_or(ParseOptions::DEFAULT_MAX_JUNK_BYTES, |options| options.max_junk_bytes);

		let f_ty = self.guess_inner(max_junk_bytes)?;
		self.f_ty = f_ty.or(self.f_ty);

		log::debug!("Probe: Guessed file type: {:?}", self.f_ty);

		Ok(self)
	}

	fn guess_inner(&mut self, max_junk_bytes: usize) -> std::io::Result<Option<FileType>> {
		// Enough to hold the Ogg identification headers
		let mut buf = [0; 36];

		let starting_position = self.inner.stream_position()?;
		let buf_len = std::io::copy(
			&mut self.inner.by_ref().take(buf.len() as u64),
			&mut Cursor::new(&mut buf[..]),
		)? as usize;

		self.inner.seek(SeekFrom::Start(starting_position))?;

		let Some(file_type_guess) = FileType::from_buffer_inner(&buf[..buf_len]) else {
			return Ok(None);
		};

		match file_type_guess {
			FileTypeGuessResult::Determined(file_ty) => Ok(Some(file_ty)),
			// `id3_len` is the size of the tag, not including the header (10 bytes)
			FileTypeGuessResult::MaybePrecededById3(id3_len) => {
				log::debug!("Probe: ID3v2 tag detected, skipping {} bytes", 10 + id3_len);

				self.inner
					.seek(SeekFrom::Current(i64::from(10 + id3_len)))?;

				// The marker may be preceded by junk, such as tag padding that overran its size
				let marker = find_marker(&mut self.inner, max_junk_bytes)?;
				self.inner.seek(SeekFrom::Start(starting_position))?;

				Ok(marker.map(|_| FileType::Flac))
			},
		}
	}

	/// Attempts to extract a [`TaggedFile`] from the reader
	///
	/// If `read_properties` is false, the properties will be zeroed out.
	///
	/// # Errors
	///
	/// * No file type
	///     - This expects the file type to have been set already, either with
	///       [`Probe::guess_file_type`] or [`Probe::set_file_type`]. When reading from
	///       paths, this is not necessary.
	/// * The reader contains invalid data
	pub fn read(mut self) -> Result<TaggedFile> {
		let options = self.options.unwrap_or_default();

		if !options.read_tags && !options.read_properties {
			log::warn!("Skipping both tag and property reading, file will be empty");
		}

		match self.f_ty {
			Some(file_type) => handler_for(file_type).read(&mut self.inner, options),
			None => err!(UnknownFormat),
		}
	}
}

/// Read a [`TaggedFile`] from a [File]
///
/// # Errors
///
/// See:
///
/// * [`Probe::guess_file_type`]
/// * [`Probe::read`]
pub fn read_from(file: &mut File) -> Result<TaggedFile> {
	Probe::new(BufReader::new(file)).guess_file_type()?.read()
}

/// Read a [`TaggedFile`] from a path
///
/// NOTE: This will determine the [`FileType`] from the extension
///
/// # Errors
///
/// See:
///
/// * [`Probe::open`]
/// * [`Probe::read`]
pub fn read_from_path<P>(path: P) -> Result<TaggedFile>
where
	P: AsRef<Path>,
{
	Probe::open(path)?.read()
}

#[cfg(test)]
mod tests {
	use crate::config::ParseOptions;
	use crate::error::ErrorKind;
	use crate::file::FileType;
	use crate::probe::Probe;

	use std::io::Cursor;

	#[test_log::test]
	fn flac_behind_id3v2() {
		let mut data = Vec::new();
		// ID3v2.4 header, 4 bytes of content
		data.extend(b"ID3\x04\0\0\0\0\0\x04");
		data.extend([0; 4]);
		data.extend(b"fLaC");
		data.extend([0; 32]);

		let probe = Probe::new(Cursor::new(&data)).guess_file_type().unwrap();
		assert_eq!(probe.file_type(), Some(FileType::Flac));

		// The reader is left where it started
		assert_eq!(probe.into_inner().position(), 0);
	}

	#[test_log::test]
	fn junk_behind_id3v2() {
		let mut data = Vec::new();
		data.extend(b"ID3\x04\0\0\0\0\0\x04");
		data.extend([0; 4]);
		data.extend([0xFF; 100]);
		data.extend(b"fLaC");
		data.extend([0; 32]);

		let probe = Probe::new(Cursor::new(&data)).guess_file_type().unwrap();
		assert_eq!(probe.file_type(), Some(FileType::Flac));

		let probe = Probe::new(Cursor::new(&data))
			.options(ParseOptions::new().max_junk_bytes(50))
			.guess_file_type()
			.unwrap();
		assert_eq!(probe.file_type(), None);
	}

	#[test_log::test]
	fn unknown_keeps_previous_guess() {
		let data = [0xAB; 64];

		let probe = Probe::with_file_type(Cursor::new(&data), FileType::Mp4)
			.guess_file_type()
			.unwrap();
		assert_eq!(probe.file_type(), Some(FileType::Mp4));

		let probe = Probe::new(Cursor::new(&data)).guess_file_type().unwrap();
		assert_eq!(probe.file_type(), None);

		let err = probe.options(ParseOptions::new()).read().unwrap_err();
		assert!(matches!(err.kind(), ErrorKind::UnknownFormat));
	}
}
