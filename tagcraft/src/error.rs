//! Contains the errors that can arise within tagcraft
//!
//! The primary error is [`TagError`]. The type of error is determined by [`ErrorKind`],
//! which can be extended at any time.

use crate::asf::{ContainerType, DescriptorType};
use crate::commit::Veto;
use crate::file::FileType;
use crate::tag::NotMapped;
pub use crate::util::text::TextEncodingError;

use std::collections::TryReserveError;
use std::fmt::{Debug, Display, Formatter};

use oggpage::PageError;

/// Alias for `Result<T, TagError>`
pub type Result<T> = std::result::Result<T, TagError>;

/// The types of errors that can occur
#[derive(Debug)]
#[non_exhaustive]
pub enum ErrorKind {
	// File format related errors
	/// Unable to guess the format
	UnknownFormat,

	// File data related errors
	/// Attempting to read/write an abnormally large amount of data
	TooMuchData,
	/// Expected the data to be a different size than provided
	///
	/// This occurs when the size of an item is written as one value, but that size is either too
	/// big or small to be valid within the bounds of that item.
	SizeMismatch,
	/// Errors that occur while decoding a file
	FileDecoding(FileDecodingError),
	/// Errors that occur while encoding a file
	FileEncoding(FileEncodingError),
	/// A chunk, box, or object header could not be decoded
	BadChunk(ChunkError),

	// Picture related errors
	/// Provided an invalid picture
	NotAPicture,
	/// Attempted to write a picture that the format does not support
	UnsupportedPicture,

	// Tag related errors
	/// Arises when writing a tag to a file type that doesn't support it
	UnsupportedTag,
	/// Arises when a tag is expected (Ex. found an "ID3 " chunk in a WAV file), but isn't found
	FakeTag,
	/// Errors that arise while decoding text
	TextDecode(&'static str),
	/// Errors that arise while encoding text
	TextEncode(TextEncodingError),
	/// Arises when a generic key has no native mapping in a tag format
	NotMapped(NotMapped),
	/// Arises when an ASF descriptor is rejected by its container
	Validation(DescriptorError),

	/// Arises when an atom contains invalid data
	BadAtom(&'static str),

	// Commit related errors
	/// A listener refused the modification
	Veto(Veto),
	/// Another process holds a lock on the file
	FileLocked,
	/// The file is smaller than the configured minimum size
	FileTooSmall(u64),
	/// The file is not writable
	NotWritable,

	// Conversions for external errors
	/// Errors that arise while parsing OGG pages
	OggPage(PageError),
	/// Unable to convert bytes to a String
	StringFromUtf8(std::string::FromUtf8Error),
	/// Unable to convert bytes to a str
	StrFromUtf8(std::str::Utf8Error),
	/// Represents all cases of [`std::io::Error`].
	Io(std::io::Error),
	/// Represents all cases of [`std::fmt::Error`].
	Fmt(std::fmt::Error),
	/// Failure to allocate enough memory
	Alloc(TryReserveError),
	/// This should **never** be encountered
	Infallible(std::convert::Infallible),
}

/// The header family a [`ChunkError`] occurred in
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ChunkFamily {
	/// MP4 boxes (atoms)
	Mp4,
	/// RIFF chunks
	Riff,
	/// ASF objects
	Asf,
}

/// The ways a chunk header can be malformed
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ChunkErrorKind {
	/// The stream ended before the header was complete
	Truncated,
	/// The identifier is all zeros or contains invalid characters
	InvalidIdentifier,
	/// The declared length is smaller than the header, or extends past its parent
	BadLength,
}

/// An error that arises while decoding a chunk header
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct ChunkError {
	family: ChunkFamily,
	kind: ChunkErrorKind,
	offset: u64,
}

impl ChunkError {
	/// Create a new `ChunkError`
	#[must_use]
	pub const fn new(family: ChunkFamily, kind: ChunkErrorKind, offset: u64) -> Self {
		Self {
			family,
			kind,
			offset,
		}
	}

	/// The header family
	pub fn family(&self) -> ChunkFamily {
		self.family
	}

	/// Returns the [`ChunkErrorKind`]
	pub fn kind(&self) -> ChunkErrorKind {
		self.kind
	}

	/// The absolute offset of the offending header
	pub fn offset(&self) -> u64 {
		self.offset
	}
}

impl Debug for ChunkError {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{:?}: {:?} @ {}", self.family, self.kind, self.offset)
	}
}

impl Display for ChunkError {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		let problem = match self.kind {
			ChunkErrorKind::Truncated => "header is truncated",
			ChunkErrorKind::InvalidIdentifier => "invalid identifier",
			ChunkErrorKind::BadLength => "invalid length",
		};

		write!(f, "{:?} header at offset {}: {problem}", self.family, self.offset)
	}
}

/// The reasons a container can reject an ASF descriptor
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum DescriptorErrorKind {
	/// The descriptor's name is empty
	EmptyName,
	/// The payload is larger than the container allows
	PayloadTooLarge {
		/// The size of the offending payload
		size: u64,
		/// The largest payload the container can hold
		max: u64,
	},
	/// The container doesn't support GUID values
	GuidNotAllowed,
	/// The stream number is out of range for the container
	StreamNotAllowed(u16),
	/// The language index is out of range for the container
	LanguageNotAllowed(u16),
	/// The container only allows a single value per name
	MultipleValuesNotAllowed,
	/// The name isn't one of the container's fixed fields
	UnsupportedName(String),
	/// The container's field can't hold this type of value
	UnsupportedType(DescriptorType),
}

/// An error that arises when a descriptor is added to an incompatible ASF container
#[derive(Clone, PartialEq, Eq)]
pub struct DescriptorError {
	container: ContainerType,
	kind: DescriptorErrorKind,
}

impl DescriptorError {
	/// Create a new `DescriptorError`
	#[must_use]
	pub const fn new(container: ContainerType, kind: DescriptorErrorKind) -> Self {
		Self { container, kind }
	}

	/// The container that rejected the descriptor
	pub fn container(&self) -> ContainerType {
		self.container
	}

	/// Returns the [`DescriptorErrorKind`]
	pub fn kind(&self) -> &DescriptorErrorKind {
		&self.kind
	}
}

impl Debug for DescriptorError {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "ASF {:?}: {:?}", self.container, self.kind)
	}
}

impl Display for DescriptorError {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "ASF {:?}: ", self.container)?;
		match &self.kind {
			DescriptorErrorKind::EmptyName => write!(f, "descriptor names cannot be empty"),
			DescriptorErrorKind::PayloadTooLarge { size, max } => {
				write!(f, "payload of {size} bytes exceeds the maximum of {max}")
			},
			DescriptorErrorKind::GuidNotAllowed => write!(f, "GUID values are not allowed"),
			DescriptorErrorKind::StreamNotAllowed(stream) => {
				write!(f, "stream number {stream} is not allowed")
			},
			DescriptorErrorKind::LanguageNotAllowed(lang) => {
				write!(f, "language index {lang} is not allowed")
			},
			DescriptorErrorKind::MultipleValuesNotAllowed => {
				write!(f, "multiple values for one name are not allowed")
			},
			DescriptorErrorKind::UnsupportedName(name) => {
				write!(f, "\"{name}\" is not a field of this container")
			},
			DescriptorErrorKind::UnsupportedType(ty) => {
				write!(f, "{ty:?} values are not allowed for this field")
			},
		}
	}
}

/// An error that arises while decoding a file
pub struct FileDecodingError {
	format: Option<FileType>,
	description: &'static str,
}

impl FileDecodingError {
	/// Create a `FileDecodingError` from a [`FileType`] and description
	#[must_use]
	pub const fn new(format: FileType, description: &'static str) -> Self {
		Self {
			format: Some(format),
			description,
		}
	}

	/// Create a `FileDecodingError` without binding it to a [`FileType`]
	pub fn from_description(description: &'static str) -> Self {
		Self {
			format: None,
			description,
		}
	}

	/// Returns the associated [`FileType`], if one exists
	pub fn format(&self) -> Option<FileType> {
		self.format
	}

	/// Returns the error description
	pub fn description(&self) -> &str {
		self.description
	}
}

impl Debug for FileDecodingError {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		if let Some(format) = self.format {
			write!(f, "{:?}: {:?}", format, self.description)
		} else {
			write!(f, "{:?}", self.description)
		}
	}
}

impl Display for FileDecodingError {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		if let Some(format) = self.format {
			write!(f, "{:?}: {}", format, self.description)
		} else {
			write!(f, "{}", self.description)
		}
	}
}

/// An error that arises while encoding a file
pub struct FileEncodingError {
	format: Option<FileType>,
	description: &'static str,
}

impl FileEncodingError {
	/// Create a `FileEncodingError` from a [`FileType`] and description
	///
	/// # Examples
	///
	/// ```rust
	/// use tagcraft::error::FileEncodingError;
	/// use tagcraft::file::FileType;
	///
	/// // This error is bounded to `FileType::Mp4`, which will be displayed when the error is formatted
	/// let mp4_error = FileEncodingError::new(FileType::Mp4, "Something went wrong in the MP4 file!");
	/// ```
	#[must_use]
	pub const fn new(format: FileType, description: &'static str) -> Self {
		Self {
			format: Some(format),
			description,
		}
	}

	/// Create a `FileEncodingError` without binding it to a [`FileType`]
	pub fn from_description(description: &'static str) -> Self {
		Self {
			format: None,
			description,
		}
	}

	/// Returns the associated [`FileType`], if one exists
	pub fn format(&self) -> Option<FileType> {
		self.format
	}

	/// Returns the error description
	pub fn description(&self) -> &str {
		self.description
	}
}

impl Debug for FileEncodingError {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		if let Some(format) = self.format {
			write!(f, "{:?}: {:?}", format, self.description)
		} else {
			write!(f, "{:?}", self.description)
		}
	}
}

impl Display for FileEncodingError {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		if let Some(format) = self.format {
			write!(f, "{:?}: {}", format, self.description)
		} else {
			write!(f, "{}", self.description)
		}
	}
}

/// Errors that could occur within tagcraft
pub struct TagError {
	pub(crate) kind: ErrorKind,
}

impl TagError {
	/// Create a `TagError` from an [`ErrorKind`]
	///
	/// # Examples
	///
	/// ```rust
	/// use tagcraft::error::{ErrorKind, TagError};
	///
	/// let unknown_format = TagError::new(ErrorKind::UnknownFormat);
	/// ```
	#[must_use]
	pub const fn new(kind: ErrorKind) -> Self {
		Self { kind }
	}

	/// Returns the [`ErrorKind`]
	pub fn kind(&self) -> &ErrorKind {
		&self.kind
	}
}

impl std::error::Error for TagError {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self.kind {
			ErrorKind::Io(ref err) => Some(err),
			ErrorKind::OggPage(ref err) => Some(err),
			ErrorKind::StringFromUtf8(ref err) => Some(err),
			ErrorKind::StrFromUtf8(ref err) => Some(err),
			_ => None,
		}
	}
}

impl Debug for TagError {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{:?}", self.kind)
	}
}

impl From<ErrorKind> for TagError {
	fn from(kind: ErrorKind) -> Self {
		Self { kind }
	}
}

impl From<FileDecodingError> for TagError {
	fn from(input: FileDecodingError) -> Self {
		Self {
			kind: ErrorKind::FileDecoding(input),
		}
	}
}

impl From<FileEncodingError> for TagError {
	fn from(input: FileEncodingError) -> Self {
		Self {
			kind: ErrorKind::FileEncoding(input),
		}
	}
}

impl From<ChunkError> for TagError {
	fn from(input: ChunkError) -> Self {
		Self {
			kind: ErrorKind::BadChunk(input),
		}
	}
}

impl From<DescriptorError> for TagError {
	fn from(input: DescriptorError) -> Self {
		Self {
			kind: ErrorKind::Validation(input),
		}
	}
}

impl From<NotMapped> for TagError {
	fn from(input: NotMapped) -> Self {
		Self {
			kind: ErrorKind::NotMapped(input),
		}
	}
}

impl From<Veto> for TagError {
	fn from(input: Veto) -> Self {
		Self {
			kind: ErrorKind::Veto(input),
		}
	}
}

impl From<TextEncodingError> for TagError {
	fn from(input: TextEncodingError) -> Self {
		Self {
			kind: ErrorKind::TextEncode(input),
		}
	}
}

impl From<PageError> for TagError {
	fn from(input: PageError) -> Self {
		Self {
			kind: ErrorKind::OggPage(input),
		}
	}
}

impl From<std::io::Error> for TagError {
	fn from(input: std::io::Error) -> Self {
		Self {
			kind: ErrorKind::Io(input),
		}
	}
}

impl From<std::fmt::Error> for TagError {
	fn from(input: std::fmt::Error) -> Self {
		Self {
			kind: ErrorKind::Fmt(input),
		}
	}
}

impl From<std::string::FromUtf8Error> for TagError {
	fn from(input: std::string::FromUtf8Error) -> Self {
		Self {
			kind: ErrorKind::StringFromUtf8(input),
		}
	}
}

impl From<std::str::Utf8Error> for TagError {
	fn from(input: std::str::Utf8Error) -> Self {
		Self {
			kind: ErrorKind::StrFromUtf8(input),
		}
	}
}

impl From<TryReserveError> for TagError {
	fn from(input: TryReserveError) -> Self {
		Self {
			kind: ErrorKind::Alloc(input),
		}
	}
}

impl From<std::convert::Infallible> for TagError {
	fn from(input: std::convert::Infallible) -> Self {
		Self {
			kind: ErrorKind::Infallible(input),
		}
	}
}

impl Display for TagError {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self.kind {
			// Conversions
			ErrorKind::OggPage(ref err) => write!(f, "{err}"),
			ErrorKind::StringFromUtf8(ref err) => write!(f, "{err}"),
			ErrorKind::StrFromUtf8(ref err) => write!(f, "{err}"),
			ErrorKind::Io(ref err) => write!(f, "{err}"),
			ErrorKind::Fmt(ref err) => write!(f, "{err}"),
			ErrorKind::Alloc(ref err) => write!(f, "{err}"),

			ErrorKind::UnknownFormat => {
				write!(f, "No format could be determined from the provided file")
			},
			ErrorKind::NotAPicture => write!(f, "Picture: Encountered invalid data"),
			ErrorKind::UnsupportedPicture => {
				write!(f, "Picture: attempted to write an unsupported picture")
			},
			ErrorKind::UnsupportedTag => write!(
				f,
				"Attempted to write a tag to a format that does not support it"
			),
			ErrorKind::FakeTag => write!(f, "Reading: Expected a tag, found invalid data"),
			ErrorKind::TextDecode(message) => write!(f, "Text decoding: {message}"),
			ErrorKind::TextEncode(ref err) => write!(f, "Text encoding: {err}"),
			ErrorKind::NotMapped(ref err) => write!(f, "{err}"),
			ErrorKind::Validation(ref err) => write!(f, "{err}"),
			ErrorKind::BadAtom(message) => write!(f, "MP4 Atom: {message}"),
			ErrorKind::BadChunk(ref err) => write!(f, "{err}"),

			// Commit
			ErrorKind::Veto(ref veto) => write!(f, "{veto}"),
			ErrorKind::FileLocked => write!(f, "The file is locked by another process"),
			ErrorKind::FileTooSmall(len) => write!(
				f,
				"The file is too small to contain audio ({len} bytes)"
			),
			ErrorKind::NotWritable => write!(f, "The file is not writable"),

			// Files
			ErrorKind::TooMuchData => write!(
				f,
				"Attempted to read/write an abnormally large amount of data"
			),
			ErrorKind::SizeMismatch => write!(
				f,
				"Encountered an invalid item size, either too big or too small to be valid"
			),
			ErrorKind::FileDecoding(ref file_decode_err) => write!(f, "{file_decode_err}"),
			ErrorKind::FileEncoding(ref file_encode_err) => write!(f, "{file_encode_err}"),

			ErrorKind::Infallible(_) => write!(f, "A expected condition was not upheld"),
		}
	}
}
