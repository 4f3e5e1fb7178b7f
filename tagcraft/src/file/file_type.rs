use crate::tag::TagType;

use std::ffi::OsStr;
use std::path::Path;

/// List of common audio extensions
///
/// This contains the extensions of every supported [`FileType`], and can be used as a filter
/// when scanning directories.
///
/// # Examples
///
/// ```rust,no_run
/// use std::fs;
/// use tagcraft::file::EXTENSIONS;
///
/// # fn main() -> tagcraft::error::Result<()> {
/// for entry in fs::read_dir(".")? {
/// 	let entry = entry?;
///
/// 	let path = entry.path();
/// 	let Some(extension) = path.extension() else {
/// 		continue;
/// 	};
///
/// 	// Skip any non-audio file extensions
/// 	if !EXTENSIONS.iter().any(|e| *e == extension) {
/// 		continue;
/// 	}
///
/// 	// `entry` is *most likely* a supported file at this point
/// 	let parsed = tagcraft::read_from_path(path)?;
/// }
/// # Ok(()) }
/// ```
pub const EXTENSIONS: &[&str] = &[
	// Also update `FileType::from_ext()` below
	"asf", "wma", "wmv", "flac", "mp4", "m4a", "m4b", "m4p", "m4r", "m4v", "3gp", "ogg", "oga",
	"opus", "wav", "wave",
];

/// The type of file read
#[derive(PartialEq, Eq, Copy, Clone, Debug, Hash)]
#[allow(missing_docs)]
#[non_exhaustive]
pub enum FileType {
	Asf,
	Flac,
	Mp4,
	Opus,
	Vorbis,
	Wav,
}

impl FileType {
	/// Returns the file type's "primary" [`TagType`], or the one most likely to be used in the target format
	///
	/// | [`FileType`]              | [`TagType`]      |
	/// |---------------------------|------------------|
	/// | `Asf`                     | `Asf`            |
	/// | `Flac`, `Opus`, `Vorbis`  | `VorbisComments` |
	/// | `Mp4`                     | `Mp4Ilst`        |
	/// | `Wav`                     | `Id3v2`          |
	///
	/// # Examples
	///
	/// ```rust
	/// use tagcraft::file::FileType;
	/// use tagcraft::tag::TagType;
	///
	/// let file_type = FileType::Wav;
	/// assert_eq!(file_type.primary_tag_type(), TagType::Id3v2);
	/// ```
	pub fn primary_tag_type(&self) -> TagType {
		match self {
			FileType::Asf => TagType::Asf,
			FileType::Flac | FileType::Opus | FileType::Vorbis => TagType::VorbisComments,
			FileType::Mp4 => TagType::Mp4Ilst,
			FileType::Wav => TagType::Id3v2,
		}
	}

	/// Returns if the target `FileType` supports a [`TagType`]
	///
	/// # Examples
	///
	/// ```rust
	/// use tagcraft::file::FileType;
	/// use tagcraft::tag::TagType;
	///
	/// assert!(FileType::Wav.supports_tag_type(TagType::RiffInfo));
	/// assert!(!FileType::Mp4.supports_tag_type(TagType::Id3v2));
	/// ```
	pub fn supports_tag_type(&self, tag_type: TagType) -> bool {
		match self {
			FileType::Wav => matches!(tag_type, TagType::Id3v2 | TagType::RiffInfo),
			_ => self.primary_tag_type() == tag_type,
		}
	}

	/// Attempts to extract a [`FileType`] from an extension
	///
	/// # Examples
	///
	/// ```rust
	/// use tagcraft::file::FileType;
	///
	/// let extension = "wma";
	/// assert_eq!(FileType::from_ext(extension), Some(FileType::Asf));
	/// ```
	pub fn from_ext<E>(ext: E) -> Option<Self>
	where
		E: AsRef<OsStr>,
	{
		let ext = ext.as_ref().to_str()?.to_ascii_lowercase();

		// Also update `EXTENSIONS` above
		match ext.as_str() {
			"asf" | "wma" | "wmv" => Some(Self::Asf),
			"flac" => Some(Self::Flac),
			"mp4" | "m4a" | "m4b" | "m4p" | "m4r" | "m4v" | "3gp" => Some(Self::Mp4),
			"ogg" | "oga" => Some(Self::Vorbis),
			"opus" => Some(Self::Opus),
			"wav" | "wave" => Some(Self::Wav),
			_ => None,
		}
	}

	/// Attempts to determine a [`FileType`] from a path
	///
	/// # Examples
	///
	/// ```rust
	/// use std::path::Path;
	/// use tagcraft::file::FileType;
	///
	/// let path = Path::new("path/to/my.m4a");
	/// assert_eq!(FileType::from_path(path), Some(FileType::Mp4));
	/// ```
	pub fn from_path<P>(path: P) -> Option<Self>
	where
		P: AsRef<Path>,
	{
		let ext = path.as_ref().extension();
		ext.and_then(Self::from_ext)
	}

	/// Attempts to extract a [`FileType`] from a buffer
	///
	/// NOTES:
	///
	/// * This is for use in [`Probe::guess_file_type`], it is recommended to use it that way
	/// * This **will not** search past an ID3v2 tag at the start of the buffer.
	///   For this behavior, use [`Probe::guess_file_type`].
	///
	/// [`Probe::guess_file_type`]: crate::probe::Probe::guess_file_type
	///
	/// # Examples
	///
	/// ```rust
	/// use tagcraft::file::FileType;
	///
	/// let mut buf = [0; 12];
	/// buf[..4].copy_from_slice(b"RIFF");
	/// buf[8..].copy_from_slice(b"WAVE");
	///
	/// assert_eq!(FileType::from_buffer(&buf), Some(FileType::Wav));
	/// ```
	pub fn from_buffer(buf: &[u8]) -> Option<Self> {
		match Self::from_buffer_inner(buf) {
			Some(FileTypeGuessResult::Determined(file_ty)) => Some(file_ty),
			// We make no attempt to search past an ID3v2 tag here, since
			// we only provided a fixed-sized buffer to search from.
			//
			// That case is handled in `Probe::guess_file_type`
			_ => None,
		}
	}

	pub(crate) fn from_buffer_inner(buf: &[u8]) -> Option<FileTypeGuessResult> {
		use crate::id3::v2::unsynch_u32;

		if buf.is_empty() {
			return None;
		}

		match Self::quick_type_guess(buf) {
			Some(f_ty) => Some(FileTypeGuessResult::Determined(f_ty)),
			// Special case for ID3, gets checked in `Probe::guess_file_type`
			// The bare minimum size for an ID3v2 header is 10 bytes
			None if buf.len() >= 10 && &buf[..3] == b"ID3" => {
				let size = u32::from_be_bytes([buf[6], buf[7], buf[8], buf[9]]);
				Some(FileTypeGuessResult::MaybePrecededById3(unsynch_u32(size)))
			},
			None => None,
		}
	}

	fn quick_type_guess(buf: &[u8]) -> Option<Self> {
		use crate::asf::Guid;

		// Safe to index, since we return early on an empty buffer
		match buf[0] {
			79 if buf.len() >= 36 && &buf[..4] == b"OggS" => {
				if &buf[28..35] == b"\x01vorbis" {
					return Some(Self::Vorbis);
				} else if &buf[28..36] == b"OpusHead" {
					return Some(Self::Opus);
				}

				None
			},
			102 if buf.starts_with(b"fLaC") => Some(Self::Flac),
			82 if buf.len() >= 12 && &buf[..4] == b"RIFF" => {
				if &buf[8..12] == b"WAVE" {
					return Some(Self::Wav);
				}

				None
			},
			_ if buf.starts_with(Guid::HEADER_OBJECT.as_bytes()) => Some(Self::Asf),
			_ if buf.len() >= 8 && &buf[4..8] == b"ftyp" => Some(Self::Mp4),
			_ => None,
		}
	}
}

/// The result of a `FileType` guess
///
/// External callers of `FileType::from_buffer()` will only ever see `Determined` cases.
/// The remaining cases are used internally in `Probe::guess_file_type()`.
pub(crate) enum FileTypeGuessResult {
	/// The `FileType` was guessed
	Determined(FileType),
	/// The stream starts with an ID3v2 tag of the given size
	MaybePrecededById3(u32),
}
