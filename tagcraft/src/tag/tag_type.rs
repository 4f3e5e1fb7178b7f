use super::{Tag, utils};
use crate::config::WriteOptions;
use crate::error::Result;
use crate::macros::err;
use crate::probe::Probe;
use crate::util::io::FileLike;

use std::fs::OpenOptions;
use std::path::Path;

/// The tag's format
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum TagType {
	/// Represents the ASF metadata objects
	Asf,
	/// Represents an ID3v2 tag, always written as ID3v2.4
	Id3v2,
	/// Represents an MP4 ilst atom
	Mp4Ilst,
	/// Represents a RIFF INFO LIST
	RiffInfo,
	/// Represents vorbis comments
	VorbisComments,
}

impl TagType {
	/// Whether the format can store an arbitrary key verbatim
	///
	/// This decides which [`ItemKey::Unknown`](crate::tag::ItemKey::Unknown) items survive a
	/// conversion.
	pub fn accepts_custom_key(self, key: &str) -> bool {
		if key.is_empty() {
			return false;
		}

		match self {
			// Anything printable, excluding '='
			TagType::VorbisComments => key.bytes().all(|b| (b' '..=b'}').contains(&b) && b != b'='),
			// Freeform atoms, or plain fourccs
			TagType::Mp4Ilst => {
				key.starts_with("----:") || key.chars().count() == 4 && key.chars().all(|c| c as u32 <= 0xFF)
			},
			// Either a frame ID, or a TXXX description
			TagType::Id3v2 => true,
			TagType::RiffInfo => key.len() == 4 && key.bytes().all(|b| b.is_ascii_alphanumeric()),
			TagType::Asf => true,
		}
	}

	/// Whether a key can hold more than one value
	///
	/// RIFF INFO stores a single chunk per ID.
	pub fn allows_multiple_values(self) -> bool {
		!matches!(self, TagType::RiffInfo)
	}

	/// Remove a tag from a [`Path`]
	///
	/// # Errors
	///
	/// See [`TagType::remove_from`]
	pub fn remove_from_path(&self, path: impl AsRef<Path>) -> Result<()> {
		let mut file = OpenOptions::new().read(true).write(true).open(path)?;
		self.remove_from(&mut file)
	}

	/// Remove a tag from a [`FileLike`]
	///
	/// # Errors
	///
	/// * It is unable to guess the file format
	/// * The format doesn't support the tag
	/// * It is unable to write to the file
	pub fn remove_from<F>(&self, file: &mut F) -> Result<()>
	where
		F: FileLike,
	{
		file.rewind()?;
		let probe = Probe::new(file).guess_file_type()?;
		let Some(file_type) = probe.file_type() else {
			err!(UnknownFormat);
		};

		if !file_type.supports_tag_type(*self) {
			err!(UnsupportedTag);
		}

		let file = probe.into_inner();
		utils::write_tag(&Tag::new(*self), file, file_type, WriteOptions::default())
	}
}

#[cfg(test)]
mod tests {
	use super::TagType;

	#[test_log::test]
	fn custom_keys() {
		assert!(TagType::VorbisComments.accepts_custom_key("MY KEY"));
		assert!(!TagType::VorbisComments.accepts_custom_key("MY=KEY"));
		assert!(!TagType::VorbisComments.accepts_custom_key(""));

		assert!(TagType::Mp4Ilst.accepts_custom_key("----:com.example:FOO"));
		assert!(TagType::Mp4Ilst.accepts_custom_key("\u{a9}xyz"));
		assert!(!TagType::Mp4Ilst.accepts_custom_key("FOOBAR"));

		assert!(TagType::RiffInfo.accepts_custom_key("IKEY"));
		assert!(!TagType::RiffInfo.accepts_custom_key("I KE"));
	}
}
