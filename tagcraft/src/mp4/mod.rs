//! MP4 specific items
//!
//! ## File notes
//!
//! The only supported tag format is [`Ilst`], stored at `moov.udta.meta.ilst`.
//!
//! When the tag grows or shrinks, every chunk offset table (`stco`, `co64`) and fragment header
//! (`tfhd`) pointing past the tag is corrected, so the audio stays addressable.
mod atom_info;
pub(crate) mod ilst;
mod properties;
mod read;
mod write;

use crate::config::{ParseOptions, WriteOptions};
use crate::error::Result;
use crate::file::{AudioFile, FileType, TaggedFile};
use crate::tag::TagType;
use crate::util::io::FileLike;

use std::io::{Read, Seek};

// Exports

/// This module contains the codes for all of the [Well-known data types]
///
/// [Well-known data types]: https://developer.apple.com/library/archive/documentation/QuickTime/QTFF/Metadata/Metadata.html#//apple_ref/doc/uid/TP40000939-CH1-SW34
pub mod constants {
	pub use super::ilst::constants::*;
}

pub use crate::mp4::properties::{Mp4Codec, Mp4Properties};
pub use atom_info::AtomIdent;
pub use ilst::Ilst;
pub use ilst::advisory_rating::AdvisoryRating;
pub use ilst::atom::{Atom, AtomData};
pub use ilst::data_type::DataType;

/// An MP4 file
#[derive(Debug, Clone, PartialEq)]
pub struct Mp4File {
	/// The file format from ftyp's "major brand" (Ex. "M4A ")
	pub(crate) ftyp: String,
	/// The parsed `ilst` (metadata) atom, if it exists
	pub(crate) ilst_tag: Option<Ilst>,
	/// The file's audio properties
	pub(crate) properties: Mp4Properties,
}

impl Mp4File {
	/// Returns the file format from ftyp's "major brand" (Ex. "M4A ")
	///
	/// # Examples
	///
	/// ```rust,no_run
	/// use tagcraft::config::ParseOptions;
	/// use tagcraft::file::AudioFile;
	/// use tagcraft::mp4::Mp4File;
	///
	/// # fn main() -> tagcraft::error::Result<()> {
	/// # let mut m4a_reader = std::io::Cursor::new(&[]);
	/// let m4a_file = Mp4File::read_from(&mut m4a_reader, ParseOptions::new())?;
	///
	/// assert_eq!(m4a_file.ftyp(), "M4A ");
	/// # Ok(()) }
	/// ```
	pub fn ftyp(&self) -> &str {
		self.ftyp.as_ref()
	}

	/// The file's `ilst` tag, if any
	pub fn ilst(&self) -> Option<&Ilst> {
		self.ilst_tag.as_ref()
	}

	/// A mutable reference to the file's `ilst` tag
	pub fn ilst_mut(&mut self) -> Option<&mut Ilst> {
		self.ilst_tag.as_mut()
	}

	/// Replace the file's `ilst` tag, returning the old one
	pub fn set_ilst(&mut self, tag: Ilst) -> Option<Ilst> {
		self.ilst_tag.replace(tag)
	}

	/// Remove the file's `ilst` tag
	pub fn remove_ilst(&mut self) -> Option<Ilst> {
		self.ilst_tag.take()
	}
}

impl AudioFile for Mp4File {
	type Properties = Mp4Properties;

	fn read_from<R>(reader: &mut R, parse_options: ParseOptions) -> Result<Self>
	where
		R: Read + Seek,
	{
		read::read_from(reader, parse_options)
	}

	/// Writes the `ilst` tag, removing the file's `ilst` if there is none
	fn save_to<F>(&self, file: &mut F, write_options: WriteOptions) -> Result<()>
	where
		F: FileLike,
	{
		let empty = Ilst::default();
		ilst::write::write_to(file, self.ilst_tag.as_ref().unwrap_or(&empty), write_options)
	}

	fn properties(&self) -> &Self::Properties {
		&self.properties
	}

	fn contains_tag(&self) -> bool {
		self.ilst_tag.is_some()
	}

	fn contains_tag_type(&self, tag_type: TagType) -> bool {
		tag_type == TagType::Mp4Ilst && self.ilst_tag.is_some()
	}
}

impl From<Mp4File> for TaggedFile {
	fn from(input: Mp4File) -> Self {
		let tags = input.ilst_tag.into_iter().map(Into::into).collect();
		TaggedFile::new(FileType::Mp4, input.properties.into(), tags)
	}
}

#[cfg(test)]
mod tests {
	use super::Mp4File;
	use super::properties::tests::{aac_entry, atom, audio_moov};
	use crate::config::{ParseOptions, WriteOptions};
	use crate::file::{AudioFile, FileType, TaggedFile, TaggedFileExt};
	use crate::mp4::Mp4Codec;
	use crate::tag::{Accessor, TagType};

	use std::io::{Cursor, Seek};
	use std::time::Duration;

	fn file() -> Vec<u8> {
		[
			atom(b"ftyp", b"M4A \0\0\0\0"),
			audio_moov(1000, 2000, &aac_entry()),
			atom(b"mdat", &[0; 32_000]),
		]
		.concat()
	}

	#[test_log::test]
	fn read() {
		let file = Mp4File::read_from(&mut Cursor::new(file()), ParseOptions::new()).unwrap();

		assert_eq!(file.ftyp(), "M4A ");
		assert!(file.ilst().is_none());
		assert!(!file.contains_tag());

		let properties = file.properties();
		assert_eq!(properties.duration(), Duration::from_secs(2));
		assert_eq!(properties.codec(), &Mp4Codec::AAC);
		assert_eq!(properties.sample_rate(), 44100);
		assert_eq!(properties.channels(), 2);

		let tagged_file: TaggedFile = file.into();
		assert_eq!(tagged_file.file_type(), FileType::Mp4);
		assert!(tagged_file.tags().is_empty());
	}

	#[test_log::test]
	fn save_and_reread() {
		let mut bytes = Cursor::new(file());
		let mut file = Mp4File::read_from(&mut bytes, ParseOptions::new()).unwrap();

		let mut ilst = super::Ilst::new();
		ilst.set_title(String::from("Song"));
		assert!(file.set_ilst(ilst).is_none());
		file.save_to(&mut bytes, WriteOptions::new()).unwrap();
		bytes.rewind().unwrap();

		let reread = Mp4File::read_from(&mut bytes, ParseOptions::new()).unwrap();
		assert_eq!(reread.ilst().unwrap().title().as_deref(), Some("Song"));
		assert!(reread.contains_tag_type(TagType::Mp4Ilst));
		assert_eq!(reread.properties().duration(), Duration::from_secs(2));

		// Saving without a tag removes it again
		let mut file = reread;
		assert!(file.remove_ilst().is_some());
		file.save_to(&mut bytes, WriteOptions::new()).unwrap();
		bytes.rewind().unwrap();

		let reread = Mp4File::read_from(&mut bytes, ParseOptions::new()).unwrap();
		assert!(reread.ilst().is_none());
	}

	#[test_log::test]
	fn not_mp4() {
		let mut bytes = Cursor::new(atom(b"moov", &[]));
		assert!(Mp4File::read_from(&mut bytes, ParseOptions::new()).is_err());
	}
}
