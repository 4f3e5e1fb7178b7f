//! WAV specific items
//!
//! ## File notes
//!
//! * A WAV file may hold both a [`RiffInfoList`] and an [`Id3v2Tag`], in a `LIST` and an
//!   `ID3 `/`id3 ` chunk respectively.
//! * Chunks are padded to an even length. Some writers forget the padding, which is tolerated
//!   when reading, and fixed when writing.

mod properties;
mod read;
pub(crate) mod tag;
pub(crate) mod write;

use crate::config::{ParseOptions, WriteOptions};
use crate::error::Result;
use crate::file::{AudioFile, FileType, TaggedFile};
use crate::id3::v2::Id3v2Tag;
use crate::tag::TagType;
use crate::util::io::FileLike;

use std::io::{Read, Seek};

// Exports
pub use properties::{WavFormat, WavProperties};
pub use tag::RiffInfoList;

/// A WAV file
#[derive(Debug, Clone, PartialEq)]
pub struct WavFile {
	/// A RIFF INFO LIST
	pub(crate) riff_info_tag: Option<RiffInfoList>,
	/// An ID3v2 tag
	pub(crate) id3v2_tag: Option<Id3v2Tag>,
	/// The file's audio properties
	pub(crate) properties: WavProperties,
}

impl WavFile {
	/// The file's RIFF INFO list, if any
	pub fn riff_info(&self) -> Option<&RiffInfoList> {
		self.riff_info_tag.as_ref()
	}

	/// A mutable reference to the file's RIFF INFO list
	pub fn riff_info_mut(&mut self) -> Option<&mut RiffInfoList> {
		self.riff_info_tag.as_mut()
	}

	/// Replace the file's RIFF INFO list, returning the old one
	pub fn set_riff_info(&mut self, tag: RiffInfoList) -> Option<RiffInfoList> {
		self.riff_info_tag.replace(tag)
	}

	/// Remove the file's RIFF INFO list
	pub fn remove_riff_info(&mut self) -> Option<RiffInfoList> {
		self.riff_info_tag.take()
	}

	/// The file's ID3v2 tag, if any
	pub fn id3v2(&self) -> Option<&Id3v2Tag> {
		self.id3v2_tag.as_ref()
	}

	/// A mutable reference to the file's ID3v2 tag
	pub fn id3v2_mut(&mut self) -> Option<&mut Id3v2Tag> {
		self.id3v2_tag.as_mut()
	}

	/// Replace the file's ID3v2 tag, returning the old one
	pub fn set_id3v2(&mut self, tag: Id3v2Tag) -> Option<Id3v2Tag> {
		self.id3v2_tag.replace(tag)
	}

	/// Remove the file's ID3v2 tag
	pub fn remove_id3v2(&mut self) -> Option<Id3v2Tag> {
		self.id3v2_tag.take()
	}
}

impl AudioFile for WavFile {
	type Properties = WavProperties;

	fn read_from<R>(reader: &mut R, parse_options: ParseOptions) -> Result<Self>
	where
		R: Read + Seek,
	{
		read::read_from(reader, parse_options)
	}

	/// Writes both tags, removing any that are missing from the file
	fn save_to<F>(&self, file: &mut F, write_options: WriteOptions) -> Result<()>
	where
		F: FileLike,
	{
		let empty_info = RiffInfoList::default();
		let empty_id3v2 = Id3v2Tag::default();

		write::write_to(
			file,
			Some(self.riff_info_tag.as_ref().unwrap_or(&empty_info)),
			Some(self.id3v2_tag.as_ref().unwrap_or(&empty_id3v2)),
			write_options,
		)
	}

	fn properties(&self) -> &Self::Properties {
		&self.properties
	}

	fn contains_tag(&self) -> bool {
		self.riff_info_tag.is_some() || self.id3v2_tag.is_some()
	}

	fn contains_tag_type(&self, tag_type: TagType) -> bool {
		match tag_type {
			TagType::RiffInfo => self.riff_info_tag.is_some(),
			TagType::Id3v2 => self.id3v2_tag.is_some(),
			_ => false,
		}
	}
}

impl From<WavFile> for TaggedFile {
	fn from(input: WavFile) -> Self {
		let mut tags = Vec::with_capacity(2);

		if let Some(id3v2) = input.id3v2_tag {
			tags.push(id3v2.into());
		}

		if let Some(riff_info) = input.riff_info_tag {
			tags.push(riff_info.into());
		}

		TaggedFile::new(FileType::Wav, input.properties.into(), tags)
	}
}
