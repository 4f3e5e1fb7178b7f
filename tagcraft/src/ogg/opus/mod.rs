pub(super) mod properties;

use super::constants::{OPUSHEAD, OPUSTAGS};
use super::read::read_headers;
use super::tag::VorbisComments;
use super::write::{OggFormat, write};
use crate::config::{ParseOptions, WriteOptions};
use crate::error::Result;
use crate::file::{AudioFile, FileType, TaggedFile};
use crate::properties::FileProperties;
use crate::tag::TagType;
use crate::util::io::FileLike;
use properties::OpusProperties;

use std::io::{Read, Seek};

/// An Ogg Opus file
#[derive(Debug, Clone, PartialEq)]
pub struct OpusFile {
	/// The Vorbis comments contained in the file
	///
	/// NOTE: While a comment packet is required, it isn't required to actually have any data.
	pub(crate) vorbis_comments_tag: VorbisComments,
	/// The file's audio properties
	pub(crate) properties: OpusProperties,
}

impl OpusFile {
	/// The file's Vorbis comments
	pub fn vorbis_comments(&self) -> &VorbisComments {
		&self.vorbis_comments_tag
	}

	/// A mutable reference to the file's Vorbis comments
	pub fn vorbis_comments_mut(&mut self) -> &mut VorbisComments {
		&mut self.vorbis_comments_tag
	}

	/// Replace the file's Vorbis comments, returning the old ones
	pub fn set_vorbis_comments(&mut self, tag: VorbisComments) -> VorbisComments {
		std::mem::replace(&mut self.vorbis_comments_tag, tag)
	}
}

impl AudioFile for OpusFile {
	type Properties = OpusProperties;

	fn read_from<R>(reader: &mut R, parse_options: ParseOptions) -> Result<Self>
	where
		R: Read + Seek,
	{
		let headers = read_headers(reader, OPUSHEAD, OPUSTAGS, 2, parse_options)?;

		Ok(Self {
			properties: if parse_options.read_properties {
				properties::read_properties(reader, &headers.first_page_header, &headers.packets)?
			} else {
				OpusProperties::default()
			},
			// A comment packet is mandatory in Opus
			vorbis_comments_tag: headers.comments.unwrap_or_default(),
		})
	}

	fn save_to<F>(&self, file: &mut F, _write_options: WriteOptions) -> Result<()>
	where
		F: FileLike,
	{
		write(file, &self.vorbis_comments_tag, OggFormat::Opus)
	}

	fn properties(&self) -> &Self::Properties {
		&self.properties
	}

	fn contains_tag(&self) -> bool {
		true
	}

	fn contains_tag_type(&self, tag_type: TagType) -> bool {
		tag_type == TagType::VorbisComments
	}
}

impl From<OpusFile> for TaggedFile {
	fn from(input: OpusFile) -> Self {
		TaggedFile::new(
			FileType::Opus,
			FileProperties::from(input.properties),
			vec![input.vorbis_comments_tag.into()],
		)
	}
}
