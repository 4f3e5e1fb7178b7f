//! Items for FLAC
//!
//! ## File notes
//!
//! * See [`FlacFile`]

mod block;
mod properties;
mod read;
pub(crate) mod write;

pub(crate) use read::find_marker;

use crate::config::{ParseOptions, WriteOptions};
use crate::error::Result;
use crate::file::{AudioFile, FileType, TaggedFile};
use crate::ogg::VorbisComments;
use crate::picture::{Picture, PictureInformation};
use crate::tag::TagType;
use crate::util::io::FileLike;

use std::io::{Read, Seek};

// Exports
pub use properties::FlacProperties;

/// A FLAC file
///
/// ## Notes
///
/// * Pictures are stored in the `FlacFile` itself, rather than the tag. Any pictures inside the tag
///   are written as their own picture blocks as well. See [`OggPictureStorage`](crate::ogg::OggPictureStorage).
/// * When converting to [`TaggedFile`], all pictures will be put inside of a [`VorbisComments`] tag,
///   even if the file did not originally contain one.
/// * An ID3v2 tag in front of the stream is skipped, and left untouched when writing.
#[derive(Debug, Clone, PartialEq)]
pub struct FlacFile {
	/// The Vorbis comments contained in the file
	pub(crate) vorbis_comments_tag: Option<VorbisComments>,
	pub(crate) pictures: Vec<(Picture, PictureInformation)>,
	/// The file's audio properties
	pub(crate) properties: FlacProperties,
}

impl FlacFile {
	/// The file's Vorbis comments, if any
	pub fn vorbis_comments(&self) -> Option<&VorbisComments> {
		self.vorbis_comments_tag.as_ref()
	}

	/// A mutable reference to the file's Vorbis comments
	pub fn vorbis_comments_mut(&mut self) -> Option<&mut VorbisComments> {
		self.vorbis_comments_tag.as_mut()
	}

	/// Replace the file's Vorbis comments, returning the old ones
	pub fn set_vorbis_comments(&mut self, tag: VorbisComments) -> Option<VorbisComments> {
		self.vorbis_comments_tag.replace(tag)
	}

	/// Remove the file's Vorbis comments
	pub fn remove_vorbis_comments(&mut self) -> Option<VorbisComments> {
		self.vorbis_comments_tag.take()
	}
}

impl AudioFile for FlacFile {
	type Properties = FlacProperties;

	fn read_from<R>(reader: &mut R, parse_options: ParseOptions) -> Result<Self>
	where
		R: Read + Seek,
	{
		read::read_from(reader, parse_options)
	}

	fn save_to<F>(&self, file: &mut F, write_options: WriteOptions) -> Result<()>
	where
		F: FileLike,
	{
		let empty = VorbisComments::default();
		let tag = self.vorbis_comments_tag.as_ref().unwrap_or(&empty);

		write::write_blocks(
			file,
			tag,
			tag.pictures.iter().chain(&self.pictures),
			write_options,
		)
	}

	fn properties(&self) -> &Self::Properties {
		&self.properties
	}

	fn contains_tag(&self) -> bool {
		self.vorbis_comments_tag.is_some()
	}

	fn contains_tag_type(&self, tag_type: TagType) -> bool {
		tag_type == TagType::VorbisComments && self.vorbis_comments_tag.is_some()
	}
}

impl From<FlacFile> for TaggedFile {
	fn from(mut input: FlacFile) -> Self {
		let mut tags = Vec::with_capacity(1);

		// Move our pictures into a `VorbisComments` tag, creating one if necessary
		match input.vorbis_comments_tag {
			Some(mut vorbis_comments) => {
				vorbis_comments.pictures.append(&mut input.pictures);
				tags.push(vorbis_comments.into());
			},
			None if !input.pictures.is_empty() => tags.push(
				VorbisComments {
					vendor: String::new(),
					items: Vec::new(),
					pictures: input.pictures,
				}
				.into(),
			),
			_ => {},
		}

		TaggedFile::new(FileType::Flac, input.properties.into(), tags)
	}
}
