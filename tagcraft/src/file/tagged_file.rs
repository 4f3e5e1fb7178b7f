use super::audio_file::AudioFile;
use super::file_type::FileType;
use crate::config::{ParseOptions, WriteOptions};
use crate::error::Result;
use crate::properties::FileProperties;
use crate::tag::{Tag, TagType};
use crate::util::io::FileLike;

use std::io::{Read, Seek};

/// Provides a common interface between [`TaggedFile`] and [`AudioFileHandle`](super::AudioFileHandle)
pub trait TaggedFileExt {
	/// Returns the file's [`FileType`]
	fn file_type(&self) -> FileType;

	/// Returns all tags
	fn tags(&self) -> &[Tag];

	/// Returns the file type's primary [`TagType`]
	///
	/// See [`FileType::primary_tag_type`]
	fn primary_tag_type(&self) -> TagType {
		self.file_type().primary_tag_type()
	}

	/// Determines whether the file supports the given [`TagType`]
	///
	/// # Examples
	///
	/// ```rust
	/// use tagcraft::file::{FileType, TaggedFile, TaggedFileExt};
	/// use tagcraft::properties::FileProperties;
	/// use tagcraft::tag::TagType;
	///
	/// let tagged_file = TaggedFile::new(FileType::Wav, FileProperties::default(), Vec::new());
	///
	/// assert!(tagged_file.supports_tag_type(TagType::RiffInfo));
	/// assert!(!tagged_file.supports_tag_type(TagType::VorbisComments));
	/// ```
	fn supports_tag_type(&self, tag_type: TagType) -> bool {
		self.file_type().supports_tag_type(tag_type)
	}

	/// Get a reference to a specific [`TagType`]
	fn tag(&self, tag_type: TagType) -> Option<&Tag>;

	/// Get a mutable reference to a specific [`TagType`]
	fn tag_mut(&mut self, tag_type: TagType) -> Option<&mut Tag>;

	/// Returns the primary tag
	///
	/// See [`FileType::primary_tag_type`]
	fn primary_tag(&self) -> Option<&Tag> {
		self.tag(self.primary_tag_type())
	}

	/// Gets a mutable reference to the file's "Primary tag"
	///
	/// See [`FileType::primary_tag_type`]
	fn primary_tag_mut(&mut self) -> Option<&mut Tag> {
		self.tag_mut(self.primary_tag_type())
	}

	/// Gets the first tag, if there are any
	///
	/// NOTE: This will grab the first available tag, you cannot rely on the result being
	/// a specific type
	fn first_tag(&self) -> Option<&Tag> {
		self.tags().first()
	}

	/// Inserts a [`Tag`]
	///
	/// NOTE: This will do nothing if the [`FileType`] does not support the [`TagType`].
	///
	/// If a tag is replaced, it will be returned
	fn insert_tag(&mut self, tag: Tag) -> Option<Tag>;

	/// Get a mutable reference to a specific [`TagType`], inserting an empty tag if needed
	///
	/// Returns `None` if the [`FileType`] does not support the [`TagType`].
	///
	/// # Examples
	///
	/// ```rust
	/// use tagcraft::file::{FileType, TaggedFile, TaggedFileExt};
	/// use tagcraft::properties::FileProperties;
	/// use tagcraft::tag::{Accessor, TagType};
	///
	/// let mut tagged_file = TaggedFile::new(FileType::Mp4, FileProperties::default(), Vec::new());
	/// assert!(tagged_file.primary_tag().is_none());
	///
	/// if let Some(tag) = tagged_file.tag_or_insert(TagType::Mp4Ilst) {
	/// 	tag.set_title(String::from("Song"));
	/// }
	///
	/// assert_eq!(tagged_file.primary_tag().unwrap().title().as_deref(), Some("Song"));
	/// ```
	fn tag_or_insert(&mut self, tag_type: TagType) -> Option<&mut Tag> {
		if !self.supports_tag_type(tag_type) {
			return None;
		}

		if self.tag(tag_type).is_none() {
			self.insert_tag(Tag::new(tag_type));
		}

		self.tag_mut(tag_type)
	}

	/// Removes a specific [`TagType`] and returns it
	fn remove(&mut self, tag_type: TagType) -> Option<Tag>;

	/// Removes all tags from the file
	fn clear(&mut self);
}

/// A generic representation of a file
///
/// This is used when the [`FileType`] has to be guessed
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedFile {
	/// The file's type
	pub(crate) ty: FileType,
	/// The file's audio properties
	pub(crate) properties: FileProperties,
	/// A collection of the file's tags
	pub(crate) tags: Vec<Tag>,
}

impl TaggedFile {
	/// Create a new `TaggedFile`
	#[must_use]
	pub const fn new(ty: FileType, properties: FileProperties, tags: Vec<Tag>) -> Self {
		Self {
			ty,
			properties,
			tags,
		}
	}

	/// Consume the file, returning its tags
	pub fn into_tags(self) -> Vec<Tag> {
		self.tags
	}
}

pub(super) fn find_tag(tags: &[Tag], tag_type: TagType) -> Option<usize> {
	tags.iter().position(|t| t.tag_type() == tag_type)
}

impl TaggedFileExt for TaggedFile {
	fn file_type(&self) -> FileType {
		self.ty
	}

	fn tags(&self) -> &[Tag] {
		self.tags.as_slice()
	}

	fn tag(&self, tag_type: TagType) -> Option<&Tag> {
		find_tag(&self.tags, tag_type).map(|pos| &self.tags[pos])
	}

	fn tag_mut(&mut self, tag_type: TagType) -> Option<&mut Tag> {
		find_tag(&self.tags, tag_type).map(|pos| &mut self.tags[pos])
	}

	fn insert_tag(&mut self, tag: Tag) -> Option<Tag> {
		let tag_type = tag.tag_type();

		if self.supports_tag_type(tag_type) {
			let ret = self.remove(tag_type);
			self.tags.push(tag);

			return ret;
		}

		None
	}

	fn remove(&mut self, tag_type: TagType) -> Option<Tag> {
		find_tag(&self.tags, tag_type).map(|pos| self.tags.remove(pos))
	}

	fn clear(&mut self) {
		self.tags.clear()
	}
}

impl AudioFile for TaggedFile {
	type Properties = FileProperties;

	fn read_from<R>(reader: &mut R, parse_options: ParseOptions) -> Result<Self>
	where
		R: Read + Seek,
		Self: Sized,
	{
		crate::probe::Probe::new(reader)
			.guess_file_type()?
			.options(parse_options)
			.read()
	}

	fn save_to<F>(&self, file: &mut F, write_options: WriteOptions) -> Result<()>
	where
		F: FileLike,
	{
		for tag in &self.tags {
			if !self.supports_tag_type(tag.tag_type()) {
				log::warn!("Skipping {:?}, not supported by {:?}", tag.tag_type(), self.ty);
				continue;
			}

			file.rewind()?;
			crate::tag::utils::write_tag(tag, file, self.ty, write_options)?;
		}

		Ok(())
	}

	fn properties(&self) -> &Self::Properties {
		&self.properties
	}

	fn contains_tag(&self) -> bool {
		!self.tags.is_empty()
	}

	fn contains_tag_type(&self, tag_type: TagType) -> bool {
		self.tags.iter().any(|t| t.tag_type() == tag_type)
	}
}
