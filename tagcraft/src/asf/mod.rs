//! ASF (WMA) specific items
//!
//! ## File notes
//!
//! Metadata lives in five different objects, each with its own limits on what a
//! [`MetadataDescriptor`] may hold. See [`ContainerType`] for the rules.

mod container;
mod descriptor;
mod guid;
mod properties;
mod read;
mod tag;
pub(crate) mod write;

use crate::config::{ParseOptions, WriteOptions};
use crate::error::Result;
use crate::file::{AudioFile, FileType, TaggedFile};
use crate::properties::FileProperties;
use crate::tag::{TagExt, TagType};
use crate::util::io::FileLike;

use std::io::{Read, Seek};

// Exports
pub use container::{ContainerType, MetadataContainer};
pub use descriptor::{DescriptorType, DescriptorValue, MetadataDescriptor};
pub use guid::Guid;
pub use properties::AsfProperties;
pub use tag::AsfTag;

/// An ASF file
#[derive(Debug, Clone, PartialEq)]
pub struct AsfFile {
	pub(crate) asf_tag: Option<AsfTag>,
	pub(crate) properties: AsfProperties,
}

impl AsfFile {
	/// The file's metadata, if any
	pub fn asf_tag(&self) -> Option<&AsfTag> {
		self.asf_tag.as_ref()
	}

	/// A mutable reference to the file's metadata
	pub fn asf_tag_mut(&mut self) -> Option<&mut AsfTag> {
		self.asf_tag.as_mut()
	}

	/// Replace the file's metadata, returning the old one
	pub fn set_asf_tag(&mut self, tag: AsfTag) -> Option<AsfTag> {
		self.asf_tag.replace(tag)
	}

	/// Remove the file's metadata
	pub fn remove_asf_tag(&mut self) -> Option<AsfTag> {
		self.asf_tag.take()
	}
}

impl AudioFile for AsfFile {
	type Properties = AsfProperties;

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
		match &self.asf_tag {
			Some(tag) => tag.save_to(file, write_options),
			None => write::write_to(file, &AsfTag::new(), write_options),
		}
	}

	fn properties(&self) -> &Self::Properties {
		&self.properties
	}

	fn contains_tag(&self) -> bool {
		self.asf_tag.is_some()
	}

	fn contains_tag_type(&self, tag_type: TagType) -> bool {
		tag_type == TagType::Asf && self.asf_tag.is_some()
	}
}

impl From<AsfFile> for TaggedFile {
	fn from(input: AsfFile) -> Self {
		TaggedFile::new(
			FileType::Asf,
			FileProperties::from(input.properties),
			input.asf_tag.map(Into::into).into_iter().collect(),
		)
	}
}
