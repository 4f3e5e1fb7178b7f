use super::file_type::FileType;
use super::tagged_file::{TaggedFile, TaggedFileExt, find_tag};
use crate::properties::FileProperties;
use crate::tag::{Tag, TagExt, TagType};

use std::path::{Path, PathBuf};

/// A [`TaggedFile`] that remembers where it was read from
///
/// This is what a [`Registry`](crate::registry::Registry) hands out, and takes back when
/// writing.
///
/// # Examples
///
/// ```rust,no_run
/// use tagcraft::config::EngineOptions;
/// use tagcraft::file::TaggedFileExt;
/// use tagcraft::registry::Registry;
/// use tagcraft::tag::Accessor;
///
/// # fn main() -> tagcraft::error::Result<()> {
/// let registry = Registry::new(EngineOptions::new());
///
/// let mut handle = registry.read_path("song.m4a")?;
/// if let Some(tag) = handle.tag_or_insert(handle.primary_tag_type()) {
/// 	tag.set_title(String::from("Song"));
/// }
///
/// registry.write(&handle)?;
/// # Ok(()) }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AudioFileHandle {
	pub(crate) path: PathBuf,
	pub(crate) file_type: FileType,
	pub(crate) properties: FileProperties,
	pub(crate) tags: Vec<Tag>,
	pub(crate) extension: Option<String>,
}

impl AudioFileHandle {
	/// Bind a [`TaggedFile`] to a path
	pub fn new(path: impl Into<PathBuf>, tagged_file: TaggedFile) -> Self {
		let path = path.into();
		let extension = path
			.extension()
			.and_then(|ext| ext.to_str())
			.map(str::to_ascii_lowercase);

		Self {
			path,
			file_type: tagged_file.ty,
			properties: tagged_file.properties,
			tags: tagged_file.tags,
			extension,
		}
	}

	/// The path the file was read from
	pub fn path(&self) -> &Path {
		&self.path
	}

	/// The file's extension, lowercased
	pub fn extension(&self) -> Option<&str> {
		self.extension.as_deref()
	}

	/// The file's audio properties
	pub fn properties(&self) -> &FileProperties {
		&self.properties
	}

	/// Whether every tag is empty
	///
	/// Writing a handle like this removes all tags from the file.
	pub fn is_tagless(&self) -> bool {
		self.tags.iter().all(TagExt::is_empty)
	}
}

impl TaggedFileExt for AudioFileHandle {
	fn file_type(&self) -> FileType {
		self.file_type
	}

	fn tags(&self) -> &[Tag] {
		&self.tags
	}

	fn tag(&self, tag_type: TagType) -> Option<&Tag> {
		find_tag(&self.tags, tag_type).map(|pos| &self.tags[pos])
	}

	fn tag_mut(&mut self, tag_type: TagType) -> Option<&mut Tag> {
		find_tag(&self.tags, tag_type).map(|pos| &mut self.tags[pos])
	}

	fn insert_tag(&mut self, tag: Tag) -> Option<Tag> {
		let tag_type = tag.tag_type();
		if !self.supports_tag_type(tag_type) {
			return None;
		}

		let ret = self.remove(tag_type);
		self.tags.push(tag);
		ret
	}

	fn remove(&mut self, tag_type: TagType) -> Option<Tag> {
		find_tag(&self.tags, tag_type).map(|pos| self.tags.remove(pos))
	}

	fn clear(&mut self) {
		self.tags.clear()
	}
}

impl From<AudioFileHandle> for TaggedFile {
	fn from(input: AudioFileHandle) -> Self {
		TaggedFile::new(input.file_type, input.properties, input.tags)
	}
}

#[cfg(test)]
mod tests {
	use super::AudioFileHandle;
	use crate::file::{FileType, TaggedFile, TaggedFileExt};
	use crate::properties::FileProperties;
	use crate::tag::{Accessor, TagType};

	#[test_log::test]
	fn lazily_defaulted_tag() {
		let tagged_file = TaggedFile::new(FileType::Opus, FileProperties::default(), Vec::new());
		let mut handle = AudioFileHandle::new("/music/Song.OPUS", tagged_file);

		assert_eq!(handle.extension(), Some("opus"));
		assert!(handle.is_tagless());

		handle
			.tag_or_insert(TagType::VorbisComments)
			.unwrap()
			.set_album(String::from("Album"));

		assert!(!handle.is_tagless());
		assert_eq!(
			handle.primary_tag().and_then(|t| t.album()).as_deref(),
			Some("Album")
		);
	}
}
