use crate::config::{EngineOptions, WriteOptions};
use crate::error::TagError;
use crate::tag::{Accessor, Tag, TagType};
use crate::util::io::FileLike;

use std::path::Path;

/// Operations shared by the generic [`Tag`] and every format-specific tag
///
/// Sealed, implemented for [`Tag`], `AsfTag`, `Id3v2Tag`, `Ilst`, `RiffInfoList`, and
/// `VorbisComments`.
pub trait TagExt: Accessor + Into<Tag> + Sized + private::Sealed {
	/// Error returned by the IO methods
	type Err: From<std::io::Error> + From<TagError> + Into<TagError>;
	/// Key type accepted by [`TagExt::contains`]
	type RefKey<'a>
	where
		Self: 'a;

	#[doc(hidden)]
	fn tag_type(&self) -> TagType;

	/// Number of items, pictures included
	///
	/// # Example
	///
	/// ```rust
	/// use tagcraft::tag::{Accessor, ItemKey, Tag, TagExt};
	/// # let tag_type = tagcraft::tag::TagType::Id3v2;
	///
	/// let mut tag = Tag::new(tag_type);
	/// assert_eq!(tag.len(), 0);
	///
	/// tag.set_artist(String::from("Foo artist"));
	/// assert_eq!(tag.len(), 1);
	/// ```
	fn len(&self) -> usize;

	/// Whether an item with `key` is present
	///
	/// # Example
	///
	/// ```rust
	/// use tagcraft::tag::{Accessor, ItemKey, Tag, TagExt};
	/// # let tag_type = tagcraft::tag::TagType::Id3v2;
	///
	/// let mut tag = Tag::new(tag_type);
	/// assert!(tag.is_empty());
	///
	/// tag.set_artist(String::from("Foo artist"));
	/// assert!(tag.contains(&ItemKey::TrackArtist));
	/// ```
	fn contains<'a>(&'a self, key: Self::RefKey<'a>) -> bool;

	/// Whether the tag has no items and no pictures
	fn is_empty(&self) -> bool;

	/// Write the tag into the file at `path`
	///
	/// The write is staged and committed by a [`CommitEngine`](crate::commit::CommitEngine)
	/// built from the default [`EngineOptions`], so the file is either fully updated or left
	/// as it was.
	///
	/// # Errors
	///
	/// See [`CommitEngine::commit`](crate::commit::CommitEngine::commit) and [`TagExt::save_to`]
	fn save_to_path<P: AsRef<Path>>(
		&self,
		path: P,
		write_options: WriteOptions,
	) -> std::result::Result<(), Self::Err> {
		let engine = crate::commit::CommitEngine::new(
			EngineOptions::new().write_options(write_options),
		);

		engine
			.commit(path.as_ref(), false, |file| {
				self.save_to(file, write_options).map_err(Into::into)
			})
			.map_err(Into::into)
	}

	/// Write the tag into `file`, which is probed for its format first
	///
	/// An empty tag removes the tag from the file.
	///
	/// # Errors
	///
	/// * [`ErrorKind::UnknownFormat`](crate::error::ErrorKind::UnknownFormat)
	/// * [`ErrorKind::UnsupportedTag`](crate::error::ErrorKind::UnsupportedTag): the format
	///   can't hold this tag type
	/// * Any IO or encoding error
	fn save_to<F>(
		&self,
		file: &mut F,
		write_options: WriteOptions,
	) -> std::result::Result<(), Self::Err>
	where
		F: FileLike;

	/// Remove this tag type from the file at `path`
	///
	/// # Errors
	///
	/// See [`TagType::remove_from_path`]
	fn remove_from_path<P: AsRef<Path>>(&self, path: P) -> std::result::Result<(), Self::Err> {
		self.tag_type().remove_from_path(path).map_err(Into::into)
	}

	/// Remove this tag type from `file`
	///
	/// Only the tag type matters, the items of `self` are ignored.
	///
	/// # Errors
	///
	/// See [`TagType::remove_from`]
	fn remove_from<F>(&self, file: &mut F) -> std::result::Result<(), Self::Err>
	where
		F: FileLike,
	{
		self.tag_type().remove_from(file).map_err(Into::into)
	}

	/// Remove every item and picture
	///
	/// Format-specific extras, like a Vorbis vendor string, are kept.
	fn clear(&mut self);
}

// https://rust-lang.github.io/api-guidelines/future-proofing.html#c-sealed
mod private {
	use crate::asf::AsfTag;
	use crate::id3::v2::Id3v2Tag;
	use crate::iff::wav::RiffInfoList;
	use crate::mp4::Ilst;
	use crate::ogg::VorbisComments;
	use crate::tag::Tag;

	pub trait Sealed {}

	impl Sealed for AsfTag {}
	impl Sealed for Id3v2Tag {}
	impl Sealed for Ilst {}
	impl Sealed for RiffInfoList {}
	impl Sealed for Tag {}
	impl Sealed for VorbisComments {}
}
