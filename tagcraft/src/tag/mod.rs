//! Utilities for generic tag handling

mod accessor;
mod field;
pub(crate) mod item;
mod tag_ext;
mod tag_type;
pub(crate) mod utils;

use crate::config::WriteOptions;
use crate::error::{Result, TagError};
use crate::macros::err;
use crate::picture::{Picture, PictureType};
use crate::probe::Probe;
use crate::util::io::FileLike;

use std::borrow::Cow;
use std::fmt::{Display, Formatter};

// Exports
pub use accessor::Accessor;
pub use field::TagField;
pub use item::{ItemKey, ItemValue, TagItem};
pub use tag_ext::TagExt;
pub use tag_type::TagType;

macro_rules! impl_accessor {
	($($item_key:ident => $name:tt),+) => {
		paste::paste! {
			$(
				fn $name(&self) -> Option<Cow<'_, str>> {
					self.get_string(&ItemKey::$item_key).map(Cow::Borrowed)
				}

				fn [<set_ $name>](&mut self, value: String) {
					self.insert(TagItem::new(ItemKey::$item_key, ItemValue::Text(value)));
				}

				fn [<remove_ $name>](&mut self) {
					self.remove_key(&ItemKey::$item_key)
				}
			)+
		}
	}
}

/// Returned when an [`ItemKey`] has no native equivalent in a [`TagType`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NotMapped {
	key: ItemKey,
	tag_type: TagType,
}

impl NotMapped {
	pub(crate) fn new(key: &ItemKey, tag_type: TagType) -> Self {
		Self {
			key: key.clone(),
			tag_type,
		}
	}

	/// The key that couldn't be mapped
	pub fn key(&self) -> &ItemKey {
		&self.key
	}

	/// The tag format that has no mapping
	pub fn tag_type(&self) -> TagType {
		self.tag_type
	}
}

impl Display for NotMapped {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{:?} has no mapping in {:?}", self.key, self.tag_type)
	}
}

impl std::error::Error for NotMapped {}

/// Represents a parsed tag
///
/// This is a tag that is loosely bound to a specific [`TagType`].
/// It is used for conversions and as the tag type of [`TaggedFile`](crate::file::TaggedFile).
///
/// Compared to other formats, this gives a much higher-level view of the
/// tag items. Rather than storing items according to their format-specific
/// keys, [`ItemKey`]s are used.
///
/// You can easily remap this to another [`TagType`] with [`Tag::re_map`].
///
/// Any conversion will, of course, be lossy to a varying degree.
///
/// ## Usage
///
/// Accessing common items
///
/// ```rust
/// use tagcraft::tag::{Accessor, Tag, TagType};
///
/// let tag = Tag::new(TagType::Id3v2);
///
/// // There are multiple quick getter methods for common items
///
/// let title = tag.title();
/// let artist = tag.artist();
/// let album = tag.album();
/// let genre = tag.genre();
/// ```
///
/// Using the checked field API
///
/// ```rust
/// use tagcraft::tag::{ItemKey, Tag, TagType};
///
/// let mut tag = Tag::new(TagType::RiffInfo);
///
/// tag.set_field(ItemKey::TrackTitle, "Title")?;
/// assert_eq!(tag.get_field(&ItemKey::TrackTitle)?, vec!["Title"]);
///
/// // RIFF INFO has no place for lyrics
/// assert!(tag.set_field(ItemKey::Lyrics, "la la la").is_err());
/// # Ok::<(), tagcraft::tag::NotMapped>(())
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tag {
	tag_type: TagType,
	pub(crate) pictures: Vec<Picture>,
	pub(crate) items: Vec<TagItem>,
}

// Years are the first 4 digits of a date, ex. "2024-01-30"
fn parse_year(input: &str) -> Option<u32> {
	let digits = input.trim().get(..4)?;
	if !digits.bytes().all(|b| b.is_ascii_digit()) {
		return None;
	}

	digits.parse().ok()
}

impl Accessor for Tag {
	impl_accessor!(
		TrackArtist => artist,
		TrackTitle  => title,
		AlbumTitle  => album,
		Genre       => genre,
		Comment     => comment
	);

	fn track(&self) -> Option<u32> {
		self.get_u32_from_string(&ItemKey::TrackNumber)
	}

	fn set_track(&mut self, value: u32) {
		self.insert_text(ItemKey::TrackNumber, value.to_string());
	}

	fn remove_track(&mut self) {
		self.remove_key(&ItemKey::TrackNumber);
	}

	fn track_total(&self) -> Option<u32> {
		self.get_u32_from_string(&ItemKey::TrackTotal)
	}

	fn set_track_total(&mut self, value: u32) {
		self.insert_text(ItemKey::TrackTotal, value.to_string());
	}

	fn remove_track_total(&mut self) {
		self.remove_key(&ItemKey::TrackTotal);
	}

	fn disk(&self) -> Option<u32> {
		self.get_u32_from_string(&ItemKey::DiscNumber)
	}

	fn set_disk(&mut self, value: u32) {
		self.insert_text(ItemKey::DiscNumber, value.to_string());
	}

	fn remove_disk(&mut self) {
		self.remove_key(&ItemKey::DiscNumber);
	}

	fn disk_total(&self) -> Option<u32> {
		self.get_u32_from_string(&ItemKey::DiscTotal)
	}

	fn set_disk_total(&mut self, value: u32) {
		self.insert_text(ItemKey::DiscTotal, value.to_string());
	}

	fn remove_disk_total(&mut self) {
		self.remove_key(&ItemKey::DiscTotal);
	}

	fn year(&self) -> Option<u32> {
		self.get_string(&ItemKey::Year)
			.or_else(|| self.get_string(&ItemKey::RecordingDate))
			.and_then(parse_year)
	}

	fn set_year(&mut self, value: u32) {
		self.remove_key(&ItemKey::RecordingDate);
		self.insert_text(ItemKey::Year, value.to_string());
	}

	fn remove_year(&mut self) {
		self.remove_key(&ItemKey::Year);
		self.remove_key(&ItemKey::RecordingDate);
	}
}

impl Tag {
	/// Initialize a new tag with a certain [`TagType`]
	#[must_use]
	pub const fn new(tag_type: TagType) -> Self {
		Self {
			tag_type,
			pictures: Vec::new(),
			items: Vec::new(),
		}
	}

	/// Change the [`TagType`], remapping all items
	///
	/// NOTE: Any item without a mapping in the new format is removed.
	///
	/// # Examples
	///
	/// ```rust
	/// use tagcraft::tag::{ItemKey, Tag, TagExt, TagType};
	///
	/// let mut tag = Tag::new(TagType::Id3v2);
	/// tag.insert_text(ItemKey::Lyrics, String::from("la la la"));
	///
	/// // ID3v2 supports lyrics
	/// assert_eq!(tag.len(), 1);
	///
	/// // But RIFF INFO does not, the item will be lost
	/// tag.re_map(TagType::RiffInfo);
	/// assert!(tag.is_empty());
	/// ```
	pub fn re_map(&mut self, tag_type: TagType) {
		self.retain(|i| i.re_map(tag_type));
		self.tag_type = tag_type
	}

	/// Returns the [`TagType`]
	pub fn tag_type(&self) -> TagType {
		self.tag_type
	}

	/// Returns the number of [`TagItem`]s
	pub fn item_count(&self) -> u32 {
		self.items.len() as u32
	}

	/// Returns the number of [`Picture`]s
	pub fn picture_count(&self) -> u32 {
		self.pictures.len() as u32
	}

	/// Returns the stored [`TagItem`]s
	pub fn items(&self) -> impl ExactSizeIterator<Item = &TagItem> + Clone {
		self.items.iter()
	}

	/// Returns a reference to a [`TagItem`] matching an [`ItemKey`]
	pub fn get(&self, item_key: &ItemKey) -> Option<&TagItem> {
		self.items.iter().find(|i| &i.item_key == item_key)
	}

	/// Get a string value from an [`ItemKey`]
	///
	/// This returns the first [`ItemValue::Text`] or [`ItemValue::Locator`].
	pub fn get_string(&self, item_key: &ItemKey) -> Option<&str> {
		self.get_strings(item_key).next()
	}

	fn get_u32_from_string(&self, key: &ItemKey) -> Option<u32> {
		let i = self.get_string(key)?;
		i.trim().parse::<u32>().ok()
	}

	/// Gets a byte slice from an [`ItemKey`]
	///
	/// Use `convert` to convert [`ItemValue::Text`] and [`ItemValue::Locator`] to byte slices
	pub fn get_binary(&self, item_key: &ItemKey, convert: bool) -> Option<&[u8]> {
		if let Some(item) = self.get(item_key) {
			match item.value() {
				ItemValue::Text(text) | ItemValue::Locator(text) if convert => {
					return Some(text.as_bytes());
				},
				ItemValue::Binary(binary) => return Some(binary),
				_ => {},
			}
		}

		None
	}

	/// Get all values of a field
	///
	/// An empty `Vec` means the field is valid for the format, but not set.
	///
	/// # Errors
	///
	/// `key` has no mapping in the tag's [`TagType`]
	///
	/// # Examples
	///
	/// ```rust
	/// use tagcraft::tag::{ItemKey, Tag, TagType};
	///
	/// let mut tag = Tag::new(TagType::VorbisComments);
	/// assert!(tag.get_field(&ItemKey::TrackArtist)?.is_empty());
	///
	/// tag.add_field(ItemKey::TrackArtist, "Foo")?;
	/// tag.add_field(ItemKey::TrackArtist, "Bar")?;
	/// assert_eq!(tag.get_field(&ItemKey::TrackArtist)?, vec!["Foo", "Bar"]);
	/// # Ok::<(), tagcraft::tag::NotMapped>(())
	/// ```
	pub fn get_field(&self, key: &ItemKey) -> std::result::Result<Vec<&str>, NotMapped> {
		self.check_mapping(key)?;
		Ok(self.get_strings(key).collect())
	}

	/// Set a field, replacing all existing values
	///
	/// # Errors
	///
	/// `key` has no mapping in the tag's [`TagType`]
	pub fn set_field(
		&mut self,
		key: ItemKey,
		value: impl Into<String>,
	) -> std::result::Result<(), NotMapped> {
		self.check_mapping(&key)?;
		self.insert_unchecked(TagItem::new(key, ItemValue::Text(value.into())));
		Ok(())
	}

	/// Add a value to a field, keeping any existing values
	///
	/// If the tag's [`TagType`] only stores one value per key, this replaces the existing
	/// value like [`Tag::set_field`].
	///
	/// # Errors
	///
	/// `key` has no mapping in the tag's [`TagType`]
	pub fn add_field(
		&mut self,
		key: ItemKey,
		value: impl Into<String>,
	) -> std::result::Result<(), NotMapped> {
		self.check_mapping(&key)?;

		let item = TagItem::new(key, ItemValue::Text(value.into()));
		if self.tag_type.allows_multiple_values() {
			self.push_unchecked(item);
		} else {
			self.insert_unchecked(item);
		}

		Ok(())
	}

	/// Delete all values of a field
	///
	/// For `number/total` pairs, only the given half is removed. The other half is kept.
	///
	/// # Errors
	///
	/// `key` has no mapping in the tag's [`TagType`]
	pub fn delete_field(&mut self, key: &ItemKey) -> std::result::Result<(), NotMapped> {
		self.check_mapping(key)?;
		self.remove_key(key);
		Ok(())
	}

	fn check_mapping(&self, key: &ItemKey) -> std::result::Result<(), NotMapped> {
		match key.map_key(self.tag_type) {
			Some(_) => Ok(()),
			None => Err(NotMapped::new(key, self.tag_type)),
		}
	}

	/// Insert a [`TagItem`], replacing any existing one of the same [`ItemKey`]
	///
	/// NOTE: This **will** verify an [`ItemKey`] mapping exists for the target [`TagType`]
	///
	/// This will return `true` if the item was inserted.
	pub fn insert(&mut self, item: TagItem) -> bool {
		if item.re_map(self.tag_type) {
			self.insert_unchecked(item);
			return true;
		}

		false
	}

	/// Insert a [`TagItem`], replacing any existing one of the same [`ItemKey`]
	///
	/// NOTE: This **will not** verify an [`ItemKey`] mapping exists. Items without a mapping
	/// are dropped when the tag is written.
	pub fn insert_unchecked(&mut self, item: TagItem) {
		match self.items.iter().position(|i| i.item_key == item.item_key) {
			// Keep the position of the first occurrence
			Some(pos) => {
				self.items[pos] = item;

				let key = self.items[pos].item_key.clone();
				let mut index = 0;
				self.items.retain(|i| {
					let keep = index <= pos || i.item_key != key;
					index += 1;
					keep
				});
			},
			None => self.items.push(item),
		}
	}

	/// Append a [`TagItem`] to the tag
	///
	/// This will not remove any items of the same [`ItemKey`], unlike [`Tag::insert`]
	///
	/// NOTE: This **will** verify an [`ItemKey`] mapping exists for the target [`TagType`]
	///
	/// Multiple items of the same [`ItemKey`] are not valid in all formats, in which case
	/// the first available item will be used.
	///
	/// This will return `true` if the item was pushed.
	pub fn push(&mut self, item: TagItem) -> bool {
		if item.re_map(self.tag_type) {
			self.items.push(item);
			return true;
		}

		false
	}

	/// Append a [`TagItem`] to the tag
	///
	/// Notes: See [`Tag::push()`] and the notes of [`Tag::insert_unchecked()`]
	pub fn push_unchecked(&mut self, item: TagItem) {
		self.items.push(item);
	}

	/// An alias for [`Tag::insert`] that doesn't require the user to create a [`TagItem`]
	///
	/// NOTE: This will replace any existing item with `item_key`. See [`Tag::insert`]
	pub fn insert_text(&mut self, item_key: ItemKey, text: String) -> bool {
		self.insert(TagItem::new(item_key, ItemValue::Text(text)))
	}

	/// Removes all items with the specified [`ItemKey`], and returns them
	pub fn take(&mut self, key: &ItemKey) -> impl Iterator<Item = TagItem> + use<'_> {
		let (taken, kept) = std::mem::take(&mut self.items)
			.into_iter()
			.partition::<Vec<_>, _>(|i| &i.item_key == key);
		self.items = kept;
		taken.into_iter()
	}

	/// Removes all items with the specified [`ItemKey`], and filters them through [`ItemValue::into_string`]
	pub fn take_strings(&mut self, key: &ItemKey) -> impl Iterator<Item = String> + use<'_> {
		self.take(key).filter_map(|i| i.item_value.into_string())
	}

	/// Returns references to all [`TagItem`]s with the specified key
	pub fn get_items<'a>(&'a self, key: &ItemKey) -> impl Iterator<Item = &'a TagItem> + Clone {
		self.items.iter().filter(move |i| i.key() == key)
	}

	/// Returns references to all texts of [`TagItem`]s with the specified key
	///
	/// This includes both [`ItemValue::Text`] and [`ItemValue::Locator`].
	pub fn get_strings<'a>(&'a self, key: &ItemKey) -> impl Iterator<Item = &'a str> + Clone {
		self.items.iter().filter_map(move |i| {
			if i.key() == key {
				i.value().as_str()
			} else {
				None
			}
		})
	}

	/// Returns references to all bytes of [`TagItem`]s with the specified key, and [`ItemValue::Binary`]
	pub fn get_bytes<'a>(&'a self, key: &ItemKey) -> impl Iterator<Item = &'a [u8]> + Clone {
		self.items.iter().filter_map(move |i| {
			if i.key() == key {
				i.value().binary()
			} else {
				None
			}
		})
	}

	/// Remove an item by its key
	///
	/// This will remove all items with this key.
	pub fn remove_key(&mut self, key: &ItemKey) {
		self.items.retain(|i| i.key() != key)
	}

	/// Retain tag items based on the predicate
	///
	/// See [`Vec::retain`](std::vec::Vec::retain)
	pub fn retain<F>(&mut self, f: F)
	where
		F: FnMut(&TagItem) -> bool,
	{
		self.items.retain(f)
	}

	/// Remove all items with empty values
	pub fn remove_empty(&mut self) {
		self.items.retain(|item| !item.value().is_empty());
	}

	/// Returns the stored [`Picture`]s as a slice
	pub fn pictures(&self) -> &[Picture] {
		&self.pictures
	}

	/// Returns the first occurrence of the [`PictureType`]
	pub fn get_picture_type(&self, picture_type: PictureType) -> Option<&Picture> {
		self.pictures
			.iter()
			.find(|picture| picture.pic_type() == picture_type)
	}

	/// Pushes a [`Picture`] to the tag
	pub fn push_picture(&mut self, picture: Picture) {
		self.pictures.push(picture)
	}

	/// Removes all [`Picture`]s of a [`PictureType`]
	pub fn remove_picture_type(&mut self, picture_type: PictureType) {
		self.pictures.retain(|p| p.pic_type() != picture_type)
	}

	/// Replaces the picture at the given `index`
	///
	/// NOTE: If `index` is out of bounds, the `picture` will be appended
	/// to the list.
	pub fn set_picture(&mut self, index: usize, picture: Picture) {
		if index >= self.pictures.len() {
			self.push_picture(picture);
		} else {
			self.pictures[index] = picture;
		}
	}

	/// Removes and returns the picture at the given `index`, if it exists
	pub fn remove_picture(&mut self, index: usize) -> Option<Picture> {
		(index < self.pictures.len()).then(|| self.pictures.remove(index))
	}
}

impl TagExt for Tag {
	type Err = TagError;
	type RefKey<'a> = &'a ItemKey;

	#[inline]
	fn tag_type(&self) -> TagType {
		self.tag_type
	}

	fn len(&self) -> usize {
		self.items.len() + self.pictures.len()
	}

	fn contains<'a>(&'a self, key: Self::RefKey<'a>) -> bool {
		self.items.iter().any(|item| item.key() == key)
	}

	fn is_empty(&self) -> bool {
		self.items.is_empty() && self.pictures.is_empty()
	}

	/// Save the `Tag` to a [`FileLike`]
	///
	/// # Errors
	///
	/// * A [`FileType`](crate::file::FileType) couldn't be determined from the File
	/// * Attempting to write a tag to a format that does not support it. See [`FileType::supports_tag_type()`](crate::file::FileType::supports_tag_type)
	fn save_to<F>(&self, file: &mut F, write_options: WriteOptions) -> Result<()>
	where
		F: FileLike,
	{
		file.rewind()?;
		let probe = Probe::new(file).guess_file_type()?;

		match probe.file_type() {
			Some(file_type) => {
				if !file_type.supports_tag_type(self.tag_type) {
					err!(UnsupportedTag);
				}

				utils::write_tag(self, probe.into_inner(), file_type, write_options)
			},
			None => err!(UnknownFormat),
		}
	}

	fn clear(&mut self) {
		self.items.clear();
		self.pictures.clear();
	}
}
