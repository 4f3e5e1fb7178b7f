use super::constants::METADATA_BLOCK_PICTURE;
use crate::config::WriteOptions;
use crate::error::TagError;
use crate::picture::{Picture, PictureInformation};
use crate::tag::{Accessor, ItemKey, ItemValue, Tag, TagExt, TagItem, TagType};
use crate::util::io::FileLike;

use std::borrow::Cow;

macro_rules! impl_accessor {
	($($name:ident => $key:literal;)+) => {
		paste::paste! {
			$(
				fn $name(&self) -> Option<Cow<'_, str>> {
					self.get($key).map(Cow::Borrowed)
				}

				fn [<set_ $name>](&mut self, value: String) {
					self.insert(String::from($key), value)
				}

				fn [<remove_ $name>](&mut self) {
					let _ = self.remove($key);
				}
			)+
		}
	}
}

// Number fields, with the alternate key some taggers write for the same value
macro_rules! impl_number_accessor {
	($($name:ident => $key:literal $(| $alt:literal)?;)+) => {
		paste::paste! {
			$(
				fn $name(&self) -> Option<u32> {
					self.get($key)
						$(.or_else(|| self.get($alt)))?
						.and_then(|value| crate::util::split_pair(value).0)
				}

				fn [<set_ $name>](&mut self, value: u32) {
					$(let _ = self.remove($alt);)?
					self.insert(String::from($key), value.to_string())
				}

				fn [<remove_ $name>](&mut self) {
					$(let _ = self.remove($alt);)?
					let _ = self.remove($key);
				}
			)+
		}
	}
}

/// Vorbis comments
///
/// The tag format of Ogg Vorbis, Opus, and FLAC. Every field is a `KEY=value` pair, keys are
/// case-insensitive, and the same key may appear any number of times.
///
/// Pictures are stored as base64 encoded `METADATA_BLOCK_PICTURE` fields in Ogg streams, and
/// as `PICTURE` blocks in FLAC.
#[derive(Default, PartialEq, Eq, Debug, Clone)]
pub struct VorbisComments {
	/// An identifier for the encoding software
	pub(crate) vendor: String,
	/// A collection of key-value pairs
	pub(crate) items: Vec<(String, String)>,
	/// A collection of all pictures
	pub(crate) pictures: Vec<(Picture, PictureInformation)>,
}

impl VorbisComments {
	/// Create a new empty `VorbisComments`
	///
	/// # Examples
	///
	/// ```rust
	/// use tagcraft::ogg::VorbisComments;
	/// use tagcraft::tag::TagExt;
	///
	/// let vorbis_comments_tag = VorbisComments::new();
	/// assert!(vorbis_comments_tag.is_empty());
	/// ```
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the vendor string
	pub fn vendor(&self) -> &str {
		&self.vendor
	}

	/// Sets the vendor string
	///
	/// An empty vendor keeps the vendor already in the file when written.
	pub fn set_vendor(&mut self, vendor: String) {
		self.vendor = vendor
	}

	/// Gets all items, in the order they were read
	pub fn items(&self) -> impl ExactSizeIterator<Item = &(String, String)> + Clone {
		self.items.iter()
	}

	/// Gets the first item with the key
	///
	/// NOTE: There can be multiple items with the same key, this only retrieves the first
	///
	/// # Examples
	///
	/// ```rust
	/// use tagcraft::ogg::VorbisComments;
	///
	/// let mut vorbis_comments = VorbisComments::new();
	/// vorbis_comments.insert(String::from("TITLE"), String::from("Foo title"));
	///
	/// assert_eq!(vorbis_comments.get("title"), Some("Foo title"));
	/// ```
	pub fn get<'a>(&'a self, key: &'a str) -> Option<&'a str> {
		self.get_all(key).next()
	}

	/// Gets all items with the key
	///
	/// # Examples
	///
	/// ```rust
	/// use tagcraft::ogg::VorbisComments;
	///
	/// let mut vorbis_comments = VorbisComments::new();
	/// vorbis_comments.push(String::from("ARTIST"), String::from("Foo artist"));
	/// vorbis_comments.push(String::from("ARTIST"), String::from("Bar artist"));
	///
	/// let all_artists = vorbis_comments.get_all("ARTIST").collect::<Vec<_>>();
	/// assert_eq!(all_artists, vec!["Foo artist", "Bar artist"]);
	/// ```
	pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + Clone + 'a {
		self.items
			.iter()
			.filter(move |(k, _)| k.eq_ignore_ascii_case(key))
			.map(|(_, v)| v.as_str())
	}

	/// Replaces every item with the key
	///
	/// Invalid keys are ignored. A valid key is made of the printable ASCII characters,
	/// excluding `=`.
	pub fn insert(&mut self, key: String, value: String) {
		if !verify_key(&key) {
			return;
		}

		let _ = self.remove(&key);
		self.items.push((key, value))
	}

	/// Appends an item, keeping any others with the same key
	///
	/// Invalid keys are ignored. See [`VorbisComments::insert`].
	pub fn push(&mut self, key: String, value: String) {
		if !verify_key(&key) {
			return;
		}

		self.items.push((key, value))
	}

	/// Removes every item with the key, returning their values
	///
	/// # Examples
	///
	/// ```rust
	/// use tagcraft::ogg::VorbisComments;
	///
	/// let mut vorbis_comments = VorbisComments::new();
	/// vorbis_comments.push(String::from("ARTIST"), String::from("Foo artist"));
	/// vorbis_comments.push(String::from("ARTIST"), String::from("Bar artist"));
	///
	/// assert_eq!(vorbis_comments.remove("artist").len(), 2);
	/// assert_eq!(vorbis_comments.get("ARTIST"), None);
	/// ```
	pub fn remove(&mut self, key: &str) -> Vec<String> {
		let mut removed = Vec::new();
		self.items.retain_mut(|(k, v)| {
			if k.eq_ignore_ascii_case(key) {
				removed.push(std::mem::take(v));
				return false;
			}

			true
		});

		removed
	}
}

fn verify_key(key: &str) -> bool {
	if key.eq_ignore_ascii_case(METADATA_BLOCK_PICTURE) {
		log::warn!("Pictures go through `OggPictureStorage`, ignoring `{key}`");
		return false;
	}

	TagType::VorbisComments.accepts_custom_key(key)
}

impl Accessor for VorbisComments {
	impl_accessor!(
		artist  => "ARTIST";
		title   => "TITLE";
		album   => "ALBUM";
		genre   => "GENRE";
		comment => "COMMENT";
	);

	impl_number_accessor!(
		track       => "TRACKNUMBER";
		track_total => "TRACKTOTAL" | "TOTALTRACKS";
		disk        => "DISCNUMBER";
		disk_total  => "DISCTOTAL" | "TOTALDISCS";
	);

	fn year(&self) -> Option<u32> {
		if let Some(year) = self.get("YEAR").and_then(|y| y.parse().ok()) {
			return Some(year);
		}

		// DATE is usually "YYYY-MM-DD"
		self.get("DATE")
			.and_then(|date| date.get(..4))
			.and_then(|year| year.parse().ok())
	}

	// A full DATE is left alone
	fn set_year(&mut self, value: u32) {
		self.insert(String::from("YEAR"), value.to_string());
	}

	fn remove_year(&mut self) {
		let _ = self.remove("YEAR");
		let _ = self.remove("DATE");
	}
}

impl TagExt for VorbisComments {
	type Err = TagError;
	type RefKey<'a> = &'a str;

	#[inline]
	fn tag_type(&self) -> TagType {
		TagType::VorbisComments
	}

	fn len(&self) -> usize {
		self.items.len() + self.pictures.len()
	}

	fn contains<'a>(&'a self, key: Self::RefKey<'a>) -> bool {
		self.items.iter().any(|(k, _)| k.eq_ignore_ascii_case(key))
	}

	fn is_empty(&self) -> bool {
		self.items.is_empty() && self.pictures.is_empty()
	}

	/// Writes the tag to a file
	///
	/// # Errors
	///
	/// * The file isn't FLAC, Ogg Vorbis, or Opus
	/// * The file's stream is malformed
	fn save_to<F>(&self, file: &mut F, write_options: WriteOptions) -> std::result::Result<(), Self::Err>
	where
		F: FileLike,
	{
		super::write::write_to(file, self, write_options)
	}

	fn clear(&mut self) {
		self.items.clear();
		self.pictures.clear();
	}
}

impl From<VorbisComments> for Tag {
	fn from(input: VorbisComments) -> Self {
		let mut tag = Tag::new(TagType::VorbisComments);

		for (key, value) in input.items {
			tag.push_unchecked(TagItem::new(
				ItemKey::from_key_or_unknown(TagType::VorbisComments, &key),
				ItemValue::Text(value),
			));
		}

		for (picture, _info) in input.pictures {
			tag.push_picture(picture);
		}

		tag
	}
}

impl From<Tag> for VorbisComments {
	fn from(input: Tag) -> Self {
		let mut vorbis_comments = VorbisComments::new();

		for item in input.items {
			let Some(key) = item.key().map_key(TagType::VorbisComments).map(str::to_owned) else {
				log::debug!("Dropping item with no Vorbis comments mapping: {:?}", item.key());
				continue;
			};

			match item.into_value() {
				ItemValue::Text(text) | ItemValue::Locator(text) => {
					vorbis_comments.push(key, text)
				},
				ItemValue::Binary(_) => log::debug!("Dropping binary item `{key}`"),
			}
		}

		for picture in input.pictures {
			let information = PictureInformation::from_picture(&picture).unwrap_or_default();
			vorbis_comments.pictures.push((picture, information));
		}

		vorbis_comments
	}
}

#[cfg(test)]
mod tests {
	use super::VorbisComments;
	use crate::config::ParseOptions;
	use crate::picture::{MimeType, Picture, PictureType};
	use crate::tag::{Accessor, ItemKey, Tag, TagExt, TagType};

	#[test_log::test]
	fn case_insensitive_keys() {
		let mut tag = VorbisComments::new();
		tag.push(String::from("Artist"), String::from("Foo"));
		tag.insert(String::from("ARTIST"), String::from("Bar"));

		assert_eq!(tag.get_all("artist").collect::<Vec<_>>(), vec!["Bar"]);
		assert!(tag.contains("aRtIsT"));
	}

	#[test_log::test]
	fn invalid_keys_are_ignored() {
		let mut tag = VorbisComments::new();
		tag.push(String::from("KEY=VALUE"), String::from("Foo"));
		tag.push(String::new(), String::from("Foo"));
		tag.push(String::from("MÜSIC"), String::from("Foo"));
		tag.insert(String::from("metadata_block_picture"), String::from("Zm9v"));

		assert!(tag.is_empty());
	}

	#[test_log::test]
	fn number_accessors() {
		let mut tag = VorbisComments::new();
		tag.push(String::from("TOTALTRACKS"), String::from("12"));
		assert_eq!(tag.track_total(), Some(12));

		tag.set_track_total(10);
		assert_eq!(tag.get("TRACKTOTAL"), Some("10"));
		assert_eq!(tag.get("TOTALTRACKS"), None);

		tag.set_track(5);
		tag.remove_track_total();
		assert_eq!(tag.track(), Some(5));
		assert_eq!(tag.track_total(), None);

		tag.push(String::from("DATE"), String::from("2005-06-07"));
		assert_eq!(tag.year(), Some(2005));
	}

	#[test_log::test]
	fn generic_conversion() {
		let mut vorbis_comments = VorbisComments::new();
		vorbis_comments.set_vendor(String::from("Encoder v1"));
		vorbis_comments.push(String::from("TITLE"), String::from("Foo title"));
		vorbis_comments.push(String::from("ARTIST"), String::from("Foo"));
		vorbis_comments.push(String::from("ARTIST"), String::from("Bar"));
		vorbis_comments.push(String::from("MY_CUSTOM_KEY"), String::from("Custom"));
		vorbis_comments.pictures.push((
			Picture::unchecked(vec![1, 2, 3])
				.pic_type(PictureType::CoverFront)
				.mime_type(MimeType::Png)
				.build(),
			Default::default(),
		));

		let tag: Tag = vorbis_comments.clone().into();
		assert_eq!(tag.tag_type(), TagType::VorbisComments);
		assert_eq!(tag.get_string(&ItemKey::TrackTitle), Some("Foo title"));
		assert_eq!(
			tag.get_strings(&ItemKey::TrackArtist).collect::<Vec<_>>(),
			vec!["Foo", "Bar"]
		);
		assert_eq!(
			tag.get_string(&ItemKey::Unknown(String::from("MY_CUSTOM_KEY"))),
			Some("Custom")
		);
		assert_eq!(tag.pictures().len(), 1);

		let back: VorbisComments = tag.into();
		assert_eq!(back.items, vorbis_comments.items);
		assert_eq!(back.pictures.len(), 1);
		// The vendor belongs to the file, not the generic tag
		assert!(back.vendor().is_empty());
	}

	#[test_log::test]
	fn binary_items_are_dropped() {
		let mut tag = Tag::new(TagType::VorbisComments);
		tag.insert_text(ItemKey::TrackTitle, String::from("Foo title"));
		tag.push_unchecked(crate::tag::TagItem::new(
			ItemKey::Unknown(String::from("BINARY")),
			crate::tag::ItemValue::Binary(vec![1, 2, 3]),
		));

		let vorbis_comments: VorbisComments = tag.into();
		assert_eq!(vorbis_comments.len(), 1);
	}

	#[test_log::test]
	fn read_block() {
		let mut block = Vec::new();
		block.extend(6u32.to_le_bytes());
		block.extend(b"vendor");
		block.extend(2u32.to_le_bytes());
		for field in [&b"TITLE=Foo title"[..], b"TRACKNUMBER=5/12"] {
			block.extend((field.len() as u32).to_le_bytes());
			block.extend(field);
		}

		let tag = crate::ogg::read::read_comments(&mut &block[..], ParseOptions::new()).unwrap();
		assert_eq!(tag.vendor(), "vendor");
		assert_eq!(tag.title().as_deref(), Some("Foo title"));
		assert_eq!(tag.track(), Some(5));
		assert_eq!(tag.track_total(), Some(12));
	}
}
