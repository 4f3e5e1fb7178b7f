pub(super) mod read;
pub(super) mod write;

use crate::config::WriteOptions;
use crate::error::TagError;
use crate::file::FileType;
use crate::macros::err;
use crate::probe::Probe;
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

/// A RIFF INFO list
///
/// Every item is a chunk with a 4 character ASCII key, holding a null terminated string. Keys are
/// case-insensitive, and unique within a list.
///
/// ## Conversions
///
/// ### To `Tag`
///
/// Every item is converted, items without an [`ItemKey`] mapping become [`ItemKey::Unknown`].
///
/// ### From `Tag`
///
/// When converting a [`TagItem`], the only conditions are that:
///
/// * It has an [`ItemKey`] mapping, or is an [`ItemKey::Unknown`] with a valid chunk ID
/// * It has a value of [`ItemValue::Text`] or [`ItemValue::Locator`]
///
/// #### Pictures
///
/// Pictures will be discarded, as they aren't supported in this format.
#[derive(Default, Debug, PartialEq, Eq, Clone)]
pub struct RiffInfoList {
	/// A collection of chunk-value pairs
	pub(crate) items: Vec<(String, String)>,
}

impl RiffInfoList {
	/// Create a new empty `RiffInfoList`
	///
	/// # Examples
	///
	/// ```rust
	/// use tagcraft::iff::wav::RiffInfoList;
	/// use tagcraft::tag::TagExt;
	///
	/// let riff_info_tag = RiffInfoList::new();
	/// assert!(riff_info_tag.is_empty());
	/// ```
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the items in the list
	pub fn items(&self) -> impl ExactSizeIterator<Item = (&str, &str)> + Clone {
		self.items.iter().map(|(k, v)| (k.as_str(), v.as_str()))
	}

	/// Get an item by key
	pub fn get(&self, key: &str) -> Option<&str> {
		self.items
			.iter()
			.find(|(k, _)| k.eq_ignore_ascii_case(key))
			.map(|(_, v)| v.as_str())
	}

	/// Insert an item
	///
	/// NOTE: This will do nothing if `key` is invalid
	///
	/// This will case-insensitively replace any item with the same key
	///
	/// # Examples
	///
	/// ```rust
	/// use tagcraft::iff::wav::RiffInfoList;
	///
	/// let mut riff_info = RiffInfoList::new();
	/// riff_info.insert(String::from("IART"), String::from("Foo artist"));
	/// riff_info.insert(String::from("iart"), String::from("Bar artist"));
	///
	/// // Not a valid chunk ID
	/// riff_info.insert(String::from("ARTIST"), String::from("Baz artist"));
	///
	/// assert_eq!(riff_info.items().len(), 1);
	/// assert_eq!(riff_info.get("IART"), Some("Bar artist"));
	/// ```
	pub fn insert(&mut self, key: String, value: String) {
		if !TagType::RiffInfo.accepts_custom_key(&key) {
			log::warn!("RIFF INFO: Ignoring invalid key \"{key}\"");
			return;
		}

		let _ = self.remove(&key);
		self.items.push((key, value))
	}

	/// Remove an item by key
	///
	/// This will case-insensitively remove an item with the key, returning it
	/// if it exists.
	pub fn remove(&mut self, key: &str) -> Option<String> {
		let pos = self
			.items
			.iter()
			.position(|(k, _)| k.eq_ignore_ascii_case(key))?;

		Some(self.items.remove(pos).1)
	}
}

impl Accessor for RiffInfoList {
	impl_accessor!(
		artist  => "IART";
		title   => "INAM";
		album   => "IPRD";
		genre   => "IGNR";
		comment => "ICMT";
	);

	fn track(&self) -> Option<u32> {
		self.get("IPRT")
			.or_else(|| self.get("ITRK"))
			.and_then(|value| crate::util::split_pair(value).0)
	}

	fn set_track(&mut self, value: u32) {
		let _ = self.remove("ITRK");
		self.insert(String::from("IPRT"), value.to_string());
	}

	fn remove_track(&mut self) {
		let _ = self.remove("IPRT");
		let _ = self.remove("ITRK");
	}

	fn track_total(&self) -> Option<u32> {
		self.get("IFRM").and_then(|value| value.trim().parse().ok())
	}

	fn set_track_total(&mut self, value: u32) {
		self.insert(String::from("IFRM"), value.to_string());
	}

	fn remove_track_total(&mut self) {
		let _ = self.remove("IFRM");
	}

	// ICRD is usually "YYYY-MM-DD"
	fn year(&self) -> Option<u32> {
		self.get("ICRD")
			.and_then(|date| date.get(..4))
			.and_then(|year| year.parse().ok())
	}

	fn set_year(&mut self, value: u32) {
		self.insert(String::from("ICRD"), value.to_string());
	}

	fn remove_year(&mut self) {
		let _ = self.remove("ICRD");
	}
}

impl IntoIterator for RiffInfoList {
	type Item = (String, String);
	type IntoIter = std::vec::IntoIter<Self::Item>;

	fn into_iter(self) -> Self::IntoIter {
		self.items.into_iter()
	}
}

impl TagExt for RiffInfoList {
	type Err = TagError;
	type RefKey<'a> = &'a str;

	#[inline]
	fn tag_type(&self) -> TagType {
		TagType::RiffInfo
	}

	fn len(&self) -> usize {
		self.items.len()
	}

	fn contains<'a>(&'a self, key: Self::RefKey<'a>) -> bool {
		self.items
			.iter()
			.any(|(item_key, _)| item_key.eq_ignore_ascii_case(key))
	}

	fn is_empty(&self) -> bool {
		self.items.is_empty()
	}

	/// Writes the list to a WAV file, leaving any ID3v2 chunk untouched
	fn save_to<F>(&self, file: &mut F, write_options: WriteOptions) -> std::result::Result<(), Self::Err>
	where
		F: FileLike,
	{
		file.rewind()?;
		let file_type = Probe::new(&mut *file).guess_file_type()?.file_type();
		file.rewind()?;

		match file_type {
			Some(FileType::Wav) => super::write::write_to(file, Some(self), None, write_options),
			Some(_) => err!(UnsupportedTag),
			None => err!(UnknownFormat),
		}
	}

	fn clear(&mut self) {
		self.items.clear();
	}
}

impl From<RiffInfoList> for Tag {
	fn from(input: RiffInfoList) -> Self {
		let mut tag = Self::new(TagType::RiffInfo);

		for (k, v) in input.items {
			tag.push_unchecked(TagItem::new(
				ItemKey::from_key_or_unknown(TagType::RiffInfo, &k),
				ItemValue::Text(v),
			));
		}

		tag
	}
}

impl From<Tag> for RiffInfoList {
	fn from(input: Tag) -> Self {
		let mut riff_info = RiffInfoList::default();

		for item in input.items {
			let Some(key) = item.key().map_key(TagType::RiffInfo).map(str::to_owned) else {
				log::debug!("Dropping item with no RIFF INFO mapping: {:?}", item.key());
				continue;
			};

			match item.into_value() {
				ItemValue::Text(text) | ItemValue::Locator(text) => riff_info.insert(key, text),
				ItemValue::Binary(_) => log::debug!("Dropping binary item `{key}`"),
			}
		}

		if !input.pictures.is_empty() {
			log::debug!("RIFF INFO: Dropping {} picture(s)", input.pictures.len());
		}

		riff_info
	}
}
