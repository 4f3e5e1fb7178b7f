use super::frame::{Frame, UNKNOWN_LANGUAGE, is_valid_frame_id};
use super::header::Id3v2Version;
use crate::config::WriteOptions;
use crate::error::TagError;
use crate::file::FileType;
use crate::macros::err;
use crate::probe::Probe;
use crate::tag::{Accessor, ItemKey, ItemValue, Tag, TagExt, TagItem, TagType};
use crate::util::io::FileLike;
use crate::util::split_pair;

use std::borrow::Cow;

const TRACK_ID: &str = "TRCK";
const DISC_ID: &str = "TPOS";

// ID3v2.4 separates multiple values with a null byte
const MULTI_VALUE_SEPARATOR: char = '\0';

macro_rules! impl_accessor {
	($($name:ident => $id:literal;)+) => {
		paste::paste! {
			$(
				fn $name(&self) -> Option<Cow<'_, str>> {
					self.get_text($id).map(Cow::Borrowed)
				}

				fn [<set_ $name>](&mut self, value: String) {
					let _ = self.insert(Frame::text($id, value));
				}

				fn [<remove_ $name>](&mut self) {
					let _ = self.remove($id);
				}
			)+
		}
	}
}

/// An `ID3v2` tag
///
/// ## Number pairs
///
/// Track and disc numbers are stored as `current/total` in `TRCK` and `TPOS`. Setting either
/// half through [`Accessor`] keeps the other, and removing one half leaves the other in place.
///
/// ## Conversions
///
/// When converting to a [`Tag`], text frames are split into one item per value, and `TXXX`
/// frames are keyed by their description. Other frames become binary items keyed by their ID,
/// so they survive a round trip.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Id3v2Tag {
	pub(crate) original_version: Id3v2Version,
	pub(crate) frames: Vec<Frame>,
}

impl Default for Id3v2Tag {
	fn default() -> Self {
		Self {
			original_version: Id3v2Version::V4,
			frames: Vec::new(),
		}
	}
}

impl Id3v2Tag {
	/// Create a new empty `ID3v2` tag
	///
	/// # Examples
	///
	/// ```rust
	/// use tagcraft::id3::v2::Id3v2Tag;
	/// use tagcraft::tag::TagExt;
	///
	/// let id3v2_tag = Id3v2Tag::new();
	/// assert!(id3v2_tag.is_empty());
	/// ```
	pub fn new() -> Self {
		Self::default()
	}

	/// The version the tag was read as
	///
	/// This has no effect on writing, tags are always written as ID3v2.4.
	pub fn original_version(&self) -> Id3v2Version {
		self.original_version
	}

	/// All frames, in the order they were read or inserted
	pub fn frames(&self) -> impl ExactSizeIterator<Item = &Frame> + Clone {
		self.frames.iter()
	}

	/// Gets the first frame with the ID
	pub fn get(&self, id: &str) -> Option<&Frame> {
		self.frames.iter().find(|frame| frame.id() == id)
	}

	/// Gets the text of a text information frame
	///
	/// # Examples
	///
	/// ```rust
	/// use tagcraft::id3::v2::{Frame, Id3v2Tag};
	///
	/// let mut tag = Id3v2Tag::new();
	/// tag.insert(Frame::text("TIT2", "Foo title"));
	///
	/// assert_eq!(tag.get_text("TIT2"), Some("Foo title"));
	/// ```
	pub fn get_text(&self, id: &str) -> Option<&str> {
		match self.get(id)? {
			Frame::Text { value, .. } => Some(value),
			_ => None,
		}
	}

	/// Gets the content of the `TXXX` frame with `description`
	///
	/// Descriptions are compared case-insensitively.
	pub fn get_user_text(&self, description: &str) -> Option<&str> {
		self.frames.iter().find_map(|frame| match frame {
			Frame::UserText {
				description: frame_description,
				content,
				..
			} if frame_description.eq_ignore_ascii_case(description) => Some(content.as_str()),
			_ => None,
		})
	}

	/// Inserts a frame, replacing and returning any frame describing the same item
	///
	/// Text frames are unique per ID, `COMM`/`USLT` per language and description, and `TXXX` per
	/// description. Other frames are always appended.
	pub fn insert(&mut self, frame: Frame) -> Option<Frame> {
		if let Some(pos) = self.frames.iter().position(|f| f.same_item(&frame)) {
			return Some(std::mem::replace(&mut self.frames[pos], frame));
		}

		self.frames.push(frame);
		None
	}

	/// Removes and returns all frames with the ID
	pub fn remove(&mut self, id: &str) -> Vec<Frame> {
		let (removed, kept) = std::mem::take(&mut self.frames)
			.into_iter()
			.partition(|frame| frame.id() == id);

		self.frames = kept;
		removed
	}

	/// Removes the `TXXX` frame with `description`
	pub fn remove_user_text(&mut self, description: &str) -> Option<Frame> {
		let pos = self.frames.iter().position(|frame| {
			matches!(frame, Frame::UserText { description: d, .. } if d.eq_ignore_ascii_case(description))
		})?;

		Some(self.frames.remove(pos))
	}

	// A comment with no description, or the first one there is
	fn comment_content(&self) -> Option<&str> {
		let mut comments = self.frames.iter().filter_map(|frame| match frame {
			Frame::Comment {
				id,
				description,
				content,
				..
			} if id == "COMM" => Some((description, content.as_str())),
			_ => None,
		});

		let first = comments.next()?;
		if first.0.is_empty() {
			return Some(first.1);
		}

		Some(
			comments
				.find(|(description, _)| description.is_empty())
				.unwrap_or(first)
				.1,
		)
	}

	fn number_pair(&self, id: &str) -> (Option<u32>, Option<u32>) {
		self.get_text(id).map(split_pair).unwrap_or_default()
	}

	// A zero is the same as a missing half
	fn set_number_pair(&mut self, id: &str, current: Option<u32>, total: Option<u32>) {
		let value = match (current.filter(|n| *n > 0), total.filter(|n| *n > 0)) {
			(Some(current), Some(total)) => format!("{current}/{total}"),
			(Some(current), None) => current.to_string(),
			(None, Some(total)) => format!("0/{total}"),
			(None, None) => {
				let _ = self.remove(id);
				return;
			},
		};

		let _ = self.insert(Frame::text(id, value));
	}
}

impl Accessor for Id3v2Tag {
	impl_accessor!(
		artist => "TPE1";
		title  => "TIT2";
		album  => "TALB";
		genre  => "TCON";
	);

	fn comment(&self) -> Option<Cow<'_, str>> {
		self.comment_content().map(Cow::Borrowed)
	}

	fn set_comment(&mut self, value: String) {
		let _ = self.insert(Frame::Comment {
			id: String::from("COMM"),
			encoding: crate::util::text::TextEncoding::UTF8,
			language: UNKNOWN_LANGUAGE,
			description: String::new(),
			content: value,
		});
	}

	fn remove_comment(&mut self) {
		let _ = self.remove("COMM");
	}

	fn track(&self) -> Option<u32> {
		self.number_pair(TRACK_ID).0
	}

	fn set_track(&mut self, value: u32) {
		let total = self.track_total();
		self.set_number_pair(TRACK_ID, Some(value), total);
	}

	fn remove_track(&mut self) {
		let total = self.track_total();
		self.set_number_pair(TRACK_ID, None, total);
	}

	fn track_total(&self) -> Option<u32> {
		self.number_pair(TRACK_ID).1
	}

	fn set_track_total(&mut self, value: u32) {
		let current = self.track();
		self.set_number_pair(TRACK_ID, current, Some(value));
	}

	fn remove_track_total(&mut self) {
		let current = self.track();
		self.set_number_pair(TRACK_ID, current, None);
	}

	fn disk(&self) -> Option<u32> {
		self.number_pair(DISC_ID).0
	}

	fn set_disk(&mut self, value: u32) {
		let total = self.disk_total();
		self.set_number_pair(DISC_ID, Some(value), total);
	}

	fn remove_disk(&mut self) {
		let total = self.disk_total();
		self.set_number_pair(DISC_ID, None, total);
	}

	fn disk_total(&self) -> Option<u32> {
		self.number_pair(DISC_ID).1
	}

	fn set_disk_total(&mut self, value: u32) {
		let current = self.disk();
		self.set_number_pair(DISC_ID, current, Some(value));
	}

	fn remove_disk_total(&mut self) {
		let current = self.disk();
		self.set_number_pair(DISC_ID, current, None);
	}

	// TDRC is a timestamp, "YYYY-MM-DDTHH:MM:SS" or any prefix of it
	fn year(&self) -> Option<u32> {
		self.get_text("TDRC")
			.and_then(|date| date.get(..4))
			.and_then(|year| year.parse().ok())
	}

	fn set_year(&mut self, value: u32) {
		let _ = self.insert(Frame::text("TDRC", value.to_string()));
	}

	fn remove_year(&mut self) {
		let _ = self.remove("TDRC");
	}
}

impl TagExt for Id3v2Tag {
	type Err = TagError;
	type RefKey<'a> = &'a str;

	#[inline]
	fn tag_type(&self) -> TagType {
		TagType::Id3v2
	}

	fn len(&self) -> usize {
		self.frames.len()
	}

	fn contains<'a>(&'a self, key: Self::RefKey<'a>) -> bool {
		self.frames.iter().any(|frame| frame.id() == key)
	}

	fn is_empty(&self) -> bool {
		self.frames.is_empty()
	}

	/// Writes the tag to a file
	///
	/// # Errors
	///
	/// * The file isn't a WAV file
	/// * The file's chunks are malformed
	fn save_to<F>(&self, file: &mut F, write_options: WriteOptions) -> std::result::Result<(), Self::Err>
	where
		F: FileLike,
	{
		file.rewind()?;
		let file_type = Probe::new(&mut *file).guess_file_type()?.file_type();
		file.rewind()?;

		match file_type {
			Some(FileType::Wav) => crate::iff::wav::write::write_to(file, None, Some(self), write_options),
			Some(_) => err!(UnsupportedTag),
			None => err!(UnknownFormat),
		}
	}

	fn clear(&mut self) {
		self.frames.clear();
	}
}

impl From<Id3v2Tag> for Tag {
	fn from(input: Id3v2Tag) -> Self {
		fn push_number(tag: &mut Tag, key: ItemKey, number: Option<u32>) {
			if let Some(number) = number {
				tag.push_unchecked(TagItem::new(key, ItemValue::Text(number.to_string())));
			}
		}

		let mut tag = Tag::new(TagType::Id3v2);

		for frame in input.frames {
			match frame {
				Frame::Text { id, value, .. } if id == TRACK_ID || id == DISC_ID => {
					let (current, total) = split_pair(&value);
					let (current_key, total_key) = if id == TRACK_ID {
						(ItemKey::TrackNumber, ItemKey::TrackTotal)
					} else {
						(ItemKey::DiscNumber, ItemKey::DiscTotal)
					};

					push_number(&mut tag, current_key, current.filter(|n| *n > 0));
					push_number(&mut tag, total_key, total);
				},
				Frame::Text { id, value, .. } => {
					let key = ItemKey::from_key_or_unknown(TagType::Id3v2, &id);
					for value in value.split(MULTI_VALUE_SEPARATOR) {
						tag.push_unchecked(TagItem::new(key.clone(), ItemValue::Text(value.to_owned())));
					}
				},
				Frame::UserText {
					description,
					content,
					..
				} => tag.push_unchecked(TagItem::new(
					ItemKey::from_key_or_unknown(TagType::Id3v2, &description),
					ItemValue::Text(content),
				)),
				// Only comments and lyrics without a description have a generic equivalent
				Frame::Comment {
					id,
					description,
					content,
					..
				} => {
					if !description.is_empty() {
						log::debug!("Dropping {id} frame with description {description:?}");
						continue;
					}

					tag.push_unchecked(TagItem::new(
						ItemKey::from_key_or_unknown(TagType::Id3v2, &id),
						ItemValue::Text(content),
					));
				},
				Frame::Binary { id, data } => tag.push_unchecked(TagItem::new(
					ItemKey::Unknown(id),
					ItemValue::Binary(data),
				)),
			}
		}

		tag
	}
}

impl From<Tag> for Id3v2Tag {
	fn from(input: Tag) -> Self {
		let mut id3v2 = Id3v2Tag::new();

		for item in input.items {
			let key = item.key().clone();
			let Some(id) = key.map_key(TagType::Id3v2).map(str::to_owned) else {
				log::debug!("Dropping item with no ID3v2 mapping: {key:?}");
				continue;
			};

			let text = match item.into_value() {
				ItemValue::Text(text) | ItemValue::Locator(text) => text,
				ItemValue::Binary(data) => {
					if is_valid_frame_id(&id) {
						id3v2.frames.push(Frame::Binary { id, data });
					} else {
						log::debug!("Dropping binary item `{id}`");
					}

					continue;
				},
			};

			match key {
				ItemKey::TrackNumber | ItemKey::TrackTotal | ItemKey::DiscNumber | ItemKey::DiscTotal => {
					let Some(number) = split_pair(&text).0 else {
						log::debug!("Dropping non-numeric {key:?}: {text:?}");
						continue;
					};

					match key {
						ItemKey::TrackNumber => id3v2.set_track(number),
						ItemKey::TrackTotal => id3v2.set_track_total(number),
						ItemKey::DiscNumber => id3v2.set_disk(number),
						_ => id3v2.set_disk_total(number),
					}
				},
				_ if id == "COMM" || id == "USLT" => {
					let _ = id3v2.insert(Frame::Comment {
						id,
						encoding: crate::util::text::TextEncoding::UTF8,
						language: UNKNOWN_LANGUAGE,
						description: String::new(),
						content: text,
					});
				},
				_ if is_valid_frame_id(&id) => {
					if !id.starts_with('T') || id == "TXXX" {
						log::debug!("Dropping text item for non-text frame `{id}`");
						continue;
					}

					// Repeated keys become a multi-value frame
					match id3v2.frames.iter_mut().find(|frame| frame.id() == id) {
						Some(Frame::Text { value, .. }) => {
							value.push(MULTI_VALUE_SEPARATOR);
							value.push_str(&text);
						},
						_ => id3v2.frames.push(Frame::text(id, text)),
					}
				},
				_ => {
					let _ = id3v2.insert(Frame::user_text(id, text));
				},
			}
		}

		id3v2
	}
}

#[cfg(test)]
mod tests {
	use super::Id3v2Tag;
	use crate::id3::v2::Frame;
	use crate::tag::{Accessor, ItemKey, ItemValue, Tag, TagExt, TagItem, TagType};

	#[test_log::test]
	fn number_pairs() {
		let mut tag = Id3v2Tag::new();

		tag.set_track(5);
		tag.set_track_total(12);
		assert_eq!(tag.get_text("TRCK"), Some("5/12"));

		tag.remove_track_total();
		assert_eq!(tag.get_text("TRCK"), Some("5"));
		assert_eq!(tag.track(), Some(5));

		tag.set_disk_total(2);
		assert_eq!(tag.get_text("TPOS"), Some("0/2"));
		assert_eq!(tag.disk(), Some(0));

		tag.remove_disk_total();
		assert!(tag.get("TPOS").is_none());
	}

	#[test_log::test]
	fn insert_replaces() {
		let mut tag = Id3v2Tag::new();
		assert!(tag.insert(Frame::text("TIT2", "Foo")).is_none());
		assert!(tag.insert(Frame::text("TIT2", "Bar")).is_some());
		assert!(tag.insert(Frame::user_text("MOOD", "Happy")).is_none());
		assert!(tag.insert(Frame::user_text("mood", "Sad")).is_some());
		assert_eq!(tag.len(), 2);
		assert_eq!(tag.get_user_text("MOOD"), Some("Sad"));

		assert!(tag.remove_user_text("Mood").is_some());
		assert_eq!(tag.len(), 1);
	}

	#[test_log::test]
	fn comments() {
		let mut tag = Id3v2Tag::new();
		tag.frames.push(Frame::Comment {
			id: String::from("COMM"),
			encoding: crate::util::text::TextEncoding::Latin1,
			language: *b"eng",
			description: String::from("iTunNORM"),
			content: String::from("0000"),
		});
		tag.frames.push(Frame::comment("Qux comment"));

		assert_eq!(tag.comment().as_deref(), Some("Qux comment"));

		let generic: Tag = tag.into();
		assert_eq!(generic.get_strings(&ItemKey::Comment).collect::<Vec<_>>(), vec!["Qux comment"]);
	}

	#[test_log::test]
	fn generic_conversion() {
		let mut tag = Id3v2Tag::new();
		tag.insert(Frame::text("TPE1", "Foo artist\0Bar artist"));
		tag.insert(Frame::text("TRCK", "3/9"));
		tag.insert(Frame::user_text("BARCODE", "0123456789"));
		tag.insert(Frame::user_text("MY CUSTOM KEY", "value"));
		tag.frames.push(Frame::Binary {
			id: String::from("PRIV"),
			data: vec![1, 2, 3],
		});

		let generic: Tag = tag.clone().into();
		assert_eq!(
			generic.get_strings(&ItemKey::TrackArtist).collect::<Vec<_>>(),
			vec!["Foo artist", "Bar artist"]
		);
		assert_eq!(generic.get_string(&ItemKey::TrackNumber), Some("3"));
		assert_eq!(generic.get_string(&ItemKey::TrackTotal), Some("9"));
		assert_eq!(generic.get_string(&ItemKey::Barcode), Some("0123456789"));

		let back: Id3v2Tag = generic.into();
		assert_eq!(back.get_text("TPE1"), Some("Foo artist\0Bar artist"));
		assert_eq!(back.get_text("TRCK"), Some("3/9"));
		assert_eq!(back.get_user_text("BARCODE"), Some("0123456789"));
		assert_eq!(back.get_user_text("MY CUSTOM KEY"), Some("value"));
		assert_eq!(back.get("PRIV"), tag.get("PRIV"));
	}

	#[test_log::test]
	fn composite_from_generic() {
		let mut generic = Tag::new(TagType::Id3v2);
		generic.insert_text(ItemKey::TrackNumber, String::from("5"));
		generic.insert_text(ItemKey::TrackTotal, String::from("12"));
		generic.push_unchecked(TagItem::new(
			ItemKey::Unknown(String::from("WOAR")),
			ItemValue::Text(String::from("https://example.com")),
		));

		let id3v2: Id3v2Tag = generic.into();
		assert_eq!(id3v2.get_text("TRCK"), Some("5/12"));
		assert_eq!(id3v2.len(), 1);
	}
}
