pub(super) mod advisory_rating;
pub(super) mod atom;
pub(super) mod constants;
pub(super) mod data_type;
pub(super) mod read;
pub(crate) mod write;

use super::AtomIdent;
use crate::config::WriteOptions;
use crate::error::TagError;
use crate::picture::{Picture, PictureType};
use crate::tag::{Accessor, ItemKey, ItemValue, Tag, TagExt, TagItem, TagType};
use crate::util::io::FileLike;
use advisory_rating::AdvisoryRating;
use atom::{Atom, AtomData};
use data_type::DataType;

use std::borrow::Cow;

const ARTIST: AtomIdent<'_> = AtomIdent::Fourcc(*b"\xa9ART");
const TITLE: AtomIdent<'_> = AtomIdent::Fourcc(*b"\xa9nam");
const ALBUM: AtomIdent<'_> = AtomIdent::Fourcc(*b"\xa9alb");
const GENRE: AtomIdent<'_> = AtomIdent::Fourcc(*b"\xa9gen");
const GNRE: AtomIdent<'_> = AtomIdent::Fourcc(*b"gnre");
const COMMENT: AtomIdent<'_> = AtomIdent::Fourcc(*b"\xa9cmt");
const DATE: AtomIdent<'_> = AtomIdent::Fourcc(*b"\xa9day");
const TEMPO: AtomIdent<'_> = AtomIdent::Fourcc(*b"tmpo");
const ADVISORY_RATING: AtomIdent<'_> = AtomIdent::Fourcc(*b"rtng");
const COVR: AtomIdent<'_> = AtomIdent::Fourcc(*b"covr");

const TRACK: [u8; 4] = *b"trkn";
const DISK: [u8; 4] = *b"disk";

macro_rules! impl_accessor {
	($($name:ident => $const:ident;)+) => {
		paste::paste! {
			$(
				fn $name(&self) -> Option<Cow<'_, str>> {
					if let Some(atom) = self.get(&$const) {
						if let Some(AtomData::UTF8(val) | AtomData::UTF16(val)) = atom.data().next() {
							return Some(Cow::Borrowed(val));
						}
					}

					None
				}

				fn [<set_ $name>](&mut self, value: String) {
					self.replace_atom(Atom::text($const, value))
				}

				fn [<remove_ $name>](&mut self) {
					let _ = self.remove(&$const);
				}
			)+
		}
	}
}

macro_rules! impl_flag_accessors {
	($($name:ident ($ident:ident)),+ $(,)?) => {
		$(
			paste::paste! {
				#[doc = "Whether the `" $ident "` flag atom is set"]
				///
				/// # Examples
				///
				/// ```rust
				#[doc = "use tagcraft::mp4::constants::flags::" $name ";"]
				/// use tagcraft::mp4::Ilst;
				///
				/// let mut ilst = Ilst::new();
				#[doc = "ilst.set_flag(" $name ", true);"]
				///
				#[doc = "assert!(ilst.is_" $name:lower "());"]
				pub fn [<is_ $name:lower>](&self) -> bool {
					self.get_flag(&constants::flags::$name).unwrap_or(false)
				}
			}
		)+
	};
}

/// An MP4 `ilst` atom
///
/// ## Pictures
///
/// Unlike other formats, ilst does not store a [`PictureType`]. All pictures will have
/// [`PictureType::Other`].
///
/// ## Genres
///
/// A genre is either stored as text in `©gen`, or as an index into [`GENRES`] in `gnre`. Only one
/// of the two is kept, see [`Ilst::set_genre`](Accessor::set_genre).
///
/// ## Conversions
///
/// ### To `Tag`
///
/// For an [`Atom`] to be converted it must:
///
/// * Have a text, integer, or flag value
/// * **OR** be a `trkn`/`disk`/`gnre` atom
/// * **OR** be a `covr` atom
///
/// ### From `Tag`
///
/// Text items with an `ilst` mapping (or a freeform key, `----:mean:name`) are converted.
/// `TrackNumber/TrackTotal` and `DiscNumber/DiscTotal` are packed into the `trkn` and `disk`
/// atoms.
///
/// [`GENRES`]: crate::mp4::constants::GENRES
#[derive(Default, PartialEq, Debug, Clone)]
pub struct Ilst {
	pub(crate) atoms: Vec<Atom<'static>>,
}

impl Ilst {
	/// Create a new empty `Ilst`
	///
	/// # Examples
	///
	/// ```rust
	/// use tagcraft::mp4::Ilst;
	/// use tagcraft::tag::TagExt;
	///
	/// let ilst_tag = Ilst::new();
	/// assert!(ilst_tag.is_empty());
	/// ```
	pub fn new() -> Self {
		Self::default()
	}

	/// Get an item by its [`AtomIdent`]
	///
	/// # Examples
	///
	/// ```rust
	/// use tagcraft::mp4::{AtomIdent, Ilst};
	/// use tagcraft::tag::Accessor;
	///
	/// let mut ilst = Ilst::new();
	/// ilst.set_title(String::from("Foo title"));
	///
	/// let title = ilst.get(&AtomIdent::Fourcc(*b"\xa9nam"));
	/// assert!(title.is_some());
	/// ```
	pub fn get(&self, ident: &AtomIdent<'_>) -> Option<&Atom<'static>> {
		self.atoms.iter().find(|a| &a.ident == ident)
	}

	fn get_mut(&mut self, ident: &AtomIdent<'_>) -> Option<&mut Atom<'static>> {
		self.atoms.iter_mut().find(|a| &a.ident == ident)
	}

	/// Inserts an [`Atom`]
	///
	/// NOTE: Do not use this to replace atoms. The atom's values are merged into an existing
	///       atom with the same identifier. To replace an atom, use [`Ilst::replace_atom`].
	///
	/// # Examples
	///
	/// ```rust
	/// use tagcraft::mp4::{Atom, AtomData, AtomIdent, Ilst};
	///
	/// const ARTIST: AtomIdent = AtomIdent::Fourcc(*b"\xa9ART");
	///
	/// let mut ilst = Ilst::new();
	/// ilst.insert(Atom::new(ARTIST, AtomData::UTF8(String::from("Foo"))));
	/// ilst.insert(Atom::new(ARTIST, AtomData::UTF8(String::from("Bar"))));
	///
	/// assert_eq!(ilst.get(&ARTIST).unwrap().data().count(), 2);
	/// ```
	pub fn insert(&mut self, atom: Atom<'static>) {
		if atom.ident == COVR && atom.data.is_pictures() {
			for data in atom.data {
				if let AtomData::Picture(picture) = data {
					self.insert_picture(picture);
				}
			}
			return;
		}

		match self.get_mut(atom.ident()) {
			Some(existing) => {
				for data in atom.data {
					existing.push_data(data);
				}
			},
			None => self.atoms.push(atom),
		}
	}

	/// Inserts an [`Atom`], replacing any atom with the same [`AtomIdent`]
	///
	/// # Examples
	///
	/// ```rust
	/// use tagcraft::mp4::{Atom, AtomData, AtomIdent, Ilst};
	/// use tagcraft::tag::Accessor;
	///
	/// let mut ilst = Ilst::new();
	///
	/// ilst.set_title(String::from("FooBar"));
	/// ilst.replace_atom(Atom::new(
	/// 	AtomIdent::Fourcc(*b"\xa9nam"),
	/// 	AtomData::UTF8(String::from("BarFoo")),
	/// ));
	/// assert_eq!(ilst.title().as_deref(), Some("BarFoo"));
	/// ```
	pub fn replace_atom(&mut self, atom: Atom<'_>) {
		let _ = self.remove(&atom.ident);
		self.atoms.push(atom.into_owned());
	}

	/// Remove an atom by its [`AtomIdent`], returning it
	///
	/// # Examples
	///
	/// ```rust
	/// use tagcraft::mp4::{AtomIdent, Ilst};
	/// use tagcraft::tag::Accessor;
	///
	/// const TITLE: AtomIdent = AtomIdent::Fourcc(*b"\xa9nam");
	///
	/// let mut ilst = Ilst::new();
	/// ilst.set_title(String::from("Foo title"));
	///
	/// assert!(ilst.remove(&TITLE).is_some());
	/// assert!(ilst.get(&TITLE).is_none());
	/// ```
	pub fn remove(&mut self, ident: &AtomIdent<'_>) -> Option<Atom<'static>> {
		let pos = self.atoms.iter().position(|a| &a.ident == ident)?;
		Some(self.atoms.remove(pos))
	}

	/// Retain atoms based on the predicate
	///
	/// See [`Vec::retain`](std::vec::Vec::retain)
	pub fn retain<F>(&mut self, f: F)
	where
		F: FnMut(&Atom<'_>) -> bool,
	{
		self.atoms.retain(f)
	}

	/// Returns all pictures
	///
	/// # Examples
	///
	/// ```rust
	/// use tagcraft::mp4::Ilst;
	/// use tagcraft::picture::{MimeType, Picture};
	///
	/// let mut ilst = Ilst::new();
	/// ilst.insert_picture(Picture::unchecked(b"foo".to_vec()).mime_type(MimeType::Png).build());
	/// ilst.insert_picture(Picture::unchecked(b"bar".to_vec()).mime_type(MimeType::Jpeg).build());
	///
	/// assert_eq!(ilst.pictures().count(), 2);
	/// ```
	pub fn pictures(&self) -> impl Iterator<Item = &Picture> {
		self.get(&COVR)
			.into_iter()
			.flat_map(Atom::data)
			.filter_map(|data| match data {
				AtomData::Picture(picture) => Some(picture),
				_ => None,
			})
	}

	/// Inserts a picture
	///
	/// If a `covr` atom exists in the tag, the picture will be appended to it.
	///
	/// # Examples
	///
	/// ```rust
	/// use tagcraft::mp4::Ilst;
	/// use tagcraft::picture::{MimeType, Picture};
	/// use tagcraft::tag::TagExt;
	///
	/// let mut ilst = Ilst::new();
	/// ilst.insert_picture(Picture::unchecked(b"foo".to_vec()).mime_type(MimeType::Png).build());
	/// ilst.insert_picture(Picture::unchecked(b"bar".to_vec()).mime_type(MimeType::Jpeg).build());
	///
	/// // The existing `covr` atom is reused
	/// assert_eq!(ilst.len(), 1);
	/// ```
	pub fn insert_picture(&mut self, mut picture: Picture) {
		picture.pic_type = PictureType::Other;

		let data = AtomData::Picture(picture);
		match self.get_mut(&COVR) {
			Some(covr) => covr.push_data(data),
			None => self.atoms.push(Atom::new(COVR, data)),
		}
	}

	/// Removes all pictures
	pub fn remove_pictures(&mut self) {
		let _ = self.remove(&COVR);
	}

	/// Sets the value of a flag ([`AtomData::Bool`]) atom
	///
	/// For identifiers, see [`constants::flags`]. A flag set to `false` is removed.
	///
	/// # Examples
	///
	/// ```rust
	/// use tagcraft::mp4::Ilst;
	/// use tagcraft::mp4::constants::flags::COMPILATION;
	///
	/// let mut ilst = Ilst::new();
	/// ilst.set_flag(COMPILATION, true);
	///
	/// assert!(ilst.is_compilation());
	/// ```
	pub fn set_flag(&mut self, ident: AtomIdent<'_>, value: bool) {
		if !value {
			let _ = self.remove(&ident);
			return;
		}

		self.replace_atom(Atom::new(ident, AtomData::Bool(value)));
	}

	fn get_flag(&self, ident: &AtomIdent<'_>) -> Option<bool> {
		match self.get(ident)?.data().next()? {
			AtomData::Bool(b) => Some(*b),
			AtomData::SignedInteger(i) => Some(*i != 0),
			AtomData::UnsignedInteger(u) => Some(*u != 0),
			_ => None,
		}
	}

	impl_flag_accessors!(
		PODCAST(pcst),
		GAPLESS(pgap),
		SHOW_WORK(shwm),
		HD_VIDEO(hdvd),
		COMPILATION(cpil)
	);

	/// Returns the parental advisory rating according to the `rtng` atom
	pub fn advisory_rating(&self) -> Option<AdvisoryRating> {
		self.get(&ADVISORY_RATING)
			.into_iter()
			.flat_map(Atom::data)
			.filter_map(|data| match data {
				AtomData::SignedInteger(si) => u8::try_from(*si).ok(),
				AtomData::UnsignedInteger(ui) => u8::try_from(*ui).ok(),
				AtomData::Unknown { data, .. } => data.first().copied(),
				_ => None,
			})
			.find_map(|rating| AdvisoryRating::try_from(rating).ok())
	}

	/// Sets the advisory rating
	pub fn set_advisory_rating(&mut self, advisory_rating: AdvisoryRating) {
		self.replace_atom(Atom::new(
			ADVISORY_RATING,
			AtomData::SignedInteger(i32::from(advisory_rating.as_u8())),
		))
	}

	/// The `gnre` code, if the genre is stored as one
	///
	/// # Examples
	///
	/// ```rust
	/// use tagcraft::mp4::Ilst;
	/// use tagcraft::tag::Accessor;
	///
	/// let mut ilst = Ilst::new();
	/// ilst.set_genre(String::from("Jazz"));
	/// assert_eq!(ilst.genre_code(), Some(9));
	///
	/// ilst.set_genre(String::from("Vaporwave"));
	/// assert_eq!(ilst.genre_code(), None);
	/// ```
	pub fn genre_code(&self) -> Option<u16> {
		match self.get(&GNRE)?.data().next()? {
			AtomData::Unknown { data, .. } if data.len() >= 2 => {
				Some(u16::from_be_bytes([data[0], data[1]]))
			},
			AtomData::SignedInteger(si) => u16::try_from(*si).ok(),
			AtomData::UnsignedInteger(ui) => u16::try_from(*ui).ok(),
			_ => None,
		}
	}

	// `(current, total)`, missing halves are 0
	fn number_pair(&self, fourcc: [u8; 4]) -> (u16, u16) {
		let Some(atom) = self.get(&AtomIdent::Fourcc(fourcc)) else {
			return (0, 0);
		};

		match atom.data().next() {
			Some(AtomData::Unknown { data, .. }) if data.len() >= 6 => (
				u16::from_be_bytes([data[2], data[3]]),
				u16::from_be_bytes([data[4], data[5]]),
			),
			Some(AtomData::Unknown { data, .. }) if data.len() >= 4 => {
				(u16::from_be_bytes([data[2], data[3]]), 0)
			},
			_ => (0, 0),
		}
	}

	fn set_number_pair(&mut self, fourcc: [u8; 4], current: u16, total: u16) {
		let ident = AtomIdent::Fourcc(fourcc);
		if current == 0 && total == 0 {
			let _ = self.remove(&ident);
			return;
		}

		let [c1, c2] = current.to_be_bytes();
		let [t1, t2] = total.to_be_bytes();

		// `trkn` has 2 trailing bytes, `disk` doesn't
		let mut data = vec![0, 0, c1, c2, t1, t2];
		if fourcc == TRACK {
			data.extend([0, 0]);
		}

		self.replace_atom(Atom::new(
			ident,
			AtomData::Unknown {
				code: DataType::Reserved,
				data,
			},
		));
	}

	fn set_current(&mut self, fourcc: [u8; 4], value: u32) {
		let (_, total) = self.number_pair(fourcc);
		self.set_number_pair(fourcc, clamp_number(value), total);
	}

	fn set_total(&mut self, fourcc: [u8; 4], value: u32) {
		let (current, _) = self.number_pair(fourcc);
		self.set_number_pair(fourcc, current, clamp_number(value));
	}
}

fn clamp_number(value: u32) -> u16 {
	u16::try_from(value).unwrap_or_else(|_| {
		log::warn!("Number {value} does not fit in an MP4 number pair, clamping");
		u16::MAX
	})
}

fn non_zero(value: u16) -> Option<u32> {
	(value != 0).then_some(u32::from(value))
}

impl<'a> IntoIterator for &'a Ilst {
	type Item = &'a Atom<'static>;
	type IntoIter = std::slice::Iter<'a, Atom<'static>>;

	fn into_iter(self) -> Self::IntoIter {
		self.atoms.iter()
	}
}

impl IntoIterator for Ilst {
	type Item = Atom<'static>;
	type IntoIter = std::vec::IntoIter<Self::Item>;

	fn into_iter(self) -> Self::IntoIter {
		self.atoms.into_iter()
	}
}

impl Accessor for Ilst {
	impl_accessor!(
		artist  => ARTIST;
		title   => TITLE;
		album   => ALBUM;
		comment => COMMENT;
	);

	fn genre(&self) -> Option<Cow<'_, str>> {
		if let Some(AtomData::UTF8(text) | AtomData::UTF16(text)) =
			self.get(&GENRE).and_then(|atom| atom.data().next())
		{
			return Some(Cow::Borrowed(text));
		}

		self.genre_code()
			.and_then(constants::genre_name)
			.map(Cow::Borrowed)
	}

	/// Sets the genre
	///
	/// Genres from [`GENRES`](crate::mp4::constants::GENRES) are stored in `gnre`, anything
	/// else in `©gen`. Setting one removes the other.
	fn set_genre(&mut self, value: String) {
		match constants::genre_code(&value) {
			Some(code) => {
				let _ = self.remove(&GENRE);
				self.replace_atom(Atom::new(
					GNRE,
					AtomData::Unknown {
						code: DataType::Reserved,
						data: code.to_be_bytes().to_vec(),
					},
				));
			},
			None => {
				let _ = self.remove(&GNRE);
				self.replace_atom(Atom::text(GENRE, value));
			},
		}
	}

	fn remove_genre(&mut self) {
		let _ = self.remove(&GENRE);
		let _ = self.remove(&GNRE);
	}

	fn track(&self) -> Option<u32> {
		non_zero(self.number_pair(TRACK).0)
	}

	fn set_track(&mut self, value: u32) {
		self.set_current(TRACK, value);
	}

	fn remove_track(&mut self) {
		self.set_current(TRACK, 0);
	}

	fn track_total(&self) -> Option<u32> {
		non_zero(self.number_pair(TRACK).1)
	}

	fn set_track_total(&mut self, value: u32) {
		self.set_total(TRACK, value);
	}

	fn remove_track_total(&mut self) {
		self.set_total(TRACK, 0);
	}

	fn disk(&self) -> Option<u32> {
		non_zero(self.number_pair(DISK).0)
	}

	fn set_disk(&mut self, value: u32) {
		self.set_current(DISK, value);
	}

	fn remove_disk(&mut self) {
		self.set_current(DISK, 0);
	}

	fn disk_total(&self) -> Option<u32> {
		non_zero(self.number_pair(DISK).1)
	}

	fn set_disk_total(&mut self, value: u32) {
		self.set_total(DISK, value);
	}

	fn remove_disk_total(&mut self) {
		self.set_total(DISK, 0);
	}

	fn year(&self) -> Option<u32> {
		let Some(AtomData::UTF8(text)) = self.get(&DATE).and_then(|atom| atom.data().next()) else {
			return None;
		};

		// Usually a full timestamp, ex. "2024-01-30T00:00:00Z"
		let year = text.trim().get(..4)?;
		year.bytes().all(|b| b.is_ascii_digit()).then(|| year.parse().ok())?
	}

	fn set_year(&mut self, value: u32) {
		self.replace_atom(Atom::text(DATE, value.to_string()));
	}

	fn remove_year(&mut self) {
		let _ = self.remove(&DATE);
	}
}

impl TagExt for Ilst {
	type Err = TagError;
	type RefKey<'a> = &'a AtomIdent<'a>;

	#[inline]
	fn tag_type(&self) -> TagType {
		TagType::Mp4Ilst
	}

	fn len(&self) -> usize {
		self.atoms.len()
	}

	fn contains<'a>(&'a self, key: Self::RefKey<'a>) -> bool {
		self.atoms.iter().any(|atom| &atom.ident == key)
	}

	fn is_empty(&self) -> bool {
		self.atoms.is_empty()
	}

	/// Writes the tag to a file
	///
	/// # Errors
	///
	/// * The file isn't MP4
	/// * The file's atom tree is malformed
	fn save_to<F>(&self, file: &mut F, write_options: WriteOptions) -> std::result::Result<(), Self::Err>
	where
		F: FileLike,
	{
		write::write_to(file, self, write_options)
	}

	fn clear(&mut self) {
		self.atoms.clear();
	}
}

impl From<Ilst> for Tag {
	fn from(input: Ilst) -> Self {
		let mut tag = Tag::new(TagType::Mp4Ilst);

		if let Some(rating) = input.advisory_rating() {
			tag.insert_text(ItemKey::ParentalRating, rating.as_u8().to_string());
		}

		if let Some(genre) = input.genre_code().and_then(constants::genre_name) {
			tag.push_unchecked(TagItem::new(ItemKey::Genre, ItemValue::Text(genre.to_owned())));
		}

		for fourcc in [TRACK, DISK] {
			let (current, total) = input.number_pair(fourcc);
			let (current_key, total_key) = if fourcc == TRACK {
				(ItemKey::TrackNumber, ItemKey::TrackTotal)
			} else {
				(ItemKey::DiscNumber, ItemKey::DiscTotal)
			};

			if let Some(current) = non_zero(current) {
				tag.insert_text(current_key, current.to_string());
			}
			if let Some(total) = non_zero(total) {
				tag.insert_text(total_key, total.to_string());
			}
		}

		for atom in input.atoms {
			if let AtomIdent::Fourcc(fourcc) = atom.ident
				&& matches!(&fourcc, b"trkn" | b"disk" | b"gnre" | b"rtng")
			{
				continue;
			}

			let key = ItemKey::from_key_or_unknown(TagType::Mp4Ilst, &atom.ident.to_key());
			for data in atom.data {
				let text = match data {
					AtomData::UTF8(text) | AtomData::UTF16(text) => text,
					AtomData::Bool(b) => String::from(if b { "1" } else { "0" }),
					AtomData::SignedInteger(si) => si.to_string(),
					AtomData::UnsignedInteger(ui) => ui.to_string(),
					AtomData::Picture(picture) => {
						tag.push_picture(picture);
						continue;
					},
					AtomData::Unknown { code, .. } => {
						log::debug!("Dropping `{}` atom with unknown type {code:?}", atom.ident.to_key());
						continue;
					},
				};

				tag.push_unchecked(TagItem::new(key.clone(), ItemValue::Text(text)));
			}
		}

		tag
	}
}

impl From<Tag> for Ilst {
	fn from(input: Tag) -> Self {
		let mut ilst = Ilst::new();

		let mut genres = Vec::new();
		for item in input.items {
			let key = item.key().clone();
			let text = match item.into_value() {
				ItemValue::Text(text) | ItemValue::Locator(text) => text,
				ItemValue::Binary(_) => {
					log::debug!("Dropping binary item {key:?}");
					continue;
				},
			};

			match key {
				ItemKey::TrackNumber => {
					if let (Some(track), total) = crate::util::split_pair(&text) {
						ilst.set_track(track);
						if let Some(total) = total {
							ilst.set_track_total(total);
						}
					}
				},
				ItemKey::TrackTotal => {
					if let Some(total) = crate::util::split_pair(&text).0 {
						ilst.set_track_total(total);
					}
				},
				ItemKey::DiscNumber => {
					if let (Some(disk), total) = crate::util::split_pair(&text) {
						ilst.set_disk(disk);
						if let Some(total) = total {
							ilst.set_disk_total(total);
						}
					}
				},
				ItemKey::DiscTotal => {
					if let Some(total) = crate::util::split_pair(&text).0 {
						ilst.set_disk_total(total);
					}
				},
				ItemKey::Genre => genres.push(text),
				ItemKey::FlagCompilation => {
					let value = matches!(text.trim(), "1" | "true" | "TRUE" | "True");
					ilst.set_flag(constants::flags::COMPILATION, value);
				},
				ItemKey::ParentalRating => {
					match text.trim().parse::<u8>().map(AdvisoryRating::try_from) {
						Ok(Ok(rating)) => ilst.set_advisory_rating(rating),
						_ => log::warn!("Invalid parental advisory rating `{text}`, discarding"),
					}
				},
				ItemKey::IntegerBpm => match text.trim().parse::<u16>() {
					Ok(bpm) => ilst.replace_atom(Atom::new(TEMPO, AtomData::SignedInteger(i32::from(bpm)))),
					Err(_) => log::warn!("Invalid BPM `{text}`, discarding"),
				},
				_ => match AtomIdent::try_from(&key) {
					Ok(ident) => ilst.insert(Atom::text(ident.into_owned(), text)),
					Err(_) => log::debug!("Dropping item with no ilst mapping: {key:?}"),
				},
			}
		}

		match genres.len() {
			0 => {},
			1 => ilst.set_genre(genres.remove(0)),
			// `gnre` can only hold one genre
			_ => {
				let data = genres.into_iter().map(AtomData::UTF8).collect();
				if let Some(atom) = Atom::from_collection(GENRE, data) {
					ilst.atoms.push(atom);
				}
			},
		}

		for picture in input.pictures {
			ilst.insert_picture(picture);
		}

		ilst
	}
}

#[cfg(test)]
mod tests {
	use super::{GENRE, GNRE, TITLE};
	use crate::mp4::{AdvisoryRating, Atom, AtomData, AtomIdent, DataType, Ilst};
	use crate::picture::{MimeType, Picture, PictureType};
	use crate::tag::{Accessor, ItemKey, Tag, TagExt, TagType};

	#[test_log::test]
	fn merge_insert() {
		let mut ilst = Ilst::new();
		ilst.insert(Atom::text(TITLE, String::from("Foo")));
		ilst.insert(Atom::text(TITLE, String::from("Bar")));

		assert_eq!(ilst.len(), 1);
		assert_eq!(ilst.get(&TITLE).unwrap().data().count(), 2);

		ilst.replace_atom(Atom::text(TITLE, String::from("Baz")));
		assert_eq!(ilst.get(&TITLE).unwrap().data().count(), 1);
		assert_eq!(ilst.title().as_deref(), Some("Baz"));
	}

	#[test_log::test]
	fn number_pairs_merge() {
		let mut ilst = Ilst::new();
		ilst.set_track(5);
		ilst.set_track_total(12);

		assert_eq!(ilst.len(), 1);
		assert_eq!(
			ilst.get(&AtomIdent::Fourcc(*b"trkn")).unwrap().data().next(),
			Some(&AtomData::Unknown {
				code: DataType::Reserved,
				data: vec![0, 0, 0, 5, 0, 12, 0, 0],
			})
		);

		ilst.remove_track_total();
		assert_eq!(ilst.track(), Some(5));
		assert_eq!(ilst.track_total(), None);

		ilst.remove_track();
		assert!(ilst.is_empty());

		ilst.set_disk_total(3);
		assert_eq!(ilst.disk(), None);
		assert_eq!(ilst.disk_total(), Some(3));
		assert_eq!(
			ilst.get(&AtomIdent::Fourcc(*b"disk")).unwrap().data().next(),
			Some(&AtomData::Unknown {
				code: DataType::Reserved,
				data: vec![0, 0, 0, 0, 0, 3],
			})
		);
	}

	#[test_log::test]
	fn genre_exclusivity() {
		let mut ilst = Ilst::new();

		ilst.set_genre(String::from("classical"));
		assert!(ilst.contains(&GNRE));
		assert!(!ilst.contains(&GENRE));
		assert_eq!(ilst.genre().as_deref(), Some("Classical"));

		ilst.set_genre(String::from("Vaporwave"));
		assert!(!ilst.contains(&GNRE));
		assert!(ilst.contains(&GENRE));
		assert_eq!(ilst.genre().as_deref(), Some("Vaporwave"));

		ilst.set_genre(String::from("Rock"));
		assert_eq!(ilst.genre_code(), Some(18));
		assert!(!ilst.contains(&GENRE));

		ilst.remove_genre();
		assert!(ilst.is_empty());
	}

	#[test_log::test]
	fn flags() {
		let mut ilst = Ilst::new();
		ilst.set_flag(crate::mp4::constants::flags::GAPLESS, true);
		assert!(ilst.is_gapless());
		assert!(!ilst.is_podcast());

		ilst.set_flag(crate::mp4::constants::flags::GAPLESS, false);
		assert!(ilst.is_empty());
	}

	#[test_log::test]
	fn ilst_to_tag() {
		let mut ilst = Ilst::new();
		ilst.set_title(String::from("Foo title"));
		ilst.set_artist(String::from("Bar artist"));
		ilst.set_genre(String::from("Jazz"));
		ilst.set_track(1);
		ilst.set_track_total(10);
		ilst.set_year(1984);
		ilst.set_advisory_rating(AdvisoryRating::Explicit);
		ilst.set_flag(crate::mp4::constants::flags::COMPILATION, true);
		ilst.insert(Atom::text(
			AtomIdent::Freeform {
				mean: "com.example".into(),
				name: "CUSTOM".into(),
			},
			String::from("Custom"),
		));
		ilst.insert_picture(Picture::unchecked(vec![1, 2, 3]).mime_type(MimeType::Png).build());

		let tag: Tag = ilst.into();
		assert_eq!(tag.tag_type(), TagType::Mp4Ilst);
		assert_eq!(tag.get_string(&ItemKey::TrackTitle), Some("Foo title"));
		assert_eq!(tag.get_string(&ItemKey::TrackArtist), Some("Bar artist"));
		assert_eq!(tag.get_string(&ItemKey::Genre), Some("Jazz"));
		assert_eq!(tag.get_string(&ItemKey::TrackNumber), Some("1"));
		assert_eq!(tag.get_string(&ItemKey::TrackTotal), Some("10"));
		assert_eq!(tag.get_string(&ItemKey::RecordingDate), Some("1984"));
		assert_eq!(tag.get_string(&ItemKey::ParentalRating), Some("1"));
		assert_eq!(tag.get_string(&ItemKey::FlagCompilation), Some("1"));
		assert_eq!(
			tag.get_string(&ItemKey::Unknown(String::from("----:com.example:CUSTOM"))),
			Some("Custom")
		);
		assert_eq!(tag.pictures().len(), 1);
		assert_eq!(tag.pictures()[0].pic_type(), PictureType::Other);
	}

	#[test_log::test]
	fn tag_to_ilst() {
		let mut tag = Tag::new(TagType::Mp4Ilst);
		tag.insert_text(ItemKey::TrackTitle, String::from("Foo title"));
		tag.insert_text(ItemKey::TrackNumber, String::from("5"));
		tag.insert_text(ItemKey::TrackTotal, String::from("12"));
		tag.insert_text(ItemKey::DiscNumber, String::from("1/2"));
		tag.insert_text(ItemKey::Genre, String::from("Blues"));
		tag.insert_text(ItemKey::IntegerBpm, String::from("120"));
		tag.insert_text(ItemKey::Label, String::from("Foo label"));
		tag.push_picture(
			Picture::unchecked(vec![1, 2, 3])
				.pic_type(PictureType::CoverFront)
				.mime_type(MimeType::Jpeg)
				.build(),
		);

		let ilst: Ilst = tag.into();
		assert_eq!(ilst.title().as_deref(), Some("Foo title"));
		assert_eq!(ilst.track(), Some(5));
		assert_eq!(ilst.track_total(), Some(12));
		assert_eq!(ilst.disk(), Some(1));
		assert_eq!(ilst.disk_total(), Some(2));
		assert_eq!(ilst.genre_code(), Some(1));
		assert_eq!(
			ilst.get(&AtomIdent::Fourcc(*b"tmpo")).unwrap().data().next(),
			Some(&AtomData::SignedInteger(120))
		);
		assert!(
			ilst.get(&AtomIdent::Freeform {
				mean: "com.apple.iTunes".into(),
				name: "LABEL".into(),
			})
			.is_some()
		);
		assert_eq!(ilst.pictures().next().unwrap().pic_type(), PictureType::Other);
	}

	#[test_log::test]
	fn multiple_genres_are_text() {
		let mut tag = Tag::new(TagType::Mp4Ilst);
		tag.push_unchecked(crate::tag::TagItem::new(
			ItemKey::Genre,
			crate::tag::ItemValue::Text(String::from("Rock")),
		));
		tag.push_unchecked(crate::tag::TagItem::new(
			ItemKey::Genre,
			crate::tag::ItemValue::Text(String::from("Pop")),
		));

		let ilst: Ilst = tag.into();
		assert!(!ilst.contains(&GNRE));
		assert_eq!(ilst.get(&GENRE).unwrap().data().count(), 2);
	}
}
