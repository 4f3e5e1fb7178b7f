use crate::error::Result;
use crate::macros::err;
use crate::mp4::AtomIdent;
use crate::mp4::ilst::data_type::DataType;
use crate::picture::Picture;
use crate::tag::TagField;

use std::borrow::Cow;
use std::fmt::{Debug, Formatter};

// Atoms with multiple values aren't all that common,
// so there's no need to create a bunch of single-element Vecs
#[derive(PartialEq, Clone)]
pub(super) enum AtomDataStorage {
	Single(AtomData),
	Multiple(Vec<AtomData>),
}

impl AtomDataStorage {
	pub(super) fn first(&self) -> Option<&AtomData> {
		match self {
			AtomDataStorage::Single(val) => Some(val),
			AtomDataStorage::Multiple(data) => data.first(),
		}
	}

	pub(super) fn is_pictures(&self) -> bool {
		self.iter().all(|data| matches!(data, AtomData::Picture(_)))
	}

	pub(super) fn from_vec(mut v: Vec<AtomData>) -> Option<Self> {
		match v.len() {
			0 => None,
			1 => Some(AtomDataStorage::Single(v.remove(0))),
			_ => Some(AtomDataStorage::Multiple(v)),
		}
	}

	pub(super) fn iter(&self) -> std::slice::Iter<'_, AtomData> {
		match self {
			AtomDataStorage::Single(s) => std::slice::from_ref(s).iter(),
			AtomDataStorage::Multiple(v) => v.iter(),
		}
	}
}

impl Debug for AtomDataStorage {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match &self {
			AtomDataStorage::Single(v) => write!(f, "{v:?}"),
			AtomDataStorage::Multiple(v) => f.debug_list().entries(v.iter()).finish(),
		}
	}
}

impl IntoIterator for AtomDataStorage {
	type Item = AtomData;
	type IntoIter = std::vec::IntoIter<Self::Item>;

	fn into_iter(self) -> Self::IntoIter {
		match self {
			AtomDataStorage::Single(s) => vec![s].into_iter(),
			AtomDataStorage::Multiple(v) => v.into_iter(),
		}
	}
}

/// Represents an `MP4` atom
#[derive(PartialEq, Clone)]
pub struct Atom<'a> {
	pub(crate) ident: AtomIdent<'a>,
	pub(super) data: AtomDataStorage,
}

impl<'a> Atom<'a> {
	/// Create a new [`Atom`]
	#[must_use]
	pub const fn new(ident: AtomIdent<'a>, data: AtomData) -> Self {
		Self {
			ident,
			data: AtomDataStorage::Single(data),
		}
	}

	/// Create a new [`Atom`] from a collection of [`AtomData`]s
	///
	/// This will return `None` if `data` is empty, as empty atoms are useless.
	pub fn from_collection(ident: AtomIdent<'a>, data: Vec<AtomData>) -> Option<Self> {
		let data = AtomDataStorage::from_vec(data)?;
		Some(Self { ident, data })
	}

	/// Returns the atom's [`AtomIdent`]
	pub fn ident(&self) -> &AtomIdent<'_> {
		&self.ident
	}

	/// Returns the atom's [`AtomData`]
	pub fn data(&self) -> impl Iterator<Item = &AtomData> {
		self.data.iter()
	}

	/// Consumes the atom, returning its [`AtomData`]
	///
	/// # Examples
	///
	/// ```rust
	/// use tagcraft::mp4::{Atom, AtomData, AtomIdent};
	///
	/// let atom = Atom::new(
	/// 	AtomIdent::Fourcc(*b"\xa9ART"),
	/// 	AtomData::UTF8(String::from("Foo")),
	/// );
	/// assert_eq!(atom.into_data().count(), 1);
	/// ```
	pub fn into_data(self) -> impl Iterator<Item = AtomData> + use<> {
		self.data.into_iter()
	}

	/// Append a value to the atom
	pub fn push_data(&mut self, data: AtomData) {
		match self.data {
			AtomDataStorage::Single(ref s) => {
				self.data = AtomDataStorage::Multiple(vec![s.clone(), data])
			},
			AtomDataStorage::Multiple(ref mut m) => m.push(data),
		}
	}

	/// Merge the data of another atom into this one
	///
	/// # Errors
	///
	/// * `self.ident()` != `other.ident()`
	///
	/// # Examples
	///
	/// ```rust
	/// use tagcraft::mp4::{Atom, AtomData, AtomIdent};
	///
	/// # fn main() -> tagcraft::error::Result<()> {
	/// let mut atom = Atom::new(
	/// 	AtomIdent::Fourcc(*b"\xa9ART"),
	/// 	AtomData::UTF8(String::from("foo")),
	/// );
	///
	/// let atom2 = Atom::new(
	/// 	AtomIdent::Fourcc(*b"\xa9ART"),
	/// 	AtomData::UTF8(String::from("bar")),
	/// );
	/// atom.merge(atom2)?;
	///
	/// assert_eq!(atom.data().count(), 2);
	/// # Ok(()) }
	/// ```
	pub fn merge(&mut self, other: Atom<'_>) -> Result<()> {
		if self.ident != other.ident {
			err!(BadAtom("Attempted to merge atoms with different identifiers"));
		}

		for data in other.data {
			self.push_data(data)
		}

		Ok(())
	}

	pub(crate) fn text(ident: AtomIdent<'a>, data: String) -> Self {
		Self::new(ident, AtomData::UTF8(data))
	}

	pub(crate) fn into_owned(self) -> Atom<'static> {
		let Self { ident, data } = self;
		Atom {
			ident: ident.into_owned(),
			data,
		}
	}
}

impl Debug for Atom<'_> {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Atom")
			.field("ident", &self.ident)
			.field("data", &self.data)
			.finish()
	}
}

impl TagField for Atom<'_> {
	fn key(&self) -> Cow<'_, str> {
		Cow::Owned(self.ident.to_key())
	}

	fn content(&self) -> Option<Cow<'_, str>> {
		match self.data.first()? {
			AtomData::UTF8(text) | AtomData::UTF16(text) => Some(Cow::Borrowed(text)),
			AtomData::SignedInteger(int) => Some(Cow::Owned(int.to_string())),
			AtomData::UnsignedInteger(uint) => Some(Cow::Owned(uint.to_string())),
			AtomData::Bool(b) => Some(Cow::Borrowed(if *b { "1" } else { "0" })),
			AtomData::Picture(_) | AtomData::Unknown { .. } => None,
		}
	}

	fn is_binary(&self) -> bool {
		matches!(
			self.data.first(),
			Some(AtomData::Picture(_) | AtomData::Unknown { .. })
		)
	}

	fn is_empty(&self) -> bool {
		self.data.iter().all(|data| match data {
			AtomData::UTF8(text) | AtomData::UTF16(text) => text.is_empty(),
			AtomData::Picture(picture) => picture.data().is_empty(),
			AtomData::Unknown { data, .. } => data.is_empty(),
			_ => false,
		})
	}
}

/// The data of an atom
///
/// NOTES:
///
/// * This only covers the most common data types.
///   See the list of [`DataType`] for all known types.
/// * There are only two variants for integers, which
///   will come from codes `21` and `22`. All other integer
///   types will be stored as [`AtomData::Unknown`].
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum AtomData {
	/// A UTF-8 encoded string
	UTF8(String),
	/// A UTF-16 encoded string
	UTF16(String),
	/// A JPEG, PNG, GIF *(Deprecated)*, or BMP image
	///
	/// The type is read from the picture itself
	Picture(Picture),
	/// A big endian signed integer (1-4 bytes)
	///
	/// NOTE:
	///
	/// This will shrink the integer when writing
	///
	/// 255 will be written as `[255]` rather than `[0, 0, 0, 255]`
	SignedInteger(i32),
	/// A big endian unsigned integer (1-4 bytes)
	///
	/// NOTE: See [`AtomData::SignedInteger`]
	UnsignedInteger(u32),
	/// A boolean value
	///
	/// NOTE: This isn't an official data type, flag atoms are stored as [`Self::SignedInteger`].
	Bool(bool),
	/// Unknown data
	///
	/// This is also where the packed `trkn`/`disk` pairs and `gnre` codes live, as they use
	/// [`DataType::Reserved`].
	Unknown {
		/// The code, or type of the item
		code: DataType,
		/// The binary data of the atom
		data: Vec<u8>,
	},
}

impl AtomData {
	/// Get the [`DataType`] of the atom
	///
	/// Note that for [`AtomData::Picture`], the type is determined by the picture's MIME type.
	/// If the MIME type is unknown (or unset), the data type will be [`DataType::Reserved`].
	///
	/// # Examples
	///
	/// ```rust
	/// use tagcraft::mp4::{AtomData, DataType};
	///
	/// let data = AtomData::UTF8(String::from("foo"));
	/// assert_eq!(data.data_type(), DataType::Utf8);
	///
	/// let data = AtomData::SignedInteger(42);
	/// assert_eq!(data.data_type(), DataType::BeSignedInteger);
	/// ```
	pub fn data_type(&self) -> DataType {
		match self {
			AtomData::UTF8(_) => DataType::Utf8,
			AtomData::UTF16(_) => DataType::Utf16,
			AtomData::SignedInteger(_) | AtomData::Bool(_) => DataType::BeSignedInteger,
			AtomData::UnsignedInteger(_) => DataType::BeUnsignedInteger,
			AtomData::Picture(p) => p.mime_type().map_or(DataType::Reserved, DataType::from),
			AtomData::Unknown { code, .. } => *code,
		}
	}
}
