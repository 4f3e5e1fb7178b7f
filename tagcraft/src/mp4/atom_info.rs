use crate::chunk::{ChunkHeader, HeaderCodec, Mp4BoxCodec};
use crate::error::TagError;
use crate::macros::err;
use crate::tag::{ItemKey, TagType};

use std::borrow::Cow;

pub(super) const ATOM_HEADER_LEN: u64 = Mp4BoxCodec::HEADER_SIZE;
// Header + version (1) + flags (3)
pub(super) const FULL_ATOM_HEADER_LEN: u64 = ATOM_HEADER_LEN + 4;

/// The location of an atom within a file
pub(crate) type AtomInfo = ChunkHeader<[u8; 4]>;

/// Represents an `MP4` atom identifier
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub enum AtomIdent<'a> {
	/// A four byte identifier
	///
	/// Many FOURCCs start with `0xA9` (©), and should be human-readable.
	Fourcc([u8; 4]),
	/// A freeform identifier
	///
	/// ```text
	/// ----:com.apple.iTunes:SUBTITLE
	/// ─┬── ────────┬─────── ───┬────
	///  ╰freeform identifier    ╰name
	///              |
	///              ╰mean
	/// ```
	Freeform {
		/// A string using a reverse DNS naming convention
		mean: Cow<'a, str>,
		/// A string identifying the atom
		name: Cow<'a, str>,
	},
}

impl<'a> AtomIdent<'a> {
	/// Obtains a borrowed instance
	pub fn as_borrowed(&'a self) -> Self {
		match self {
			Self::Fourcc(fourcc) => Self::Fourcc(*fourcc),
			Self::Freeform { mean, name } => Self::Freeform {
				mean: Cow::Borrowed(mean),
				name: Cow::Borrowed(name),
			},
		}
	}

	/// Obtains an owned instance
	pub fn into_owned(self) -> AtomIdent<'static> {
		match self {
			Self::Fourcc(fourcc) => AtomIdent::Fourcc(fourcc),
			Self::Freeform { mean, name } => AtomIdent::Freeform {
				mean: Cow::Owned(mean.into_owned()),
				name: Cow::Owned(name.into_owned()),
			},
		}
	}

	/// The identifier as it appears in an [`ItemKey`] mapping
	///
	/// FOURCC bytes are treated as Latin-1, so `0xA9` becomes `©`. Freeform identifiers are
	/// joined as `----:mean:name`.
	///
	/// # Examples
	///
	/// ```rust
	/// use tagcraft::mp4::AtomIdent;
	///
	/// assert_eq!(AtomIdent::Fourcc(*b"\xa9nam").to_key(), "\u{a9}nam");
	/// ```
	pub fn to_key(&self) -> String {
		match self {
			Self::Fourcc(fourcc) => fourcc.iter().map(|b| char::from(*b)).collect(),
			Self::Freeform { mean, name } => format!("----:{mean}:{name}"),
		}
	}

	/// Parse a key created by [`AtomIdent::to_key`]
	pub(crate) fn from_key(key: &'a str) -> Option<Self> {
		if let Some(freeform) = key.strip_prefix("----:") {
			let (mean, name) = freeform.split_once(':')?;
			if mean.is_empty() || name.is_empty() {
				return None;
			}

			return Some(AtomIdent::Freeform {
				mean: Cow::Borrowed(mean),
				name: Cow::Borrowed(name),
			});
		}

		let mut fourcc = [0; 4];
		let mut chars = key.chars();
		for b in &mut fourcc {
			*b = u8::try_from(u32::from(chars.next()?)).ok()?;
		}

		if chars.next().is_some() {
			return None;
		}

		Some(AtomIdent::Fourcc(fourcc))
	}
}

impl<'a> TryFrom<&'a ItemKey> for AtomIdent<'a> {
	type Error = TagError;

	fn try_from(value: &'a ItemKey) -> std::result::Result<Self, Self::Error> {
		if let Some(ident) = value.map_key(TagType::Mp4Ilst).and_then(AtomIdent::from_key) {
			return Ok(ident);
		}

		err!(TextDecode(
			"ItemKey does not map to a freeform or fourcc identifier"
		))
	}
}

impl TryFrom<ItemKey> for AtomIdent<'static> {
	type Error = TagError;

	fn try_from(value: ItemKey) -> std::result::Result<Self, Self::Error> {
		let ret: AtomIdent<'_> = (&value).try_into()?;
		Ok(ret.into_owned())
	}
}
