use crate::picture::MimeType;

/// The type of a `data` atom's payload
///
/// Only the well-known types that are interpreted are named, anything else is kept as
/// [`DataType::Other`]. See the [QuickTime file format] for the full list.
///
/// [QuickTime file format]: https://developer.apple.com/documentation/quicktime-file-format/well-known_types
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum DataType {
	/// Reserved for use where no type needs to be indicated (0)
	///
	/// Used by `trkn`, `disk`, and `gnre`, which are interpreted by their identifiers.
	Reserved,
	/// UTF-8 text without any count or NULL terminator (1)
	Utf8,
	/// UTF-16 BE text (2)
	Utf16,
	/// GIF image (12), deprecated
	Gif,
	/// JPEG image (13)
	Jpeg,
	/// PNG image (14)
	Png,
	/// A big-endian signed integer in 1, 2, 3, 4 or 8 bytes (21)
	BeSignedInteger,
	/// A big-endian unsigned integer in 1, 2, 3, 4 or 8 bytes (22)
	BeUnsignedInteger,
	/// Windows bitmap image (27)
	Bmp,
	/// Any other type code
	Other(u32),
}

impl DataType {
	/// The largest code that fits in the 24 bits of a `data` atom's flags
	pub const MAX: u32 = 0x00FF_FFFF;

	// `covr` only allows the image types, or an implicit type
	pub(super) fn picture_mime_type(self) -> Option<Option<MimeType>> {
		match self {
			DataType::Reserved => Some(None),
			DataType::Gif => Some(Some(MimeType::Gif)),
			DataType::Jpeg => Some(Some(MimeType::Jpeg)),
			DataType::Png => Some(Some(MimeType::Png)),
			DataType::Bmp => Some(Some(MimeType::Bmp)),
			_ => None,
		}
	}
}

impl From<u32> for DataType {
	fn from(value: u32) -> Self {
		match value {
			0 => DataType::Reserved,
			1 => DataType::Utf8,
			2 => DataType::Utf16,
			12 => DataType::Gif,
			13 => DataType::Jpeg,
			14 => DataType::Png,
			21 => DataType::BeSignedInteger,
			22 => DataType::BeUnsignedInteger,
			27 => DataType::Bmp,
			other => DataType::Other(other),
		}
	}
}

impl From<DataType> for u32 {
	fn from(value: DataType) -> Self {
		match value {
			DataType::Reserved => 0,
			DataType::Utf8 => 1,
			DataType::Utf16 => 2,
			DataType::Gif => 12,
			DataType::Jpeg => 13,
			DataType::Png => 14,
			DataType::BeSignedInteger => 21,
			DataType::BeUnsignedInteger => 22,
			DataType::Bmp => 27,
			DataType::Other(other) => other,
		}
	}
}

impl From<&MimeType> for DataType {
	fn from(value: &MimeType) -> Self {
		match value {
			MimeType::Gif => DataType::Gif,
			MimeType::Jpeg => DataType::Jpeg,
			MimeType::Png => DataType::Png,
			MimeType::Bmp => DataType::Bmp,
			_ => DataType::Reserved,
		}
	}
}
