//! Format-agnostic picture handling
//!
//! Every format stores pictures differently:
//!
//! * FLAC uses a `PICTURE` metadata block
//! * Vorbis comments store the same block, base64 encoded, under `METADATA_BLOCK_PICTURE`
//! * MP4 uses `covr` data atoms, with the image format as the data type
//! * ASF uses `WM/Picture` descriptors
//!
//! All of them are converted to and from a [`Picture`].

use crate::config::ParsingMode;
use crate::error::{ErrorKind, Result, TagError};
use crate::macros::{err, try_vec};

use std::borrow::Cow;
use std::fmt::{Debug, Display, Formatter};
use std::io::{Cursor, Read, Seek, SeekFrom};

use byteorder::{BigEndian, ReadBytesExt as _};
use data_encoding::BASE64;

/// MIME types for pictures.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
#[non_exhaustive]
pub enum MimeType {
	/// PNG image
	Png,
	/// JPEG image
	Jpeg,
	/// TIFF image
	Tiff,
	/// BMP image
	Bmp,
	/// GIF image
	Gif,
	/// Some unknown MIME type
	Unknown(String),
}

impl MimeType {
	/// Get a `MimeType` from a string
	///
	/// # Examples
	///
	/// ```rust
	/// use tagcraft::picture::MimeType;
	///
	/// assert_eq!(MimeType::from_str("image/jpeg"), MimeType::Jpeg);
	/// assert_eq!(MimeType::from_str("IMAGE/PNG"), MimeType::Png);
	/// ```
	#[must_use]
	#[allow(clippy::should_implement_trait)] // Infallible in contrast to FromStr
	pub fn from_str(mime_type: &str) -> Self {
		match &*mime_type.to_lowercase() {
			"image/jpeg" | "image/jpg" => Self::Jpeg,
			"image/png" => Self::Png,
			"image/tiff" => Self::Tiff,
			"image/bmp" => Self::Bmp,
			"image/gif" => Self::Gif,
			_ => Self::Unknown(mime_type.to_owned()),
		}
	}

	/// Get a &str from a `MimeType`
	#[must_use]
	pub fn as_str(&self) -> &str {
		match self {
			MimeType::Jpeg => "image/jpeg",
			MimeType::Png => "image/png",
			MimeType::Tiff => "image/tiff",
			MimeType::Bmp => "image/bmp",
			MimeType::Gif => "image/gif",
			MimeType::Unknown(unknown) => unknown,
		}
	}

	/// Sniff the `MimeType` from the start of an image
	///
	/// # Errors
	///
	/// The signature isn't one of the known [`MimeType`]s
	pub fn from_signature(bytes: &[u8]) -> Result<Self> {
		match bytes {
			[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, ..] => Ok(MimeType::Png),
			[0xFF, 0xD8, ..] => Ok(MimeType::Jpeg),
			[b'G', b'I', b'F', b'8', b'7' | b'9', b'a', ..] => Ok(MimeType::Gif),
			[b'B', b'M', ..] => Ok(MimeType::Bmp),
			[b'I', b'I', b'*', 0x00, ..] | [b'M', b'M', 0x00, b'*', ..] => Ok(MimeType::Tiff),
			_ => err!(NotAPicture),
		}
	}
}

impl Display for MimeType {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// The picture type, as used by ID3v2 APIC, FLAC and ASF
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
#[non_exhaustive]
pub enum PictureType {
	Other,
	Icon,
	OtherIcon,
	CoverFront,
	CoverBack,
	Leaflet,
	Media,
	LeadArtist,
	Artist,
	Conductor,
	Band,
	Composer,
	Lyricist,
	RecordingLocation,
	DuringRecording,
	DuringPerformance,
	ScreenCapture,
	BrightFish,
	Illustration,
	BandLogo,
	PublisherLogo,
	Undefined(u8),
}

// Index == type byte
const PICTURE_TYPES: [PictureType; 21] = [
	PictureType::Other,
	PictureType::Icon,
	PictureType::OtherIcon,
	PictureType::CoverFront,
	PictureType::CoverBack,
	PictureType::Leaflet,
	PictureType::Media,
	PictureType::LeadArtist,
	PictureType::Artist,
	PictureType::Conductor,
	PictureType::Band,
	PictureType::Composer,
	PictureType::Lyricist,
	PictureType::RecordingLocation,
	PictureType::DuringRecording,
	PictureType::DuringPerformance,
	PictureType::ScreenCapture,
	PictureType::BrightFish,
	PictureType::Illustration,
	PictureType::BandLogo,
	PictureType::PublisherLogo,
];

impl PictureType {
	/// Get the type byte
	pub fn as_u8(&self) -> u8 {
		match self {
			Self::Undefined(i) => *i,
			known => PICTURE_TYPES
				.iter()
				.position(|ty| ty == known)
				.map_or(0, |pos| pos as u8),
		}
	}

	/// Get a `PictureType` from its type byte
	pub fn from_u8(byte: u8) -> Self {
		PICTURE_TYPES
			.get(usize::from(byte))
			.copied()
			.unwrap_or(Self::Undefined(byte))
	}
}

/// Information about a [`Picture`]
///
/// This is only stored by FLAC's `METADATA_BLOCK_PICTURE`.
/// See [`Picture::as_flac_bytes`] for more information.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct PictureInformation {
	/// The picture's width in pixels
	pub width: u32,
	/// The picture's height in pixels
	pub height: u32,
	/// The picture's color depth in bits per pixel
	pub color_depth: u32,
	/// The number of colors used
	pub num_colors: u32,
}

impl PictureInformation {
	/// Attempt to extract [`PictureInformation`] from a [`Picture`]
	///
	/// Only PNG and JPEG are inspected, anything else is zeroed out.
	///
	/// # Errors
	///
	/// * `picture.data` is less than 8 bytes in length
	pub fn from_picture(picture: &Picture) -> Result<Self> {
		let data = &*picture.data;

		if data.len() < 8 {
			err!(NotAPicture);
		}

		match data[..4] {
			[0x89, b'P', b'N', b'G'] => Ok(Self::from_png(data).unwrap_or_default()),
			[0xFF, 0xD8, 0xFF, ..] => Ok(Self::from_jpeg(data).unwrap_or_default()),
			_ => Ok(Self::default()),
		}
	}

	/// Attempt to extract [`PictureInformation`] from a PNG
	///
	/// # Errors
	///
	/// * `data` is not a valid PNG
	pub fn from_png(data: &[u8]) -> Result<Self> {
		let mut reader = Cursor::new(data);

		let mut sig = [0; 8];
		reader.read_exact(&mut sig)?;
		if MimeType::from_signature(&sig).ok() != Some(MimeType::Png) {
			err!(NotAPicture);
		}

		// The signature is immediately followed by IHDR
		let _ihdr_len = reader.read_u32::<BigEndian>()?;
		let mut ihdr = [0; 4];
		reader.read_exact(&mut ihdr)?;
		if &ihdr != b"IHDR" {
			err!(NotAPicture);
		}

		let width = reader.read_u32::<BigEndian>()?;
		let height = reader.read_u32::<BigEndian>()?;
		let mut color_depth = u32::from(reader.read_u8()?);
		let color_type = reader.read_u8()?;

		match color_type {
			2 => color_depth *= 3,
			4 | 6 => color_depth *= 4,
			_ => {},
		}

		let mut info = Self {
			width,
			height,
			color_depth,
			num_colors: 0,
		};

		// Only indexed-color images have a palette
		if color_type != 3 {
			return Ok(info);
		}

		// Compression, filter, interlace, and the IHDR CRC
		reader.seek(SeekFrom::Current(7))?;

		let mut chunk_type = [0; 4];
		while let (Ok(size), Ok(())) = (
			reader.read_u32::<BigEndian>(),
			reader.read_exact(&mut chunk_type),
		) {
			if &chunk_type == b"PLTE" {
				info.num_colors = size / 3;
				break;
			}

			let Some(skip) = size.checked_add(4) else {
				break;
			};

			reader.seek(SeekFrom::Current(i64::from(skip)))?;
		}

		Ok(info)
	}

	/// Attempt to extract [`PictureInformation`] from a JPEG
	///
	/// # Errors
	///
	/// * `data` is not a JPEG image
	/// * `data` does not contain a `SOF0`/`SOF2` frame
	pub fn from_jpeg(data: &[u8]) -> Result<Self> {
		let mut reader = Cursor::new(data);

		let mut frame_marker = [0; 4];
		reader.read_exact(&mut frame_marker)?;
		if !matches!(frame_marker, [0xFF, 0xD8, 0xFF, ..]) {
			err!(NotAPicture);
		}

		// Segment lengths include themselves
		let Some(content_len) = reader.read_u16::<BigEndian>()?.checked_sub(2) else {
			err!(NotAPicture);
		};
		reader.seek(SeekFrom::Current(i64::from(content_len)))?;

		while let Ok(0xFF) = reader.read_u8() {
			let marker = reader.read_u8()?;
			let segment_len = reader.read_u16::<BigEndian>()?;

			// Start of scan, the header is over
			if marker == 0xDA {
				break;
			}

			if marker == 0xC0 || marker == 0xC2 {
				let precision = reader.read_u8()?;
				let height = u32::from(reader.read_u16::<BigEndian>()?);
				let width = u32::from(reader.read_u16::<BigEndian>()?);
				let components = reader.read_u8()?;

				return Ok(Self {
					width,
					height,
					color_depth: u32::from(precision) * u32::from(components),
					num_colors: 0,
				});
			}

			let Some(skip) = segment_len.checked_sub(2) else {
				break;
			};
			reader.seek(SeekFrom::Current(i64::from(skip)))?;
		}

		err!(NotAPicture)
	}
}

/// Builder for a [`Picture`]
///
/// This is created through [`Picture::unchecked()`].
pub struct PictureBuilder {
	pic_type: PictureType,
	mime_type: Option<MimeType>,
	description: Option<Cow<'static, str>>,
	data: Cow<'static, [u8]>,
}

impl PictureBuilder {
	/// Set the [`PictureType`]
	pub fn pic_type(mut self, pic_type: PictureType) -> Self {
		self.pic_type = pic_type;
		self
	}

	/// Set the [`MimeType`]
	pub fn mime_type(mut self, mime_type: MimeType) -> Self {
		self.mime_type = Some(mime_type);
		self
	}

	/// Set the description
	pub fn description(mut self, description: impl Into<Cow<'static, str>>) -> Self {
		self.description = Some(description.into());
		self
	}

	/// Convert this builder into a [`Picture`]
	pub fn build(self) -> Picture {
		Picture {
			pic_type: self.pic_type,
			mime_type: self.mime_type,
			description: self.description,
			data: self.data,
		}
	}
}

/// Represents a picture.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct Picture {
	pub(crate) pic_type: PictureType,
	pub(crate) mime_type: Option<MimeType>,
	pub(crate) description: Option<Cow<'static, str>>,
	pub(crate) data: Cow<'static, [u8]>,
}

impl Debug for Picture {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Picture")
			.field("pic_type", &self.pic_type)
			.field("mime_type", &self.mime_type)
			.field("description", &self.description)
			.field("data", &format!("<{} bytes>", self.data.len()))
			.finish()
	}
}

impl Picture {
	/// Create a [`Picture`] from a reader
	///
	/// The [`MimeType`] is sniffed from the data. The `pic_type` will always be
	/// [`PictureType::Other`].
	///
	/// # Errors
	///
	/// * `reader` contains less than 8 bytes
	/// * `reader` does not contain a supported format. See [`MimeType`] for valid formats
	pub fn from_reader<R>(reader: &mut R) -> Result<Self>
	where
		R: Read,
	{
		let mut data = Vec::new();
		reader.read_to_end(&mut data)?;

		if data.len() < 8 {
			err!(NotAPicture);
		}

		let mime_type = MimeType::from_signature(&data)?;

		Ok(Self {
			pic_type: PictureType::Other,
			mime_type: Some(mime_type),
			description: None,
			data: data.into(),
		})
	}

	/// Create a new `Picture` with no verification
	///
	/// This will **not** verify `data`'s signature.
	///
	/// # Examples
	///
	/// ```rust
	/// use tagcraft::picture::{MimeType, Picture, PictureType};
	///
	/// let picture = Picture::unchecked(vec![0xFF, 0xD8, 0xFF, 0xE0])
	/// 	.pic_type(PictureType::Band)
	/// 	.mime_type(MimeType::Jpeg)
	/// 	.description("The band on stage")
	/// 	.build();
	///
	/// assert_eq!(picture.description(), Some("The band on stage"));
	/// ```
	pub fn unchecked(data: Vec<u8>) -> PictureBuilder {
		PictureBuilder {
			pic_type: PictureType::Other,
			mime_type: None,
			description: None,
			data: Cow::Owned(data),
		}
	}

	/// Returns the [`PictureType`]
	pub fn pic_type(&self) -> PictureType {
		self.pic_type
	}

	/// Sets the [`PictureType`]
	pub fn set_pic_type(&mut self, pic_type: PictureType) {
		self.pic_type = pic_type
	}

	/// Returns the [`MimeType`]
	pub fn mime_type(&self) -> Option<&MimeType> {
		self.mime_type.as_ref()
	}

	pub(crate) fn mime_str(&self) -> &str {
		self.mime_type.as_ref().map_or("", MimeType::as_str)
	}

	/// Returns the description
	pub fn description(&self) -> Option<&str> {
		self.description.as_deref()
	}

	/// Sets the description
	pub fn set_description(&mut self, description: Option<String>) {
		self.description = description.map(Cow::from);
	}

	/// Returns the picture data
	pub fn data(&self) -> &[u8] {
		&self.data
	}

	/// Consumes the [`Picture`], returning the data
	pub fn into_data(self) -> Vec<u8> {
		self.data.into_owned()
	}

	/// Convert a [`Picture`] to a FLAC `METADATA_BLOCK_PICTURE`
	///
	/// With `encode`, the block is base64 encoded for use in Vorbis comments.
	///
	/// NOTE: This does not include the comment key or the FLAC block header, and the
	///       size is not checked against either format's limits.
	pub fn as_flac_bytes(&self, picture_information: PictureInformation, encode: bool) -> Vec<u8> {
		let mime_str = self.mime_str();
		let description = self.description.as_deref().unwrap_or_default();

		let mut data = Vec::with_capacity(32 + mime_str.len() + description.len() + self.data.len());

		data.extend(u32::from(self.pic_type.as_u8()).to_be_bytes());
		data.extend((mime_str.len() as u32).to_be_bytes());
		data.extend(mime_str.as_bytes());
		data.extend((description.len() as u32).to_be_bytes());
		data.extend(description.as_bytes());

		data.extend(picture_information.width.to_be_bytes());
		data.extend(picture_information.height.to_be_bytes());
		data.extend(picture_information.color_depth.to_be_bytes());
		data.extend(picture_information.num_colors.to_be_bytes());

		data.extend((self.data.len() as u32).to_be_bytes());
		data.extend(self.data.iter());

		if encode {
			BASE64.encode(&data).into_bytes()
		} else {
			data
		}
	}

	/// Get a [`Picture`] from a FLAC `METADATA_BLOCK_PICTURE`
	///
	/// With `encoded`, `bytes` is expected to be the base64 string from a Vorbis comment.
	///
	/// # Errors
	///
	/// This function will return [`NotAPicture`][ErrorKind::NotAPicture] if
	/// at any point it's unable to parse the data
	pub fn from_flac_bytes(
		bytes: &[u8],
		encoded: bool,
		parse_mode: ParsingMode,
	) -> Result<(Self, PictureInformation)> {
		if encoded {
			let data = BASE64
				.decode(bytes)
				.map_err(|_| TagError::new(ErrorKind::NotAPicture))?;
			Self::flac_block(&data, parse_mode)
		} else {
			Self::flac_block(bytes, parse_mode)
		}
	}

	fn flac_block(content: &[u8], parse_mode: ParsingMode) -> Result<(Self, PictureInformation)> {
		fn read_str<'a>(reader: &mut &'a [u8], len: usize) -> Result<&'a [u8]> {
			if len > reader.len() {
				err!(SizeMismatch);
			}

			let (text, rest) = reader.split_at(len);
			*reader = rest;
			Ok(text)
		}

		if content.len() < 32 {
			err!(NotAPicture);
		}

		let reader = &mut &*content;

		let pic_ty = reader.read_u32::<BigEndian>()?;
		if pic_ty > 255 && parse_mode == ParsingMode::Strict {
			err!(NotAPicture);
		}

		let mime_len = reader.read_u32::<BigEndian>()? as usize;
		let mime_type_str = std::str::from_utf8(read_str(reader, mime_len)?)?;

		let desc_len = reader.read_u32::<BigEndian>()? as usize;
		let description = match std::str::from_utf8(read_str(reader, desc_len)?) {
			Ok(desc) if !desc.is_empty() => Some(Cow::Owned(desc.to_owned())),
			_ => None,
		};

		let information = PictureInformation {
			width: reader.read_u32::<BigEndian>()?,
			height: reader.read_u32::<BigEndian>()?,
			color_depth: reader.read_u32::<BigEndian>()?,
			num_colors: reader.read_u32::<BigEndian>()?,
		};

		let data_len = reader.read_u32::<BigEndian>()? as usize;
		if data_len > reader.len() {
			err!(NotAPicture);
		}

		let mut data = try_vec![0; data_len];
		reader.read_exact(&mut data)?;

		let mime_type = (!mime_type_str.is_empty()).then(|| MimeType::from_str(mime_type_str));

		Ok((
			Self {
				pic_type: PictureType::from_u8(pic_ty as u8),
				mime_type,
				description,
				data: Cow::Owned(data),
			},
			information,
		))
	}
}
