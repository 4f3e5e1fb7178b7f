use std::fmt::{Debug, Display, Formatter};

/// A 128-bit ASF object identifier
///
/// The bytes are stored as they appear in the file. The first three groups of the canonical
/// form are little endian on disk.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Guid([u8; 16]);

impl Guid {
	/// The Header Object, which must be the first object in every ASF file
	pub const HEADER_OBJECT: Guid = Guid::new(
		0x75B2_2630,
		0x668E,
		0x11CF,
		[0xA6, 0xD9, 0x00, 0xAA, 0x00, 0x62, 0xCE, 0x6C],
	);
	/// The Data Object
	pub const DATA_OBJECT: Guid = Guid::new(
		0x75B2_2636,
		0x668E,
		0x11CF,
		[0xA6, 0xD9, 0x00, 0xAA, 0x00, 0x62, 0xCE, 0x6C],
	);
	/// The File Properties Object
	pub const FILE_PROPERTIES_OBJECT: Guid = Guid::new(
		0x8CAB_DCA1,
		0xA947,
		0x11CF,
		[0x8E, 0xE4, 0x00, 0xC0, 0x0C, 0x20, 0x53, 0x65],
	);
	/// The Stream Properties Object
	pub const STREAM_PROPERTIES_OBJECT: Guid = Guid::new(
		0xB7DC_0791,
		0xA9B7,
		0x11CF,
		[0x8E, 0xE6, 0x00, 0xC0, 0x0C, 0x20, 0x53, 0x65],
	);
	/// The Header Extension Object
	pub const HEADER_EXTENSION_OBJECT: Guid = Guid::new(
		0x5FBF_03B5,
		0xA92E,
		0x11CF,
		[0x8E, 0xE3, 0x00, 0xC0, 0x0C, 0x20, 0x53, 0x65],
	);
	/// The reserved field of the Header Extension Object
	pub const HEADER_EXTENSION_RESERVED: Guid = Guid::new(
		0xABD3_D211,
		0xA9BA,
		0x11CF,
		[0x8E, 0xE6, 0x00, 0xC0, 0x0C, 0x20, 0x53, 0x65],
	);
	/// The Content Description Object
	pub const CONTENT_DESCRIPTION_OBJECT: Guid = Guid::new(
		0x75B2_2633,
		0x668E,
		0x11CF,
		[0xA6, 0xD9, 0x00, 0xAA, 0x00, 0x62, 0xCE, 0x6C],
	);
	/// The Extended Content Description Object
	pub const EXTENDED_CONTENT_DESCRIPTION_OBJECT: Guid = Guid::new(
		0xD2D0_A440,
		0xE307,
		0x11D2,
		[0x97, 0xF0, 0x00, 0xA0, 0xC9, 0x5E, 0xA8, 0x50],
	);
	/// The Content Branding Object
	pub const CONTENT_BRANDING_OBJECT: Guid = Guid::new(
		0x2211_B3FA,
		0xBD23,
		0x11D2,
		[0xB4, 0xB7, 0x00, 0xA0, 0xC9, 0x55, 0xFC, 0x6E],
	);
	/// The Metadata Object, found in the Header Extension Object
	pub const METADATA_OBJECT: Guid = Guid::new(
		0xC5F8_CBEA,
		0x5BAF,
		0x4877,
		[0x84, 0x67, 0xAA, 0x8C, 0x44, 0xFA, 0x4C, 0xCA],
	);
	/// The Metadata Library Object, found in the Header Extension Object
	pub const METADATA_LIBRARY_OBJECT: Guid = Guid::new(
		0x4423_1C94,
		0x9498,
		0x49D1,
		[0xA1, 0x41, 0x1D, 0x13, 0x4E, 0x45, 0x70, 0x54],
	);
	/// The stream type of audio streams
	pub const AUDIO_MEDIA: Guid = Guid::new(
		0xF869_9E40,
		0x5B4D,
		0x11CF,
		[0xA8, 0xFD, 0x00, 0x80, 0x5F, 0x5C, 0x44, 0x2B],
	);

	/// Create a `Guid` from its canonical groups
	///
	/// # Examples
	///
	/// ```rust
	/// use tagcraft::asf::Guid;
	///
	/// let guid = Guid::new(0x75B2_2630, 0x668E, 0x11CF, [0xA6, 0xD9, 0x00, 0xAA, 0x00, 0x62, 0xCE, 0x6C]);
	/// assert_eq!(guid, Guid::HEADER_OBJECT);
	/// assert_eq!(guid.to_string(), "75B22630-668E-11CF-A6D9-00AA0062CE6C");
	/// ```
	pub const fn new(data1: u32, data2: u16, data3: u16, data4: [u8; 8]) -> Self {
		let d1 = data1.to_le_bytes();
		let d2 = data2.to_le_bytes();
		let d3 = data3.to_le_bytes();

		Self([
			d1[0], d1[1], d1[2], d1[3], d2[0], d2[1], d3[0], d3[1], data4[0], data4[1], data4[2],
			data4[3], data4[4], data4[5], data4[6], data4[7],
		])
	}

	/// Create a `Guid` from its on-disk representation
	pub const fn from_bytes(bytes: [u8; 16]) -> Self {
		Self(bytes)
	}

	/// The on-disk representation
	pub fn as_bytes(&self) -> &[u8; 16] {
		&self.0
	}

	/// Whether every byte is zero
	pub fn is_zero(&self) -> bool {
		self.0 == [0; 16]
	}
}

impl Display for Guid {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		let b = &self.0;
		write!(
			f,
			"{:08X}-{:04X}-{:04X}-{:02X}{:02X}-{:02X}{:02X}{:02X}{:02X}{:02X}{:02X}",
			u32::from_le_bytes([b[0], b[1], b[2], b[3]]),
			u16::from_le_bytes([b[4], b[5]]),
			u16::from_le_bytes([b[6], b[7]]),
			b[8],
			b[9],
			b[10],
			b[11],
			b[12],
			b[13],
			b[14],
			b[15]
		)
	}
}

impl Debug for Guid {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "Guid({self})")
	}
}
