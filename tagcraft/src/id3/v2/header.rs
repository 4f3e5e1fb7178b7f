use super::unsynch_u32;
use crate::error::Result;
use crate::macros::{decode_err, err};

use std::io::Read;

use byteorder::{BigEndian, ByteOrder, ReadBytesExt};

/// The ID3v2 version
///
/// Tags are read in versions 3 and 4, and are always written as ID3v2.4.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum Id3v2Version {
	/// ID3v2.3
	V3,
	/// ID3v2.4
	V4,
}

#[derive(Copy, Clone, Debug)]
pub(crate) struct Id3v2Header {
	pub(crate) version: Id3v2Version,
	pub(crate) unsynchronisation: bool,
	pub(crate) footer: bool,
	/// The size of the tag contents (**DOES NOT INCLUDE THE HEADER/FOOTER**)
	pub(crate) size: u32,
	/// The size of the extended header, which is part of `size`
	pub(crate) extended_size: u32,
}

impl Id3v2Header {
	pub(crate) fn parse<R>(bytes: &mut R) -> Result<Self>
	where
		R: Read,
	{
		let mut header = [0; 10];
		bytes.read_exact(&mut header)?;

		if &header[..3] != b"ID3" {
			err!(FakeTag);
		}

		// Version is stored as [major, minor], the minor revision doesn't matter
		let version = match header[3] {
			3 => Id3v2Version::V3,
			4 => Id3v2Version::V4,
			major => {
				log::debug!("ID3v2: Found unsupported version 2.{major}.{}", header[4]);
				decode_err!(@BAIL "ID3v2: Unsupported version");
			},
		};

		let flags = header[5];
		let size = unsynch_u32(BigEndian::read_u32(&header[6..]));

		let mut extended_size = 0;
		if flags & 0x40 == 0x40 {
			// Only the size matters, the extended header's content is discarded
			extended_size = match version {
				// Excludes the size field itself
				Id3v2Version::V3 => bytes.read_u32::<BigEndian>()?.saturating_add(4),
				Id3v2Version::V4 => unsynch_u32(bytes.read_u32::<BigEndian>()?),
			};

			if extended_size < 6 || extended_size >= size {
				decode_err!(@BAIL "ID3v2: Found an invalid extended header size");
			}
		}

		Ok(Id3v2Header {
			version,
			unsynchronisation: flags & 0x80 == 0x80,
			footer: version == Id3v2Version::V4 && flags & 0x10 == 0x10,
			size,
			extended_size,
		})
	}

	/// The total size of the tag, including the header and footer
	pub(crate) fn full_tag_size(&self) -> u32 {
		self.size + 10 + if self.footer { 10 } else { 0 }
	}
}
