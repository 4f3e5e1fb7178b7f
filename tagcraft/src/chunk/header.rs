use crate::asf::Guid;
use crate::error::{ChunkError, ChunkErrorKind, ChunkFamily, Result};

use std::fmt::Debug;
use std::io::{ErrorKind as IoErrorKind, Read, Seek};
use std::marker::PhantomData;

use byteorder::{BigEndian, ByteOrder, LittleEndian, ReadBytesExt};

/// A decoded chunk header
///
/// `len` always includes the header itself, regardless of how the family stores it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ChunkHeader<I> {
	/// The chunk identifier
	pub ident: I,
	/// The total length of the chunk, including the header
	pub len: u64,
	/// The absolute offset of the start of the header
	pub start: u64,
	/// The size of the header as it was stored
	pub header_len: u64,
	/// Whether a 64-bit extended length was used
	pub extended: bool,
}

impl<I> ChunkHeader<I> {
	/// The length of the chunk's content
	pub fn payload_len(&self) -> u64 {
		self.len - self.header_len
	}

	/// The absolute offset of the chunk's content
	pub fn payload_start(&self) -> u64 {
		self.start + self.header_len
	}

	/// The absolute offset directly after the chunk, excluding any padding
	pub fn end(&self) -> u64 {
		self.start + self.len
	}
}

/// Describes the header layout of a chunk family
pub trait HeaderCodec {
	/// The identifier type
	type Ident: Copy + Eq + Debug;

	/// The family, used for error reporting
	const FAMILY: ChunkFamily;
	/// The smallest possible header size
	const HEADER_SIZE: u64;

	/// Decode a header at the reader's current position
	///
	/// `remaining` is the number of bytes left in the parent. `None` is returned when the
	/// parent has no room left for another header.
	///
	/// # Errors
	///
	/// [`ErrorKind::BadChunk`](crate::error::ErrorKind::BadChunk) if the header is truncated,
	/// has an invalid identifier, or has an invalid length.
	fn decode<R>(reader: &mut R, remaining: u64) -> Result<Option<ChunkHeader<Self::Ident>>>
	where
		R: Read + Seek;

	/// Encode a header
	fn encode(header: &ChunkHeader<Self::Ident>) -> Vec<u8>;

	/// The number of padding bytes that follow a payload of `payload_len` bytes
	fn padding(_payload_len: u64) -> u64 {
		0
	}
}

fn bad<C: HeaderCodec + ?Sized>(kind: ChunkErrorKind, offset: u64) -> crate::error::TagError {
	ChunkError::new(C::FAMILY, kind, offset).into()
}

// Map an unexpected EOF to a truncated header
fn truncated<C: HeaderCodec + ?Sized>(
	offset: u64,
) -> impl FnOnce(std::io::Error) -> crate::error::TagError {
	move |e| {
		if e.kind() == IoErrorKind::UnexpectedEof {
			bad::<C>(ChunkErrorKind::Truncated, offset)
		} else {
			e.into()
		}
	}
}

// The format permits any characters to be used in atom identifiers. This doesn't
// leave us any room for error detection.
//
// TagLib has decided on a character set to consider valid, so we will do the same:
// <https://github.com/taglib/taglib/issues/1077#issuecomment-1440385838>
fn is_valid_identifier_byte(b: u8) -> bool {
	(b' '..=b'~').contains(&b) || b == b'\xA9'
}

/// MP4 boxes
///
/// ```text
/// [size: u32 BE][fourcc] (size == 1: [extended size: u64 BE])
/// ```
///
/// A size of 0 means the box extends to the end of its parent.
pub struct Mp4BoxCodec;

impl HeaderCodec for Mp4BoxCodec {
	type Ident = [u8; 4];

	const FAMILY: ChunkFamily = ChunkFamily::Mp4;
	const HEADER_SIZE: u64 = 8;

	fn decode<R>(reader: &mut R, remaining: u64) -> Result<Option<ChunkHeader<Self::Ident>>>
	where
		R: Read + Seek,
	{
		if remaining < Self::HEADER_SIZE {
			return Ok(None);
		}

		let start = reader.stream_position()?;

		let len_raw = reader
			.read_u32::<BigEndian>()
			.map_err(truncated::<Self>(start))?;

		let mut ident = [0; 4];
		reader
			.read_exact(&mut ident)
			.map_err(truncated::<Self>(start))?;

		if !ident.iter().copied().all(is_valid_identifier_byte) {
			return Err(bad::<Self>(ChunkErrorKind::InvalidIdentifier, start));
		}

		let (len, header_len, extended) = match len_raw {
			// The box extends to the end of its parent
			0 => (remaining, Self::HEADER_SIZE, false),
			// There's an extended length
			1 => {
				let len = reader
					.read_u64::<BigEndian>()
					.map_err(truncated::<Self>(start))?;
				(len, Self::HEADER_SIZE + 8, true)
			},
			_ => (u64::from(len_raw), Self::HEADER_SIZE, false),
		};

		if len < header_len || len > remaining {
			return Err(bad::<Self>(ChunkErrorKind::BadLength, start));
		}

		Ok(Some(ChunkHeader {
			ident,
			len,
			start,
			header_len,
			extended,
		}))
	}

	fn encode(header: &ChunkHeader<Self::Ident>) -> Vec<u8> {
		let mut bytes = Vec::with_capacity(16);

		if header.extended || u32::try_from(header.len).is_err() {
			bytes.extend(1_u32.to_be_bytes());
			bytes.extend(header.ident);
			bytes.extend(header.len.to_be_bytes());
		} else {
			bytes.extend((header.len as u32).to_be_bytes());
			bytes.extend(header.ident);
		}

		bytes
	}
}

/// RIFF chunks
///
/// ```text
/// [fourcc][size: u32]
/// ```
///
/// The size excludes the header, and payloads are padded to an even length.
pub struct RiffCodec<B: ByteOrder>(PhantomData<B>);

impl<B: ByteOrder> HeaderCodec for RiffCodec<B> {
	type Ident = [u8; 4];

	const FAMILY: ChunkFamily = ChunkFamily::Riff;
	const HEADER_SIZE: u64 = 8;

	fn decode<R>(reader: &mut R, remaining: u64) -> Result<Option<ChunkHeader<Self::Ident>>>
	where
		R: Read + Seek,
	{
		if remaining < Self::HEADER_SIZE {
			return Ok(None);
		}

		let start = reader.stream_position()?;

		let mut ident = [0; 4];
		reader
			.read_exact(&mut ident)
			.map_err(truncated::<Self>(start))?;

		let size = reader.read_u32::<B>().map_err(truncated::<Self>(start))?;

		if ident == [0; 4] || !ident.iter().copied().all(is_valid_identifier_byte) {
			return Err(bad::<Self>(ChunkErrorKind::InvalidIdentifier, start));
		}

		let len = Self::HEADER_SIZE + u64::from(size);
		if len > remaining {
			return Err(bad::<Self>(ChunkErrorKind::BadLength, start));
		}

		Ok(Some(ChunkHeader {
			ident,
			len,
			start,
			header_len: Self::HEADER_SIZE,
			extended: false,
		}))
	}

	fn encode(header: &ChunkHeader<Self::Ident>) -> Vec<u8> {
		let mut bytes = Vec::with_capacity(8);
		bytes.extend(header.ident);

		let mut size = [0; 4];
		B::write_u32(&mut size, header.payload_len() as u32);
		bytes.extend(size);

		bytes
	}

	fn padding(payload_len: u64) -> u64 {
		payload_len % 2
	}
}

/// Little endian RIFF chunks, as found in WAV files
pub type RiffLeCodec = RiffCodec<LittleEndian>;

/// ASF objects
///
/// ```text
/// [GUID: 16 bytes][size: u64 LE]
/// ```
pub struct AsfObjectCodec;

impl HeaderCodec for AsfObjectCodec {
	type Ident = Guid;

	const FAMILY: ChunkFamily = ChunkFamily::Asf;
	const HEADER_SIZE: u64 = 24;

	fn decode<R>(reader: &mut R, remaining: u64) -> Result<Option<ChunkHeader<Self::Ident>>>
	where
		R: Read + Seek,
	{
		if remaining < Self::HEADER_SIZE {
			return Ok(None);
		}

		let start = reader.stream_position()?;

		let mut guid = [0; 16];
		reader
			.read_exact(&mut guid)
			.map_err(truncated::<Self>(start))?;

		let len = reader
			.read_u64::<LittleEndian>()
			.map_err(truncated::<Self>(start))?;

		let ident = Guid::from_bytes(guid);
		if ident.is_zero() {
			return Err(bad::<Self>(ChunkErrorKind::InvalidIdentifier, start));
		}

		if len < Self::HEADER_SIZE || len > remaining {
			return Err(bad::<Self>(ChunkErrorKind::BadLength, start));
		}

		Ok(Some(ChunkHeader {
			ident,
			len,
			start,
			header_len: Self::HEADER_SIZE,
			extended: false,
		}))
	}

	fn encode(header: &ChunkHeader<Self::Ident>) -> Vec<u8> {
		let mut bytes = Vec::with_capacity(24);
		bytes.extend(header.ident.as_bytes());
		bytes.extend(header.len.to_le_bytes());
		bytes
	}
}

#[cfg(test)]
mod tests {
	use super::{AsfObjectCodec, ChunkHeader, HeaderCodec, Mp4BoxCodec, RiffLeCodec};
	use crate::asf::Guid;
	use crate::error::{ChunkErrorKind, ErrorKind};

	use std::io::Cursor;

	fn chunk_error_kind(err: &crate::error::TagError) -> ChunkErrorKind {
		match err.kind() {
			ErrorKind::BadChunk(e) => e.kind(),
			other => panic!("expected a chunk error, got {other:?}"),
		}
	}

	#[test_log::test]
	fn mp4_box() {
		let mut reader = Cursor::new(b"\x00\x00\x00\x10moov\x00\x00\x00\x00\x00\x00\x00\x00".to_vec());
		let header = Mp4BoxCodec::decode(&mut reader, 16).unwrap().unwrap();

		assert_eq!(&header.ident, b"moov");
		assert_eq!(header.len, 16);
		assert_eq!(header.payload_len(), 8);
		assert_eq!(Mp4BoxCodec::encode(&header), b"\x00\x00\x00\x10moov");
	}

	#[test_log::test]
	fn mp4_extended_and_open_ended() {
		let mut data = b"\x00\x00\x00\x01mdat".to_vec();
		data.extend(20_u64.to_be_bytes());
		data.extend([0; 4]);

		let header = Mp4BoxCodec::decode(&mut Cursor::new(&data), 20)
			.unwrap()
			.unwrap();
		assert!(header.extended);
		assert_eq!(header.header_len, 16);
		assert_eq!(header.payload_len(), 4);

		let open = Mp4BoxCodec::decode(&mut Cursor::new(b"\x00\x00\x00\x00free\0\0"), 10)
			.unwrap()
			.unwrap();
		assert_eq!(open.len, 10);
	}

	#[test_log::test]
	fn mp4_bad_headers() {
		let err = Mp4BoxCodec::decode(&mut Cursor::new(b"\x00\x00\x00\x08\x00\x01\x02\x03"), 8)
			.unwrap_err();
		assert_eq!(chunk_error_kind(&err), ChunkErrorKind::InvalidIdentifier);

		let err = Mp4BoxCodec::decode(&mut Cursor::new(b"\x00\x00\x00\x04free"), 8).unwrap_err();
		assert_eq!(chunk_error_kind(&err), ChunkErrorKind::BadLength);

		let err = Mp4BoxCodec::decode(&mut Cursor::new(b"\x00\x00\x01\x00free"), 64).unwrap_err();
		assert_eq!(chunk_error_kind(&err), ChunkErrorKind::BadLength);

		let err = Mp4BoxCodec::decode(&mut Cursor::new(b"\x00\x00\x00\x01mdat\x00\x00"), 64)
			.unwrap_err();
		assert_eq!(chunk_error_kind(&err), ChunkErrorKind::Truncated);

		// No room left in the parent
		assert!(Mp4BoxCodec::decode(&mut Cursor::new(b"\0\0"), 2).unwrap().is_none());
	}

	#[test_log::test]
	fn riff_chunk() {
		let header = RiffLeCodec::decode(&mut Cursor::new(b"LIST\x05\x00\x00\x00"), 14)
			.unwrap()
			.unwrap();

		assert_eq!(header.len, 13);
		assert_eq!(RiffLeCodec::padding(header.payload_len()), 1);
		assert_eq!(RiffLeCodec::encode(&header), b"LIST\x05\x00\x00\x00");

		let err = RiffLeCodec::decode(&mut Cursor::new([0_u8; 8]), 8).unwrap_err();
		assert_eq!(chunk_error_kind(&err), ChunkErrorKind::InvalidIdentifier);
	}

	#[test_log::test]
	fn asf_object() {
		let header = ChunkHeader {
			ident: Guid::HEADER_OBJECT,
			len: 30,
			start: 0,
			header_len: 24,
			extended: false,
		};

		let mut encoded = AsfObjectCodec::encode(&header);
		encoded.extend([0; 6]);

		let decoded = AsfObjectCodec::decode(&mut Cursor::new(encoded), 30)
			.unwrap()
			.unwrap();
		assert_eq!(decoded, header);

		let err = AsfObjectCodec::decode(&mut Cursor::new([0_u8; 24]), 24).unwrap_err();
		assert_eq!(chunk_error_kind(&err), ChunkErrorKind::InvalidIdentifier);
	}
}
