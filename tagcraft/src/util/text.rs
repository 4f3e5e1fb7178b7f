use crate::error::{ErrorKind, Result, TagError};
use crate::macros::err;

use std::io::Read;

use byteorder::ReadBytesExt;

/// Errors that can occur while encoding text
#[derive(Copy, Clone, Debug)]
pub struct TextEncodingError {
	encoding: TextEncoding,
	valid_up_to: usize,
}

impl TextEncodingError {
	/// The target text encoding
	pub fn encoding(&self) -> TextEncoding {
		self.encoding
	}

	/// The character index in the provided string up to which the encoding was valid
	pub fn valid_up_to(&self) -> usize {
		self.valid_up_to
	}
}

impl std::fmt::Display for TextEncodingError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(
			f,
			"invalid {:?} sequence from index {}",
			self.encoding, self.valid_up_to
		)
	}
}

impl std::error::Error for TextEncodingError {}

/// The text encoding for use in ID3v2 frames
#[derive(Debug, Clone, Eq, PartialEq, Copy, Hash)]
#[repr(u8)]
pub enum TextEncoding {
	/// ISO-8859-1
	Latin1 = 0,
	/// UTF-16 with a byte order mark
	UTF16 = 1,
	/// UTF-16 big endian
	UTF16BE = 2,
	/// UTF-8
	UTF8 = 3,
}

impl TextEncoding {
	/// Get a `TextEncoding` from a u8, must be 0-3 inclusive
	pub fn from_u8(byte: u8) -> Option<Self> {
		match byte {
			0 => Some(Self::Latin1),
			1 => Some(Self::UTF16),
			2 => Some(Self::UTF16BE),
			3 => Some(Self::UTF8),
			_ => None,
		}
	}

	pub(crate) fn encode(
		self,
		text: &str,
		terminated: bool,
	) -> std::result::Result<Vec<u8>, TextEncodingError> {
		let mut out = match self {
			TextEncoding::Latin1 => latin1_encode(text)?,
			TextEncoding::UTF16 => utf16_encode(text, u16::to_le_bytes, true),
			TextEncoding::UTF16BE => utf16_encode(text, u16::to_be_bytes, false),
			TextEncoding::UTF8 => text.as_bytes().to_vec(),
		};

		if terminated {
			match self {
				TextEncoding::Latin1 | TextEncoding::UTF8 => out.push(0),
				TextEncoding::UTF16 | TextEncoding::UTF16BE => out.extend([0, 0]),
			}
		}

		Ok(out)
	}
}

/// Decode text from `reader` in `encoding`
///
/// When `terminated` is set, this reads up to (and consumes) the null terminator, otherwise it
/// reads to the end of the reader. Returns the text and the number of bytes consumed.
pub(crate) fn decode_text<R>(
	reader: &mut R,
	encoding: TextEncoding,
	terminated: bool,
) -> Result<(String, usize)>
where
	R: Read,
{
	let (raw_bytes, bytes_read) = if terminated {
		let (bytes, terminator_len) = read_to_terminator(reader, encoding);
		let len = bytes.len() + terminator_len;
		(bytes, len)
	} else {
		let mut bytes = Vec::new();
		reader.read_to_end(&mut bytes)?;
		let len = bytes.len();
		(bytes, len)
	};

	if raw_bytes.is_empty() {
		return Ok((String::new(), bytes_read));
	}

	let text = match encoding {
		TextEncoding::Latin1 => latin1_decode(&raw_bytes),
		TextEncoding::UTF16 => {
			if raw_bytes.len() % 2 != 0 {
				err!(TextDecode("UTF-16 string has an odd length"));
			}

			match raw_bytes[..2] {
				[0xFE, 0xFF] => utf16_decode_bytes(&raw_bytes[2..], u16::from_be_bytes)?,
				[0xFF, 0xFE] => utf16_decode_bytes(&raw_bytes[2..], u16::from_le_bytes)?,
				_ => err!(TextDecode("UTF-16 string has an invalid byte order mark")),
			}
		},
		TextEncoding::UTF16BE => utf16_decode_bytes(&raw_bytes, u16::from_be_bytes)?,
		TextEncoding::UTF8 => utf8_decode(raw_bytes)
			.map_err(|_| TagError::new(ErrorKind::TextDecode("Expected a UTF-8 string")))?,
	};

	Ok((text, bytes_read))
}

pub(crate) fn read_to_terminator<R>(reader: &mut R, encoding: TextEncoding) -> (Vec<u8>, usize)
where
	R: Read,
{
	let mut text_bytes = Vec::new();
	let mut terminator_len = 0;

	match encoding {
		TextEncoding::Latin1 | TextEncoding::UTF8 => {
			while let Ok(byte) = reader.read_u8() {
				if byte == 0 {
					terminator_len = 1;
					break;
				}

				text_bytes.push(byte)
			}
		},
		TextEncoding::UTF16 | TextEncoding::UTF16BE => {
			while let (Ok(b1), Ok(b2)) = (reader.read_u8(), reader.read_u8()) {
				if b1 == 0 && b2 == 0 {
					terminator_len = 2;
					break;
				}

				text_bytes.push(b1);
				text_bytes.push(b2)
			}
		},
	}

	(text_bytes, terminator_len)
}

pub(crate) fn latin1_decode(bytes: &[u8]) -> String {
	let mut text = bytes.iter().map(|c| *c as char).collect::<String>();
	trim_end_nulls(&mut text);
	text
}

fn latin1_encode(s: &str) -> std::result::Result<Vec<u8>, TextEncodingError> {
	s.chars()
		.enumerate()
		.map(|(index, c)| {
			u8::try_from(u32::from(c)).map_err(|_| TextEncodingError {
				encoding: TextEncoding::Latin1,
				valid_up_to: index,
			})
		})
		.collect()
}

pub(crate) fn utf8_decode(bytes: Vec<u8>) -> Result<String> {
	String::from_utf8(bytes)
		.map(|mut text| {
			trim_end_nulls(&mut text);
			text
		})
		.map_err(Into::into)
}

pub(crate) fn utf16_decode_bytes(bytes: &[u8], endianness: fn([u8; 2]) -> u16) -> Result<String> {
	if bytes.is_empty() {
		return Ok(String::new());
	}

	let words: Vec<u16> = bytes
		.chunks_exact(2)
		.map(|c| endianness([c[0], c[1]]))
		.collect();

	String::from_utf16(&words)
		.map(|mut text| {
			trim_end_nulls(&mut text);
			text
		})
		.map_err(|_| TagError::new(ErrorKind::TextDecode("Given an invalid UTF-16 string")))
}

/// Decode a UTF-16 LE string, as found in ASF objects
///
/// Trailing nulls are removed.
pub(crate) fn utf16le_decode(bytes: &[u8]) -> Result<String> {
	if bytes.len() % 2 != 0 {
		err!(TextDecode("UTF-16 string has an odd length"));
	}

	utf16_decode_bytes(bytes, u16::from_le_bytes)
}

/// Encode a null terminated UTF-16 LE string, as found in ASF objects
pub(crate) fn utf16le_encode(text: &str) -> Vec<u8> {
	let mut encoded = utf16_encode(text, u16::to_le_bytes, false);
	encoded.extend([0, 0]);
	encoded
}

pub(crate) fn trim_end_nulls(text: &mut String) {
	if text.ends_with('\0') {
		let new_len = text.trim_end_matches('\0').len();
		text.truncate(new_len);
	}
}

fn utf16_encode(text: &str, endianness: fn(u16) -> [u8; 2], bom: bool) -> Vec<u8> {
	let mut encoded = Vec::<u8>::with_capacity(text.len() * 2 + 2);

	if bom {
		encoded.extend_from_slice(&endianness(0xFEFF_u16));
	}

	for ch in text.encode_utf16() {
		encoded.extend_from_slice(&endianness(ch));
	}

	encoded
}

#[cfg(test)]
mod tests {
	use crate::util::text::{TextEncoding, decode_text, utf16le_decode, utf16le_encode};

	use std::io::Cursor;

	const TEST_STRING: &str = "l\u{00f8}ft\u{00a5}";

	#[test_log::test]
	fn text_decode() {
		let be = decode_text(
			&mut Cursor::new(&[
				0xFE, 0xFF, 0x00, 0x6C, 0x00, 0xF8, 0x00, 0x66, 0x00, 0x74, 0x00, 0xA5, 0x00, 0x00,
			]),
			TextEncoding::UTF16,
			false,
		)
		.unwrap();
		let le = decode_text(
			&mut Cursor::new(&[
				0xFF, 0xFE, 0x6C, 0x00, 0xF8, 0x00, 0x66, 0x00, 0x74, 0x00, 0xA5, 0x00, 0x00, 0x00,
			]),
			TextEncoding::UTF16,
			false,
		)
		.unwrap();

		assert_eq!(be, le);
		assert_eq!(be.0, TEST_STRING);

		let (utf8, read) =
			decode_text(&mut TEST_STRING.as_bytes(), TextEncoding::UTF8, false).unwrap();
		assert_eq!(utf8, TEST_STRING);
		assert_eq!(read, TEST_STRING.len());
	}

	#[test_log::test]
	fn terminated_decode() {
		let mut reader = Cursor::new(b"first\0second".to_vec());

		let (first, read) = decode_text(&mut reader, TextEncoding::Latin1, true).unwrap();
		assert_eq!(first, "first");
		assert_eq!(read, 6);

		let (second, _) = decode_text(&mut reader, TextEncoding::Latin1, true).unwrap();
		assert_eq!(second, "second");

		let (empty, read) =
			decode_text(&mut Cursor::new([0_u8, 0x48]), TextEncoding::UTF8, true).unwrap();
		assert_eq!(empty, "");
		assert_eq!(read, 1);
	}

	#[test_log::test]
	fn text_encode() {
		assert_eq!(
			TextEncoding::UTF16BE.encode(TEST_STRING, false).unwrap(),
			&[0x00, 0x6C, 0x00, 0xF8, 0x00, 0x66, 0x00, 0x74, 0x00, 0xA5]
		);
		assert_eq!(
			TextEncoding::UTF16.encode(TEST_STRING, true).unwrap(),
			&[
				0xFF, 0xFE, 0x6C, 0x00, 0xF8, 0x00, 0x66, 0x00, 0x74, 0x00, 0xA5, 0x00, 0x00, 0x00
			]
		);
		assert_eq!(
			TextEncoding::Latin1.encode(TEST_STRING, true).unwrap(),
			&[0x6C, 0xF8, 0x66, 0x74, 0xA5, 0x00]
		);

		let err = TextEncoding::Latin1.encode("ab\u{2603}", false).unwrap_err();
		assert_eq!(err.valid_up_to(), 2);
	}

	#[test_log::test]
	fn asf_strings() {
		let encoded = utf16le_encode("Song");
		assert_eq!(encoded, b"S\0o\0n\0g\0\0\0");
		assert_eq!(utf16le_decode(&encoded).unwrap(), "Song");
		assert!(utf16le_decode(&[0x53]).is_err());
	}
}
