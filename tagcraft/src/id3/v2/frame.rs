use crate::error::Result;
use crate::macros::decode_err;
use crate::util::text::{TextEncoding, decode_text, trim_end_nulls};

use std::io::Read;

use byteorder::ReadBytesExt;

/// An ID3v2 frame
///
/// Frames that aren't decoded are kept as [`Frame::Binary`], and written back unchanged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Frame {
	/// A text information frame (`T***`, excluding `TXXX`)
	///
	/// ID3v2.4 stores multiple values separated by a null byte.
	Text {
		/// The frame ID
		id: String,
		/// The encoding of `value`
		encoding: TextEncoding,
		/// The text
		value: String,
	},
	/// A `COMM` or `USLT` frame
	Comment {
		/// Either `COMM` or `USLT`
		id: String,
		/// The encoding of `description` and `content`
		encoding: TextEncoding,
		/// ISO-639-2 language code
		language: [u8; 3],
		/// A short description, unique per language
		description: String,
		/// The text
		content: String,
	},
	/// A user defined text frame (`TXXX`)
	UserText {
		/// The encoding of `description` and `content`
		encoding: TextEncoding,
		/// The description, which acts as the item's key
		description: String,
		/// The text
		content: String,
	},
	/// Any other frame
	Binary {
		/// The frame ID
		id: String,
		/// The frame content, without its header
		data: Vec<u8>,
	},
}

/// The language code used when none is specified
pub(crate) const UNKNOWN_LANGUAGE: [u8; 3] = *b"XXX";

/// Whether `id` is a valid frame ID (4 uppercase alphanumeric characters)
pub(crate) fn is_valid_frame_id(id: &str) -> bool {
	id.len() == 4
		&& id
			.bytes()
			.all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}

impl Frame {
	/// Create a text frame, encoded as UTF-8
	pub fn text(id: impl Into<String>, value: impl Into<String>) -> Self {
		Frame::Text {
			id: id.into(),
			encoding: TextEncoding::UTF8,
			value: value.into(),
		}
	}

	/// Create a `COMM` frame with no description, encoded as UTF-8
	pub fn comment(content: impl Into<String>) -> Self {
		Frame::Comment {
			id: String::from("COMM"),
			encoding: TextEncoding::UTF8,
			language: UNKNOWN_LANGUAGE,
			description: String::new(),
			content: content.into(),
		}
	}

	/// Create a `TXXX` frame, encoded as UTF-8
	pub fn user_text(description: impl Into<String>, content: impl Into<String>) -> Self {
		Frame::UserText {
			encoding: TextEncoding::UTF8,
			description: description.into(),
			content: content.into(),
		}
	}

	/// The frame ID
	pub fn id(&self) -> &str {
		match self {
			Frame::Text { id, .. } | Frame::Comment { id, .. } | Frame::Binary { id, .. } => id,
			Frame::UserText { .. } => "TXXX",
		}
	}

	/// Whether two frames describe the same item, and can't both be in a tag
	pub(crate) fn same_item(&self, other: &Frame) -> bool {
		match (self, other) {
			(
				Frame::Comment {
					id,
					language,
					description,
					..
				},
				Frame::Comment {
					id: other_id,
					language: other_language,
					description: other_description,
					..
				},
			) => id == other_id && language == other_language && description == other_description,
			(
				Frame::UserText { description, .. },
				Frame::UserText {
					description: other_description,
					..
				},
			) => description.eq_ignore_ascii_case(other_description),
			(Frame::Text { id, .. }, Frame::Text { id: other_id, .. }) => id == other_id,
			_ => false,
		}
	}

	/// Whether the frame holds no content
	pub fn is_empty(&self) -> bool {
		match self {
			Frame::Text { value, .. } => value.is_empty(),
			Frame::Comment { content, .. } | Frame::UserText { content, .. } => content.is_empty(),
			Frame::Binary { data, .. } => data.is_empty(),
		}
	}

	/// Decode a frame's content
	pub(crate) fn parse(id: String, content: &[u8]) -> Result<Frame> {
		let reader = &mut &*content;

		let frame = match id.as_str() {
			"TXXX" => {
				let encoding = read_encoding(reader)?;
				let (description, _) = decode_text(reader, encoding, true)?;
				let (content, _) = decode_text(reader, encoding, false)?;

				Frame::UserText {
					encoding,
					description,
					content: without_nulls(content),
				}
			},
			"COMM" | "USLT" => {
				let encoding = read_encoding(reader)?;

				let mut language = [0; 3];
				reader.read_exact(&mut language)?;

				let (description, _) = decode_text(reader, encoding, true)?;
				let (content, _) = decode_text(reader, encoding, false)?;

				Frame::Comment {
					id,
					encoding,
					language,
					description,
					content: without_nulls(content),
				}
			},
			_ if id.starts_with('T') => {
				let encoding = read_encoding(reader)?;
				let (value, _) = decode_text(reader, encoding, false)?;

				Frame::Text {
					id,
					encoding,
					value: without_nulls(value),
				}
			},
			_ => Frame::Binary {
				id,
				data: content.to_vec(),
			},
		};

		Ok(frame)
	}

	/// Encode the frame's content, without a header
	///
	/// Latin-1 frames holding text outside of the Latin-1 range are written as UTF-8.
	pub(crate) fn content(&self) -> Result<Vec<u8>> {
		let mut content = Vec::new();

		match self {
			Frame::Text {
				encoding, value, ..
			} => {
				let encoding = usable_encoding(*encoding, &[value]);
				content.push(encoding as u8);
				content.extend(encoding.encode(value, false)?);
			},
			Frame::Comment {
				encoding,
				language,
				description,
				content: text,
				..
			} => {
				let encoding = usable_encoding(*encoding, &[description, text]);
				content.push(encoding as u8);
				content.extend(language);
				content.extend(encoding.encode(description, true)?);
				content.extend(encoding.encode(text, false)?);
			},
			Frame::UserText {
				encoding,
				description,
				content: text,
			} => {
				let encoding = usable_encoding(*encoding, &[description, text]);
				content.push(encoding as u8);
				content.extend(encoding.encode(description, true)?);
				content.extend(encoding.encode(text, false)?);
			},
			Frame::Binary { data, .. } => content.extend(data),
		}

		Ok(content)
	}
}

fn read_encoding(reader: &mut &[u8]) -> Result<TextEncoding> {
	match reader.read_u8().ok().and_then(TextEncoding::from_u8) {
		Some(encoding) => Ok(encoding),
		None => decode_err!(@BAIL "ID3v2: Found invalid text encoding"),
	}
}

fn without_nulls(mut text: String) -> String {
	trim_end_nulls(&mut text);
	text
}

fn usable_encoding(encoding: TextEncoding, texts: &[&String]) -> TextEncoding {
	if encoding == TextEncoding::Latin1 && texts.iter().any(|text| text.chars().any(|c| c > '\u{FF}')) {
		log::debug!("ID3v2: Text doesn't fit in Latin-1, writing it as UTF-8");
		return TextEncoding::UTF8;
	}

	encoding
}

#[cfg(test)]
mod tests {
	use super::{Frame, is_valid_frame_id};
	use crate::util::text::TextEncoding;

	#[test_log::test]
	fn text_encodings() {
		let latin1 = b"\x00Caf\xE9".to_vec();
		let utf16 = b"\x01\xFF\xFEC\x00a\x00f\x00\xE9\x00\x00\x00".to_vec();
		let utf16be = b"\x02\x00C\x00a\x00f\x00\xE9".to_vec();
		let utf8 = b"\x03Caf\xC3\xA9\x00".to_vec();

		for content in [latin1, utf16, utf16be, utf8] {
			let Frame::Text { value, .. } = Frame::parse(String::from("TIT2"), &content).unwrap()
			else {
				unreachable!()
			};

			assert_eq!(value, "Café");
		}
	}

	#[test_log::test]
	fn comment() {
		let frame = Frame::Comment {
			id: String::from("COMM"),
			encoding: TextEncoding::UTF16,
			language: *b"eng",
			description: String::from("desc"),
			content: String::from("Qux comment"),
		};

		let content = frame.content().unwrap();
		assert_eq!(Frame::parse(String::from("COMM"), &content).unwrap(), frame);
	}

	#[test_log::test]
	fn user_text() {
		let frame = Frame::user_text("REPLAYGAIN_TRACK_GAIN", "-6.5 dB");

		let content = frame.content().unwrap();
		assert_eq!(content[0], TextEncoding::UTF8 as u8);
		assert_eq!(Frame::parse(String::from("TXXX"), &content).unwrap(), frame);
	}

	#[test_log::test]
	fn latin1_fallback() {
		let frame = Frame::Text {
			id: String::from("TPE1"),
			encoding: TextEncoding::Latin1,
			value: String::from("\u{3042}"),
		};

		let content = frame.content().unwrap();
		assert_eq!(content[0], TextEncoding::UTF8 as u8);
	}

	#[test_log::test]
	fn opaque_frames() {
		let frame = Frame::parse(String::from("PRIV"), b"owner\x00\x01\x02").unwrap();
		assert_eq!(frame.id(), "PRIV");
		assert_eq!(frame.content().unwrap(), b"owner\x00\x01\x02");
	}

	#[test_log::test]
	fn bad_encoding() {
		assert!(Frame::parse(String::from("TIT2"), b"\x07Foo").is_err());
		assert!(Frame::parse(String::from("TIT2"), b"").is_err());
	}

	#[test_log::test]
	fn frame_ids() {
		assert!(is_valid_frame_id("TIT2"));
		assert!(!is_valid_frame_id("tit2"));
		assert!(!is_valid_frame_id("TIT"));
		assert!(!is_valid_frame_id("BARCODE"));
	}
}
