use super::atom::{Atom, AtomData};
use super::data_type::DataType;
use super::{AtomIdent, GENRE, GNRE, Ilst, constants};
use crate::config::WriteOptions;
use crate::error::Result;
use crate::macros::encode_err;
use crate::mp4::atom_info::ATOM_HEADER_LEN;
use crate::picture::{MimeType, Picture};
use crate::util::io::FileLike;

use std::borrow::Cow;

pub(crate) fn write_to<F>(file: &mut F, tag: &Ilst, write_options: WriteOptions) -> Result<()>
where
	F: FileLike,
{
	log::debug!("Attempting to write `ilst` tag to file");

	let ilst = build_ilst(tag, write_options)?;
	crate::mp4::write::write_ilst(file, &ilst, write_options)
}

/// Build a complete `ilst` atom
///
/// An empty tag produces no bytes at all.
pub(crate) fn build_ilst(tag: &Ilst, write_options: WriteOptions) -> Result<Vec<u8>> {
	log::debug!("Building `ilst` atom");

	if tag.atoms.is_empty() {
		return Ok(Vec::new());
	}

	let mut content = Vec::new();
	for atom in &tag.atoms {
		match textual_genre(tag, atom, write_options) {
			Some(converted) => content.extend(build_atom(&converted)?),
			None => content.extend(build_atom(atom)?),
		}
	}

	let ilst = with_header(*b"ilst", &content)?;
	log::trace!("Built `ilst` atom, size: {} bytes", ilst.len());

	Ok(ilst)
}

// With `genres_as_text`, a `gnre` code is written as `©gen` instead, unless `©gen` already exists
fn textual_genre(tag: &Ilst, atom: &Atom<'_>, write_options: WriteOptions) -> Option<Atom<'static>> {
	if !write_options.genres_as_text || atom.ident != GNRE || tag.get(&GENRE).is_some() {
		return None;
	}

	let genre = tag.genre_code().and_then(constants::genre_name)?;
	log::trace!("Writing `gnre` code as `©gen`: {genre}");

	Some(Atom::text(GENRE, genre.to_owned()))
}

pub(crate) fn with_header(ident: [u8; 4], content: &[u8]) -> Result<Vec<u8>> {
	let Ok(size) = u32::try_from(ATOM_HEADER_LEN + content.len() as u64) else {
		return Err(encode_err!(Mp4, "Atom is too large to fit a 32-bit size"));
	};

	let mut atom = Vec::with_capacity(size as usize);
	atom.extend(size.to_be_bytes());
	atom.extend(ident);
	atom.extend(content);

	Ok(atom)
}

fn full_atom(ident: [u8; 4], content: &[u8]) -> Result<Vec<u8>> {
	let mut versioned = Vec::with_capacity(content.len() + 4);
	// Version (1) + flags (3)
	versioned.extend([0; 4]);
	versioned.extend(content);

	with_header(ident, &versioned)
}

fn build_atom(atom: &Atom<'_>) -> Result<Vec<u8>> {
	let mut content = Vec::new();

	let fourcc = match &atom.ident {
		AtomIdent::Fourcc(fourcc) => *fourcc,
		AtomIdent::Freeform { mean, name } => {
			content.extend(full_atom(*b"mean", mean.as_bytes())?);
			content.extend(full_atom(*b"name", name.as_bytes())?);
			*b"----"
		},
	};

	for value in atom.data() {
		let (code, payload) = match value {
			AtomData::UTF8(text) => (DataType::Utf8, Cow::Borrowed(text.as_bytes())),
			AtomData::UTF16(text) => (
				DataType::Utf16,
				Cow::Owned(text.encode_utf16().flat_map(u16::to_be_bytes).collect()),
			),
			AtomData::Picture(picture) => (picture_type(picture)?, Cow::Borrowed(picture.data())),
			AtomData::SignedInteger(int) => {
				let bytes = int.to_be_bytes();
				(
					DataType::BeSignedInteger,
					Cow::Owned(bytes[4 - bytes_to_occupy_int(*int)..].to_vec()),
				)
			},
			AtomData::UnsignedInteger(uint) => {
				let bytes = uint.to_be_bytes();
				(
					DataType::BeUnsignedInteger,
					Cow::Owned(bytes[4 - bytes_to_occupy_uint(*uint)..].to_vec()),
				)
			},
			AtomData::Bool(b) => (DataType::BeSignedInteger, Cow::Owned(vec![u8::from(*b)])),
			AtomData::Unknown { code, data } => (*code, Cow::Borrowed(data.as_slice())),
		};

		content.extend(data_atom(code, &payload)?);
	}

	with_header(fourcc, &content)
}

fn picture_type(picture: &Picture) -> Result<DataType> {
	match picture.mime_type() {
		Some(mime_type @ (MimeType::Gif | MimeType::Jpeg | MimeType::Png | MimeType::Bmp)) => {
			Ok(DataType::from(mime_type))
		},
		// Implicit, readers will have to sniff it
		None => Ok(DataType::Reserved),
		Some(_) => Err(encode_err!(
			Mp4,
			"Attempted to write an unsupported picture format"
		)),
	}
}

// .... DATA (type set = 0) (type code) (locale = 0000) (data)
fn data_atom(code: DataType, payload: &[u8]) -> Result<Vec<u8>> {
	let code = u32::from(code);
	if code > DataType::MAX {
		return Err(encode_err!(
			Mp4,
			"Attempted to write a code that cannot fit in 24 bits"
		));
	}

	let mut content = Vec::with_capacity(payload.len() + 8);
	content.push(constants::WELL_KNOWN_TYPE_SET);
	content.extend(&code.to_be_bytes()[1..]);
	content.extend([0; 4]);
	content.extend(payload);

	with_header(*b"data", &content)
}

fn bytes_to_occupy_uint(uint: u32) -> usize {
	if uint == 0 {
		return 1;
	}

	let ret = 4 - (uint.to_le().leading_zeros() >> 3) as usize;
	if ret == 3 {
		return 4;
	}
	ret
}

// Signed integers can only be shrunk as long as the sign survives
fn bytes_to_occupy_int(int: i32) -> usize {
	if i8::try_from(int).is_ok() {
		1
	} else if i16::try_from(int).is_ok() {
		2
	} else {
		4
	}
}

#[cfg(test)]
mod tests {
	use super::{build_ilst, bytes_to_occupy_int, bytes_to_occupy_uint};
	use crate::config::WriteOptions;
	use crate::mp4::constants::flags::GAPLESS;
	use crate::mp4::{Atom, AtomData, AtomIdent, Ilst};
	use crate::picture::{MimeType, Picture};
	use crate::tag::Accessor;

	macro_rules! int_test {
		(
			func: $fun:expr,
			$(
				{
					input: $input:expr,
					expected: $expected:expr $(,)?
				}
			),+ $(,)?
		) => {
			$(
				{
					let bytes = $fun($input);
					assert_eq!(&$input.to_be_bytes()[4 - bytes..], &$expected[..]);
				}
			)+
		}
	}

	#[test_log::test]
	fn integer_shrinking_unsigned() {
		int_test! {
			func: bytes_to_occupy_uint,
			{
				input: 0u32,
				expected: [0],
			},
			{
				input: 1u32,
				expected: [1],
			},
			{
				input: 32767u32,
				expected: [127, 255],
			},
			{
				input: 65535u32,
				expected: [255, 255],
			},
			{
				input: 8_388_607_u32,
				expected: [0, 127, 255, 255],
			},
			{
				input: u32::MAX,
				expected: [255, 255, 255, 255],
			},
		}
	}

	#[test_log::test]
	fn integer_shrinking_signed() {
		int_test! {
			func: bytes_to_occupy_int,
			{
				input: -1i32,
				expected: [255],
			},
			{
				input: 128i32,
				expected: [0, 128],
			},
			{
				input: -40_000i32,
				expected: [255, 255, 99, 192],
			},
		}
	}

	#[test_log::test]
	fn empty_tag() {
		assert!(build_ilst(&Ilst::new(), WriteOptions::default()).unwrap().is_empty());
	}

	#[test_log::test]
	fn layout() {
		let mut ilst = Ilst::new();
		ilst.set_title(String::from("Foo"));
		ilst.set_flag(GAPLESS, true);

		let bytes = build_ilst(&ilst, WriteOptions::default()).unwrap();

		#[rustfmt::skip]
		let expected = [
			&[0, 0, 0, 60][..], b"ilst",
				&[0, 0, 0, 27], b"\xa9nam",
					&[0, 0, 0, 19], b"data", &[0, 0, 0, 1], &[0; 4], b"Foo",
				&[0, 0, 0, 25], b"pgap",
					&[0, 0, 0, 17], b"data", &[0, 0, 0, 21], &[0; 4], &[1],
		]
		.concat();

		assert_eq!(bytes, expected);
	}

	#[test_log::test]
	fn freeform_layout() {
		let mut ilst = Ilst::new();
		ilst.insert(Atom::new(
			AtomIdent::Freeform {
				mean: "com.apple.iTunes".into(),
				name: "LABEL".into(),
			},
			AtomData::UTF8(String::from("X")),
		));

		let bytes = build_ilst(&ilst, WriteOptions::default()).unwrap();
		assert_eq!(&bytes[12..16], b"----");
		assert_eq!(&bytes[16..20], &[0, 0, 0, 28]);
		assert_eq!(&bytes[20..24], b"mean");
		assert_eq!(&bytes[28..44], b"com.apple.iTunes");
		assert_eq!(&bytes[48..52], b"name");
		assert_eq!(&bytes[56..61], b"LABEL");
	}

	#[test_log::test]
	fn genres_as_text() {
		let mut ilst = Ilst::new();
		ilst.set_genre(String::from("Jazz"));

		let as_code = build_ilst(&ilst, WriteOptions::default()).unwrap();
		assert_eq!(&as_code[12..16], b"gnre");
		assert_eq!(&as_code[as_code.len() - 2..], &[0, 9]);

		let as_text = build_ilst(&ilst, WriteOptions::new().genres_as_text(true)).unwrap();
		assert_eq!(&as_text[12..16], b"\xa9gen");
		assert_eq!(&as_text[as_text.len() - 4..], b"Jazz");
	}

	#[test_log::test]
	fn unsupported_picture() {
		let mut ilst = Ilst::new();
		ilst.insert_picture(Picture::unchecked(vec![1]).mime_type(MimeType::Tiff).build());

		assert!(build_ilst(&ilst, WriteOptions::default()).is_err());
	}
}
