use super::atom::{Atom, AtomData, AtomDataStorage};
use super::constants::{WELL_KNOWN_TYPE_SET, flags};
use super::data_type::DataType;
use super::{AtomIdent, Ilst};
use crate::chunk::{ChunkWalker, Mp4BoxCodec};
use crate::config::{ParseOptions, ParsingMode};
use crate::error::{Result, TagError};
use crate::macros::{err, parse_mode_choice, try_vec};
use crate::mp4::atom_info::AtomInfo;
use crate::picture::{MimeType, Picture, PictureType};
use crate::util::text::{utf8_decode, utf16_decode_bytes};

use std::io::{Cursor, Read, Seek, SeekFrom};

use byteorder::{BigEndian, ReadBytesExt};

// type indicator (4) + locale (4)
const DATA_ATOM_PREFIX_LEN: u64 = 8;

/// The contents of a single `ilst` item
#[derive(Default)]
struct ItemContents {
	mean: Option<String>,
	name: Option<String>,
	values: Vec<(DataType, Vec<u8>)>,
}

/// Parse the content of an `ilst` atom
///
/// The reader is expected to be at the start of the atom's content.
pub(in crate::mp4) fn parse_ilst<R>(
	reader: &mut R,
	parse_options: ParseOptions,
	ilst: &AtomInfo,
) -> Result<Ilst>
where
	R: Read + Seek,
{
	let parse_mode = parse_options.parsing_mode;

	let mut contents = try_vec![0; ilst.payload_len() as usize, parse_options.allocation_limit];
	reader.read_exact(&mut contents)?;

	let len = contents.len() as u64;
	let mut cursor = Cursor::new(contents);
	let mut walker = ChunkWalker::<Mp4BoxCodec>::new(len, parse_mode);

	let mut tag = Ilst::new();
	while let Some(item) = walker.next(&mut cursor)? {
		match &item.ident {
			b"free" | b"skip" => {},
			b"covr" if !parse_options.read_cover_art => {},
			_ => {
				let contents = match read_item(&mut cursor, &item, parse_options) {
					Ok(contents) => contents,
					Err(e) => {
						handle_error(e, parse_mode)?;
						walker.skip(&mut cursor, &item)?;
						continue;
					},
				};

				if let Some(atom) = build_atom(item.ident, contents, parse_mode)? {
					tag.insert(atom);
				}
			},
		}

		walker.skip(&mut cursor, &item)?;
	}

	Ok(tag)
}

fn handle_error(err: TagError, parse_mode: ParsingMode) -> Result<()> {
	parse_mode_choice!(
		parse_mode,
		STRICT: Err(err),
		DEFAULT: {
			log::warn!("Skipping atom with invalid content: {err}");
			Ok(())
		}
	)
}

fn read_item<R>(reader: &mut R, item: &AtomInfo, parse_options: ParseOptions) -> Result<ItemContents>
where
	R: Read + Seek,
{
	let parse_mode = parse_options.parsing_mode;
	let mut contents = ItemContents::default();

	let mut walker = ChunkWalker::<Mp4BoxCodec>::for_parent(item, parse_mode);
	while let Some(child) = walker.next(reader)? {
		match &child.ident {
			b"mean" => contents.mean = Some(read_freeform_part(reader, &child, parse_options)?),
			b"name" => contents.name = Some(read_freeform_part(reader, &child, parse_options)?),
			b"data" => {
				if child.payload_len() < DATA_ATOM_PREFIX_LEN {
					err!(BadAtom("`data` atom is too short"));
				}

				let type_set = reader.read_u8()?;
				let code = reader.read_u24::<BigEndian>()?;

				if type_set != WELL_KNOWN_TYPE_SET {
					parse_mode_choice!(
						parse_mode,
						STRICT: err!(BadAtom("Unknown type set in `data` atom")),
					);

					log::warn!("Skipping `data` atom with an unknown type set ({type_set})");
					walker.skip(reader, &child)?;
					continue;
				}

				// Locale, always 0
				reader.seek(SeekFrom::Current(4))?;

				let content_len = child.payload_len() - DATA_ATOM_PREFIX_LEN;
				let mut content = try_vec![0; content_len as usize, parse_options.allocation_limit];
				reader.read_exact(&mut content)?;

				contents.values.push((DataType::from(code), content));
			},
			other => log::debug!("Skipping unexpected atom in `ilst` item: {other:?}"),
		}

		walker.skip(reader, &child)?;
	}

	Ok(contents)
}

// `mean` and `name` are full atoms holding a single string
fn read_freeform_part<R>(reader: &mut R, atom: &AtomInfo, parse_options: ParseOptions) -> Result<String>
where
	R: Read + Seek,
{
	if atom.payload_len() < 4 {
		err!(BadAtom("Freeform atom is missing its version/flags"));
	}

	reader.seek(SeekFrom::Current(4))?;

	let mut content = try_vec![0; (atom.payload_len() - 4) as usize, parse_options.allocation_limit];
	reader.read_exact(&mut content)?;

	utf8_decode(content)
}

fn build_atom(fourcc: [u8; 4], contents: ItemContents, parse_mode: ParsingMode) -> Result<Option<Atom<'static>>> {
	let ident = if &fourcc == b"----" {
		match (contents.mean, contents.name) {
			(Some(mean), Some(name)) => AtomIdent::Freeform {
				mean: mean.into(),
				name: name.into(),
			},
			_ => {
				parse_mode_choice!(
					parse_mode,
					STRICT: err!(BadAtom("Freeform atom is missing its `mean` or `name`")),
				);

				log::warn!("Skipping freeform atom with no `mean` or `name`");
				return Ok(None);
			},
		}
	} else {
		AtomIdent::Fourcc(fourcc)
	};

	let mut values = Vec::with_capacity(contents.values.len());
	for (code, content) in contents.values {
		let value = if &fourcc == b"covr" {
			interpret_picture(code, content)
		} else if flags::is_flag(&fourcc) {
			// Any size integer is valid, it'll be corrected on write
			Ok(AtomData::Bool(content.iter().any(|&b| b != 0)))
		} else {
			interpret_atom_content(code, content)
		};

		match value {
			Ok(value) => values.push(value),
			Err(e) => handle_error(e, parse_mode)?,
		}
	}

	let Some(data) = AtomDataStorage::from_vec(values) else {
		log::debug!("Skipping `{}` atom with no values", ident.to_key());
		return Ok(None);
	};

	Ok(Some(Atom { ident, data }))
}

fn interpret_picture(code: DataType, content: Vec<u8>) -> Result<AtomData> {
	let Some(mime_type) = code.picture_mime_type() else {
		err!(BadAtom("`covr` atom has an unknown picture type"));
	};

	// An implicit type, the format has to be guessed
	let mime_type = mime_type.or_else(|| MimeType::from_signature(&content).ok());

	let mut picture = Picture::unchecked(content).pic_type(PictureType::Other);
	if let Some(mime_type) = mime_type {
		picture = picture.mime_type(mime_type);
	}

	Ok(AtomData::Picture(picture.build()))
}

fn interpret_atom_content(code: DataType, content: Vec<u8>) -> Result<AtomData> {
	Ok(match code {
		DataType::Utf8 => AtomData::UTF8(utf8_decode(content)?),
		DataType::Utf16 => AtomData::UTF16(utf16_decode_bytes(&content, u16::from_be_bytes)?),
		DataType::BeSignedInteger | DataType::BeUnsignedInteger if content.len() == 8 => {
			AtomData::Unknown {
				code,
				data: content,
			}
		},
		DataType::BeSignedInteger => {
			let Some((first, rest)) = content.split_first().filter(|_| content.len() <= 4) else {
				err!(BadAtom("Unexpected atom size for type \"BE signed integer\""));
			};

			// Sign extend from the most significant byte
			let value = rest
				.iter()
				.fold(i32::from(*first as i8), |acc, &b| (acc << 8) | i32::from(b));
			AtomData::SignedInteger(value)
		},
		DataType::BeUnsignedInteger => {
			if content.is_empty() || content.len() > 4 {
				err!(BadAtom("Unexpected atom size for type \"BE unsigned integer\""));
			}

			let value = content.iter().fold(0_u32, |acc, &b| (acc << 8) | u32::from(b));
			AtomData::UnsignedInteger(value)
		},
		_ => AtomData::Unknown {
			code,
			data: content,
		},
	})
}

#[cfg(test)]
mod tests {
	use super::{interpret_atom_content, parse_ilst};
	use crate::chunk::{ChunkWalker, Mp4BoxCodec};
	use crate::config::{ParseOptions, ParsingMode};
	use crate::mp4::{AtomData, AtomIdent, DataType, Ilst};
	use crate::picture::MimeType;
	use crate::tag::Accessor;

	use std::io::Cursor;

	fn atom(ident: &[u8; 4], content: &[u8]) -> Vec<u8> {
		let mut atom = (content.len() as u32 + 8).to_be_bytes().to_vec();
		atom.extend(ident);
		atom.extend(content);
		atom
	}

	fn data(type_set: u8, code: u32, content: &[u8]) -> Vec<u8> {
		let mut payload = vec![type_set];
		payload.extend(&code.to_be_bytes()[1..]);
		payload.extend([0; 4]);
		payload.extend(content);
		atom(b"data", &payload)
	}

	fn parse(items: &[Vec<u8>], parse_options: ParseOptions) -> crate::error::Result<Ilst> {
		let ilst = atom(b"ilst", &items.concat());
		let mut reader = Cursor::new(&ilst);

		let mut walker = ChunkWalker::<Mp4BoxCodec>::new(ilst.len() as u64, ParsingMode::Strict);
		let info = walker.next(&mut reader).unwrap().unwrap();
		parse_ilst(&mut reader, parse_options, &info)
	}

	#[test_log::test]
	fn text_numbers_and_flags() {
		let items = [
			atom(b"\xa9nam", &data(0, 1, b"Foo title")),
			atom(b"trkn", &data(0, 0, &[0, 0, 0, 3, 0, 9, 0, 0])),
			atom(b"cpil", &data(0, 21, &[1])),
			atom(b"tmpo", &data(0, 21, &[0, 120])),
			atom(b"free", &[0; 4]),
		];

		let ilst = parse(&items, ParseOptions::new()).unwrap();
		assert_eq!(ilst.title().as_deref(), Some("Foo title"));
		assert_eq!(ilst.track(), Some(3));
		assert_eq!(ilst.track_total(), Some(9));
		assert!(ilst.is_compilation());
		assert_eq!(
			ilst.get(&AtomIdent::Fourcc(*b"tmpo")).unwrap().data().next(),
			Some(&AtomData::SignedInteger(120))
		);
		assert_eq!(ilst.atoms.len(), 4);
	}

	#[test_log::test]
	fn freeform_and_multiple_values() {
		let mut mean = vec![0; 4];
		mean.extend(b"com.apple.iTunes");
		let mut name = vec![0; 4];
		name.extend(b"LABEL");

		let freeform = [
			atom(b"mean", &mean),
			atom(b"name", &name),
			data(0, 1, b"Foo"),
			data(0, 1, b"Bar"),
		]
		.concat();

		let ilst = parse(&[atom(b"----", &freeform)], ParseOptions::new()).unwrap();
		let label = ilst
			.get(&AtomIdent::Freeform {
				mean: "com.apple.iTunes".into(),
				name: "LABEL".into(),
			})
			.unwrap();
		assert_eq!(label.data().count(), 2);
	}

	#[test_log::test]
	fn freeform_missing_name() {
		let mut mean = vec![0; 4];
		mean.extend(b"com.apple.iTunes");
		let freeform = [atom(b"mean", &mean), data(0, 1, b"Foo")].concat();
		let items = [atom(b"----", &freeform)];

		assert!(parse(&items, ParseOptions::new().parsing_mode(ParsingMode::Strict)).is_err());
		assert!(parse(&items, ParseOptions::new()).unwrap().atoms.is_empty());
	}

	#[test_log::test]
	fn unknown_type_set() {
		let items = [atom(b"\xa9nam", &data(1, 1, b"Foo"))];

		assert!(parse(&items, ParseOptions::new().parsing_mode(ParsingMode::Strict)).is_err());
		assert!(parse(&items, ParseOptions::new()).unwrap().atoms.is_empty());
	}

	#[test_log::test]
	fn cover_art() {
		let png = b"\x89PNG\r\n\x1a\nfoo".to_vec();
		let items = [atom(b"covr", &[data(0, 13, b"jpeg"), data(0, 0, &png)].concat())];

		let ilst = parse(&items, ParseOptions::new()).unwrap();
		let pictures = ilst.pictures().collect::<Vec<_>>();
		assert_eq!(pictures.len(), 2);
		assert_eq!(pictures[0].mime_type(), Some(&MimeType::Jpeg));
		assert_eq!(pictures[1].mime_type(), Some(&MimeType::Png));

		let ilst = parse(&items, ParseOptions::new().read_cover_art(false)).unwrap();
		assert_eq!(ilst.pictures().count(), 0);

		// Text isn't a valid picture type
		let items = [atom(b"covr", &data(0, 1, b"foo"))];
		assert!(parse(&items, ParseOptions::new().parsing_mode(ParsingMode::Strict)).is_err());
	}

	#[test_log::test]
	fn integers() {
		assert_eq!(
			interpret_atom_content(DataType::BeSignedInteger, vec![0xFF]).unwrap(),
			AtomData::SignedInteger(-1)
		);
		assert_eq!(
			interpret_atom_content(DataType::BeSignedInteger, vec![0x01, 0x00]).unwrap(),
			AtomData::SignedInteger(256)
		);
		assert_eq!(
			interpret_atom_content(DataType::BeUnsignedInteger, vec![0xFF, 0xFF, 0xFF]).unwrap(),
			AtomData::UnsignedInteger(0x00FF_FFFF)
		);
		assert!(matches!(
			interpret_atom_content(DataType::BeSignedInteger, vec![0; 8]).unwrap(),
			AtomData::Unknown { .. }
		));
		assert!(interpret_atom_content(DataType::BeSignedInteger, vec![0; 5]).is_err());
	}
}
