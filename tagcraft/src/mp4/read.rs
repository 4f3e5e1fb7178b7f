use super::Mp4File;
use super::atom_info::AtomInfo;
use super::ilst::Ilst;
use super::ilst::read::parse_ilst;
use super::properties::Mp4Properties;
use crate::chunk::{ChunkWalker, Mp4BoxCodec};
use crate::config::{ParseOptions, ParsingMode};
use crate::error::{ErrorKind, Result, TagError};
use crate::macros::{decode_err, err};
use crate::util::io::SeekStreamLen;
use crate::util::text::utf8_decode;

use std::io::{Read, Seek, SeekFrom};

use byteorder::{BigEndian, ReadBytesExt};

/// An atom, with the children of the containers we need to look into
///
/// Everything needed to find the tag, the audio track, and the chunk offset tables is kept.
/// The content of all other atoms is skipped.
#[derive(Debug, Clone)]
pub(super) struct ContextualAtom {
	pub(super) info: AtomInfo,
	pub(super) children: Vec<ContextualAtom>,
}

#[rustfmt::skip]
const IMPORTANT_CONTAINERS: &[[u8; 4]] = &[
	*b"moov",
		*b"udta",
			*b"meta",
		*b"trak",
			*b"mdia",
				*b"minf",
					*b"stbl",
	*b"moof",
		*b"traf",
];

impl ContextualAtom {
	/// Read every atom up to the walker's end
	pub(super) fn read_all<R>(
		reader: &mut R,
		walker: &mut ChunkWalker<Mp4BoxCodec>,
		parse_mode: ParsingMode,
	) -> Result<Vec<ContextualAtom>>
	where
		R: Read + Seek,
	{
		let mut atoms = Vec::new();

		while let Some(info) = walker.next(reader)? {
			let mut children = Vec::new();

			if IMPORTANT_CONTAINERS.contains(&info.ident) {
				if info.ident == *b"meta" {
					meta_is_full(reader, &info, parse_mode)?;
				}

				let mut child_walker = ChunkWalker::for_parent(&info, parse_mode);
				children = Self::read_all(reader, &mut child_walker, parse_mode)?;
			}

			walker.skip(reader, &info)?;
			atoms.push(ContextualAtom { info, children });
		}

		Ok(atoms)
	}

	pub(super) fn child(&self, ident: [u8; 4]) -> Option<&ContextualAtom> {
		self.children.iter().find(|atom| atom.info.ident == ident)
	}

	pub(super) fn children_of(&self, ident: [u8; 4]) -> impl Iterator<Item = &ContextualAtom> {
		self.children
			.iter()
			.filter(move |atom| atom.info.ident == ident)
	}

	/// Every atom with the identifier at any depth below this one
	pub(super) fn find_all(&self, ident: [u8; 4]) -> Vec<&AtomInfo> {
		let mut found = Vec::new();
		for child in &self.children {
			if child.info.ident == ident {
				found.push(&child.info);
			}

			found.extend(child.find_all(ident));
		}

		found
	}
}

pub(super) fn find_atom(atoms: &[ContextualAtom], ident: [u8; 4]) -> Option<&ContextualAtom> {
	atoms.iter().find(|atom| atom.info.ident == ident)
}

/// Verifies the stream starts with an `ftyp` atom, returning its major brand
pub(super) fn verify_mp4<R>(
	reader: &mut R,
	walker: &mut ChunkWalker<Mp4BoxCodec>,
) -> Result<String>
where
	R: Read + Seek,
{
	let Ok(Some(atom)) = walker.next(reader) else {
		err!(UnknownFormat);
	};

	if atom.ident != *b"ftyp" {
		err!(UnknownFormat);
	}

	// size + identifier + major brand
	// There *should* be more, but this is all we need from it
	if atom.len < 12 {
		decode_err!(@BAIL Mp4, "\"ftyp\" atom too short");
	}

	let mut major_brand = [0; 4];
	reader.read_exact(&mut major_brand)?;
	walker.skip(reader, &atom)?;

	let major_brand = utf8_decode(major_brand.to_vec()).map_err(|_| {
		TagError::new(ErrorKind::BadAtom("Unable to parse \"ftyp\"'s major brand"))
	})?;

	log::debug!("Verified to be an MP4 file. Major brand: {major_brand}");
	Ok(major_brand)
}

/// Positions the reader at the first child of a `meta` atom
///
/// A full `meta` atom has a version (1) and flags (3) before its children. Some files have a
/// normal atom instead, meaning the next four bytes are the size of the first child.
pub(super) fn meta_is_full<R>(reader: &mut R, meta: &AtomInfo, parse_mode: ParsingMode) -> Result<bool>
where
	R: Read + Seek,
{
	if meta.payload_len() < 4 {
		return Ok(false);
	}

	let version_flags = reader.read_u32::<BigEndian>()?;

	if meta.payload_len() >= 8 {
		let mut possible_ident = [0; 4];
		reader.read_exact(&mut possible_ident)?;

		if let b"hdlr" | b"ilst" | b"mhdr" | b"ctry" | b"lang" = &possible_ident {
			log::warn!("File contains a non-full `meta` atom");

			reader.seek(SeekFrom::Current(-8))?;
			return Ok(false);
		}

		reader.seek(SeekFrom::Current(-4))?;
	}

	if version_flags != 0 {
		if parse_mode == ParsingMode::Strict {
			err!(BadAtom("`meta` atom has a non-zero version/flags"));
		}

		log::warn!("`meta` atom has a non-zero version/flags ({version_flags:#010X})");
	}

	Ok(true)
}

pub(crate) fn read_from<R>(reader: &mut R, parse_options: ParseOptions) -> Result<Mp4File>
where
	R: Read + Seek,
{
	let parse_mode = parse_options.parsing_mode;

	let start = reader.stream_position()?;
	let file_length = reader.stream_len_hack()?;

	let mut walker = ChunkWalker::<Mp4BoxCodec>::new(file_length, parse_mode);
	let ftyp = verify_mp4(reader, &mut walker)?;

	let atoms = ContextualAtom::read_all(reader, &mut walker, parse_mode)?;

	let Some(moov) = find_atom(&atoms, *b"moov") else {
		decode_err!(@BAIL Mp4, "No \"moov\" atom found");
	};

	let mut ilst_tag: Option<Ilst> = None;
	if parse_options.read_tags {
		for ilst_info in moov
			.children_of(*b"udta")
			.flat_map(|udta| udta.children_of(*b"meta"))
			.flat_map(|meta| meta.children_of(*b"ilst"))
			.map(|ilst| ilst.info)
		{
			reader.seek(SeekFrom::Start(ilst_info.payload_start()))?;
			let parsed = parse_ilst(reader, parse_options, &ilst_info)?;

			match &mut ilst_tag {
				Some(existing) => {
					log::warn!("Multiple `ilst` atoms found, combining them");
					for atom in parsed.atoms {
						existing.insert(atom);
					}
				},
				None => ilst_tag = Some(parsed),
			}
		}
	}

	let properties = if parse_options.read_properties {
		let mdat_len = find_atom(&atoms, *b"mdat").map(|mdat| mdat.info.payload_len());
		super::properties::read_properties(reader, moov, mdat_len, file_length - start, parse_mode)?
	} else {
		Mp4Properties::default()
	};

	Ok(Mp4File {
		ftyp,
		ilst_tag,
		properties,
	})
}
