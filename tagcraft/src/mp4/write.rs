use super::atom_info::{ATOM_HEADER_LEN, AtomInfo};
use super::ilst::write::with_header;
use super::read::{ContextualAtom, find_atom, verify_mp4};
use crate::chunk::{ChunkWalker, Mp4BoxCodec};
use crate::config::{ParseOptions, WriteOptions};
use crate::error::Result;
use crate::macros::encode_err;
use crate::util::io::{FileLike, overwrite};

use std::io::{Cursor, Seek, SeekFrom};
use std::ops::Range;

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

/// A single replacement within a file's contents
#[derive(Debug)]
struct Splice {
	range: Range<usize>,
	replacement: Vec<u8>,
	// Every atom enclosing `range`, which need their sizes updated
	parents: Vec<AtomInfo>,
}

impl Splice {
	fn insert(at: u64, replacement: Vec<u8>, parents: Vec<AtomInfo>) -> Self {
		Self {
			range: at as usize..at as usize,
			replacement,
			parents,
		}
	}

	fn delta(&self) -> i64 {
		self.replacement.len() as i64 - self.range.len() as i64
	}
}

/// Replace the `ilst` atom of an MP4 file
///
/// `ilst` is a complete atom, or empty to remove the existing one. Any missing `udta` and
/// `meta` atoms are created.
pub(crate) fn write_ilst<F>(file: &mut F, ilst: &[u8], write_options: WriteOptions) -> Result<()>
where
	F: FileLike,
{
	let parse_mode = ParseOptions::DEFAULT_PARSING_MODE;

	file.rewind()?;
	let mut contents = Vec::new();
	file.read_to_end(&mut contents)?;

	let mut reader = Cursor::new(contents.as_slice());
	let mut walker = ChunkWalker::<Mp4BoxCodec>::new(contents.len() as u64, parse_mode);

	verify_mp4(&mut reader, &mut walker)?;
	let atoms = ContextualAtom::read_all(&mut reader, &mut walker, parse_mode)?;

	let Some(moov) = find_atom(&atoms, *b"moov") else {
		encode_err!(@BAIL Mp4, "Could not find \"moov\" atom in target file");
	};

	log::trace!(
		"Found `moov` atom, offset: {}, size: {}",
		moov.info.start,
		moov.info.len
	);

	let Some(splice) = plan(moov, ilst, write_options)? else {
		log::debug!("No `ilst` atom to remove, nothing to do");
		return Ok(());
	};

	apply(&mut contents, &atoms, splice)?;
	overwrite(file, &contents)
}

fn plan(moov: &ContextualAtom, ilst: &[u8], write_options: WriteOptions) -> Result<Option<Splice>> {
	let remove_tag = ilst.is_empty();

	// ilst is nested in udta.meta, so we need to check what atoms actually exist
	let Some(udta) = moov.child(*b"udta") else {
		if remove_tag {
			return Ok(None);
		}

		log::trace!("No `udta` atom found, creating one");
		let udta = with_header(*b"udta", &create_meta(ilst)?)?;
		return Ok(Some(Splice::insert(moov.info.end(), udta, vec![moov.info])));
	};

	let Some(meta) = udta.child(*b"meta") else {
		if remove_tag {
			return Ok(None);
		}

		log::trace!("No `meta` atom found, creating one");
		return Ok(Some(Splice::insert(
			udta.info.end(),
			create_meta(ilst)?,
			vec![moov.info, udta.info],
		)));
	};

	let parents = vec![moov.info, udta.info, meta.info];

	let Some(ilst_idx) = meta
		.children
		.iter()
		.position(|atom| atom.info.ident == *b"ilst")
	else {
		if remove_tag {
			return Ok(None);
		}

		log::trace!("No `ilst` atom found, appending one to `meta`");
		return Ok(Some(Splice::insert(meta.info.end(), ilst.to_vec(), parents)));
	};

	let existing = meta.children[ilst_idx].info;
	let start = existing.start as usize;

	if remove_tag {
		return Ok(Some(Splice {
			range: start..existing.end() as usize,
			replacement: Vec::new(),
			parents,
		}));
	}

	// Any `free` atoms directly after the `ilst` atom can be reused
	let mut end = existing.end();
	for sibling in &meta.children[ilst_idx + 1..] {
		if sibling.info.ident != *b"free" {
			break;
		}

		end = sibling.info.end();
	}

	let available = end - existing.start;
	let ilst_len = ilst.len() as u64;
	let mut replacement = ilst.to_vec();

	// What's left over has to fit a `free` atom
	if available == ilst_len || available.saturating_sub(ilst_len) >= ATOM_HEADER_LEN {
		log::trace!("Found enough padding to fit the tag, file size will not change");

		if available > ilst_len {
			replacement.extend(free_atom(available - ilst_len)?);
		}
	} else if let Some(padding) = write_options.preferred_padding
		&& u64::from(padding) >= ATOM_HEADER_LEN
	{
		log::trace!("Tag size changed, padding `ilst` with {padding} bytes");
		replacement.extend(free_atom(u64::from(padding))?);
	}

	Ok(Some(Splice {
		range: start..end as usize,
		replacement,
		parents,
	}))
}

fn apply(contents: &mut Vec<u8>, atoms: &[ContextualAtom], splice: Splice) -> Result<()> {
	let delta = splice.delta();

	if delta != 0 {
		for parent in &splice.parents {
			let new_len = (parent.len as i64 + delta) as u64;
			log::trace!(
				"Updating `{}` atom size, old size: {}, new size: {}",
				String::from_utf8_lossy(&parent.ident),
				parent.len,
				new_len
			);

			write_atom_size(contents, parent, new_len)?;
		}

		update_offsets(contents, atoms, delta, splice.range.start as u64)?;
	}

	contents.splice(splice.range, splice.replacement);
	Ok(())
}

fn write_atom_size(contents: &mut [u8], atom: &AtomInfo, new_len: u64) -> Result<()> {
	let mut writer = Cursor::new(contents);
	writer.seek(SeekFrom::Start(atom.start))?;

	if atom.extended {
		writer.seek(SeekFrom::Current(ATOM_HEADER_LEN as i64))?;
		writer.write_u64::<BigEndian>(new_len)?;
		return Ok(());
	}

	let Ok(new_len) = u32::try_from(new_len) else {
		encode_err!(@BAIL Mp4, "Atom size no longer fits in 32 bits");
	};

	writer.write_u32::<BigEndian>(new_len)?;
	Ok(())
}

/// Shift every chunk offset at or past `offset` by `delta`
///
/// This covers the `stco` and `co64` tables, as well as the base data offsets of fragments (`tfhd`).
fn update_offsets(contents: &mut [u8], atoms: &[ContextualAtom], delta: i64, offset: u64) -> Result<()> {
	log::debug!("Checking for offset atoms to update");

	let mut writer = Cursor::new(contents);

	for top_level in atoms {
		// 32-bit offsets
		for stco in top_level.find_all(*b"stco") {
			log::trace!("Found `stco` atom");

			// Skip version (1) + flags (3)
			writer.seek(SeekFrom::Start(stco.payload_start() + 4))?;

			let count = writer.read_u32::<BigEndian>()?;
			for _ in 0..count {
				let read_offset = writer.read_u32::<BigEndian>()?;
				if u64::from(read_offset) < offset {
					continue;
				}

				let Ok(new_offset) = u32::try_from(i64::from(read_offset) + delta) else {
					encode_err!(@BAIL Mp4, "Chunk offset no longer fits in an `stco` atom");
				};

				writer.seek(SeekFrom::Current(-4))?;
				writer.write_u32::<BigEndian>(new_offset)?;

				log::trace!("Updated offset from {read_offset} to {new_offset}");
			}
		}

		// 64-bit offsets
		for co64 in top_level.find_all(*b"co64") {
			log::trace!("Found `co64` atom");

			writer.seek(SeekFrom::Start(co64.payload_start() + 4))?;

			let count = writer.read_u32::<BigEndian>()?;
			for _ in 0..count {
				let read_offset = writer.read_u64::<BigEndian>()?;
				if read_offset < offset {
					continue;
				}

				let new_offset = (read_offset as i64 + delta) as u64;
				writer.seek(SeekFrom::Current(-8))?;
				writer.write_u64::<BigEndian>(new_offset)?;

				log::trace!("Updated offset from {read_offset} to {new_offset}");
			}
		}

		for tfhd in top_level.find_all(*b"tfhd") {
			log::trace!("Found `tfhd` atom");

			// Skip version (1)
			writer.seek(SeekFrom::Start(tfhd.payload_start() + 1))?;

			let flags = writer.read_u24::<BigEndian>()?;
			let base_data_offset = (flags & 0b1) != 0;
			if !base_data_offset {
				continue;
			}

			// Skip track ID
			writer.seek(SeekFrom::Current(4))?;

			let read_offset = writer.read_u64::<BigEndian>()?;
			if read_offset < offset {
				continue;
			}

			let new_offset = (read_offset as i64 + delta) as u64;
			writer.seek(SeekFrom::Current(-8))?;
			writer.write_u64::<BigEndian>(new_offset)?;

			log::trace!("Updated base data offset from {read_offset} to {new_offset}");
		}
	}

	Ok(())
}

// A full `meta` atom, with an iTunes metadata handler
fn create_meta(ilst: &[u8]) -> Result<Vec<u8>> {
	const HDLR_SIZE: usize = ATOM_HEADER_LEN as usize + 25;

	let mut hdlr_content = Vec::with_capacity(HDLR_SIZE - ATOM_HEADER_LEN as usize);
	// Version (1) + flags (3) + pre-defined (4)
	hdlr_content.extend([0; 8]);
	hdlr_content.extend(b"mdirappl");
	hdlr_content.extend([0; 9]);

	let hdlr = with_header(*b"hdlr", &hdlr_content)?;

	let mut meta_content = Vec::with_capacity(4 + HDLR_SIZE + ilst.len());
	meta_content.extend([0; 4]);
	meta_content.extend(hdlr);
	meta_content.extend(ilst);

	with_header(*b"meta", &meta_content)
}

fn free_atom(size: u64) -> Result<Vec<u8>> {
	let Ok(size) = usize::try_from(size) else {
		encode_err!(@BAIL Mp4, "Padding is too large");
	};

	with_header(*b"free", &vec![0; size - ATOM_HEADER_LEN as usize])
}
