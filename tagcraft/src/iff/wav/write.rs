use super::read::verify_wav;
use super::tag::RiffInfoList;
use super::tag::write::create_riff_info;
use crate::chunk::{ChunkHeader, ChunkWalker, HeaderCodec, RiffLeCodec};
use crate::config::{ParsingMode, WriteOptions};
use crate::error::Result;
use crate::id3::v2::Id3v2Tag;
use crate::id3::v2::write::create_tag;
use crate::macros::err;
use crate::util::io::{FileLike, overwrite};

use std::io::Cursor;

const RIFF_HEADER_SIZE: usize = 12;

/// Append a chunk, followed by a pad byte if its content has an odd length
pub(in crate::iff::wav) fn push_chunk(out: &mut Vec<u8>, ident: [u8; 4], content: &[u8]) -> Result<()> {
	let Ok(size) = u32::try_from(content.len()) else {
		err!(TooMuchData);
	};

	let header = ChunkHeader {
		ident,
		len: RiffLeCodec::HEADER_SIZE + u64::from(size),
		start: 0,
		header_len: RiffLeCodec::HEADER_SIZE,
		extended: false,
	};

	out.extend(RiffLeCodec::encode(&header));
	out.extend(content);
	if RiffLeCodec::padding(u64::from(size)) > 0 {
		out.push(0);
	}

	Ok(())
}

enum TagChunk {
	Info,
	Id3,
}

fn tag_chunk(header: &ChunkHeader<[u8; 4]>, contents: &[u8]) -> Option<TagChunk> {
	match &header.ident {
		b"ID3 " | b"id3 " => Some(TagChunk::Id3),
		b"LIST" => {
			let start = header.payload_start() as usize;
			(contents.get(start..start + 4) == Some(&b"INFO"[..])).then_some(TagChunk::Info)
		},
		_ => None,
	}
}

/// Rewrite the tag chunks of a WAV file
///
/// A `None` tag leaves its chunk untouched, an empty tag removes it. With
/// [`WriteOptions::remove_others`], a `None` tag is removed as well. New chunks replace the first
/// existing chunk of the same kind, or are appended to the end of the RIFF chunk. Duplicate tag
/// chunks are dropped.
pub(crate) fn write_to<F>(
	file: &mut F,
	riff_info: Option<&RiffInfoList>,
	id3v2: Option<&Id3v2Tag>,
	write_options: WriteOptions,
) -> Result<()>
where
	F: FileLike + ?Sized,
{
	let empty_info = RiffInfoList::default();
	let empty_id3v2 = Id3v2Tag::default();
	let (riff_info, id3v2) = if write_options.remove_others {
		(
			Some(riff_info.unwrap_or(&empty_info)),
			Some(id3v2.unwrap_or(&empty_id3v2)),
		)
	} else {
		(riff_info, id3v2)
	};

	file.rewind()?;

	let mut contents = Vec::new();
	file.read_to_end(&mut contents)?;

	let mut reader = Cursor::new(&contents[..]);
	let riff_size = verify_wav(&mut reader)?;

	let riff_end = (u64::from(riff_size) + 8).min(contents.len() as u64);

	let mut info_chunk = match riff_info {
		Some(tag) => Some(create_riff_info(tag)?),
		None => None,
	};

	let mut id3_chunk = match id3v2 {
		Some(tag) => {
			let id3v2 = create_tag(tag, write_options)?;
			let ident = if write_options.uppercase_id3v2_chunk { *b"ID3 " } else { *b"id3 " };

			let mut chunk = Vec::new();
			if !id3v2.is_empty() {
				push_chunk(&mut chunk, ident, &id3v2)?;
			}

			Some(chunk)
		},
		None => None,
	};

	let mut out = Vec::with_capacity(contents.len());
	out.extend(&contents[..RIFF_HEADER_SIZE]);

	// Any corruption at this point has already been tolerated by the reader, so there is no point in
	// being strict. An invalid chunk length still aborts the write.
	let mut walker = ChunkWalker::<RiffLeCodec>::new(riff_end, ParsingMode::BestAttempt);
	let mut copied_to = RIFF_HEADER_SIZE as u64;
	while let Some(header) = walker.next(&mut reader)? {
		let replacement = match tag_chunk(&header, &contents) {
			Some(TagChunk::Info) if riff_info.is_some() => Some(&mut info_chunk),
			Some(TagChunk::Id3) if id3v2.is_some() => Some(&mut id3_chunk),
			_ => None,
		};

		match replacement {
			// The first chunk of its kind is replaced, and the rest are dropped
			Some(chunk) => {
				if let Some(chunk) = chunk.take() {
					out.extend(chunk);
				} else {
					log::debug!("WAV: Dropping duplicate tag chunk @ {}", header.start);
				}
			},
			None => {
				let start = header.start as usize;
				let end = header.end() as usize;

				out.extend(&contents[start..end]);
				if RiffLeCodec::padding(header.payload_len()) > 0 {
					out.push(0);
				}
			},
		}

		walker.skip(&mut reader, &header)?;
		copied_to = reader.position();
	}

	// New tags go directly after the last valid chunk
	for chunk in [info_chunk, id3_chunk].into_iter().flatten() {
		out.extend(chunk);
	}

	// Anything the walk couldn't make sense of is kept as-is
	if copied_to < riff_end {
		log::warn!("WAV: Keeping {} unrecognized bytes at the end of the RIFF chunk", riff_end - copied_to);
		out.extend(&contents[copied_to as usize..riff_end as usize]);
	}

	let Ok(new_riff_size) = u32::try_from(out.len() - 8) else {
		err!(TooMuchData);
	};
	out[4..8].copy_from_slice(&new_riff_size.to_le_bytes());

	// Data trailing the RIFF chunk
	out.extend(&contents[riff_end as usize..]);

	overwrite(file, &out)
}

#[cfg(test)]
mod tests {
	use super::write_to;
	use crate::config::{ParseOptions, WriteOptions};
	use crate::file::AudioFile;
	use crate::id3::v2::Id3v2Tag;
	use crate::iff::wav::{RiffInfoList, WavFile};
	use crate::tag::{Accessor, TagExt};

	use std::io::Cursor;

	fn chunk(ident: &[u8; 4], content: &[u8]) -> Vec<u8> {
		let mut chunk = ident.to_vec();
		chunk.extend((content.len() as u32).to_le_bytes());
		chunk.extend(content);
		if content.len() % 2 != 0 {
			chunk.push(0);
		}
		chunk
	}

	fn wav(chunks: &[Vec<u8>]) -> Vec<u8> {
		let body = chunks.concat();

		let mut wav = b"RIFF".to_vec();
		wav.extend((body.len() as u32 + 4).to_le_bytes());
		wav.extend(b"WAVE");
		wav.extend(body);
		wav
	}

	fn fmt() -> Vec<u8> {
		// 8kHz mono, 8 bits
		chunk(b"fmt ", b"\x01\x00\x01\x00\x40\x1F\x00\x00\x40\x1F\x00\x00\x01\x00\x08\x00")
	}

	fn riff_size(bytes: &[u8]) -> usize {
		u32::from_le_bytes(bytes[4..8].try_into().unwrap()) as usize
	}

	#[test_log::test]
	fn adds_tags() {
		let original = wav(&[fmt(), chunk(b"data", &[0x80; 8000])]);

		let mut info = RiffInfoList::new();
		info.set_title(String::from("Foo title"));
		let mut id3v2 = Id3v2Tag::new();
		id3v2.set_artist(String::from("Bar artist"));

		let mut file = Cursor::new(original.clone());
		write_to(&mut file, Some(&info), Some(&id3v2), WriteOptions::new()).unwrap();

		let bytes = file.into_inner();
		assert_eq!(riff_size(&bytes), bytes.len() - 8);
		assert_eq!(&bytes[..original.len()][12..], &original[12..]);
		assert_eq!(&bytes[original.len()..original.len() + 4], b"LIST");

		let read = WavFile::read_from(&mut Cursor::new(bytes), ParseOptions::new()).unwrap();
		assert_eq!(read.riff_info().unwrap(), &info);
		assert_eq!(read.id3v2().unwrap().artist().as_deref(), Some("Bar artist"));
		assert_eq!(read.properties().duration().as_secs(), 1);
	}

	#[test_log::test]
	fn replaces_in_place() {
		let original = wav(&[
			fmt(),
			chunk(b"LIST", b"INFOINAM\x04\x00\x00\x00Foo\x00"),
			chunk(b"data", &[0x80; 100]),
			chunk(b"LIST", b"INFOIART\x04\x00\x00\x00Bar\x00"),
		]);

		let mut info = RiffInfoList::new();
		info.set_album(String::from("Baz album"));

		let mut file = Cursor::new(original);
		write_to(&mut file, Some(&info), None, WriteOptions::new()).unwrap();

		let bytes = file.into_inner();
		assert_eq!(riff_size(&bytes), bytes.len() - 8);
		// The first list is replaced, the duplicate dropped
		assert_eq!(&bytes[36..40], b"LIST");
		assert_eq!(&bytes[bytes.len() - 108..bytes.len() - 100], b"data\x64\x00\x00\x00");

		let read = WavFile::read_from(&mut Cursor::new(bytes), ParseOptions::new()).unwrap();
		assert_eq!(read.riff_info().unwrap(), &info);
	}

	#[test_log::test]
	fn removes_tags() {
		let mut id3v2 = Id3v2Tag::new();
		id3v2.set_title(String::from("Foo title"));

		let original = wav(&[fmt(), chunk(b"data", &[0x80; 100])]);
		let mut file = Cursor::new(original.clone());
		write_to(&mut file, None, Some(&id3v2), WriteOptions::new()).unwrap();
		assert_ne!(file.get_ref(), &original);

		// An empty tag removes the chunk, `None` leaves it alone
		write_to(&mut file, Some(&RiffInfoList::new()), None, WriteOptions::new()).unwrap();
		assert_ne!(file.get_ref(), &original);

		write_to(&mut file, None, Some(&Id3v2Tag::new()), WriteOptions::new()).unwrap();
		assert_eq!(file.get_ref(), &original);
	}

	#[test_log::test]
	fn remove_others() {
		let mut id3v2 = Id3v2Tag::new();
		id3v2.set_title(String::from("Foo title"));
		let mut info = RiffInfoList::new();
		info.set_title(String::from("Bar title"));

		let original = wav(&[fmt(), chunk(b"data", &[0x80; 100])]);
		let mut file = Cursor::new(original);
		write_to(&mut file, Some(&info), Some(&id3v2), WriteOptions::new()).unwrap();

		write_to(&mut file, Some(&info), None, WriteOptions::new().remove_others(true)).unwrap();

		file.set_position(0);
		let read = WavFile::read_from(&mut file, ParseOptions::new()).unwrap();
		assert!(read.id3v2().is_none());
		assert_eq!(read.riff_info().unwrap().title().as_deref(), Some("Bar title"));
	}

	#[test_log::test]
	fn id3_chunk_case() {
		let mut id3v2 = Id3v2Tag::new();
		id3v2.set_title(String::from("Foo title"));

		let original = wav(&[fmt(), chunk(b"data", &[0x80; 100])]);

		let mut file = Cursor::new(original.clone());
		id3v2.save_to(&mut file, WriteOptions::new()).unwrap();
		assert_eq!(&file.get_ref()[original.len()..original.len() + 4], b"ID3 ");

		let mut file = Cursor::new(original.clone());
		id3v2
			.save_to(&mut file, WriteOptions::new().uppercase_id3v2_chunk(false))
			.unwrap();
		assert_eq!(&file.get_ref()[original.len()..original.len() + 4], b"id3 ");
	}

	#[test_log::test]
	fn pads_unpadded_chunks() {
		// An odd-sized chunk missing its pad byte
		let mut body = fmt();
		body.extend(b"junk\x03\x00\x00\x00abc");
		// Sized so that reading one byte too far gives an invalid identifier ("ata\0")
		body.extend(chunk(b"data", &[0x80; 256]));

		let mut original = b"RIFF".to_vec();
		original.extend((body.len() as u32 + 4).to_le_bytes());
		original.extend(b"WAVE");
		original.extend(body);

		let mut info = RiffInfoList::new();
		info.set_title(String::from("Foo"));

		let mut file = Cursor::new(original);
		write_to(&mut file, Some(&info), None, WriteOptions::new()).unwrap();

		let bytes = file.into_inner();
		assert_eq!(&bytes[36..48], b"junk\x03\x00\x00\x00abc\x00");
		assert_eq!(&bytes[48..52], b"data");
		assert_eq!(riff_size(&bytes), bytes.len() - 8);

		let read = WavFile::read_from(&mut Cursor::new(bytes), ParseOptions::new()).unwrap();
		assert_eq!(read.riff_info().unwrap().title().as_deref(), Some("Foo"));
	}

	#[test_log::test]
	fn trailing_data_is_kept() {
		let mut original = wav(&[fmt(), chunk(b"data", &[0x80; 100])]);
		original.extend(b"TAG trailing");

		let mut info = RiffInfoList::new();
		info.set_title(String::from("Foo"));

		let mut file = Cursor::new(original);
		write_to(&mut file, Some(&info), None, WriteOptions::new()).unwrap();

		let bytes = file.into_inner();
		assert!(bytes.ends_with(b"TAG trailing"));
		assert_eq!(riff_size(&bytes), bytes.len() - 8 - 12);
	}

	#[test_log::test]
	fn not_a_wav() {
		let mut file = Cursor::new(b"RIFF\x04\x00\x00\x00AVI ".to_vec());
		assert!(write_to(&mut file, Some(&RiffInfoList::new()), None, WriteOptions::new()).is_err());
	}
}
