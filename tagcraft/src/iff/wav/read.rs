use super::WavFile;
use super::properties::WavProperties;
use super::tag::RiffInfoList;
use crate::chunk::{ChunkWalker, RiffLeCodec};
use crate::config::{ParseOptions, ParsingMode};
use crate::error::Result;
use crate::id3::v2::{Id3v2Tag, parse_id3v2};
use crate::macros::{decode_err, try_vec};
use crate::util::io::SeekStreamLen;

use std::io::{Read, Seek};

use byteorder::{LittleEndian, ReadBytesExt};

// Verifies that the stream is a WAV file and returns the size of the RIFF chunk
pub(crate) fn verify_wav<T>(data: &mut T) -> Result<u32>
where
	T: Read + Seek,
{
	let mut id = [0; 12];
	data.read_exact(&mut id)?;

	if &id[..4] != b"RIFF" {
		decode_err!(@BAIL Wav, "WAV file doesn't contain a RIFF chunk");
	}

	if &id[8..] != b"WAVE" {
		decode_err!(@BAIL Wav, "Found RIFF file, format is not WAVE");
	}

	log::debug!("File verified to be WAV");
	Ok(u32::from_le_bytes([id[4], id[5], id[6], id[7]]))
}

pub(super) fn read_from<R>(data: &mut R, parse_options: ParseOptions) -> Result<WavFile>
where
	R: Read + Seek,
{
	let riff_size = verify_wav(data)?;
	let file_len = data.stream_len_hack()?;

	let mut riff_end = u64::from(riff_size) + 8;
	if riff_end > file_len {
		if parse_options.parsing_mode == ParsingMode::Strict {
			decode_err!(@BAIL Wav, "RIFF chunk is larger than the file");
		}

		log::warn!("WAV: RIFF chunk is larger than the file, ignoring the excess");
		riff_end = file_len;
	}

	let mut stream_len = None;
	let mut total_samples = None;
	let mut fmt = Vec::new();

	let mut riff_info = RiffInfoList::default();
	let mut id3v2_tag: Option<Id3v2Tag> = None;

	let mut walker = ChunkWalker::<RiffLeCodec>::new(riff_end, parse_options.parsing_mode);
	while let Some(header) = walker.next(data)? {
		match &header.ident {
			b"fmt " if parse_options.read_properties && fmt.is_empty() => {
				fmt = try_vec![0; header.payload_len() as usize, parse_options.allocation_limit];
				data.read_exact(&mut fmt)?;
			},
			b"fact" if parse_options.read_properties && total_samples.is_none() => {
				if header.payload_len() >= 4 {
					total_samples = Some(data.read_u32::<LittleEndian>()?);
				}
			},
			b"data" if stream_len.is_none() => stream_len = Some(header.payload_len()),
			b"LIST" if parse_options.read_tags => {
				if header.payload_len() < 4 {
					decode_err!(@BAIL Wav, "Invalid LIST chunk size");
				}

				let mut list_type = [0; 4];
				data.read_exact(&mut list_type)?;

				if &list_type == b"INFO" {
					super::tag::read::parse_riff_info(data, header.end(), &mut riff_info, parse_options)?;
				}
			},
			b"ID3 " | b"id3 " if parse_options.read_tags => {
				let tag = match parse_id3v2(&mut data.by_ref().take(header.payload_len()), parse_options) {
					Ok(tag) => tag,
					Err(e) => {
						if parse_options.parsing_mode == ParsingMode::Strict {
							return Err(e);
						}

						log::warn!("WAV: Ignoring unreadable ID3v2 chunk: {e}");
						walker.skip(data, &header)?;
						continue;
					},
				};

				match id3v2_tag.as_mut() {
					// Duplicate tags have their frames appended to the previous
					Some(existing_tag) => {
						log::warn!("Duplicate ID3v2 tag found, appending frames to previous tag");

						for frame in tag.frames {
							existing_tag.insert(frame);
						}
					},
					None => id3v2_tag = Some(tag),
				}
			},
			_ => {},
		}

		walker.skip(data, &header)?;
	}

	let properties = if parse_options.read_properties {
		super::properties::read_properties(&fmt, total_samples, stream_len, file_len)?
	} else {
		WavProperties::default()
	};

	Ok(WavFile {
		riff_info_tag: (!riff_info.items.is_empty()).then_some(riff_info),
		id3v2_tag,
		properties,
	})
}
