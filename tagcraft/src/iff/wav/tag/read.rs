use super::RiffInfoList;
use crate::chunk::{ChunkWalker, RiffLeCodec};
use crate::config::{ParseOptions, ParsingMode};
use crate::error::Result;
use crate::macros::{decode_err, try_vec};
use crate::tag::TagType;
use crate::util::text::{latin1_decode, trim_end_nulls};

use std::io::{Read, Seek};

/// Read the items of a `LIST` chunk of type `INFO`
///
/// The reader is expected to be positioned directly after the list type, and `end` is the end
/// of the `LIST` chunk.
pub(in crate::iff::wav) fn parse_riff_info<R>(
	data: &mut R,
	end: u64,
	tag: &mut RiffInfoList,
	parse_options: ParseOptions,
) -> Result<()>
where
	R: Read + Seek,
{
	let parse_mode = parse_options.parsing_mode;

	let mut walker = ChunkWalker::<RiffLeCodec>::new(end, parse_mode);
	while let Some(header) = walker.next(data)? {
		// The codec only accepts printable ASCII, which is always valid UTF-8
		let key = String::from_utf8_lossy(&header.ident).into_owned();

		if !TagType::RiffInfo.accepts_custom_key(&key) {
			if parse_mode == ParsingMode::Strict {
				decode_err!(@BAIL Wav, "RIFF INFO item key contains invalid characters");
			}

			log::warn!("RIFF INFO: Skipping item with an invalid key \"{key}\"");
			walker.skip(data, &header)?;
			continue;
		}

		let mut content = try_vec![0; header.payload_len() as usize, parse_options.allocation_limit];
		data.read_exact(&mut content)?;

		let mut value = match String::from_utf8(content) {
			Ok(value) => value,
			Err(e) => {
				if parse_mode == ParsingMode::Strict {
					decode_err!(@BAIL Wav, "Failed to read RIFF INFO item value");
				}

				// RIFF INFO has no standard text encoding, writers tend to use the system encoding
				log::warn!("RIFF INFO: \"{key}\" is not valid UTF-8, decoding as Latin-1");
				latin1_decode(e.as_bytes())
			},
		};

		trim_end_nulls(&mut value);

		log::trace!("RIFF INFO: Read item \"{key}\"");
		tag.insert(key, value);

		walker.skip(data, &header)?;
	}

	Ok(())
}
