use super::super::find_last_page;
use crate::error::Result;
use crate::macros::decode_err;
use crate::properties::FileProperties;
use crate::util::math::{RoundedDivision, kbps};

use std::io::{Read, Seek, SeekFrom};
use std::time::Duration;

use byteorder::{LittleEndian, ReadBytesExt};
use oggpage::{Packets, PageHeader};

// Opus granule positions always count 48kHz samples
const GRANULE_RATE: u64 = 48000;

/// An Opus file's audio properties
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
#[non_exhaustive]
pub struct OpusProperties {
	pub(crate) duration: Duration,
	pub(crate) overall_bitrate: u32,
	pub(crate) audio_bitrate: u32,
	pub(crate) channels: u8,
	pub(crate) version: u8,
	pub(crate) input_sample_rate: u32,
	pub(crate) pre_skip: u16,
}

impl From<OpusProperties> for FileProperties {
	fn from(input: OpusProperties) -> Self {
		Self {
			duration: input.duration,
			overall_bitrate: Some(input.overall_bitrate),
			audio_bitrate: Some(input.audio_bitrate),
			sample_rate: Some(input.input_sample_rate),
			bit_depth: None,
			channels: Some(input.channels),
		}
	}
}

impl OpusProperties {
	/// Duration of the audio
	pub fn duration(&self) -> Duration {
		self.duration
	}

	/// Overall bitrate (kbps)
	pub fn overall_bitrate(&self) -> u32 {
		self.overall_bitrate
	}

	/// Audio bitrate (kbps)
	pub fn audio_bitrate(&self) -> u32 {
		self.audio_bitrate
	}

	/// Channel count
	pub fn channels(&self) -> u8 {
		self.channels
	}

	/// Opus version
	pub fn version(&self) -> u8 {
		self.version
	}

	/// Input sample rate
	///
	/// This is the rate of the original audio, playback is always at 48kHz.
	pub fn input_sample_rate(&self) -> u32 {
		self.input_sample_rate
	}

	/// The number of samples to discard from the start of the decoded stream
	pub fn pre_skip(&self) -> u16 {
		self.pre_skip
	}
}

pub(in crate::ogg) fn read_properties<R>(
	data: &mut R,
	first_page_header: &PageHeader,
	packets: &Packets,
) -> Result<OpusProperties>
where
	R: Read + Seek,
{
	let mut properties = OpusProperties::default();

	let (Some(ident_packet), Some(comment_packet)) = (packets.get(0), packets.get(1)) else {
		decode_err!(@BAIL Opus, "Missing header packets");
	};

	// Skip the signature
	let ident_reader = &mut &ident_packet[8..];

	properties.version = ident_reader.read_u8()?;
	properties.channels = ident_reader.read_u8()?;
	properties.pre_skip = ident_reader.read_u16::<LittleEndian>()?;
	properties.input_sample_rate = ident_reader.read_u32::<LittleEndian>()?;

	let _output_gain = ident_reader.read_u16::<LittleEndian>()?;
	let channel_mapping_family = ident_reader.read_u8()?;

	// RFC 7845, section 5.1.1
	if (channel_mapping_family == 0 && properties.channels > 2)
		|| (channel_mapping_family == 1 && properties.channels > 8)
	{
		decode_err!(@BAIL Opus, "Invalid channel count for mapping family");
	}

	let last_page = find_last_page(data);
	let file_length = data.seek(SeekFrom::End(0))?;

	let last_page = match last_page {
		Ok(last_page) => last_page,
		Err(e) => {
			log::warn!("Opus: Unable to find the last page ({e}), unable to calculate length");
			return Ok(properties);
		},
	};

	let total_samples = last_page
		.header()
		.abgp
		.saturating_sub(first_page_header.abgp)
		// Pre-skip samples are decoded, but discarded
		.saturating_sub(u64::from(properties.pre_skip));

	if total_samples == 0 {
		log::warn!("Opus: The file contains invalid PCM values, unable to calculate length");
		return Ok(properties);
	}

	let length = (u128::from(total_samples) * 1000).div_round(u128::from(GRANULE_RATE)) as u64;
	properties.duration = Duration::from_millis(length);

	let header_size = (ident_packet.len() + comment_packet.len()) as u64;
	properties.overall_bitrate = kbps(file_length, properties.duration);
	properties.audio_bitrate = kbps(
		file_length.saturating_sub(header_size),
		properties.duration,
	);

	Ok(properties)
}
