use super::super::find_last_page;
use crate::error::Result;
use crate::macros::decode_err;
use crate::properties::FileProperties;
use crate::util::math::{RoundedDivision, kbps};

use std::io::{Read, Seek, SeekFrom};
use std::time::Duration;

use byteorder::{LittleEndian, ReadBytesExt};
use oggpage::{Packets, PageHeader};

/// An Ogg Vorbis file's audio properties
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[non_exhaustive]
pub struct VorbisProperties {
	pub(crate) duration: Duration,
	pub(crate) overall_bitrate: u32,
	pub(crate) audio_bitrate: u32,
	pub(crate) sample_rate: u32,
	pub(crate) channels: u8,
	pub(crate) version: u32,
	pub(crate) bitrate_maximum: i32,
	pub(crate) bitrate_nominal: i32,
	pub(crate) bitrate_minimum: i32,
}

impl From<VorbisProperties> for FileProperties {
	fn from(input: VorbisProperties) -> Self {
		Self {
			duration: input.duration,
			overall_bitrate: Some(input.overall_bitrate),
			audio_bitrate: Some(input.audio_bitrate),
			sample_rate: Some(input.sample_rate),
			bit_depth: None,
			channels: Some(input.channels),
		}
	}
}

impl VorbisProperties {
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

	/// Sample rate (Hz)
	pub fn sample_rate(&self) -> u32 {
		self.sample_rate
	}

	/// Channel count
	pub fn channels(&self) -> u8 {
		self.channels
	}

	/// Vorbis version
	pub fn version(&self) -> u32 {
		self.version
	}

	/// Maximum bitrate (bps)
	pub fn bitrate_max(&self) -> i32 {
		self.bitrate_maximum
	}

	/// Nominal bitrate (bps)
	pub fn bitrate_nominal(&self) -> i32 {
		self.bitrate_nominal
	}

	/// Minimum bitrate (bps)
	pub fn bitrate_min(&self) -> i32 {
		self.bitrate_minimum
	}
}

pub(in crate::ogg) fn read_properties<R>(
	data: &mut R,
	first_page_header: &PageHeader,
	packets: &Packets,
) -> Result<VorbisProperties>
where
	R: Read + Seek,
{
	let mut properties = VorbisProperties::default();

	let Some(ident_packet) = packets.get(0) else {
		decode_err!(@BAIL Vorbis, "Missing identification packet");
	};

	// Skip the signature
	let ident_reader = &mut &ident_packet[7..];

	properties.version = ident_reader.read_u32::<LittleEndian>()?;
	properties.channels = ident_reader.read_u8()?;
	properties.sample_rate = ident_reader.read_u32::<LittleEndian>()?;

	properties.bitrate_maximum = ident_reader.read_i32::<LittleEndian>()?;
	properties.bitrate_nominal = ident_reader.read_i32::<LittleEndian>()?;
	properties.bitrate_minimum = ident_reader.read_i32::<LittleEndian>()?;

	let last_page = find_last_page(data);
	let file_length = data.seek(SeekFrom::End(0))?;

	match last_page {
		Ok(last_page) if properties.sample_rate > 0 => {
			let total_samples = last_page
				.header()
				.abgp
				.saturating_sub(first_page_header.abgp);

			if total_samples > 0 {
				let length = (u128::from(total_samples) * 1000)
					.div_round(u128::from(properties.sample_rate)) as u64;
				properties.duration = Duration::from_millis(length);
			} else {
				log::warn!("Vorbis: The file contains invalid PCM values, unable to calculate length");
			}
		},
		Ok(_) => log::warn!("Vorbis: Sample rate = 0, unable to calculate length"),
		Err(e) => log::warn!("Vorbis: Unable to find the last page ({e}), unable to calculate length"),
	}

	properties.overall_bitrate = kbps(file_length, properties.duration);

	if properties.bitrate_nominal > 0 {
		properties.audio_bitrate = (properties.bitrate_nominal as u32).div_round(1000);
	} else {
		let header_size: usize = packets.iter().map(<[u8]>::len).sum();
		properties.audio_bitrate = kbps(
			file_length.saturating_sub(header_size as u64),
			properties.duration,
		);
	}

	Ok(properties)
}
