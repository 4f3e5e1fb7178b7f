use super::guid::Guid;
use crate::error::Result;
use crate::properties::FileProperties;
use crate::util::math::kbps;

use std::io::Read;
use std::time::Duration;

use byteorder::{LittleEndian, ReadBytesExt as _};

// File Properties Object fields, relative to the end of the object header
pub(super) const FILE_SIZE_OFFSET: usize = 16;

/// An ASF file's audio properties
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub struct AsfProperties {
	pub(crate) duration: Duration,
	pub(crate) overall_bitrate: u32,
	pub(crate) audio_bitrate: u32,
	pub(crate) sample_rate: u32,
	pub(crate) bits_per_sample: u16,
	pub(crate) channels: u16,
	pub(crate) codec_id: u16,
}

impl From<AsfProperties> for FileProperties {
	fn from(input: AsfProperties) -> Self {
		Self {
			duration: input.duration,
			overall_bitrate: Some(input.overall_bitrate),
			audio_bitrate: Some(input.audio_bitrate),
			sample_rate: Some(input.sample_rate),
			bit_depth: (input.bits_per_sample > 0).then_some(input.bits_per_sample as u8),
			channels: Some(input.channels as u8),
		}
	}
}

impl AsfProperties {
	/// Duration of the audio, excluding the preroll
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

	/// Bits per sample
	pub fn bits_per_sample(&self) -> u16 {
		self.bits_per_sample
	}

	/// Channel count
	pub fn channels(&self) -> u16 {
		self.channels
	}

	/// The `WAVEFORMATEX` format tag, ex. `0x0161` for WMA
	pub fn codec_id(&self) -> u16 {
		self.codec_id
	}
}

pub(super) fn read_file_properties(
	mut content: &[u8],
	properties: &mut AsfProperties,
	file_len: u64,
) -> Result<()> {
	let reader = &mut content;

	// File ID, file size, creation date, data packets count
	let mut skip = [0; 40];
	reader.read_exact(&mut skip)?;

	// 100-nanosecond units
	let play_duration = reader.read_u64::<LittleEndian>()?;
	let _send_duration = reader.read_u64::<LittleEndian>()?;
	// Milliseconds
	let preroll = reader.read_u64::<LittleEndian>()?;

	let duration = Duration::from_nanos(play_duration.saturating_mul(100))
		.saturating_sub(Duration::from_millis(preroll));

	properties.duration = duration;
	properties.overall_bitrate = kbps(file_len, duration);

	Ok(())
}

pub(super) fn read_stream_properties(mut content: &[u8], properties: &mut AsfProperties) -> Result<()> {
	let reader = &mut content;

	let mut stream_type = [0; 16];
	reader.read_exact(&mut stream_type)?;
	if Guid::from_bytes(stream_type) != Guid::AUDIO_MEDIA {
		log::debug!("Skipping non-audio stream");
		return Ok(());
	}

	// Error correction type, time offset
	let mut skip = [0; 24];
	reader.read_exact(&mut skip)?;

	let type_specific_len = reader.read_u32::<LittleEndian>()?;
	let _error_correction_len = reader.read_u32::<LittleEndian>()?;
	let _flags = reader.read_u16::<LittleEndian>()?;
	let _reserved = reader.read_u32::<LittleEndian>()?;

	// WAVEFORMATEX
	if type_specific_len < 16 {
		log::warn!("Audio stream properties are too short, ignoring");
		return Ok(());
	}

	properties.codec_id = reader.read_u16::<LittleEndian>()?;
	properties.channels = reader.read_u16::<LittleEndian>()?;
	properties.sample_rate = reader.read_u32::<LittleEndian>()?;
	let bytes_per_second = reader.read_u32::<LittleEndian>()?;
	let _block_align = reader.read_u16::<LittleEndian>()?;
	properties.bits_per_sample = reader.read_u16::<LittleEndian>()?;

	properties.audio_bitrate = ((u64::from(bytes_per_second) * 8 + 500) / 1000) as u32;

	Ok(())
}
