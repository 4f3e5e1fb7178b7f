use crate::error::Result;
use crate::macros::decode_err;
use crate::properties::FileProperties;
use crate::util::math::{RoundedDivision, kbps};

use std::time::Duration;

use byteorder::{LittleEndian, ReadBytesExt};

const PCM: u16 = 0x0001;
const IEEE_FLOAT: u16 = 0x0003;
const EXTENSIBLE: u16 = 0xFFFE;

/// A WAV file's format
#[allow(missing_docs, non_camel_case_types)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WavFormat {
	PCM,
	IEEE_FLOAT,
	Other(u16),
}

impl Default for WavFormat {
	fn default() -> Self {
		Self::Other(0)
	}
}

impl From<u16> for WavFormat {
	fn from(format_tag: u16) -> Self {
		match format_tag {
			PCM => Self::PCM,
			IEEE_FLOAT => Self::IEEE_FLOAT,
			other => Self::Other(other),
		}
	}
}

/// A WAV file's audio properties
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
#[non_exhaustive]
pub struct WavProperties {
	pub(crate) format: WavFormat,
	pub(crate) duration: Duration,
	pub(crate) overall_bitrate: u32,
	pub(crate) audio_bitrate: u32,
	pub(crate) sample_rate: u32,
	pub(crate) bit_depth: u8,
	pub(crate) channels: u8,
}

impl From<WavProperties> for FileProperties {
	fn from(input: WavProperties) -> Self {
		let WavProperties {
			duration,
			overall_bitrate,
			audio_bitrate,
			sample_rate,
			bit_depth,
			channels,
			format: _,
		} = input;

		Self {
			duration,
			overall_bitrate: Some(overall_bitrate),
			audio_bitrate: Some(audio_bitrate),
			sample_rate: Some(sample_rate),
			bit_depth: Some(bit_depth),
			channels: Some(channels),
		}
	}
}

impl WavProperties {
	/// Duration of the audio
	pub fn duration(&self) -> Duration {
		self.duration
	}

	/// Overall bitrate (kbps)
	pub fn overall_bitrate(&self) -> u32 {
		self.overall_bitrate
	}

	/// Audio bitrate (kbps)
	pub fn bitrate(&self) -> u32 {
		self.audio_bitrate
	}

	/// Sample rate (Hz)
	pub fn sample_rate(&self) -> u32 {
		self.sample_rate
	}

	/// Bits per sample
	pub fn bit_depth(&self) -> u8 {
		self.bit_depth
	}

	/// Channel count
	pub fn channels(&self) -> u8 {
		self.channels
	}

	/// WAV format
	pub fn format(&self) -> &WavFormat {
		&self.format
	}
}

// The fields of WAVEFORMATEX we care about
#[derive(Copy, Clone, Debug)]
struct FmtChunk {
	format_tag: u16,
	channels: u16,
	sample_rate: u32,
	bytes_per_second: u32,
	block_align: u16,
	bits_per_sample: u16,
}

fn read_fmt_chunk(mut fmt: &[u8]) -> Result<FmtChunk> {
	if fmt.len() < 16 {
		decode_err!(@BAIL Wav, "File does not contain a valid \"fmt \" chunk");
	}

	let len = fmt.len();
	let reader = &mut fmt;

	let mut chunk = FmtChunk {
		format_tag: reader.read_u16::<LittleEndian>()?,
		channels: reader.read_u16::<LittleEndian>()?,
		sample_rate: reader.read_u32::<LittleEndian>()?,
		bytes_per_second: reader.read_u32::<LittleEndian>()?,
		block_align: reader.read_u16::<LittleEndian>()?,
		bits_per_sample: reader.read_u16::<LittleEndian>()?,
	};

	// WAVE_FORMAT_EXTENSIBLE stores the real format tag in the first 2 bytes of the sub format GUID
	if chunk.format_tag == EXTENSIBLE {
		if len < 40 {
			decode_err!(@BAIL Wav, "Extensible format identified, invalid \"fmt \" chunk size found (< 40)");
		}

		let _cb_size = reader.read_u16::<LittleEndian>()?;
		let valid_bits_per_sample = reader.read_u16::<LittleEndian>()?;
		let _channel_mask = reader.read_u32::<LittleEndian>()?;

		chunk.format_tag = reader.read_u16::<LittleEndian>()?;
		if valid_bits_per_sample > 0 {
			chunk.bits_per_sample = valid_bits_per_sample;
		}
	}

	Ok(chunk)
}

pub(super) fn read_properties(
	fmt: &[u8],
	total_samples: Option<u32>,
	stream_len: Option<u64>,
	file_length: u64,
) -> Result<WavProperties> {
	let FmtChunk {
		format_tag,
		channels,
		sample_rate,
		bytes_per_second,
		block_align,
		bits_per_sample,
	} = read_fmt_chunk(fmt)?;

	let Some(stream_len) = stream_len else {
		decode_err!(@BAIL Wav, "File does not contain a \"data\" chunk");
	};

	if channels == 0 {
		decode_err!(@BAIL Wav, "File contains 0 channels");
	}

	let bit_depth = if bits_per_sample > 0 {
		bits_per_sample
	} else {
		(block_align / channels).saturating_mul(8)
	};

	let pcm = format_tag == PCM || format_tag == IEEE_FLOAT;

	// Samples per channel. The "fact" chunk is only trusted for compressed formats.
	let total_samples = match total_samples {
		Some(total_samples) if !pcm => Some(u64::from(total_samples)),
		_ if pcm && block_align > 0 => Some(stream_len / u64::from(block_align)),
		_ => None,
	};

	let duration = match total_samples {
		Some(total_samples) if sample_rate > 0 => {
			log::debug!("Calculating duration from total samples");
			Duration::from_millis((total_samples * 1000).div_round(u64::from(sample_rate)))
		},
		_ if bytes_per_second > 0 => {
			log::debug!("Calculating duration from stream length/byte rate");
			Duration::from_millis((stream_len * 1000).div_round(u64::from(bytes_per_second)))
		},
		_ => {
			log::warn!("Unable to calculate duration and bitrate");
			Duration::ZERO
		},
	};

	let audio_bitrate = if bytes_per_second > 0 {
		(u64::from(bytes_per_second) * 8).div_round(1000) as u32
	} else {
		log::warn!("Estimating audio bitrate from stream length");
		kbps(stream_len, duration)
	};

	Ok(WavProperties {
		format: WavFormat::from(format_tag),
		duration,
		overall_bitrate: kbps(file_length, duration),
		audio_bitrate,
		sample_rate,
		bit_depth: bit_depth as u8,
		channels: channels as u8,
	})
}

#[cfg(test)]
mod tests {
	use super::{WavFormat, read_properties};

	use std::time::Duration;

	fn fmt(format_tag: u16, channels: u16, sample_rate: u32, bits_per_sample: u16) -> Vec<u8> {
		let block_align = channels * (bits_per_sample / 8);
		let bytes_per_second = sample_rate * u32::from(block_align);

		let mut fmt = format_tag.to_le_bytes().to_vec();
		fmt.extend(channels.to_le_bytes());
		fmt.extend(sample_rate.to_le_bytes());
		fmt.extend(bytes_per_second.to_le_bytes());
		fmt.extend(block_align.to_le_bytes());
		fmt.extend(bits_per_sample.to_le_bytes());
		fmt
	}

	#[test_log::test]
	fn pcm() {
		// 2 seconds of 16-bit stereo at 48kHz
		let properties =
			read_properties(&fmt(1, 2, 48000, 16), None, Some(384_000), 384_044).unwrap();

		assert_eq!(properties.format(), &WavFormat::PCM);
		assert_eq!(properties.duration(), Duration::from_secs(2));
		assert_eq!(properties.bitrate(), 1536);
		assert_eq!(properties.overall_bitrate(), 1536);
		assert_eq!(properties.sample_rate(), 48000);
		assert_eq!(properties.bit_depth(), 16);
		assert_eq!(properties.channels(), 2);
	}

	#[test_log::test]
	fn extensible() {
		let mut extensible = fmt(0xFFFE, 1, 8000, 32);
		// cbSize, valid bits, channel mask
		extensible.extend(22_u16.to_le_bytes());
		extensible.extend(24_u16.to_le_bytes());
		extensible.extend(4_u32.to_le_bytes());
		// KSDATAFORMAT_SUBTYPE_IEEE_FLOAT
		extensible.extend(3_u16.to_le_bytes());
		extensible.extend([0; 14]);

		let properties = read_properties(&extensible, None, Some(32000), 32080).unwrap();
		assert_eq!(properties.format(), &WavFormat::IEEE_FLOAT);
		assert_eq!(properties.bit_depth(), 24);
		assert_eq!(properties.duration(), Duration::from_secs(1));
	}

	#[test_log::test]
	fn compressed_uses_fact() {
		// A-law, 1 byte per sample, with a lying data length
		let properties = read_properties(&fmt(6, 1, 8000, 8), Some(4000), Some(1), 100).unwrap();
		assert_eq!(properties.format(), &WavFormat::Other(6));
		assert_eq!(properties.duration(), Duration::from_millis(500));
	}

	#[test_log::test]
	fn invalid() {
		assert!(read_properties(&[0; 8], None, Some(10), 100).is_err());
		assert!(read_properties(&fmt(1, 2, 44100, 16), None, None, 100).is_err());
		assert!(read_properties(&fmt(1, 0, 44100, 16), None, Some(10), 100).is_err());
	}
}
