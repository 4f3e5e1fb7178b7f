//! Generic audio properties
//!
//! Every format has its own properties struct, which can be converted into a [`FileProperties`].

use std::time::Duration;

/// The format-independent summary of a file's audio stream
///
/// Anything a format doesn't store, or that couldn't be computed, is `None`. The duration is
/// zeroed instead.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
#[non_exhaustive]
pub struct FileProperties {
	pub(crate) duration: Duration,
	pub(crate) overall_bitrate: Option<u32>,
	pub(crate) audio_bitrate: Option<u32>,
	pub(crate) sample_rate: Option<u32>,
	pub(crate) bit_depth: Option<u8>,
	pub(crate) channels: Option<u8>,
}

impl FileProperties {
	/// Assemble a summary by hand, for formats defined outside of tagcraft
	#[must_use]
	pub const fn new(
		duration: Duration,
		overall_bitrate: Option<u32>,
		audio_bitrate: Option<u32>,
		sample_rate: Option<u32>,
		bit_depth: Option<u8>,
		channels: Option<u8>,
	) -> Self {
		Self {
			duration,
			overall_bitrate,
			audio_bitrate,
			sample_rate,
			bit_depth,
			channels,
		}
	}

	/// Playback length
	pub fn duration(&self) -> Duration {
		self.duration
	}

	/// Bitrate of the whole file, tags included, in kbps
	pub fn overall_bitrate(&self) -> Option<u32> {
		self.overall_bitrate
	}

	/// Bitrate of the audio stream alone, in kbps
	pub fn audio_bitrate(&self) -> Option<u32> {
		self.audio_bitrate
	}

	/// Samples per second, per channel
	pub fn sample_rate(&self) -> Option<u32> {
		self.sample_rate
	}

	/// Bits per sample, for formats that have a fixed sample size
	pub fn bit_depth(&self) -> Option<u8> {
		self.bit_depth
	}

	/// Number of interleaved channels
	pub fn channels(&self) -> Option<u8> {
		self.channels
	}

	/// Whether every field is zero or missing
	///
	/// This is the case when properties were skipped with
	/// [`ParseOptions::read_properties`](crate::config::ParseOptions::read_properties).
	pub fn is_empty(&self) -> bool {
		matches!(
			self,
			Self {
				duration: Duration::ZERO,
				overall_bitrate: None | Some(0),
				audio_bitrate: None | Some(0),
				sample_rate: None | Some(0),
				bit_depth: None | Some(0),
				channels: None | Some(0),
			}
		)
	}
}
