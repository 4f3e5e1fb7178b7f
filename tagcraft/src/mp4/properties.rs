use super::atom_info::{AtomInfo, FULL_ATOM_HEADER_LEN};
use super::read::ContextualAtom;
use crate::chunk::{ChunkWalker, Mp4BoxCodec};
use crate::config::ParsingMode;
use crate::error::Result;
use crate::macros::{decode_err, parse_mode_choice, try_vec};
use crate::properties::FileProperties;
use crate::util::math::{RoundedDivision, kbps};

use std::io::{Cursor, Read, Seek, SeekFrom};
use std::time::Duration;

use byteorder::{BigEndian, ReadBytesExt};

/// An MP4 file's audio codec
#[allow(missing_docs)]
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Mp4Codec {
	#[default]
	Unknown,
	AAC,
	ALAC,
	MP3,
}

/// An MP4 file's audio properties
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[non_exhaustive]
pub struct Mp4Properties {
	pub(crate) codec: Mp4Codec,
	pub(crate) duration: Duration,
	pub(crate) overall_bitrate: u32,
	pub(crate) audio_bitrate: u32,
	pub(crate) sample_rate: u32,
	pub(crate) bit_depth: Option<u8>,
	pub(crate) channels: u8,
	pub(crate) drm_protected: bool,
}

impl From<Mp4Properties> for FileProperties {
	fn from(input: Mp4Properties) -> Self {
		Self::new(
			input.duration,
			Some(input.overall_bitrate),
			Some(input.audio_bitrate),
			Some(input.sample_rate),
			input.bit_depth,
			Some(input.channels),
		)
	}
}

impl Mp4Properties {
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

	/// Bits per sample
	pub fn bit_depth(&self) -> Option<u8> {
		self.bit_depth
	}

	/// Channel count
	pub fn channels(&self) -> u8 {
		self.channels
	}

	/// Audio codec
	pub fn codec(&self) -> &Mp4Codec {
		&self.codec
	}

	/// Whether or not the file is DRM protected
	pub fn is_drm_protected(&self) -> bool {
		self.drm_protected
	}
}

// The time fields of `mvhd` and `mdhd` share a layout
struct TimeHeader {
	timescale: u32,
	duration: u64,
}

impl TimeHeader {
	fn read<R>(reader: &mut R, atom: &AtomInfo) -> Result<Self>
	where
		R: Read + Seek,
	{
		reader.seek(SeekFrom::Start(atom.payload_start()))?;

		let version = reader.read_u8()?;
		let _flags = reader.read_u24::<BigEndian>()?;

		let (timescale, duration) = if version == 1 {
			// We don't care about these two values
			let _creation_time = reader.read_u64::<BigEndian>()?;
			let _modification_time = reader.read_u64::<BigEndian>()?;

			let timescale = reader.read_u32::<BigEndian>()?;
			let duration = reader.read_u64::<BigEndian>()?;

			(timescale, duration)
		} else {
			let _creation_time = reader.read_u32::<BigEndian>()?;
			let _modification_time = reader.read_u32::<BigEndian>()?;

			let timescale = reader.read_u32::<BigEndian>()?;
			let duration = reader.read_u32::<BigEndian>()?;

			(timescale, u64::from(duration))
		};

		Ok(Self {
			timescale,
			duration,
		})
	}

	fn to_duration(&self) -> Option<Duration> {
		if self.timescale == 0 {
			return None;
		}

		let millis = (u128::from(self.duration) * 1000).div_round(u128::from(self.timescale));
		Some(Duration::from_millis(u64::try_from(millis).ok()?))
	}
}

struct AudioTrak<'a> {
	mdia: &'a ContextualAtom,
}

impl<'a> AudioTrak<'a> {
	/// Find the first `trak` with a sound handler
	fn find<R>(reader: &mut R, moov: &'a ContextualAtom) -> Result<Option<Self>>
	where
		R: Read + Seek,
	{
		for mdia in moov
			.children_of(*b"trak")
			.filter_map(|trak| trak.child(*b"mdia"))
		{
			let Some(hdlr) = mdia.child(*b"hdlr") else {
				continue;
			};

			// Version (1) + flags (3) + pre-defined (4) + handler type (4)
			if hdlr.info.payload_len() < 12 {
				log::warn!("Incomplete `hdlr` atom, skipping");
				continue;
			}

			reader.seek(SeekFrom::Start(hdlr.info.payload_start() + 8))?;

			let mut handler_type = [0; 4];
			reader.read_exact(&mut handler_type)?;

			if &handler_type == b"soun" {
				return Ok(Some(Self { mdia }));
			}
		}

		Ok(None)
	}

	fn stsd(&self) -> Option<&'a AtomInfo> {
		let stbl = self.mdia.child(*b"minf")?.child(*b"stbl")?;
		stbl.child(*b"stsd").map(|stsd| &stsd.info)
	}
}

pub(super) fn read_properties<R>(
	reader: &mut R,
	moov: &ContextualAtom,
	mdat_len: Option<u64>,
	file_length: u64,
	parse_mode: ParsingMode,
) -> Result<Mp4Properties>
where
	R: Read + Seek,
{
	let mut properties = Mp4Properties::default();

	if let Some(mvhd) = moov.child(*b"mvhd") {
		if let Some(duration) = TimeHeader::read(reader, &mvhd.info)?.to_duration() {
			properties.duration = duration;
		}
	}

	let Some(trak) = AudioTrak::find(reader, moov)? else {
		parse_mode_choice!(
			parse_mode,
			STRICT: decode_err!(@BAIL Mp4, "File contains no audio tracks"),
		);

		log::warn!("File contains no audio tracks");
		return Ok(properties);
	};

	// The track's own duration, in case the movie header didn't have one
	if properties.duration.is_zero() {
		if let Some(mdhd) = trak.mdia.child(*b"mdhd") {
			if let Some(duration) = TimeHeader::read(reader, &mdhd.info)?.to_duration() {
				properties.duration = duration;
			}
		}
	}

	// `stsd` contains the majority of the audio properties
	match trak.stsd() {
		Some(stsd) => {
			reader.seek(SeekFrom::Start(stsd.payload_start()))?;

			let mut stsd_data = try_vec![0; stsd.payload_len() as usize];
			reader.read_exact(&mut stsd_data)?;

			read_stsd(&mut Cursor::new(stsd_data), &mut properties, parse_mode)?;
		},
		None => log::warn!("Audio track has no `stsd` atom"),
	}

	if properties.duration.is_zero() {
		log::warn!("Duration is 0, unable to calculate bitrate");
		return Ok(properties);
	}

	properties.overall_bitrate = kbps(file_length, properties.duration);

	if properties.audio_bitrate == 0 {
		match mdat_len {
			Some(mdat_len) => {
				log::debug!("Estimating audio bitrate from `mdat` size");
				properties.audio_bitrate = kbps(mdat_len, properties.duration);
			},
			None => log::warn!("No `mdat` atom found, unable to calculate audio bitrate"),
		}
	}

	Ok(properties)
}

fn read_stsd<R>(reader: &mut R, properties: &mut Mp4Properties, parse_mode: ParsingMode) -> Result<()>
where
	R: Read + Seek,
{
	let stsd_len = reader.seek(SeekFrom::End(0))?;
	reader.rewind()?;

	// Version (1) + flags (3)
	reader.seek(SeekFrom::Current(4))?;
	let num_sample_entries = reader.read_u32::<BigEndian>()?;

	let mut walker = ChunkWalker::<Mp4BoxCodec>::new(stsd_len, parse_mode);
	for _ in 0..num_sample_entries {
		let Some(entry) = walker.next(reader)? else {
			break;
		};

		match &entry.ident {
			b"mp4a" => mp4a_properties(reader, &entry, properties, parse_mode)?,
			b"alac" => alac_properties(reader, &entry, properties, parse_mode)?,
			// Special case to detect encrypted files
			b"drms" => {
				properties.drm_protected = true;
				walker.skip(reader, &entry)?;
				continue;
			},
			other => {
				log::warn!(
					"Found unsupported sample entry: {:?}",
					other.escape_ascii().to_string()
				);
				walker.skip(reader, &entry)?;
				continue;
			},
		}

		// We only want to read the properties of the first stream
		// that we can actually recognize
		break;
	}

	Ok(())
}

// The fields shared by every audio sample entry
//
// Reserved (6)
// Data reference index (2)
// Version (2)
// Revision level (2)
// Vendor (4)
// Channels (2)
// Sample size (2)
// Compression ID (2)
// Packet size (2)
// Sample rate (4, 16.16 fixed point)
const SAMPLE_ENTRY_LEN: u64 = 28;

fn read_sample_entry<R>(reader: &mut R, entry: &AtomInfo, properties: &mut Mp4Properties) -> Result<bool>
where
	R: Read + Seek,
{
	if entry.payload_len() < SAMPLE_ENTRY_LEN {
		log::warn!("Sample entry is too short, skipping");
		return Ok(false);
	}

	reader.seek(SeekFrom::Start(entry.payload_start() + 16))?;
	properties.channels = reader.read_u16::<BigEndian>()? as u8;

	let sample_size = reader.read_u16::<BigEndian>()?;
	if sample_size > 0 {
		properties.bit_depth = Some(sample_size as u8);
	}

	reader.seek(SeekFrom::Current(4))?;
	properties.sample_rate = reader.read_u32::<BigEndian>()? >> 16;

	Ok(true)
}

// Find a child of a sample entry, after the shared fields
fn sample_entry_child<R>(
	reader: &mut R,
	entry: &AtomInfo,
	ident: [u8; 4],
	parse_mode: ParsingMode,
) -> Result<Option<AtomInfo>>
where
	R: Read + Seek,
{
	reader.seek(SeekFrom::Start(entry.payload_start() + SAMPLE_ENTRY_LEN))?;

	let mut walker = ChunkWalker::<Mp4BoxCodec>::for_parent(entry, parse_mode);
	walker.seek_sibling(reader, ident)
}

// https://wiki.multimedia.cx/index.php?title=MPEG-4_Audio#Sampling_Frequencies
const SAMPLE_RATES: [u32; 13] = [
	96000, 88200, 64000, 48000, 44100, 32000, 24000, 22050, 16000, 12000, 11025, 8000, 7350,
];

fn mp4a_properties<R>(
	reader: &mut R,
	entry: &AtomInfo,
	properties: &mut Mp4Properties,
	parse_mode: ParsingMode,
) -> Result<()>
where
	R: Read + Seek,
{
	const ELEMENTARY_DESCRIPTOR_TAG: u8 = 0x03;
	const DECODER_CONFIG_TAG: u8 = 0x04;
	const DECODER_SPECIFIC_DESCRIPTOR_TAG: u8 = 0x05;

	// Set the codec to AAC, which is a good guess if we fail before reaching the `esds`
	properties.codec = Mp4Codec::AAC;

	if !read_sample_entry(reader, entry, properties)? {
		return Ok(());
	}

	// The sample size is meaningless for lossy streams
	properties.bit_depth = None;

	// This information is often followed by an esds (elementary stream descriptor) atom containing the bitrate
	let Some(esds) = sample_entry_child(reader, entry, *b"esds", parse_mode)? else {
		return Ok(());
	};

	if esds.payload_len() < FULL_ATOM_HEADER_LEN {
		return Ok(());
	}

	// There are 4 bytes we expect to be zeroed out
	// Version (1)
	// Flags (3)
	//
	// Otherwise, we don't know how to handle it, and can simply bail.
	if reader.read_u32::<BigEndian>()? != 0 {
		return Ok(());
	}

	let descriptor = Descriptor::read(reader)?;
	if descriptor.tag != ELEMENTARY_DESCRIPTOR_TAG {
		return Ok(());
	}

	// Skipping 3 bytes
	// Elementary stream ID (2)
	// Flags (1)
	reader.seek(SeekFrom::Current(3))?;

	// There is another descriptor embedded in the previous one
	let descriptor = Descriptor::read(reader)?;
	if descriptor.tag != DECODER_CONFIG_TAG {
		return Ok(());
	}

	properties.codec = match reader.read_u8()? {
		0x40 | 0x41 | 0x66 | 0x67 | 0x68 => Mp4Codec::AAC,
		0x69 | 0x6B => Mp4Codec::MP3,
		_ => Mp4Codec::Unknown,
	};

	// Skipping 8 bytes
	// Stream type (1)
	// Buffer size (3)
	// Max bitrate (4)
	reader.seek(SeekFrom::Current(8))?;

	let average_bitrate = reader.read_u32::<BigEndian>()?;
	properties.audio_bitrate = average_bitrate / 1000;

	// Yet another descriptor to check
	let descriptor = Descriptor::read(reader)?;
	if descriptor.tag == DECODER_SPECIFIC_DESCRIPTOR_TAG {
		// https://wiki.multimedia.cx/index.php?title=MPEG-4_Audio#Audio_Specific_Config
		//
		// 5 bits: object type
		// 4 bits: frequency index
		// 4 bits: channel configuration
		let byte_a = reader.read_u8()?;
		let byte_b = reader.read_u8()?;

		let object_type = byte_a >> 3;

		// Extended object types shift everything over, just keep what the sample entry says
		if object_type != 31 {
			let frequency_index = ((byte_a & 0x07) << 1) | (byte_b >> 7);
			let channel_conf = (byte_b >> 3) & 0x0F;

			if let Some(sample_rate) = SAMPLE_RATES.get(usize::from(frequency_index)) {
				properties.sample_rate = *sample_rate;
			}

			// The channel configuration isn't always set
			if channel_conf > 0 {
				properties.channels = channel_conf;
			}
		}
	}

	Ok(())
}

fn alac_properties<R>(
	reader: &mut R,
	entry: &AtomInfo,
	properties: &mut Mp4Properties,
	parse_mode: ParsingMode,
) -> Result<()>
where
	R: Read + Seek,
{
	if !read_sample_entry(reader, entry, properties)? {
		return Ok(());
	}

	// Unlike the "mp4a" atom, we cannot read the data that immediately follows it
	// For ALAC, there's an inner "alac" atom holding the decoder config
	let Some(alac) = sample_entry_child(reader, entry, *b"alac", parse_mode)? else {
		return Ok(());
	};

	// Version (4) + the 24 byte config
	if alac.payload_len() < 28 {
		return Ok(());
	}

	properties.codec = Mp4Codec::ALAC;

	// Skipping 9 bytes
	// Version (4)
	// Samples per frame (4)
	// Compatible version (1)
	reader.seek(SeekFrom::Current(9))?;

	// Sample size (1)
	properties.bit_depth = Some(reader.read_u8()?);

	// Skipping 3 bytes
	// Rice history mult (1)
	// Rice initial history (1)
	// Rice parameter limit (1)
	reader.seek(SeekFrom::Current(3))?;

	properties.channels = reader.read_u8()?;

	// Skipping 6 bytes
	// Max run (2)
	// Max frame size (4)
	reader.seek(SeekFrom::Current(6))?;

	properties.audio_bitrate = reader.read_u32::<BigEndian>()? / 1000;
	properties.sample_rate = reader.read_u32::<BigEndian>()?;

	Ok(())
}

struct Descriptor {
	tag: u8,
	_size: u32,
}

impl Descriptor {
	fn read<R: Read>(reader: &mut R) -> Result<Descriptor> {
		let tag = reader.read_u8()?;

		// https://github.com/FFmpeg/FFmpeg/blob/84f5583078699e96b040f4f41b39720b683326d0/libavformat/isom.c#L283
		let mut size: u32 = 0;
		for _ in 0..4 {
			let b = reader.read_u8()?;
			size = (size << 7) | u32::from(b & 0x7F);
			if b & 0x80 == 0 {
				break;
			}
		}

		Ok(Descriptor { tag, _size: size })
	}
}
