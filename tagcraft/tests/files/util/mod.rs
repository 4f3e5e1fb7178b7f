//! Fixtures, and the checks shared between every format
//!
//! Every fixture carries a single artist of "Foo artist" in its native tag.

use tagcraft::asf::Guid;
use tagcraft::config::{ParseOptions, WriteOptions};
use tagcraft::file::{AudioFile, TaggedFile, TaggedFileExt};
use tagcraft::probe::Probe;
use tagcraft::tag::{ItemKey, ItemValue, TagExt, TagItem, TagType};

use std::fs::File;
use std::io::{Seek as _, Write as _};

use oggpage::{CONTAINS_FIRST_PAGE_OF_BITSTREAM, CONTAINS_LAST_PAGE_OF_BITSTREAM, Page, PageHeader};

/// Create a new temporary file holding `content`
pub fn temp_file(content: &[u8]) -> File {
	let mut file = tempfile::tempfile().unwrap();
	file.write_all(content).unwrap();
	file.rewind().unwrap();

	file
}

/// Parse `file` from the start, guessing its type from the content
pub fn read(file: &mut File, parse_options: ParseOptions) -> TaggedFile {
	file.rewind().unwrap();

	Probe::new(file)
		.options(parse_options)
		.guess_file_type()
		.unwrap()
		.read()
		.unwrap()
}

/// Verify that the tag of type `tag_type` has an [`ItemKey::TrackArtist`] of `expected_value`
///
/// Also verifies that the tag has exactly `expected_item_count` items
pub fn verify_artist(
	file: &impl TaggedFileExt,
	tag_type: TagType,
	expected_value: &str,
	expected_item_count: u32,
) {
	println!(
		"VERIFY: Expecting `{tag_type:?}` to have {expected_item_count} items, with an artist of \
		 \"{expected_value}\""
	);

	let tag = file.tag(tag_type).unwrap();
	assert_eq!(tag.item_count(), expected_item_count);
	assert_eq!(
		tag.get(&ItemKey::TrackArtist),
		Some(&TagItem::new(
			ItemKey::TrackArtist,
			ItemValue::Text(String::from(expected_value))
		))
	);
}

/// This will:
///
/// * Verify that the tag of type `tag_type` has an artist of `expected_value`
/// * Set the artist to `new_value`
/// * Write the tag back to `file`
pub fn set_artist(
	file: &mut File,
	tagged_file: &mut TaggedFile,
	tag_type: TagType,
	expected_value: &str,
	new_value: &str,
	expected_item_count: u32,
) {
	verify_artist(tagged_file, tag_type, expected_value, expected_item_count);
	println!("WRITE: Writing artist \"{new_value}\" to {tag_type:?}\n");

	let tag = tagged_file.tag_mut(tag_type).unwrap();
	tag.insert_unchecked(TagItem::new(
		ItemKey::TrackArtist,
		ItemValue::Text(String::from(new_value)),
	));

	file.rewind().unwrap();
	tag.save_to(file, WriteOptions::default()).unwrap();
}

/// Write `new_value` as the artist, read it back, then restore the original
pub fn artist_round_trip(content: &[u8], tag_type: TagType, expected_item_count: u32) {
	let mut file = temp_file(content);

	let mut tagged_file = read(&mut file, ParseOptions::new());
	set_artist(
		&mut file,
		&mut tagged_file,
		tag_type,
		"Foo artist",
		"Bar artist",
		expected_item_count,
	);

	let mut tagged_file = read(&mut file, ParseOptions::new());
	set_artist(
		&mut file,
		&mut tagged_file,
		tag_type,
		"Bar artist",
		"Foo artist",
		expected_item_count,
	);

	let tagged_file = read(&mut file, ParseOptions::new());
	verify_artist(&tagged_file, tag_type, "Foo artist", expected_item_count);
}

/// Remove the tag of type `tag_type`, and verify it's gone
pub fn remove_tag(content: &[u8], tag_type: TagType) {
	let mut file = temp_file(content);

	let tagged_file = read(&mut file, ParseOptions::new().read_properties(false));
	assert!(tagged_file.tag(tag_type).is_some_and(|tag| !tag.is_empty()));

	file.rewind().unwrap();
	tag_type.remove_from(&mut file).unwrap();

	let tagged_file = read(&mut file, ParseOptions::new().read_properties(false));
	assert!(tagged_file.tag(tag_type).is_none_or(TagExt::is_empty));
}

/// Verify that no audio properties are read when requested
pub fn no_properties_test(content: &[u8]) {
	let mut file = temp_file(content);
	let tagged_file = read(&mut file, ParseOptions::new().read_properties(false));
	assert!(tagged_file.properties().is_empty());
}

/// Verify that no tags are read when requested
///
/// Some formats (like Opus) *require* a tag, which is then expected to be empty.
pub fn no_tag_test(content: &[u8]) {
	let mut file = temp_file(content);
	let tagged_file = read(&mut file, ParseOptions::new().read_tags(false));
	assert!(tagged_file.tags().iter().all(TagExt::is_empty));
	assert!(!tagged_file.properties().is_empty());
}

// ---------- RIFF ----------

pub fn riff_chunk(ident: &[u8; 4], content: &[u8]) -> Vec<u8> {
	let mut chunk = ident.to_vec();
	chunk.extend((content.len() as u32).to_le_bytes());
	chunk.extend(content);
	if content.len() % 2 != 0 {
		chunk.push(0);
	}
	chunk
}

/// 16-bit stereo, 44.1kHz, 1 second of silence, with a RIFF INFO list and an ID3v2 tag
pub fn wav() -> Vec<u8> {
	let mut body = b"WAVE".to_vec();
	body.extend(riff_chunk(
		b"fmt ",
		b"\x01\x00\x02\x00\x44\xAC\x00\x00\x10\xB1\x02\x00\x04\x00\x10\x00",
	));
	body.extend(riff_chunk(b"data", &[0; 176_400]));
	body.extend(riff_chunk(b"LIST", &[&b"INFO"[..], &riff_chunk(b"IART", b"Foo artist\0")].concat()));
	body.extend(riff_chunk(b"id3 ", &id3v2_artist("Foo artist")));

	let mut wav = b"RIFF".to_vec();
	wav.extend((body.len() as u32).to_le_bytes());
	wav.extend(body);
	wav
}

/// An ID3v2.4 tag with a single UTF-8 `TPE1` frame
pub fn id3v2_artist(artist: &str) -> Vec<u8> {
	let frame_len = 1 + artist.len();
	assert!(frame_len < 0x80);

	let mut frame = b"TPE1".to_vec();
	frame.extend([0, 0, 0, frame_len as u8]);
	frame.extend([0, 0]);
	frame.push(3);
	frame.extend(artist.as_bytes());

	assert!(frame.len() < 0x80);

	let mut tag = b"ID3\x04\x00\x00".to_vec();
	tag.extend([0, 0, 0, frame.len() as u8]);
	tag.extend(frame);
	tag
}

// ---------- MP4 ----------

pub fn atom(ident: &[u8; 4], content: &[u8]) -> Vec<u8> {
	let mut atom = (content.len() as u32 + 8).to_be_bytes().to_vec();
	atom.extend(ident);
	atom.extend(content);
	atom
}

fn full_atom(ident: &[u8; 4], content: &[u8]) -> Vec<u8> {
	atom(ident, &[&[0; 4][..], content].concat())
}

fn mp4a() -> Vec<u8> {
	// AAC LC, 128kbps, 44.1kHz, 2 channels
	let mut esds = vec![0x03, 25, 0, 1, 0];
	esds.extend([0x04, 17, 0x40, 0x15, 0, 0, 0]);
	esds.extend(0_u32.to_be_bytes());
	esds.extend(128_000_u32.to_be_bytes());
	esds.extend([0x05, 2, 0x12, 0x10]);

	let mut entry = vec![0; 16];
	entry.extend(2_u16.to_be_bytes());
	entry.extend(16_u16.to_be_bytes());
	entry.extend([0; 4]);
	entry.extend((44100_u32 << 16).to_be_bytes());
	entry.extend(full_atom(b"esds", &esds));

	atom(b"mp4a", &entry)
}

fn moov(chunk_offset: u32, udta: &[u8]) -> Vec<u8> {
	// 1000 units per second, 2 seconds
	let mut mvhd = vec![0; 12];
	mvhd.extend(1000_u32.to_be_bytes());
	mvhd.extend(2000_u32.to_be_bytes());
	mvhd.extend([0; 80]);

	let mut stsd = vec![0; 4];
	stsd.extend(1_u32.to_be_bytes());
	stsd.extend(mp4a());

	let stco = full_atom(
		b"stco",
		&[&1_u32.to_be_bytes()[..], &chunk_offset.to_be_bytes()].concat(),
	);

	let mut hdlr = vec![0; 8];
	hdlr.extend(b"soun");
	hdlr.extend([0; 13]);

	let stbl = atom(b"stbl", &[atom(b"stsd", &stsd), stco].concat());
	let mdia = atom(
		b"mdia",
		&[atom(b"hdlr", &hdlr), atom(b"minf", &stbl)].concat(),
	);

	atom(
		b"moov",
		&[atom(b"mvhd", &mvhd), atom(b"trak", &mdia), udta.to_vec()].concat(),
	)
}

/// An `ilst` holding a single UTF-8 `©ART`
pub fn ilst_artist(artist: &str) -> Vec<u8> {
	let data = atom(b"data", &[&[0, 0, 0, 1][..], &[0; 4], artist.as_bytes()].concat());
	atom(b"ilst", &atom(b"\xa9ART", &data))
}

/// An M4A file, with `udta` (if any) placed at the end of `moov`
pub fn mp4_with_udta(udta: &[u8]) -> Vec<u8> {
	let ftyp = atom(b"ftyp", b"M4A \0\0\0\0");

	let mdat_payload_start = (ftyp.len() + moov(0, udta).len() + 8) as u32;
	[ftyp, moov(mdat_payload_start, udta), atom(b"mdat", &[0xAB; 32_000])].concat()
}

pub fn mp4() -> Vec<u8> {
	let mut hdlr = vec![0; 8];
	hdlr.extend(b"mdirappl");
	hdlr.extend([0; 9]);

	let meta = full_atom(b"meta", &[atom(b"hdlr", &hdlr), ilst_artist("Foo artist")].concat());
	mp4_with_udta(&atom(b"udta", &meta))
}

/// The first `stco` entry of an MP4 file, and where `mdat` starts its payload
pub fn mp4_chunk_offset(content: &[u8]) -> (u32, usize) {
	let stco = content.windows(4).position(|w| w == b"stco").unwrap();
	let offset_pos = stco + 4 + 4 + 4;
	let offset = u32::from_be_bytes(content[offset_pos..offset_pos + 4].try_into().unwrap());

	let mdat = content.windows(4).rposition(|w| w == b"mdat").unwrap();
	(offset, mdat + 4)
}

// ---------- FLAC ----------

fn flac_block(ty: u8, last: bool, content: &[u8]) -> Vec<u8> {
	let mut block = vec![if last { ty | 0x80 } else { ty }];
	block.extend(&(content.len() as u32).to_be_bytes()[1..]);
	block.extend(content);
	block
}

pub fn comment_block(vendor: &str, fields: &[&str]) -> Vec<u8> {
	let mut content = Vec::new();
	content.extend((vendor.len() as u32).to_le_bytes());
	content.extend(vendor.as_bytes());
	content.extend((fields.len() as u32).to_le_bytes());
	for field in fields {
		content.extend((field.len() as u32).to_le_bytes());
		content.extend(field.as_bytes());
	}
	content
}

/// 44.1kHz, 2 channels, 16 bits, 2 seconds
pub fn flac() -> Vec<u8> {
	let samples: u32 = 88200;
	let info: u32 = (44100 << 12) | (1 << 9) | (15 << 4);

	let mut stream_info = vec![0x10, 0x00, 0x10, 0x00, 0, 0, 0, 0, 0, 0];
	stream_info.extend(info.to_be_bytes());
	stream_info.extend(samples.to_be_bytes());
	stream_info.extend([0; 16]);

	let mut file = b"fLaC".to_vec();
	file.extend(flac_block(0, false, &stream_info));
	file.extend(flac_block(
		4,
		true,
		&comment_block("tagcraft", &["ARTIST=Foo artist"]),
	));
	file.extend([0xFF, 0xF8, 0xC9, 0x18, 0x00, 0xC2]);
	file.extend([0; 512]);
	file
}

// ---------- Ogg ----------

fn page(flags: u8, abgp: u64, sequence_number: u32, content: Vec<u8>) -> Vec<u8> {
	let mut page = Page::new(PageHeader::new(flags, abgp, 7, sequence_number), content).unwrap();
	page.gen_crc();
	page.as_bytes()
}

/// 48kHz stereo Opus, 2 seconds after pre-skip
pub fn opus() -> Vec<u8> {
	let mut head = b"OpusHead".to_vec();
	head.push(1);
	head.push(2);
	head.extend(312_u16.to_le_bytes());
	head.extend(44100_u32.to_le_bytes());
	head.extend(0_u16.to_le_bytes());
	head.push(0);

	let mut tags = b"OpusTags".to_vec();
	tags.extend(comment_block("tagcraft", &["ARTIST=Foo artist"]));

	[
		page(CONTAINS_FIRST_PAGE_OF_BITSTREAM, 0, 0, head),
		page(0, 0, 1, tags),
		page(CONTAINS_LAST_PAGE_OF_BITSTREAM, 96_312, 2, vec![0xFC; 200]),
	]
	.concat()
}

/// 44.1kHz stereo Vorbis, 2 seconds
pub fn vorbis() -> Vec<u8> {
	let mut ident = b"\x01vorbis".to_vec();
	ident.extend(0_u32.to_le_bytes());
	ident.push(2);
	ident.extend(44100_u32.to_le_bytes());
	ident.extend(0_i32.to_le_bytes());
	ident.extend(128_000_i32.to_le_bytes());
	ident.extend(0_i32.to_le_bytes());
	ident.push(0xB8);
	ident.push(1);

	let mut comments = b"\x03vorbis".to_vec();
	comments.extend(comment_block("tagcraft", &["ARTIST=Foo artist"]));
	comments.push(1);

	let mut setup = b"\x05vorbis".to_vec();
	setup.extend([0; 32]);

	[
		page(CONTAINS_FIRST_PAGE_OF_BITSTREAM, 0, 0, ident),
		page(0, 0, 1, comments),
		page(0, 0, 2, setup),
		page(CONTAINS_LAST_PAGE_OF_BITSTREAM, 88_200, 3, vec![0xFC; 200]),
	]
	.concat()
}

// ---------- ASF ----------

fn asf_object(guid: Guid, content: &[u8]) -> Vec<u8> {
	let mut object = guid.as_bytes().to_vec();
	object.extend((content.len() as u64 + 24).to_le_bytes());
	object.extend(content);
	object
}

fn utf16le(text: &str) -> Vec<u8> {
	let mut encoded: Vec<u8> = text.encode_utf16().flat_map(u16::to_le_bytes).collect();
	encoded.extend([0, 0]);
	encoded
}

/// WMA, 2 channels, 44.1kHz, 2 seconds, with an author in the content description
pub fn asf() -> Vec<u8> {
	let mut file_properties = vec![0; 40];
	// Play duration, send duration, preroll
	file_properties.extend(20_000_000_u64.to_le_bytes());
	file_properties.extend(20_000_000_u64.to_le_bytes());
	file_properties.extend(0_u64.to_le_bytes());
	// Flags, packet sizes, max bitrate
	file_properties.extend([0; 16]);

	let mut stream_properties = Guid::AUDIO_MEDIA.as_bytes().to_vec();
	stream_properties.extend([0; 24]);
	stream_properties.extend(18_u32.to_le_bytes());
	stream_properties.extend(0_u32.to_le_bytes());
	stream_properties.extend(1_u16.to_le_bytes());
	stream_properties.extend(0_u32.to_le_bytes());
	// WAVEFORMATEX, WMA v2
	stream_properties.extend(0x0161_u16.to_le_bytes());
	stream_properties.extend(2_u16.to_le_bytes());
	stream_properties.extend(44100_u32.to_le_bytes());
	stream_properties.extend(16_000_u32.to_le_bytes());
	stream_properties.extend(4_u16.to_le_bytes());
	stream_properties.extend(16_u16.to_le_bytes());
	stream_properties.extend(0_u16.to_le_bytes());

	let author = utf16le("Foo artist");
	let mut content_description = Vec::new();
	for len in [0, author.len(), 0, 0, 0] {
		content_description.extend((len as u16).to_le_bytes());
	}
	content_description.extend(author);

	let objects = [
		asf_object(Guid::FILE_PROPERTIES_OBJECT, &file_properties),
		asf_object(Guid::STREAM_PROPERTIES_OBJECT, &stream_properties),
		asf_object(Guid::CONTENT_DESCRIPTION_OBJECT, &content_description),
	];

	let mut header_content = (objects.len() as u32).to_le_bytes().to_vec();
	header_content.extend([1, 2]);
	header_content.extend(objects.concat());

	let mut data = vec![0; 16];
	data.extend(0_u64.to_le_bytes());
	data.extend([1, 1]);
	data.extend([0; 256]);

	[
		asf_object(Guid::HEADER_OBJECT, &header_content),
		asf_object(Guid::DATA_OBJECT, &data),
	]
	.concat()
}

/// Whether every page of an Ogg stream has a valid checksum and consecutive sequence numbers
pub fn verify_ogg_pages(content: &[u8]) {
	let mut reader = std::io::Cursor::new(content);
	let mut expected_sequence = 0;

	while (reader.position() as usize) < content.len() {
		let page = Page::read(&mut reader).unwrap();
		page.verify_crc().unwrap();
		assert_eq!(page.header().sequence_number, expected_sequence);
		expected_sequence += 1;
	}
}

/// Save every tag of a file unchanged, and verify they read back the same
pub fn save_unchanged(content: &[u8]) {
	let mut file = temp_file(content);
	let tagged_file = read(&mut file, ParseOptions::new());

	file.rewind().unwrap();
	tagged_file.save_to(&mut file, WriteOptions::default()).unwrap();

	let reread = read(&mut file, ParseOptions::new());
	assert_eq!(reread.tags(), tagged_file.tags());
	assert_eq!(
		reread.properties().duration(),
		tagged_file.properties().duration()
	);
}
