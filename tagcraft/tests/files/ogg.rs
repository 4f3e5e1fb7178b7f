use crate::util::{self, read, temp_file};

use tagcraft::config::{ParseOptions, WriteOptions};
use tagcraft::file::{AudioFile, FileType, TaggedFileExt};
use tagcraft::ogg::{OpusFile, VorbisComments, VorbisFile};
use tagcraft::tag::{Accessor, TagType};

use std::io::{Read, Seek};
use std::time::Duration;

fn file_bytes(file: &mut std::fs::File) -> Vec<u8> {
	let mut content = Vec::new();
	file.rewind().unwrap();
	file.read_to_end(&mut content).unwrap();
	content
}

#[test_log::test]
fn opus_read() {
	let mut file = temp_file(&util::opus());
	let tagged_file = read(&mut file, ParseOptions::new());

	assert_eq!(tagged_file.file_type(), FileType::Opus);
	util::verify_artist(&tagged_file, TagType::VorbisComments, "Foo artist", 1);

	file.rewind().unwrap();
	let opus_file = OpusFile::read_from(&mut file, ParseOptions::new()).unwrap();
	let properties = opus_file.properties();
	assert_eq!(properties.duration(), Duration::from_secs(2));
	assert_eq!(properties.channels(), 2);
	assert_eq!(properties.input_sample_rate(), 44100);
	assert_eq!(properties.pre_skip(), 312);
}

#[test_log::test]
fn opus_write() {
	util::artist_round_trip(&util::opus(), TagType::VorbisComments, 1);
}

#[test_log::test]
fn opus_remove() {
	util::remove_tag(&util::opus(), TagType::VorbisComments);
}

#[test_log::test]
fn opus_read_no_properties() {
	util::no_properties_test(&util::opus());
}

#[test_log::test]
fn opus_read_no_tags() {
	util::no_tag_test(&util::opus());
}

#[test_log::test]
fn vorbis_read() {
	let mut file = temp_file(&util::vorbis());
	let tagged_file = read(&mut file, ParseOptions::new());

	assert_eq!(tagged_file.file_type(), FileType::Vorbis);
	util::verify_artist(&tagged_file, TagType::VorbisComments, "Foo artist", 1);

	file.rewind().unwrap();
	let vorbis_file = VorbisFile::read_from(&mut file, ParseOptions::new()).unwrap();
	let properties = vorbis_file.properties();
	assert_eq!(properties.duration(), Duration::from_secs(2));
	assert_eq!(properties.sample_rate(), 44100);
	assert_eq!(properties.channels(), 2);
	assert_eq!(properties.bitrate_nominal(), 128_000);
	assert_eq!(properties.audio_bitrate(), 128);
}

#[test_log::test]
fn vorbis_write() {
	util::artist_round_trip(&util::vorbis(), TagType::VorbisComments, 1);
}

#[test_log::test]
fn vorbis_remove() {
	util::remove_tag(&util::vorbis(), TagType::VorbisComments);
}

#[test_log::test]
fn vorbis_read_no_properties() {
	util::no_properties_test(&util::vorbis());
}

#[test_log::test]
fn vorbis_read_no_tags() {
	util::no_tag_test(&util::vorbis());
}

#[test_log::test]
fn vorbis_save_unchanged() {
	util::save_unchanged(&util::vorbis());
}

#[test_log::test]
fn pages_stay_valid() {
	for content in [util::opus(), util::vorbis()] {
		let mut file = temp_file(&content);
		let mut tagged_file = read(&mut file, ParseOptions::new());

		// Large enough to span multiple pages
		util::set_artist(
			&mut file,
			&mut tagged_file,
			TagType::VorbisComments,
			"Foo artist",
			&"Bar artist".repeat(10_000),
			1,
		);

		let written = file_bytes(&mut file);
		assert!(written.len() > content.len() + 100_000);
		util::verify_ogg_pages(&written);

		// The audio page is untouched, apart from its sequence number and checksum
		assert_eq!(written[written.len() - 200..], content[content.len() - 200..]);
	}
}

#[test_log::test]
fn vendor_is_kept() {
	let mut file = temp_file(&util::opus());
	let mut opus_file = OpusFile::read_from(&mut file, ParseOptions::new()).unwrap();
	assert_eq!(opus_file.vorbis_comments().vendor(), "tagcraft");

	// An empty vendor keeps the file's
	let mut comments = VorbisComments::default();
	comments.set_title(String::from("Foo title"));
	opus_file.set_vorbis_comments(comments);

	file.rewind().unwrap();
	opus_file.save_to(&mut file, WriteOptions::default()).unwrap();

	file.rewind().unwrap();
	let opus_file = OpusFile::read_from(&mut file, ParseOptions::new()).unwrap();
	assert_eq!(opus_file.vorbis_comments().vendor(), "tagcraft");
	assert_eq!(opus_file.vorbis_comments().title().as_deref(), Some("Foo title"));
}
