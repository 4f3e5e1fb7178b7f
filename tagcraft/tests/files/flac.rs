use crate::util::{self, read, temp_file};

use tagcraft::config::{ParseOptions, WriteOptions};
use tagcraft::file::{AudioFile, FileType, TaggedFileExt};
use tagcraft::flac::FlacFile;
use tagcraft::ogg::VorbisComments;
use tagcraft::tag::{Accessor, TagType};

use std::io::Seek;
use std::time::Duration;

#[test_log::test]
fn read_file() {
	let mut file = temp_file(&util::flac());
	let tagged_file = read(&mut file, ParseOptions::new());

	assert_eq!(tagged_file.file_type(), FileType::Flac);
	util::verify_artist(&tagged_file, TagType::VorbisComments, "Foo artist", 1);

	let properties = tagged_file.properties();
	assert_eq!(properties.duration(), Duration::from_secs(2));
	assert_eq!(properties.sample_rate(), Some(44100));
	assert_eq!(properties.channels(), Some(2));
	assert_eq!(properties.bit_depth(), Some(16));
}

#[test_log::test]
fn write() {
	util::artist_round_trip(&util::flac(), TagType::VorbisComments, 1);
}

#[test_log::test]
fn remove() {
	util::remove_tag(&util::flac(), TagType::VorbisComments);
}

#[test_log::test]
fn read_no_properties() {
	util::no_properties_test(&util::flac());
}

#[test_log::test]
fn read_no_tags() {
	util::no_tag_test(&util::flac());
}

#[test_log::test]
fn vendor_survives_generic_writes() {
	let mut file = temp_file(&util::flac());

	let mut tagged_file = read(&mut file, ParseOptions::new());
	util::set_artist(
		&mut file,
		&mut tagged_file,
		TagType::VorbisComments,
		"Foo artist",
		"Bar artist",
		1,
	);

	file.rewind().unwrap();
	let flac_file = FlacFile::read_from(&mut file, ParseOptions::new()).unwrap();
	let comments = flac_file.vorbis_comments().unwrap();
	assert_eq!(comments.vendor(), "tagcraft");
	assert_eq!(comments.artist().as_deref(), Some("Bar artist"));
}

#[test_log::test]
fn grow_tag() {
	let mut file = temp_file(&util::flac());
	let mut flac_file = FlacFile::read_from(&mut file, ParseOptions::new()).unwrap();

	let mut comments = VorbisComments::default();
	comments.set_title("A".repeat(4096));
	flac_file.set_vorbis_comments(comments);

	file.rewind().unwrap();
	flac_file.save_to(&mut file, WriteOptions::default()).unwrap();

	file.rewind().unwrap();
	let reread = FlacFile::read_from(&mut file, ParseOptions::new()).unwrap();
	assert_eq!(reread.vorbis_comments().unwrap().title().map(|t| t.len()), Some(4096));
	assert_eq!(reread.properties().duration(), Duration::from_secs(2));
}

#[test_log::test]
fn save_unchanged() {
	util::save_unchanged(&util::flac());
}
