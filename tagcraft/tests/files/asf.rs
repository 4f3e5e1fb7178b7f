use crate::util::{self, read, temp_file};

use tagcraft::asf::{AsfFile, AsfTag};
use tagcraft::config::{ParseOptions, WriteOptions};
use tagcraft::file::{AudioFile, FileType, TaggedFileExt};
use tagcraft::tag::{Accessor, TagType};

use std::io::Seek;
use std::time::Duration;

#[test_log::test]
fn read_file() {
	let mut file = temp_file(&util::asf());
	let tagged_file = read(&mut file, ParseOptions::new());

	assert_eq!(tagged_file.file_type(), FileType::Asf);
	util::verify_artist(&tagged_file, TagType::Asf, "Foo artist", 1);

	file.rewind().unwrap();
	let asf_file = AsfFile::read_from(&mut file, ParseOptions::new()).unwrap();
	let properties = asf_file.properties();
	assert_eq!(properties.duration(), Duration::from_secs(2));
	assert_eq!(properties.sample_rate(), 44100);
	assert_eq!(properties.channels(), 2);
	assert_eq!(properties.bits_per_sample(), 16);
	assert_eq!(properties.codec_id(), 0x0161);
}

#[test_log::test]
fn write() {
	util::artist_round_trip(&util::asf(), TagType::Asf, 1);
}

#[test_log::test]
fn remove() {
	util::remove_tag(&util::asf(), TagType::Asf);
}

#[test_log::test]
fn read_no_properties() {
	util::no_properties_test(&util::asf());
}

#[test_log::test]
fn read_no_tags() {
	util::no_tag_test(&util::asf());
}

#[test_log::test]
fn save_unchanged() {
	util::save_unchanged(&util::asf());
}

#[test_log::test]
fn extended_descriptors() {
	let mut file = temp_file(&util::asf());
	let mut asf_file = AsfFile::read_from(&mut file, ParseOptions::new()).unwrap();

	let mut tag = AsfTag::default();
	tag.set_artist(String::from("Foo artist"));
	tag.set_album(String::from("Foo album"));
	tag.set_genre(String::from("Classical"));
	asf_file.set_asf_tag(tag);

	file.rewind().unwrap();
	asf_file.save_to(&mut file, WriteOptions::default()).unwrap();

	file.rewind().unwrap();
	let asf_file = AsfFile::read_from(&mut file, ParseOptions::new()).unwrap();
	let tag = asf_file.asf_tag().unwrap();
	assert_eq!(tag.artist().as_deref(), Some("Foo artist"));
	assert_eq!(tag.album().as_deref(), Some("Foo album"));
	assert_eq!(tag.genre().as_deref(), Some("Classical"));

	// The audio is untouched
	assert_eq!(asf_file.properties().duration(), Duration::from_secs(2));
}
