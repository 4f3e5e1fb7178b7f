use crate::util::{self, read, temp_file};

use tagcraft::config::ParseOptions;
use tagcraft::file::{AudioFile, FileType, TaggedFileExt};
use tagcraft::iff::wav::WavFile;
use tagcraft::tag::TagType;

use std::io::Seek;

#[test_log::test]
fn read_both_tags() {
	let mut file = temp_file(&util::wav());
	let tagged_file = read(&mut file, ParseOptions::new());

	assert_eq!(tagged_file.file_type(), FileType::Wav);

	// Both tags are read, the primary tag is ID3v2
	util::verify_artist(&tagged_file, TagType::Id3v2, "Foo artist", 1);
	util::verify_artist(&tagged_file, TagType::RiffInfo, "Foo artist", 1);
	assert_eq!(
		tagged_file.primary_tag().map(|tag| tag.tag_type()),
		Some(TagType::Id3v2)
	);
}

#[test_log::test]
fn properties() {
	let mut file = temp_file(&util::wav());
	let wav_file = WavFile::read_from(&mut file, ParseOptions::new()).unwrap();

	let properties = wav_file.properties();
	assert_eq!(properties.channels(), 2);
	assert_eq!(properties.sample_rate(), 44100);
	assert_eq!(properties.bit_depth(), 16);
	assert_eq!(properties.duration().as_secs(), 1);
}

#[test_log::test]
fn write_id3v2() {
	util::artist_round_trip(&util::wav(), TagType::Id3v2, 1);
}

#[test_log::test]
fn write_riff_info() {
	util::artist_round_trip(&util::wav(), TagType::RiffInfo, 1);
}

#[test_log::test]
fn writing_one_tag_keeps_the_other() {
	let mut file = temp_file(&util::wav());

	let mut tagged_file = read(&mut file, ParseOptions::new());
	util::set_artist(
		&mut file,
		&mut tagged_file,
		TagType::RiffInfo,
		"Foo artist",
		"Bar artist",
		1,
	);

	let tagged_file = read(&mut file, ParseOptions::new());
	util::verify_artist(&tagged_file, TagType::RiffInfo, "Bar artist", 1);
	util::verify_artist(&tagged_file, TagType::Id3v2, "Foo artist", 1);
}

#[test_log::test]
fn remove_id3v2() {
	util::remove_tag(&util::wav(), TagType::Id3v2);
}

#[test_log::test]
fn remove_riff_info() {
	util::remove_tag(&util::wav(), TagType::RiffInfo);
}

#[test_log::test]
fn remove_keeps_audio() {
	let content = util::wav();
	let mut file = temp_file(&content);

	TagType::RiffInfo.remove_from(&mut file).unwrap();
	TagType::Id3v2.remove_from(&mut file).unwrap();

	file.rewind().unwrap();
	let wav_file = WavFile::read_from(&mut file, ParseOptions::new()).unwrap();
	assert!(!wav_file.contains_tag());
	assert_eq!(wav_file.properties().duration().as_secs(), 1);
}

#[test_log::test]
fn read_no_properties() {
	util::no_properties_test(&util::wav());
}

#[test_log::test]
fn read_no_tags() {
	let mut file = temp_file(&util::wav());
	let tagged_file = read(&mut file, ParseOptions::new().read_tags(false));
	assert!(tagged_file.tags().is_empty());
	assert!(!tagged_file.properties().is_empty());
}

#[test_log::test]
fn save_unchanged() {
	util::save_unchanged(&util::wav());
}
