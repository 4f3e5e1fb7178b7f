use crate::util::{self, read, temp_file};

use tagcraft::config::{ParseOptions, WriteOptions};
use tagcraft::file::{AudioFile, FileType, TaggedFileExt};
use tagcraft::mp4::{Ilst, Mp4Codec, Mp4File};
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
fn read_file() {
	let mut file = temp_file(&util::mp4());
	let tagged_file = read(&mut file, ParseOptions::new());

	assert_eq!(tagged_file.file_type(), FileType::Mp4);
	util::verify_artist(&tagged_file, TagType::Mp4Ilst, "Foo artist", 1);

	file.rewind().unwrap();
	let mp4_file = Mp4File::read_from(&mut file, ParseOptions::new()).unwrap();
	assert_eq!(mp4_file.ftyp(), "M4A ");

	let properties = mp4_file.properties();
	assert_eq!(properties.codec(), &Mp4Codec::AAC);
	assert_eq!(properties.duration(), Duration::from_secs(2));
	assert_eq!(properties.sample_rate(), 44100);
	assert_eq!(properties.channels(), 2);
}

#[test_log::test]
fn write() {
	util::artist_round_trip(&util::mp4(), TagType::Mp4Ilst, 1);
}

#[test_log::test]
fn remove() {
	util::remove_tag(&util::mp4(), TagType::Mp4Ilst);
}

#[test_log::test]
fn read_no_properties() {
	util::no_properties_test(&util::mp4());
}

#[test_log::test]
fn read_no_tags() {
	util::no_tag_test(&util::mp4());
}

#[test_log::test]
fn save_unchanged() {
	util::save_unchanged(&util::mp4());
}

#[test_log::test]
fn chunk_offsets_follow_the_audio() {
	let original = util::mp4();
	let (offset, mdat_payload) = util::mp4_chunk_offset(&original);
	assert_eq!(offset as usize, mdat_payload);

	let mut file = temp_file(&original);
	let mut mp4_file = Mp4File::read_from(&mut file, ParseOptions::new()).unwrap();

	let mut ilst = Ilst::new();
	ilst.set_artist(String::from("Foo artist"));
	ilst.set_title("A very long title ".repeat(64));
	mp4_file.set_ilst(ilst);

	file.rewind().unwrap();
	mp4_file.save_to(&mut file, WriteOptions::default()).unwrap();

	let grown = file_bytes(&mut file);
	assert!(grown.len() > original.len());

	let (offset, mdat_payload) = util::mp4_chunk_offset(&grown);
	assert_eq!(offset as usize, mdat_payload);
	assert_eq!(&grown[mdat_payload..mdat_payload + 4], &[0xAB; 4]);

	// Shrink it back down
	mp4_file.remove_ilst();
	file.rewind().unwrap();
	mp4_file.save_to(&mut file, WriteOptions::default()).unwrap();

	let shrunk = file_bytes(&mut file);
	let (offset, mdat_payload) = util::mp4_chunk_offset(&shrunk);
	assert_eq!(offset as usize, mdat_payload);
	assert_eq!(&shrunk[mdat_payload..], &[0xAB; 32_000]);
}

#[test_log::test]
fn create_udta() {
	let mut file = temp_file(&util::mp4_with_udta(&[]));

	let tagged_file = read(&mut file, ParseOptions::new());
	assert!(tagged_file.tag(TagType::Mp4Ilst).is_none());

	file.rewind().unwrap();
	let mut mp4_file = Mp4File::read_from(&mut file, ParseOptions::new()).unwrap();
	let mut ilst = Ilst::new();
	ilst.set_artist(String::from("Foo artist"));
	mp4_file.set_ilst(ilst);

	file.rewind().unwrap();
	mp4_file.save_to(&mut file, WriteOptions::default()).unwrap();

	let tagged_file = read(&mut file, ParseOptions::new());
	util::verify_artist(&tagged_file, TagType::Mp4Ilst, "Foo artist", 1);

	let content = file_bytes(&mut file);
	let (offset, mdat_payload) = util::mp4_chunk_offset(&content);
	assert_eq!(offset as usize, mdat_payload);
}
