#![allow(missing_docs)]

#[allow(dead_code)]
#[path = "files/util/mod.rs"]
mod util;

use tagcraft::commit::{ModificationListener, Veto};
use tagcraft::config::EngineOptions;
use tagcraft::error::ErrorKind;
use tagcraft::prelude::*;
use tagcraft::registry::Registry;
use tagcraft::tag::TagType;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

type Log = Arc<Mutex<Vec<String>>>;

fn scratch(name: &str, content: &[u8]) -> (tempfile::TempDir, PathBuf) {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join(name);
	fs::write(&path, content).unwrap();
	(dir, path)
}

fn dir_entries(dir: &tempfile::TempDir) -> usize {
	fs::read_dir(dir.path()).unwrap().count()
}

fn artist(registry: &Registry, path: &Path, tag_type: TagType) -> Option<String> {
	let handle = registry.read_path(path).unwrap();
	handle
		.tag(tag_type)
		.and_then(|tag| tag.artist().map(|artist| artist.into_owned()))
}

struct Recorder {
	name: &'static str,
	log: Log,
	veto_before: bool,
	veto_after: bool,
}

impl Recorder {
	fn new(name: &'static str, log: &Log) -> Self {
		Self {
			name,
			log: Arc::clone(log),
			veto_before: false,
			veto_after: false,
		}
	}

	fn push(&self, event: &str) {
		self.log.lock().unwrap().push(format!("{}:{event}", self.name));
	}
}

impl ModificationListener for Recorder {
	fn before_modify(&self, _path: &Path, is_deleting: bool) -> Result<(), Veto> {
		self.push(if is_deleting { "before(delete)" } else { "before" });
		if self.veto_before {
			return Err(Veto::new("before"));
		}

		Ok(())
	}

	fn after_modify(&self, original: &Path, staged: &Path) -> Result<(), Veto> {
		assert_ne!(original, staged);
		assert!(staged.exists());
		assert_eq!(original.parent(), staged.parent());

		self.push("after");
		if self.veto_after {
			return Err(Veto::new("after"));
		}

		Ok(())
	}

	fn after_operation_finished(&self, file: &Path, committed: bool) {
		assert!(file.exists());
		self.push(if committed { "finished" } else { "aborted" });
	}

	fn vetoed(&self, _path: &Path, veto: &Veto) {
		self.push(&format!("vetoed({})", veto.reason()));
	}
}

#[test_log::test]
fn every_format_round_trips() {
	let registry = Registry::new(EngineOptions::new());

	for (name, content, tag_type) in [
		("a.wma", util::asf(), TagType::Asf),
		("a.flac", util::flac(), TagType::VorbisComments),
		("a.m4a", util::mp4(), TagType::Mp4Ilst),
		("a.opus", util::opus(), TagType::VorbisComments),
		("a.ogg", util::vorbis(), TagType::VorbisComments),
		("a.wav", util::wav(), TagType::Id3v2),
	] {
		println!("File: {name}");
		let (_dir, path) = scratch(name, &content);

		let mut handle = registry.read_path(&path).unwrap();
		assert_eq!(handle.primary_tag_type(), tag_type);
		assert_eq!(
			handle.primary_tag().and_then(|tag| tag.artist()).as_deref(),
			Some("Foo artist")
		);

		handle
			.primary_tag_mut()
			.unwrap()
			.set_artist(String::from("Bar artist"));
		registry.write(&handle).unwrap();

		assert_eq!(artist(&registry, &path, tag_type).as_deref(), Some("Bar artist"));
		assert!(!registry.read_path(&path).unwrap().properties().is_empty());
	}
}

#[test_log::test]
fn second_write_is_identical() {
	let registry = Registry::new(EngineOptions::new());

	for (name, content) in [
		("a.wma", util::asf()),
		("a.flac", util::flac()),
		("a.m4a", util::mp4()),
		("a.opus", util::opus()),
		("a.ogg", util::vorbis()),
		("a.wav", util::wav()),
	] {
		println!("File: {name}");
		let (_dir, path) = scratch(name, &content);

		let mut handle = registry.read_path(&path).unwrap();
		handle
			.primary_tag_mut()
			.unwrap()
			.set_title(String::from("Foo title"));

		registry.write(&handle).unwrap();
		let first = fs::read(&path).unwrap();

		let handle = registry.read_path(&path).unwrap();
		registry.write(&handle).unwrap();
		assert_eq!(fs::read(&path).unwrap(), first);
	}
}

#[test_log::test]
fn delete_every_format() {
	let registry = Registry::new(EngineOptions::new());

	for (name, content) in [
		("a.wma", util::asf()),
		("a.flac", util::flac()),
		("a.m4a", util::mp4()),
		("a.opus", util::opus()),
		("a.ogg", util::vorbis()),
		("a.wav", util::wav()),
	] {
		println!("File: {name}");
		let (_dir, path) = scratch(name, &content);

		let handle = registry.read_path(&path).unwrap();
		registry.delete(&handle).unwrap();

		let handle = registry.read_path(&path).unwrap();
		assert!(handle.tags().iter().all(TagExt::is_empty));
		assert!(!handle.properties().is_empty());
	}
}

#[test_log::test]
fn wrong_extension_falls_back_to_content() {
	let registry = Registry::new(EngineOptions::new());
	let (_dir, path) = scratch("actually_flac.mp4", &util::flac());

	let handle = registry.read_path(&path).unwrap();
	assert_eq!(handle.file_type(), tagcraft::file::FileType::Flac);
}

#[test_log::test]
fn listener_order() {
	let log = Log::default();

	let mut registry = Registry::new(EngineOptions::new());
	registry.add_listener(Recorder::new("a", &log));
	registry.add_listener(Recorder::new("b", &log));

	let (_dir, path) = scratch("a.flac", &util::flac());
	let handle = registry.read_path(&path).unwrap();
	registry.write(&handle).unwrap();

	assert_eq!(
		*log.lock().unwrap(),
		[
			"a:before", "b:before", "a:after", "b:after", "a:finished", "b:finished"
		]
	);
}

#[test_log::test]
fn veto_before_staging() {
	let log = Log::default();

	let mut vetoing = Recorder::new("a", &log);
	vetoing.veto_before = true;

	let mut registry = Registry::new(EngineOptions::new());
	registry.add_listener(vetoing);
	registry.add_listener(Recorder::new("b", &log));

	let content = util::flac();
	let (dir, path) = scratch("a.flac", &content);

	let mut handle = registry.read_path(&path).unwrap();
	handle
		.primary_tag_mut()
		.unwrap()
		.set_artist(String::from("Bar artist"));

	let err = registry.write(&handle).unwrap_err();
	assert!(matches!(err.kind(), ErrorKind::Veto(veto) if veto.reason() == "before"));

	// The second listener was never asked
	assert_eq!(
		*log.lock().unwrap(),
		[
			"a:before",
			"a:vetoed(before)",
			"b:vetoed(before)",
			"a:aborted",
			"b:aborted"
		]
	);

	assert_eq!(fs::read(&path).unwrap(), content);
	assert_eq!(dir_entries(&dir), 1);
}

#[test_log::test]
fn veto_after_staging() {
	let log = Log::default();

	let mut vetoing = Recorder::new("a", &log);
	vetoing.veto_after = true;

	let mut registry = Registry::new(EngineOptions::new());
	registry.add_listener(vetoing);

	let content = util::mp4();
	let (dir, path) = scratch("a.m4a", &content);

	let mut handle = registry.read_path(&path).unwrap();
	handle
		.primary_tag_mut()
		.unwrap()
		.set_title(String::from("Foo title"));

	let err = registry.write(&handle).unwrap_err();
	assert!(matches!(err.kind(), ErrorKind::Veto(_)));

	// The staged copy is gone, and the original is untouched
	assert_eq!(fs::read(&path).unwrap(), content);
	assert_eq!(dir_entries(&dir), 1);
}

#[test_log::test]
fn deletes_are_flagged() {
	let log = Log::default();

	let mut registry = Registry::new(EngineOptions::new());
	registry.add_listener(Recorder::new("a", &log));

	let (_dir, path) = scratch("a.opus", &util::opus());
	let mut handle = registry.read_path(&path).unwrap();

	// Writing a handle with no tags left is a delete
	handle.clear();
	registry.write(&handle).unwrap();

	assert_eq!(
		*log.lock().unwrap(),
		["a:before(delete)", "a:after", "a:finished"]
	);
}

#[test_log::test]
fn both_strategies() {
	for preserve_file_identity in [true, false] {
		let registry =
			Registry::new(EngineOptions::new().preserve_file_identity(preserve_file_identity));

		let (dir, path) = scratch("a.wav", &util::wav());
		let mut handle = registry.read_path(&path).unwrap();
		handle
			.tag_mut(TagType::RiffInfo)
			.unwrap()
			.set_artist(String::from("Bar artist"));

		registry.write(&handle).unwrap();

		assert_eq!(
			artist(&registry, &path, TagType::RiffInfo).as_deref(),
			Some("Bar artist")
		);
		assert_eq!(dir_entries(&dir), 1);
	}
}

#[cfg(unix)]
#[test_log::test]
fn preserved_identity() {
	use std::os::unix::fs::MetadataExt;

	let (dir, path) = scratch("a.flac", &util::flac());
	let link = dir.path().join("link.flac");
	fs::hard_link(&path, &link).unwrap();

	let inode = fs::metadata(&path).unwrap().ino();

	let registry = Registry::new(EngineOptions::new().preserve_file_identity(true));
	let mut handle = registry.read_path(&path).unwrap();
	handle
		.primary_tag_mut()
		.unwrap()
		.set_artist(String::from("Bar artist"));
	registry.write(&handle).unwrap();

	assert_eq!(fs::metadata(&path).unwrap().ino(), inode);

	// The hard link sees the change
	assert_eq!(
		artist(&registry, &link, TagType::VorbisComments).as_deref(),
		Some("Bar artist")
	);
}

#[test_log::test]
fn too_small() {
	let registry = Registry::new(EngineOptions::new().min_file_size(1024 * 1024));

	let content = util::flac();
	let (_dir, path) = scratch("a.flac", &content);
	let handle = registry.read_path(&path).unwrap();

	let err = registry.write(&handle).unwrap_err();
	assert!(matches!(err.kind(), ErrorKind::FileTooSmall(len) if *len == content.len() as u64));
	assert_eq!(fs::read(&path).unwrap(), content);
}

#[test_log::test]
fn read_only() {
	let registry = Registry::new(EngineOptions::new());

	let content = util::flac();
	let (_dir, path) = scratch("a.flac", &content);
	let handle = registry.read_path(&path).unwrap();

	let mut permissions = fs::metadata(&path).unwrap().permissions();
	permissions.set_readonly(true);
	fs::set_permissions(&path, permissions).unwrap();

	let err = registry.write(&handle).unwrap_err();
	assert!(matches!(err.kind(), ErrorKind::NotWritable));
	assert_eq!(fs::read(&path).unwrap(), content);
}
