//! Reader and writer dispatch
//!
//! Every supported format has exactly one [`FormatHandler`], a stateless unit struct that knows
//! how to read the format into a [`TaggedFile`] and how to write a [`Tag`] back. A [`Registry`]
//! picks the handler for a file, by extension or by content, and routes every write through a
//! [`CommitEngine`].

use crate::commit::{CommitEngine, ModificationListener};
use crate::config::{EngineOptions, ParseOptions, WriteOptions};
use crate::error::Result;
use crate::file::{AudioFile, AudioFileHandle, FileType, TaggedFile};
use crate::macros::err;
use crate::probe::Probe;
use crate::tag::{Tag, TagType};
use crate::util::io::SeekRead;

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

/// A reader and writer pair for a single [`FileType`]
///
/// Handlers hold no state, and are shared as `&'static dyn FormatHandler`.
pub trait FormatHandler: Send + Sync {
	/// The format this handler reads and writes
	fn file_type(&self) -> FileType;

	/// The lowercase extensions this handler is registered under
	fn extensions(&self) -> &'static [&'static str];

	/// The tag types the format can hold
	fn tag_types(&self) -> &'static [TagType];

	/// Read a file, starting at the reader's current position
	///
	/// # Errors
	///
	/// The reader doesn't contain a valid file of this format
	fn read(&self, reader: &mut dyn SeekRead, parse_options: ParseOptions) -> Result<TaggedFile>;

	/// Write a single tag to `file`
	///
	/// An empty tag removes the tag from the file.
	///
	/// # Errors
	///
	/// * The tag type isn't supported by the format
	/// * `file` doesn't contain a valid file of this format
	fn write(&self, file: &mut File, tag: &Tag, write_options: WriteOptions) -> Result<()> {
		crate::tag::utils::write_tag(tag, file, self.file_type(), write_options)
	}
}

macro_rules! handlers {
	($($name:ident => $file:path, $file_type:ident, [$($ext:literal),+], [$($tag_type:ident),+]);+ $(;)?) => {
		paste::paste! {
			$(
				#[doc = "The [`FormatHandler`] for [`FileType::" $file_type "`]"]
				#[derive(Copy, Clone, Debug, Default)]
				pub struct [<$name Handler>];

				impl FormatHandler for [<$name Handler>] {
					fn file_type(&self) -> FileType {
						FileType::$file_type
					}

					fn extensions(&self) -> &'static [&'static str] {
						&[$($ext),+]
					}

					fn tag_types(&self) -> &'static [TagType] {
						&[$(TagType::$tag_type),+]
					}

					fn read(
						&self,
						mut reader: &mut dyn SeekRead,
						parse_options: ParseOptions,
					) -> Result<TaggedFile> {
						<$file>::read_from(&mut reader, parse_options).map(Into::into)
					}
				}
			)+

			const HANDLERS: &[&dyn FormatHandler] = &[$(&[<$name Handler>]),+];

			/// The handler for a [`FileType`]
			pub fn handler_for(file_type: FileType) -> &'static dyn FormatHandler {
				match file_type {
					$(FileType::$file_type => &[<$name Handler>],)+
				}
			}
		}
	};
}

handlers! {
	Asf    => crate::asf::AsfFile,         Asf,    ["asf", "wma", "wmv"], [Asf];
	Flac   => crate::flac::FlacFile,       Flac,   ["flac"], [VorbisComments];
	Mp4    => crate::mp4::Mp4File,         Mp4,    ["mp4", "m4a", "m4b", "m4p", "m4r", "m4v", "3gp"], [Mp4Ilst];
	Opus   => crate::ogg::OpusFile,        Opus,   ["opus"], [VorbisComments];
	Vorbis => crate::ogg::VorbisFile,      Vorbis, ["ogg", "oga"], [VorbisComments];
	Wav    => crate::iff::wav::WavFile,    Wav,    ["wav", "wave"], [Id3v2, RiffInfo];
}

/// The handler registered under an extension, compared case-insensitively
pub fn handler_for_extension(ext: &str) -> Option<&'static dyn FormatHandler> {
	HANDLERS
		.iter()
		.copied()
		.find(|handler| handler.extensions().iter().any(|e| e.eq_ignore_ascii_case(ext)))
}

/// Reads and writes files through the matching [`FormatHandler`]
///
/// A `Registry` carries its own [`EngineOptions`] and listeners, nothing is shared between
/// instances.
///
/// # Examples
///
/// ```rust,no_run
/// use tagcraft::config::EngineOptions;
/// use tagcraft::file::TaggedFileExt;
/// use tagcraft::registry::Registry;
///
/// # fn main() -> tagcraft::error::Result<()> {
/// let registry = Registry::new(EngineOptions::new().preserve_file_identity(false));
///
/// let mut handle = registry.read_path("song.opus")?;
/// handle.clear();
///
/// // No tags left, so this removes the Vorbis comments entirely
/// registry.write(&handle)?;
/// # Ok(()) }
/// ```
pub struct Registry {
	engine: CommitEngine,
}

impl Registry {
	/// Create a `Registry` with no listeners
	pub fn new(options: EngineOptions) -> Self {
		Self {
			engine: CommitEngine::new(options),
		}
	}

	/// The registry's options
	pub fn options(&self) -> &EngineOptions {
		self.engine.options()
	}

	/// Register a [`ModificationListener`] for every write and delete
	pub fn add_listener<L>(&mut self, listener: L)
	where
		L: ModificationListener + 'static,
	{
		self.engine.add_listener(listener);
	}

	fn parse_options(&self) -> ParseOptions {
		self.engine.options().parse_options
	}

	/// Read a file, selecting the handler by extension
	///
	/// # Errors
	///
	/// * [`ErrorKind::UnknownFormat`](crate::error::ErrorKind::UnknownFormat): No handler is
	///   registered for `ext`
	/// * The reader doesn't contain a valid file of that format
	pub fn read_by_extension<R>(&self, reader: &mut R, ext: &str) -> Result<TaggedFile>
	where
		R: Read + Seek,
	{
		let Some(handler) = handler_for_extension(ext) else {
			log::debug!("Registry: No handler for extension `{ext}`");
			err!(UnknownFormat);
		};

		handler.read(reader, self.parse_options())
	}

	/// Read a file, selecting the handler from its leading bytes
	///
	/// # Errors
	///
	/// * [`ErrorKind::UnknownFormat`](crate::error::ErrorKind::UnknownFormat): The content
	///   matches no handler
	/// * The reader doesn't contain a valid file of the detected format
	pub fn read_by_magic<R>(&self, reader: &mut R) -> Result<TaggedFile>
	where
		R: Read + Seek,
	{
		Probe::new(reader)
			.guess_file_type()?
			.options(self.parse_options())
			.read()
	}

	/// Read the file at `path`
	///
	/// The extension is tried first. When there is no handler for it, or the handler fails, the
	/// content decides.
	///
	/// # Errors
	///
	/// * `path` can't be opened
	/// * See [`Registry::read_by_extension`] and [`Registry::read_by_magic`]
	pub fn read_path(&self, path: impl AsRef<Path>) -> Result<AudioFileHandle> {
		let path = path.as_ref();
		log::debug!("Registry: Reading `{}`", path.display());

		let mut reader = BufReader::new(File::open(path)?);

		let by_extension = path
			.extension()
			.and_then(|ext| ext.to_str())
			.and_then(handler_for_extension);

		let tagged_file = match by_extension {
			Some(handler) => match handler.read(&mut reader, self.parse_options()) {
				Ok(tagged_file) => tagged_file,
				Err(e) => {
					reader.rewind()?;

					let probe = Probe::new(&mut reader).guess_file_type()?;
					match probe.file_type() {
						Some(file_type) if file_type != handler.file_type() => {
							log::warn!(
								"Registry: `{}` is not a {:?} file, reading as {file_type:?}",
								path.display(),
								handler.file_type()
							);
							probe.options(self.parse_options()).read()?
						},
						_ => return Err(e),
					}
				},
			},
			None => self.read_by_magic(&mut reader)?,
		};

		Ok(AudioFileHandle::new(path, tagged_file))
	}

	/// Write the tags of `handle` back to its file
	///
	/// A handle whose tags are all empty is handed to [`Registry::delete`].
	///
	/// # Errors
	///
	/// * [`ErrorKind::UnsupportedTag`](crate::error::ErrorKind::UnsupportedTag): A tag can't be
	///   stored in the file's format. Nothing is written in this case.
	/// * See [`CommitEngine::commit`]
	pub fn write(&self, handle: &AudioFileHandle) -> Result<()> {
		if handle.is_tagless() {
			log::debug!("Registry: `{}` has no tags left", handle.path().display());
			return self.delete(handle);
		}

		let handler = handler_for(handle.file_type);
		if let Some(tag) = handle
			.tags
			.iter()
			.find(|tag| !handler.tag_types().contains(&tag.tag_type()))
		{
			log::error!(
				"Registry: {:?} can't hold a {:?} tag",
				handler.file_type(),
				tag.tag_type()
			);
			err!(UnsupportedTag);
		}

		let write_options = self.engine.options().write_options;
		self.engine.commit(handle.path(), false, |file| {
			for tag in &handle.tags {
				file.rewind()?;
				handler.write(file, tag, write_options)?;
			}

			Ok(())
		})
	}

	/// Remove every tag from the file of `handle`
	///
	/// The handle itself is left as it is.
	///
	/// # Errors
	///
	/// See [`CommitEngine::commit`]
	pub fn delete(&self, handle: &AudioFileHandle) -> Result<()> {
		let handler = handler_for(handle.file_type);

		let write_options = self.engine.options().write_options;
		self.engine.commit(handle.path(), true, |file| {
			for tag_type in handler.tag_types() {
				file.rewind()?;
				handler.write(file, &Tag::new(*tag_type), write_options)?;
			}

			Ok(())
		})
	}
}

#[cfg(test)]
mod tests {
	use super::{Registry, handler_for, handler_for_extension};
	use crate::commit::{ModificationListener, Veto};
	use crate::config::EngineOptions;
	use crate::error::ErrorKind;
	use crate::file::{EXTENSIONS, FileType, TaggedFileExt};
	use crate::tag::{Accessor, Tag, TagType};

	use std::io::Cursor;
	use std::path::{Path, PathBuf};

	// 16-bit mono, 8kHz, 200 bytes of silence
	fn wav() -> Vec<u8> {
		let mut body = b"WAVEfmt \x10\0\0\0".to_vec();
		body.extend(b"\x01\x00\x01\x00\x40\x1F\x00\x00\x80\x3E\x00\x00\x02\x00\x10\x00");
		body.extend(b"data");
		body.extend(200_u32.to_le_bytes());
		body.extend([0; 200]);

		let mut wav = b"RIFF".to_vec();
		wav.extend((body.len() as u32).to_le_bytes());
		wav.extend(body);
		wav
	}

	fn scratch(name: &str, contents: &[u8]) -> (tempfile::TempDir, PathBuf) {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join(name);
		std::fs::write(&path, contents).unwrap();
		(dir, path)
	}

	#[test_log::test]
	fn every_extension_has_one_handler() {
		for ext in EXTENSIONS {
			let handler = handler_for_extension(ext).unwrap();
			assert_eq!(FileType::from_ext(ext), Some(handler.file_type()));
			assert_eq!(handler_for(handler.file_type()).file_type(), handler.file_type());
		}

		assert!(handler_for_extension("M4A").is_some());
		assert!(handler_for_extension("mp3").is_none());
	}

	#[test_log::test]
	fn read_by_extension_and_magic() {
		let registry = Registry::new(EngineOptions::new());

		let file = registry
			.read_by_extension(&mut Cursor::new(wav()), "WAV")
			.unwrap();
		assert_eq!(file.file_type(), FileType::Wav);

		let file = registry.read_by_magic(&mut Cursor::new(wav())).unwrap();
		assert_eq!(file.file_type(), FileType::Wav);

		let err = registry
			.read_by_extension(&mut Cursor::new(wav()), "mp3")
			.unwrap_err();
		assert!(matches!(err.kind(), ErrorKind::UnknownFormat));

		let err = registry
			.read_by_magic(&mut Cursor::new([0xAB; 64]))
			.unwrap_err();
		assert!(matches!(err.kind(), ErrorKind::UnknownFormat));
	}

	#[test_log::test]
	fn read_path_falls_back_to_magic() {
		let registry = Registry::new(EngineOptions::new());

		let (_dir, path) = scratch("song.flac", &wav());
		let handle = registry.read_path(&path).unwrap();
		assert_eq!(handle.file_type(), FileType::Wav);
		assert_eq!(handle.extension(), Some("flac"));

		let (_dir, path) = scratch("song.bin", &wav());
		assert_eq!(registry.read_path(&path).unwrap().file_type(), FileType::Wav);
	}

	#[test_log::test]
	fn write_and_delete() {
		let registry = Registry::new(EngineOptions::new());
		let (_dir, path) = scratch("song.wav", &wav());

		let mut handle = registry.read_path(&path).unwrap();
		assert!(handle.is_tagless());

		let tag = handle.tag_or_insert(TagType::RiffInfo).unwrap();
		tag.set_title(String::from("Foo title"));
		registry.write(&handle).unwrap();

		let handle = registry.read_path(&path).unwrap();
		let tag = handle.tag(TagType::RiffInfo).unwrap();
		assert_eq!(tag.title().as_deref(), Some("Foo title"));

		registry.delete(&handle).unwrap();
		assert_eq!(std::fs::read(&path).unwrap(), wav());
	}

	#[test_log::test]
	fn unsupported_tag_touches_nothing() {
		let registry = Registry::new(EngineOptions::new());
		let (_dir, path) = scratch("song.wav", &wav());

		let mut handle = registry.read_path(&path).unwrap();
		let mut tag = Tag::new(TagType::Mp4Ilst);
		tag.set_title(String::from("Foo title"));
		handle.tags.push(tag);

		let err = registry.write(&handle).unwrap_err();
		assert!(matches!(err.kind(), ErrorKind::UnsupportedTag));
		assert_eq!(std::fs::read(&path).unwrap(), wav());
	}

	struct DenyDeletes;

	impl ModificationListener for DenyDeletes {
		fn before_modify(&self, _path: &Path, is_deleting: bool) -> Result<(), Veto> {
			if is_deleting {
				return Err(Veto::new("deletes are disabled"));
			}

			Ok(())
		}
	}

	#[test_log::test]
	fn empty_write_is_a_delete() {
		let mut registry = Registry::new(EngineOptions::new());
		registry.add_listener(DenyDeletes);

		let (_dir, path) = scratch("song.wav", &wav());
		let handle = registry.read_path(&path).unwrap();

		let err = registry.write(&handle).unwrap_err();
		assert!(matches!(err.kind(), ErrorKind::Veto(_)));
		assert_eq!(std::fs::read(&path).unwrap(), wav());
	}
}
