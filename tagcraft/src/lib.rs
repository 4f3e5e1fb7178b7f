//! Read, convert, and crash-safely write metadata in audio containers.
//!
//! # Supported Formats
//!
//! | Format     | Extensions                                      | Tags                            |
//! |------------|-------------------------------------------------|---------------------------------|
//! | ASF        | `asf`, `wma`, `wmv`                             | ASF metadata objects            |
//! | FLAC       | `flac`                                          | Vorbis Comments                 |
//! | MP4        | `mp4`, `m4a`, `m4b`, `m4p`, `m4r`, `m4v`, `3gp` | `ilst`                          |
//! | Ogg Opus   | `opus`                                          | Vorbis Comments                 |
//! | Ogg Vorbis | `ogg`, `oga`                                    | Vorbis Comments                 |
//! | WAV        | `wav`, `wave`                                   | ID3v2, RIFF INFO                |
//!
//! # Examples
//!
//! ## Reading and writing through a registry
//!
//! A [`Registry`](registry::Registry) selects the format by extension, falling back to the
//! content, and sends every write through a crash-safe [`CommitEngine`](commit::CommitEngine).
//!
//! ```rust,no_run
//! # fn main() -> tagcraft::error::Result<()> {
//! use tagcraft::config::EngineOptions;
//! use tagcraft::prelude::*;
//! use tagcraft::registry::Registry;
//!
//! let registry = Registry::new(EngineOptions::new());
//!
//! let mut handle = registry.read_path("test.m4a")?;
//! if let Some(tag) = handle.primary_tag_mut() {
//! 	tag.set_artist(String::from("Foo artist"));
//! }
//!
//! // The original is either fully replaced, or left untouched
//! registry.write(&handle)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Using an existing reader
//!
//! ```rust,no_run
//! # fn main() -> tagcraft::error::Result<()> {
//! use tagcraft::read_from;
//! use std::fs::File;
//!
//! let mut file = File::open("test.wma")?;
//!
//! // The file type is guessed from the content
//! let tagged_file = read_from(&mut file)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Using concrete file types
//!
//! ```rust,no_run
//! # fn main() -> tagcraft::error::Result<()> {
//! use tagcraft::config::ParseOptions;
//! use tagcraft::file::AudioFile;
//! use tagcraft::iff::wav::WavFile;
//! use tagcraft::tag::TagType;
//! use std::fs::File;
//!
//! let mut file_content = File::open("test.wav")?;
//! let wav_file = WavFile::read_from(&mut file_content, ParseOptions::new())?;
//!
//! assert_eq!(wav_file.properties().channels(), 2);
//!
//! // WAV files can hold two tags at once
//! assert!(wav_file.contains_tag_type(TagType::Id3v2));
//! assert!(wav_file.contains_tag_type(TagType::RiffInfo));
//! # Ok(())
//! # }
//! ```
//!
//! # Important format-specific notes
//!
//! All formats have their own quirks that may produce unexpected results between conversions.
//! Be sure to read the module documentation of each format to see important notes and warnings.

pub mod chunk;
pub mod commit;
pub mod config;
pub mod error;
pub mod file;
pub(crate) mod macros;
pub mod picture;
pub mod probe;
pub mod properties;
pub mod registry;
pub mod tag;
mod util;

pub mod asf;
pub mod flac;
pub mod id3;
pub mod iff;
pub mod mp4;
pub mod ogg;

pub use crate::probe::{read_from, read_from_path};

pub use util::text::TextEncoding;

pub use util::io;

pub mod prelude {
	//! A prelude for commonly used items in the library.
	//!
	//! This module is intended to be wildcard imported.
	//!
	//! ```rust
	//! use tagcraft::prelude::*;
	//! ```

	pub use crate::file::{AudioFile, TaggedFileExt};
	pub use crate::tag::{Accessor, ItemKey, TagExt};
}
