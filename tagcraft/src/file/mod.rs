//! Generic file handling utilities

mod audio_file;
mod file_type;
mod handle;
mod tagged_file;

pub use audio_file::AudioFile;
pub use file_type::{EXTENSIONS, FileType};
pub use handle::AudioFileHandle;
pub use tagged_file::{TaggedFile, TaggedFileExt};

pub(crate) use file_type::FileTypeGuessResult;
