use crate::config::WriteOptions;
use crate::error::Result;
use crate::file::FileType;
use crate::macros::err;
use crate::tag::{Tag, TagType};
use crate::util::io::FileLike;
use crate::{asf, flac, iff, mp4, ogg};

use crate::asf::AsfTag;
use crate::id3::v2::Id3v2Tag;
use crate::mp4::Ilst;
use crate::ogg::VorbisComments;
use iff::wav::RiffInfoList;

/// Write a generic [`Tag`] by converting it to the native tag of `file_type`
///
/// An empty tag removes the native tag from the file.
pub(crate) fn write_tag<F>(
	tag: &Tag,
	file: &mut F,
	file_type: FileType,
	write_options: WriteOptions,
) -> Result<()>
where
	F: FileLike,
{
	log::debug!(
		"Writing {:?} ({} items) to {file_type:?} file",
		tag.tag_type(),
		tag.item_count()
	);

	match (file_type, tag.tag_type()) {
		(FileType::Asf, TagType::Asf) => {
			asf::write::write_to(file, &AsfTag::from(tag.clone()), write_options)
		},
		(FileType::Flac, TagType::VorbisComments) => {
			flac::write::write_to(file, &VorbisComments::from(tag.clone()), write_options)
		},
		(FileType::Opus | FileType::Vorbis, TagType::VorbisComments) => {
			ogg::write::write_to(file, &VorbisComments::from(tag.clone()), write_options)
		},
		(FileType::Mp4, TagType::Mp4Ilst) => {
			mp4::ilst::write::write_to(file, &Ilst::from(tag.clone()), write_options)
		},
		(FileType::Wav, TagType::RiffInfo) => iff::wav::write::write_to(
			file,
			Some(&RiffInfoList::from(tag.clone())),
			None,
			write_options,
		),
		(FileType::Wav, TagType::Id3v2) => iff::wav::write::write_to(
			file,
			None,
			Some(&Id3v2Tag::from(tag.clone())),
			write_options,
		),
		_ => err!(UnsupportedTag),
	}
}

#[cfg(test)]
mod tests {
	use super::write_tag;
	use crate::config::WriteOptions;
	use crate::error::ErrorKind;
	use crate::file::FileType;
	use crate::tag::{Tag, TagType};

	use std::io::Cursor;

	#[test_log::test]
	fn unsupported_pairs() {
		let mut file = Cursor::new(Vec::new());

		for (file_type, tag_type) in [
			(FileType::Mp4, TagType::Id3v2),
			(FileType::Flac, TagType::Asf),
			(FileType::Asf, TagType::RiffInfo),
		] {
			let err = write_tag(&Tag::new(tag_type), &mut file, file_type, WriteOptions::default())
				.unwrap_err();
			assert!(matches!(err.kind(), ErrorKind::UnsupportedTag));
		}

		// Nothing was written
		assert!(file.into_inner().is_empty());
	}
}
