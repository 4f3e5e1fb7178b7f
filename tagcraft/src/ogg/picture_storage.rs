use crate::error::Result;
use crate::picture::{Picture, PictureInformation, PictureType};

/// Picture handling shared by [`VorbisComments`](super::VorbisComments) and
/// [`FlacFile`](crate::flac::FlacFile)
///
/// Both store pictures alongside their [`PictureInformation`], which has to be written with them.
pub trait OggPictureStorage: private::Sealed {
	/// Inserts a [`Picture`]
	///
	/// Only one picture each of [`PictureType::Icon`] and [`PictureType::OtherIcon`] may exist,
	/// any existing one is replaced and returned.
	///
	/// If `information` is `None`, it will be read from the picture's data.
	///
	/// # Errors
	///
	/// `information` is `None` and the picture is neither a PNG nor a JPEG
	///
	/// # Examples
	///
	/// ```rust
	/// use tagcraft::ogg::{OggPictureStorage, VorbisComments};
	/// use tagcraft::picture::{MimeType, Picture, PictureInformation, PictureType};
	///
	/// # fn main() -> tagcraft::error::Result<()> {
	/// let icon = Picture::unchecked(vec![0; 16])
	/// 	.pic_type(PictureType::Icon)
	/// 	.mime_type(MimeType::Png)
	/// 	.build();
	///
	/// let mut tag = VorbisComments::new();
	/// assert!(tag.insert_picture(icon.clone(), Some(PictureInformation::default()))?.is_none());
	///
	/// // The old icon is returned
	/// assert!(tag.insert_picture(icon, Some(PictureInformation::default()))?.is_some());
	/// assert_eq!(tag.pictures().len(), 1);
	/// # Ok(()) }
	/// ```
	fn insert_picture(
		&mut self,
		picture: Picture,
		information: Option<PictureInformation>,
	) -> Result<Option<(Picture, PictureInformation)>> {
		let info = match information {
			Some(info) => info,
			None => PictureInformation::from_picture(&picture)?,
		};

		let replaced = match picture.pic_type() {
			PictureType::Icon | PictureType::OtherIcon => self
				.pictures()
				.iter()
				.position(|(p, _)| p.pic_type() == picture.pic_type())
				.map(|pos| self.remove_picture(pos)),
			_ => None,
		};

		self.pictures_mut().push((picture, info));

		Ok(replaced)
	}

	/// Removes every picture of a [`PictureType`]
	fn remove_picture_type(&mut self, picture_type: PictureType) {
		self.pictures_mut()
			.retain(|(pic, _)| pic.pic_type() != picture_type);
	}

	/// All stored pictures
	fn pictures(&self) -> &[(Picture, PictureInformation)];

	/// Replaces the picture at `index`, or appends it if `index` is out of bounds
	fn set_picture(&mut self, index: usize, picture: Picture, info: PictureInformation) {
		let pictures = self.pictures_mut();
		match pictures.get_mut(index) {
			Some(slot) => *slot = (picture, info),
			None => pictures.push((picture, info)),
		}
	}

	/// Removes and returns the picture at `index`
	///
	/// # Panics
	///
	/// `index` is out of bounds
	fn remove_picture(&mut self, index: usize) -> (Picture, PictureInformation) {
		self.pictures_mut().remove(index)
	}

	/// Removes and returns all pictures
	fn remove_pictures(&mut self) -> Vec<(Picture, PictureInformation)> {
		std::mem::take(self.pictures_mut())
	}
}

mod private {
	use crate::picture::{Picture, PictureInformation};

	pub trait Sealed {
		fn pictures_mut(&mut self) -> &mut Vec<(Picture, PictureInformation)>;
	}

	impl Sealed for crate::ogg::VorbisComments {
		fn pictures_mut(&mut self) -> &mut Vec<(Picture, PictureInformation)> {
			&mut self.pictures
		}
	}

	impl Sealed for crate::flac::FlacFile {
		fn pictures_mut(&mut self) -> &mut Vec<(Picture, PictureInformation)> {
			&mut self.pictures
		}
	}
}

impl OggPictureStorage for crate::ogg::VorbisComments {
	fn pictures(&self) -> &[(Picture, PictureInformation)] {
		&self.pictures
	}
}

impl OggPictureStorage for crate::flac::FlacFile {
	fn pictures(&self) -> &[(Picture, PictureInformation)] {
		&self.pictures
	}
}

#[cfg(test)]
mod tests {
	use super::OggPictureStorage;
	use crate::ogg::VorbisComments;
	use crate::picture::{MimeType, Picture, PictureInformation, PictureType};

	fn picture(pic_type: PictureType) -> Picture {
		Picture::unchecked(vec![1, 2, 3])
			.pic_type(pic_type)
			.mime_type(MimeType::Jpeg)
			.build()
	}

	#[test_log::test]
	fn icons_are_unique() {
		let mut tag = VorbisComments::new();
		let info = Some(PictureInformation::default());

		for _ in 0..2 {
			tag.insert_picture(picture(PictureType::CoverFront), info).unwrap();
			tag.insert_picture(picture(PictureType::OtherIcon), info).unwrap();
		}

		assert_eq!(tag.pictures().len(), 3);

		tag.remove_picture_type(PictureType::CoverFront);
		assert_eq!(tag.pictures().len(), 1);
		assert_eq!(tag.remove_pictures().len(), 1);
	}

	#[test_log::test]
	fn unreadable_information() {
		let mut tag = VorbisComments::new();
		assert!(tag.insert_picture(picture(PictureType::CoverFront), None).is_err());
		assert!(tag.pictures().is_empty());
	}
}
