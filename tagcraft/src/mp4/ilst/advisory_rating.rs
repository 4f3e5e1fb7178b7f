/// Content of the `rtng` atom
///
/// A generic [`Tag`](crate::tag::Tag) stores this under
/// [`ItemKey::ParentalRating`](crate::tag::ItemKey::ParentalRating), as the number returned by
/// [`AdvisoryRating::as_u8`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum AdvisoryRating {
	/// No advisory
	Inoffensive = 0,
	/// Explicit content
	///
	/// Some older encoders wrote `4` here. It is accepted, but `1` is always written.
	Explicit = 1,
	/// An edited version of explicit content
	Clean = 2,
}

impl AdvisoryRating {
	/// The value stored in the `rtng` atom
	///
	/// # Examples
	///
	/// ```rust
	/// use tagcraft::mp4::AdvisoryRating;
	///
	/// assert_eq!(AdvisoryRating::Clean.as_u8(), 2);
	/// assert_eq!(AdvisoryRating::try_from(4), Ok(AdvisoryRating::Explicit));
	/// assert_eq!(AdvisoryRating::try_from(3), Err(3));
	/// ```
	pub fn as_u8(&self) -> u8 {
		*self as u8
	}
}

impl TryFrom<u8> for AdvisoryRating {
	type Error = u8;

	fn try_from(rating: u8) -> Result<Self, Self::Error> {
		Ok(match rating {
			0 => Self::Inoffensive,
			1 | 4 => Self::Explicit,
			2 => Self::Clean,
			_ => return Err(rating),
		})
	}
}
