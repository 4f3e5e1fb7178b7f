use std::error::Error;
use std::fmt;

/// Alias for `Result<T, PageError>`
pub type Result<T> = std::result::Result<T, PageError>;

/// Everything that can go wrong while reading, writing, or verifying pages
#[derive(Debug)]
#[non_exhaustive]
pub enum PageError {
	/// The page's stream structure version isn't 0
	InvalidVersion,
	/// The page has an empty segment table
	BadSegmentCount,
	/// The page doesn't start with `OggS`
	MissingMagic,
	/// The CRC stored in the header doesn't cover the page
	BadChecksum {
		/// The CRC stored in the page header
		stored: u32,
		/// The CRC of the page as it is
		calculated: u32,
	},
	/// The content exceeds [`MAX_CONTENT_SIZE`](crate::MAX_CONTENT_SIZE)
	TooMuchData,
	/// The stream ended in the middle of a page or packet
	NotEnoughData,
	/// An IO error from the underlying reader or writer
	Io(std::io::Error),
}

impl fmt::Display for PageError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let message = match self {
			PageError::InvalidVersion => "Stream structure version is not 0",
			PageError::BadSegmentCount => "Segment table is empty",
			PageError::MissingMagic => "Expected an \"OggS\" capture pattern",
			PageError::TooMuchData => "Content does not fit in a single page",
			PageError::NotEnoughData => "Stream ended before the page or packet did",
			PageError::BadChecksum { stored, calculated } => {
				return write!(
					f,
					"Checksum mismatch (stored {stored:#010X}, calculated {calculated:#010X})"
				);
			},
			PageError::Io(err) => return write!(f, "{err}"),
		};

		f.write_str(message)
	}
}

impl Error for PageError {
	fn source(&self) -> Option<&(dyn Error + 'static)> {
		if let PageError::Io(err) = self {
			return Some(err);
		}

		None
	}
}

impl From<std::io::Error> for PageError {
	fn from(err: std::io::Error) -> PageError {
		PageError::Io(err)
	}
}
