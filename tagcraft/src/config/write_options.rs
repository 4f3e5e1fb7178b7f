/// Settings applied when a tag is written
///
/// Most of these only concern one or two formats, and are ignored by the rest.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub struct WriteOptions {
	pub(crate) preferred_padding: Option<u32>,
	pub(crate) remove_others: bool,
	pub(crate) genres_as_text: bool,
	pub(crate) uppercase_id3v2_chunk: bool,
}

impl WriteOptions {
	/// Default preferred padding size in bytes
	pub const DEFAULT_PREFERRED_PADDING: u32 = 1024;

	/// The default write settings, usable in `const` contexts
	///
	/// # Examples
	///
	/// ```rust
	/// use tagcraft::config::WriteOptions;
	///
	/// let write_options = WriteOptions::new();
	/// ```
	pub const fn new() -> Self {
		Self {
			preferred_padding: Some(Self::DEFAULT_PREFERRED_PADDING),
			remove_others: false,
			genres_as_text: false,
			uppercase_id3v2_chunk: true,
		}
	}

	/// Bytes of padding to leave after a tag, `0` for none
	///
	/// Padding lets later edits grow the tag without moving the audio. It is written for ID3v2, FLAC
	/// and MP4 (as a `free` atom), and ignored by the other formats.
	///
	/// # Examples
	///
	/// ```rust
	/// use tagcraft::config::WriteOptions;
	///
	/// // Room for a larger tag later on
	/// let options = WriteOptions::new().preferred_padding(2048);
	///
	/// // No padding at all
	/// let options = WriteOptions::new().preferred_padding(0);
	/// ```
	pub fn preferred_padding(mut self, preferred_padding: u32) -> Self {
		match preferred_padding {
			0 => self.preferred_padding = None,
			_ => self.preferred_padding = Some(preferred_padding),
		}
		self
	}

	/// Whether to remove all other tags when writing
	///
	/// If set to `true`, only the tag being written will be kept in the file. This only matters
	/// for WAV, the one format that holds more than one tag type (RIFF INFO and ID3v2).
	pub fn remove_others(mut self, remove_others: bool) -> Self {
		self.remove_others = remove_others;
		self
	}

	/// Whether to always write genres as free text
	///
	/// MP4 files have two competing genre atoms: `gnre`, which holds an index into the ID3v1
	/// genre list, and `©gen`, which holds free text. By default, a genre that appears in the
	/// ID3v1 list is written as `gnre`, and anything else as `©gen`.
	///
	/// When this is set, `©gen` is always used.
	///
	/// # Examples
	///
	/// ```rust
	/// use tagcraft::config::WriteOptions;
	///
	/// let options = WriteOptions::new().genres_as_text(true);
	/// ```
	pub fn genres_as_text(mut self, genres_as_text: bool) -> Self {
		self.genres_as_text = genres_as_text;
		self
	}

	/// Whether to uppercase the ID3v2 chunk name
	///
	/// When dealing with RIFF files, some software may expect the ID3v2 chunk name to be
	/// lowercase.
	///
	/// NOTE: The vast majority of software will be able to read both upper and lowercase
	/// chunk names.
	pub fn uppercase_id3v2_chunk(mut self, uppercase_id3v2_chunk: bool) -> Self {
		self.uppercase_id3v2_chunk = uppercase_id3v2_chunk;
		self
	}
}

impl Default for WriteOptions {
	/// The default implementation for `WriteOptions`
	///
	/// The defaults are as follows:
	///
	/// ```rust,ignore
	/// WriteOptions {
	///     preferred_padding: 1024,
	///     remove_others: false,
	///     genres_as_text: false,
	///     uppercase_id3v2_chunk: true,
	/// }
	/// ```
	fn default() -> Self {
		Self::new()
	}
}
