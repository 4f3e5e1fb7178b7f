/// Settings applied when a file is read
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub struct ParseOptions {
	pub(crate) read_properties: bool,
	pub(crate) read_tags: bool,
	pub(crate) parsing_mode: ParsingMode,
	pub(crate) max_junk_bytes: usize,
	pub(crate) read_cover_art: bool,
	pub(crate) allocation_limit: usize,
}

impl Default for ParseOptions {
	/// The default implementation for `ParseOptions`
	///
	/// The defaults are as follows:
	///
	/// ```rust,ignore
	/// ParseOptions {
	/// 	read_properties: true,
	///     read_tags: true,
	/// 	parsing_mode: ParsingMode::BestAttempt,
	///     max_junk_bytes: 1024,
	///     read_cover_art: true,
	///     allocation_limit: 16 * 1024 * 1024,
	/// }
	/// ```
	fn default() -> Self {
		Self::new()
	}
}

impl ParseOptions {
	/// Default parsing mode
	pub const DEFAULT_PARSING_MODE: ParsingMode = ParsingMode::BestAttempt;

	/// Default for [`ParseOptions::max_junk_bytes`]
	pub const DEFAULT_MAX_JUNK_BYTES: usize = 1024;

	/// Default allocation limit for any single item, 16MB
	pub const DEFAULT_ALLOCATION_LIMIT: usize = 16 * 1024 * 1024;

	/// The default read settings, usable in `const` contexts
	///
	/// # Examples
	///
	/// ```rust
	/// use tagcraft::config::ParseOptions;
	///
	/// let parsing_options = ParseOptions::new();
	/// ```
	#[must_use]
	pub const fn new() -> Self {
		Self {
			read_properties: true,
			read_tags: true,
			parsing_mode: Self::DEFAULT_PARSING_MODE,
			max_junk_bytes: Self::DEFAULT_MAX_JUNK_BYTES,
			read_cover_art: true,
			allocation_limit: Self::DEFAULT_ALLOCATION_LIMIT,
		}
	}

	/// Whether to compute [`FileProperties`](crate::properties::FileProperties)
	///
	/// Skipping them avoids seeking through the audio stream, which matters for Ogg and MP4.
	///
	/// # Examples
	///
	/// ```rust
	/// use tagcraft::config::ParseOptions;
	///
	/// // Only interested in the tags
	/// let parsing_options = ParseOptions::new().read_properties(false);
	/// ```
	pub fn read_properties(&mut self, read_properties: bool) -> Self {
		self.read_properties = read_properties;
		*self
	}

	/// Whether to read tags at all
	///
	/// Without tags, writing the file back removes every tag it had.
	pub fn read_tags(&mut self, read_tags: bool) -> Self {
		self.read_tags = read_tags;
		*self
	}

	/// How to react to malformed input, see [`ParsingMode`]
	///
	/// # Examples
	///
	/// ```rust
	/// use tagcraft::config::{ParseOptions, ParsingMode};
	///
	/// let parsing_options = ParseOptions::new().parsing_mode(ParsingMode::Strict);
	/// ```
	pub fn parsing_mode(&mut self, parsing_mode: ParsingMode) -> Self {
		self.parsing_mode = parsing_mode;
		*self
	}

	/// How far past a leading ID3v2 tag to look for the `fLaC` marker
	///
	/// Some taggers write a wrong ID3v2 size, leaving stray padding between the tag and the
	/// stream. Anything further away than this is not recognized as FLAC.
	///
	/// # Examples
	///
	/// ```rust
	/// use tagcraft::config::ParseOptions;
	///
	/// let parsing_options = ParseOptions::new().max_junk_bytes(4096);
	/// ```
	pub fn max_junk_bytes(&mut self, max_junk_bytes: usize) -> Self {
		self.max_junk_bytes = max_junk_bytes;
		*self
	}

	/// Whether to decode embedded pictures
	///
	/// Pictures are skipped without being buffered when this is off.
	pub fn read_cover_art(&mut self, read_cover_art: bool) -> Self {
		self.read_cover_art = read_cover_art;
		*self
	}

	/// The largest single item, in bytes, that will be buffered
	///
	/// Sizes come straight from the file, so a corrupt length could otherwise request
	/// gigabytes. Items over the limit are treated as corrupt. Vorbis comments, for example, stop
	/// at that item and keep what was read before it.
	///
	/// # Examples
	///
	/// ```rust
	/// use tagcraft::config::ParseOptions;
	///
	/// // Allow for very large cover art
	/// let parsing_options = ParseOptions::new().allocation_limit(32 * 1024 * 1024);
	/// ```
	pub fn allocation_limit(&mut self, allocation_limit: usize) -> Self {
		self.allocation_limit = allocation_limit;
		*self
	}
}

/// How strictly malformed input is treated
///
/// Set with [`ParseOptions::parsing_mode`].
///
/// # Examples
///
/// ```rust,no_run
/// use tagcraft::config::{ParseOptions, ParsingMode};
/// use tagcraft::probe::Probe;
///
/// # fn main() -> tagcraft::error::Result<()> {
/// // Reject anything malformed
/// let parsing_options = ParseOptions::new().parsing_mode(ParsingMode::Strict);
/// let tagged_file = Probe::open("foo.m4a")?.options(parsing_options).read()?;
/// # Ok(()) }
/// ```
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
#[non_exhaustive]
pub enum ParsingMode {
	/// Any malformed input is an error
	///
	/// * Undecodable text fails the whole read
	/// * An invalid chunk identifier fails the whole read
	Strict,
	/// Recover from what can be recovered from (the default)
	///
	/// NOTE: Files that read fine may still fail to write.
	///
	/// * Undecodable text becomes an empty string
	/// * An invalid chunk identifier ends the walk, keeping the chunks before it
	#[default]
	BestAttempt,
	/// Keep going whenever possible, even if the result is partial
	///
	/// * Items with undecodable text are dropped
	/// * An unknown sample rate is reported as 0
	Relaxed,
}
