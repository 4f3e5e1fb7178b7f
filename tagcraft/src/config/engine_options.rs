use crate::config::{ParseOptions, WriteOptions};

/// Options to control the commit engine
///
/// These are handed to [`Registry::new`](crate::registry::Registry::new), and apply to every
/// read and write made through it.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub struct EngineOptions {
	pub(crate) preserve_file_identity: bool,
	pub(crate) check_writable: bool,
	pub(crate) min_file_size: u64,
	pub(crate) parse_options: ParseOptions,
	pub(crate) write_options: WriteOptions,
}

impl EngineOptions {
	/// Default minimum file size in bytes
	///
	/// Anything smaller can't hold both a container and audio.
	pub const DEFAULT_MIN_FILE_SIZE: u64 = 100;

	/// Creates a new `EngineOptions`, alias for `Default` implementation
	///
	/// # Examples
	///
	/// ```rust
	/// use tagcraft::config::EngineOptions;
	///
	/// let engine_options = EngineOptions::new();
	/// ```
	pub const fn new() -> Self {
		Self {
			preserve_file_identity: true,
			check_writable: true,
			min_file_size: Self::DEFAULT_MIN_FILE_SIZE,
			parse_options: ParseOptions::new(),
			write_options: WriteOptions::new(),
		}
	}

	/// Whether to keep the original file's identity when committing
	///
	/// When `true`, the staged file is copied back over the original while it is locked, so the
	/// inode, hard links, and extended attributes of the original survive. When `false`, the
	/// original is renamed to a backup and the staged file is moved into its place.
	///
	/// # Examples
	///
	/// ```rust
	/// use tagcraft::config::EngineOptions;
	///
	/// // The files are never hard linked, so a rename is fine
	/// let engine_options = EngineOptions::new().preserve_file_identity(false);
	/// ```
	pub fn preserve_file_identity(mut self, preserve_file_identity: bool) -> Self {
		self.preserve_file_identity = preserve_file_identity;
		self
	}

	/// Whether to verify the file is writable before staging any changes
	pub fn check_writable(mut self, check_writable: bool) -> Self {
		self.check_writable = check_writable;
		self
	}

	/// The smallest file size, in bytes, that will be written to
	pub fn min_file_size(mut self, min_file_size: u64) -> Self {
		self.min_file_size = min_file_size;
		self
	}

	/// The [`ParseOptions`] used for every read
	pub fn parse_options(mut self, parse_options: ParseOptions) -> Self {
		self.parse_options = parse_options;
		self
	}

	/// The [`WriteOptions`] used for every write
	pub fn write_options(mut self, write_options: WriteOptions) -> Self {
		self.write_options = write_options;
		self
	}
}

impl Default for EngineOptions {
	/// The default implementation for `EngineOptions`
	///
	/// The defaults are as follows:
	///
	/// ```rust,ignore
	/// EngineOptions {
	///     preserve_file_identity: true,
	///     check_writable: true,
	///     min_file_size: 100,
	///     parse_options: ParseOptions::new(),
	///     write_options: WriteOptions::new(),
	/// }
	/// ```
	fn default() -> Self {
		Self::new()
	}
}
