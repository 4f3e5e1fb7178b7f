//! Various traits for reading and writing to file-like objects

use crate::error::Result;

use std::fs::File;
use std::io::{Cursor, Read, Seek, SeekFrom, Write};

// TODO: https://github.com/rust-lang/rust/issues/59359
pub(crate) trait SeekStreamLen: Seek {
	fn stream_len_hack(&mut self) -> Result<u64> {
		let current_pos = self.stream_position()?;
		let len = self.seek(SeekFrom::End(0))?;

		self.seek(SeekFrom::Start(current_pos))?;

		Ok(len)
	}
}

impl<T> SeekStreamLen for T where T: Seek + ?Sized {}

/// A `Read + Seek` supertrait, so readers can be passed around as trait objects
pub trait SeekRead: Read + Seek {}
impl<T: Read + Seek + ?Sized> SeekRead for T {}

/// Provides a method to truncate an object to the specified length
///
/// This is one component of the [`FileLike`] trait, which is used to provide implementors access to any
/// file saving methods such as [`AudioFile::save_to`](crate::file::AudioFile::save_to).
///
/// Take great care in implementing this for downstream types, as tagcraft will assume that the
/// container has the new length specified. If this assumption were to be broken, files **will** become corrupted.
pub trait Truncate {
	/// Truncate a storage object to the specified length
	///
	/// # Errors
	///
	/// Errors depend on the object being truncated, which may not always be fallible.
	fn truncate(&mut self, new_len: u64) -> std::io::Result<()>;
}

impl Truncate for File {
	fn truncate(&mut self, new_len: u64) -> std::io::Result<()> {
		self.set_len(new_len)
	}
}

impl Truncate for Vec<u8> {
	fn truncate(&mut self, new_len: u64) -> std::io::Result<()> {
		Vec::truncate(self, new_len as usize);
		Ok(())
	}
}

impl<T> Truncate for Cursor<T>
where
	T: Truncate,
{
	fn truncate(&mut self, new_len: u64) -> std::io::Result<()> {
		self.get_mut().truncate(new_len)
	}
}

impl<T> Truncate for Box<T>
where
	T: Truncate + ?Sized,
{
	fn truncate(&mut self, new_len: u64) -> std::io::Result<()> {
		self.as_mut().truncate(new_len)
	}
}

impl<T> Truncate for &mut T
where
	T: Truncate + ?Sized,
{
	fn truncate(&mut self, new_len: u64) -> std::io::Result<()> {
		(**self).truncate(new_len)
	}
}

/// Provides a method to get the length of a storage object
///
/// This is one component of the [`FileLike`] trait.
///
/// Take great care in implementing this for downstream types, as tagcraft will assume that the
/// container has the exact length specified. If this assumption were to be broken, files **may** become corrupted.
pub trait Length {
	/// Get the length of a storage object
	///
	/// # Errors
	///
	/// Errors depend on the object being read, which may not always be fallible.
	fn len(&self) -> std::io::Result<u64>;
}

impl Length for File {
	fn len(&self) -> std::io::Result<u64> {
		self.metadata().map(|m| m.len())
	}
}

impl Length for Vec<u8> {
	fn len(&self) -> std::io::Result<u64> {
		Ok(Vec::len(self) as u64)
	}
}

impl<T> Length for Cursor<T>
where
	T: Length,
{
	fn len(&self) -> std::io::Result<u64> {
		Length::len(self.get_ref())
	}
}

impl<T> Length for Box<T>
where
	T: Length + ?Sized,
{
	fn len(&self) -> std::io::Result<u64> {
		Length::len(self.as_ref())
	}
}

impl<T> Length for &mut T
where
	T: Length + ?Sized,
{
	fn len(&self) -> std::io::Result<u64> {
		Length::len(&**self)
	}
}

/// Provides a set of methods to read and write to a file-like object
///
/// This is a combination of the [`Read`], [`Write`], [`Seek`], [`Truncate`], and [`Length`] traits.
/// It is object safe, format writers receive a `&mut dyn FileLike`.
///
/// Take great care in implementing this for downstream types, as tagcraft will assume that the
/// trait implementations are correct. If this assumption were to be broken, files **may** become corrupted.
pub trait FileLike: Read + Write + Seek + Truncate + Length {}

impl<T> FileLike for T where T: Read + Write + Seek + Truncate + Length + ?Sized {}

/// Replace the entire contents of `file` with `contents`
pub(crate) fn overwrite<F>(file: &mut F, contents: &[u8]) -> Result<()>
where
	F: FileLike + ?Sized,
{
	file.rewind()?;
	file.truncate(0)?;
	file.write_all(contents)?;
	file.flush()?;

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::{FileLike, Length, overwrite};

	use std::io::{Cursor, Read, Seek, Write};

	fn shrink(file: &mut dyn FileLike) {
		overwrite(file, b"abc").unwrap();
	}

	#[test_log::test]
	fn overwrite_vec() {
		let mut cursor = Cursor::new(b"a much longer buffer".to_vec());
		shrink(&mut cursor);

		assert_eq!(cursor.get_ref().as_slice(), b"abc");
		assert_eq!(Length::len(&cursor).unwrap(), 3);
	}

	#[test_log::test]
	fn overwrite_file() {
		let mut file = tempfile::tempfile().unwrap();
		file.write_all(b"a much longer buffer").unwrap();

		shrink(&mut file);

		file.rewind().unwrap();
		let mut contents = Vec::new();
		file.read_to_end(&mut contents).unwrap();
		assert_eq!(contents, b"abc");
	}
}
