use super::stage::StagedFile;
use crate::error::Result;
use crate::macros::err;

use std::fs::{File, OpenOptions, TryLockError};
use std::io::{self, Seek, Write};
use std::path::Path;

/// Copy the staged bytes over the original, keeping its inode, links, and attributes
///
/// The original is locked for the duration of the copy. Filesystems without lock support are
/// written to unlocked.
pub(super) fn overwrite_in_place(path: &Path, staged: &mut StagedFile) -> Result<()> {
	let mut original = OpenOptions::new().read(true).write(true).open(path)?;
	let locked = check_lock(original.try_lock(), path)?;

	let result = copy_over(staged.file_mut(), &mut original);

	if locked && let Err(e) = original.unlock() {
		log::warn!("Failed to unlock `{}`: {e}", path.display());
	}

	result
}

/// Whether the lock was taken
///
/// Contention is an error, a filesystem without lock support is not.
fn check_lock(attempt: std::result::Result<(), TryLockError>, path: &Path) -> Result<bool> {
	match attempt {
		Ok(()) => {
			log::trace!("Locked `{}`", path.display());
			Ok(true)
		},
		Err(TryLockError::WouldBlock) => err!(FileLocked),
		Err(TryLockError::Error(e)) if e.kind() == io::ErrorKind::Unsupported => {
			log::warn!(
				"File locking is unsupported for `{}`, writing without a lock",
				path.display()
			);
			Ok(false)
		},
		Err(TryLockError::Error(e)) => Err(e.into()),
	}
}

fn copy_over(staged: &mut File, original: &mut File) -> Result<()> {
	staged.rewind()?;
	original.rewind()?;

	let len = io::copy(staged, original)?;
	original.set_len(len)?;
	original.flush()?;
	original.sync_all()?;

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::{check_lock, overwrite_in_place};
	use crate::commit::stage::StagedFile;
	use crate::error::ErrorKind;

	use std::fs::{File, TryLockError};
	use std::io::{self, Write};
	use std::path::Path;

	#[test_log::test]
	fn shrinking_overwrite() {
		let dir = tempfile::tempdir().unwrap();
		let original = dir.path().join("song.opus");
		std::fs::write(&original, b"a much longer original file").unwrap();

		let mut staged = StagedFile::create(&original).unwrap();
		staged.file_mut().set_len(0).unwrap();
		staged.file_mut().write_all(b"short").unwrap();
		staged.finish().unwrap();

		overwrite_in_place(&original, &mut staged).unwrap();
		staged.discard();

		assert_eq!(std::fs::read(&original).unwrap(), b"short");
	}

	#[cfg(unix)]
	#[test_log::test]
	fn keeps_hard_links() {
		let dir = tempfile::tempdir().unwrap();
		let original = dir.path().join("song.opus");
		let link = dir.path().join("link.opus");
		std::fs::write(&original, b"original").unwrap();
		std::fs::hard_link(&original, &link).unwrap();

		let mut staged = StagedFile::create(&original).unwrap();
		staged.file_mut().set_len(0).unwrap();
		staged.file_mut().write_all(b"modified").unwrap();
		staged.finish().unwrap();

		overwrite_in_place(&original, &mut staged).unwrap();
		staged.discard();

		assert_eq!(std::fs::read(&link).unwrap(), b"modified");
	}

	#[test_log::test]
	fn locked_by_someone_else() {
		let dir = tempfile::tempdir().unwrap();
		let original = dir.path().join("song.opus");
		std::fs::write(&original, b"original").unwrap();

		let mut staged = StagedFile::create(&original).unwrap();
		staged.file_mut().set_len(0).unwrap();
		staged.file_mut().write_all(b"modified").unwrap();
		staged.finish().unwrap();

		let holder = File::open(&original).unwrap();
		holder.lock().unwrap();

		let err = overwrite_in_place(&original, &mut staged).unwrap_err();
		assert!(matches!(err.kind(), ErrorKind::FileLocked));

		holder.unlock().unwrap();
		assert_eq!(std::fs::read(&original).unwrap(), b"original");

		staged.discard();
		assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
	}

	#[test_log::test]
	fn lock_outcomes() {
		let path = Path::new("song.opus");

		assert!(check_lock(Ok(()), path).unwrap());
		assert!(matches!(
			check_lock(Err(TryLockError::WouldBlock), path).unwrap_err().kind(),
			ErrorKind::FileLocked
		));

		// No lock support, the write goes ahead unlocked
		let unsupported = io::Error::from(io::ErrorKind::Unsupported);
		assert!(!check_lock(Err(TryLockError::Error(unsupported)), path).unwrap());

		let denied = io::Error::from(io::ErrorKind::PermissionDenied);
		assert!(matches!(
			check_lock(Err(TryLockError::Error(denied)), path).unwrap_err().kind(),
			ErrorKind::Io(_)
		));
	}
}
