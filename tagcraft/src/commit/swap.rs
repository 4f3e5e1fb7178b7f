use super::stage::StagedFile;
use crate::error::Result;

use std::ffi::OsString;
use std::fs::{self, Metadata};
use std::path::{Path, PathBuf};

// Backups are "<name>.old", then "<name>.old1", "<name>.old2", ...
const MAX_BACKUP_ATTEMPTS: u32 = 1000;

/// Rename the original out of the way, and move the staged file into its place
///
/// On failure, the original is moved back.
pub(super) fn swap_into_place(path: &Path, staged: StagedFile) -> Result<()> {
	let metadata = fs::metadata(path)?;

	// The staged file is created with restrictive permissions
	fs::set_permissions(staged.path(), metadata.permissions())?;

	let backup = backup_path(path)?;
	replace_with_backup(path, &backup, |destination| staged.persist(destination))?;

	if let Err(e) = copy_created(&metadata, path) {
		log::warn!("Failed to copy the creation time to `{}`: {e}", path.display());
	}

	Ok(())
}

/// Move `path` to `backup`, then `put` the new file at `path`
///
/// If `put` fails, the backup is moved back.
fn replace_with_backup<P>(path: &Path, backup: &Path, put: P) -> Result<()>
where
	P: FnOnce(&Path) -> Result<()>,
{
	log::debug!("Backing up `{}` to `{}`", path.display(), backup.display());
	fs::rename(path, backup)?;

	if let Err(e) = put(path) {
		if let Err(restore_err) = fs::rename(backup, path) {
			log::error!(
				"Failed to restore `{}` from `{}`: {restore_err}",
				path.display(),
				backup.display()
			);
		}

		return Err(e);
	}

	if let Err(e) = fs::remove_file(backup) {
		log::warn!("Failed to remove backup `{}`: {e}", backup.display());
	}

	Ok(())
}

pub(super) fn backup_path(path: &Path) -> std::io::Result<PathBuf> {
	let mut name = path.file_name().map(OsString::from).unwrap_or_default();
	name.push(".old");

	let candidate = path.with_file_name(&name);
	if !candidate.try_exists()? {
		return Ok(candidate);
	}

	for n in 1..MAX_BACKUP_ATTEMPTS {
		let mut numbered = name.clone();
		numbered.push(n.to_string());

		let candidate = path.with_file_name(numbered);
		if !candidate.try_exists()? {
			return Ok(candidate);
		}
	}

	Err(std::io::Error::new(
		std::io::ErrorKind::AlreadyExists,
		"no free backup file name",
	))
}

#[cfg(any(windows, target_os = "macos"))]
fn copy_created(metadata: &Metadata, path: &Path) -> std::io::Result<()> {
	#[cfg(target_os = "macos")]
	use std::os::macos::fs::FileTimesExt as _;
	#[cfg(windows)]
	use std::os::windows::fs::FileTimesExt as _;

	let times = std::fs::FileTimes::new().set_created(metadata.created()?);
	std::fs::File::options().write(true).open(path)?.set_times(times)
}

// Creation times can't be set here
#[cfg(not(any(windows, target_os = "macos")))]
fn copy_created(_metadata: &Metadata, _path: &Path) -> std::io::Result<()> {
	Ok(())
}
