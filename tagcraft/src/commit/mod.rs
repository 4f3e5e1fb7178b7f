//! Crash-safe writing
//!
//! Every modification made through a [`CommitEngine`] goes through the same states:
//!
//! ```text
//! Precheck -> Stage -> Commit -> Cleanup
//!     \          \         \
//!      `----------`---------`---> Abort -> Cleanup
//! ```
//!
//! * **Precheck**: The file must exist, be writable, and be large enough to be a real audio file.
//!   Every [`ModificationListener`] gets a chance to veto.
//! * **Stage**: The file is copied to a temporary file in the same directory, and the
//!   modification is applied to the copy. Listeners get another chance to veto.
//! * **Commit**: The staged file replaces the original, either by copying it over the original
//!   (see [`EngineOptions::preserve_file_identity`]) or by renaming.
//! * **Cleanup**: The staged file is removed if it is still around.
//!
//! The original file is never touched before the commit state.

/// Observers that can veto a commit
pub mod listener;
mod overwrite;
mod stage;
mod swap;

use crate::config::EngineOptions;
use crate::error::Result;
use crate::macros::err;

use std::fmt::{Display, Formatter};
use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind as IoErrorKind;
use std::path::Path;

pub use listener::{ListenerChain, ModificationListener, Veto};
use stage::StagedFile;

/// The states of a commit
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum CommitState {
	Precheck,
	Stage,
	Commit,
	Cleanup,
	Abort,
}

impl Display for CommitState {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		let name = match self {
			CommitState::Precheck => "precheck",
			CommitState::Stage => "stage",
			CommitState::Commit => "commit",
			CommitState::Cleanup => "cleanup",
			CommitState::Abort => "abort",
		};

		f.write_str(name)
	}
}

/// Applies modifications to files without ever leaving them half-written
///
/// # Examples
///
/// ```rust,no_run
/// use std::io::Write;
/// use tagcraft::commit::CommitEngine;
/// use tagcraft::config::EngineOptions;
///
/// # fn main() -> tagcraft::error::Result<()> {
/// let engine = CommitEngine::new(EngineOptions::new());
///
/// // The closure only ever sees the staged copy
/// engine.commit("song.flac".as_ref(), false, |staged| {
/// 	staged.write_all(b"fLaC")?;
/// 	Ok(())
/// })?;
/// # Ok(()) }
/// ```
pub struct CommitEngine {
	options: EngineOptions,
	listeners: ListenerChain,
}

impl CommitEngine {
	/// Create a new `CommitEngine` with no listeners
	pub fn new(options: EngineOptions) -> Self {
		Self {
			options,
			listeners: ListenerChain::new(),
		}
	}

	/// The engine's options
	pub fn options(&self) -> &EngineOptions {
		&self.options
	}

	/// Register a [`ModificationListener`]
	///
	/// Listeners are consulted in the order they are added.
	pub fn add_listener<L>(&mut self, listener: L)
	where
		L: ModificationListener + 'static,
	{
		self.listeners.push(listener);
	}

	/// The registered listeners
	pub fn listeners(&self) -> &ListenerChain {
		&self.listeners
	}

	/// Apply `modify` to the file at `path`
	///
	/// `modify` receives a staged copy of the file, positioned at the start. `is_deleting` is
	/// passed along to the listeners.
	///
	/// # Errors
	///
	/// * [`ErrorKind::Io`](crate::error::ErrorKind::Io): `path` doesn't exist, or any other IO error
	/// * [`ErrorKind::NotWritable`](crate::error::ErrorKind::NotWritable)
	/// * [`ErrorKind::FileTooSmall`](crate::error::ErrorKind::FileTooSmall)
	/// * [`ErrorKind::FileLocked`](crate::error::ErrorKind::FileLocked)
	/// * [`ErrorKind::Veto`](crate::error::ErrorKind::Veto)
	/// * Any error from `modify`
	///
	/// In all cases, the original file is left as it was.
	pub fn commit<W>(&self, path: &Path, is_deleting: bool, modify: W) -> Result<()>
	where
		W: FnOnce(&mut File) -> Result<()>,
	{
		let mut staged = None;
		let result = self.run(path, is_deleting, modify, &mut staged);

		if result.is_err() {
			transition(path, CommitState::Abort);
		}

		transition(path, CommitState::Cleanup);
		if let Some(staged) = staged {
			staged.discard();
		}

		self.listeners.after_operation_finished(path, result.is_ok());

		result
	}

	fn run<W>(
		&self,
		path: &Path,
		is_deleting: bool,
		modify: W,
		staged_slot: &mut Option<StagedFile>,
	) -> Result<()>
	where
		W: FnOnce(&mut File) -> Result<()>,
	{
		transition(path, CommitState::Precheck);
		self.precheck(path)?;
		self.listeners.before_modify(path, is_deleting)?;

		transition(path, CommitState::Stage);
		let staged = staged_slot.insert(StagedFile::create(path)?);
		modify(staged.file_mut())?;
		staged.finish()?;
		self.listeners.after_modify(path, staged.path())?;

		transition(path, CommitState::Commit);
		if self.options.preserve_file_identity {
			overwrite::overwrite_in_place(path, staged)?;
		} else if let Some(staged) = staged_slot.take() {
			swap::swap_into_place(path, staged)?;
		}

		Ok(())
	}

	fn precheck(&self, path: &Path) -> Result<()> {
		let metadata = fs::metadata(path)?;

		if self.options.check_writable {
			if metadata.permissions().readonly() {
				err!(NotWritable);
			}

			if let Err(e) = OpenOptions::new().write(true).open(path) {
				if e.kind() == IoErrorKind::PermissionDenied {
					err!(NotWritable);
				}

				return Err(e.into());
			}
		}

		let len = metadata.len();
		if len < self.options.min_file_size {
			log::debug!(
				"`{}` is {len} bytes, below the minimum of {}",
				path.display(),
				self.options.min_file_size
			);
			err!(FileTooSmall(len));
		}

		Ok(())
	}
}

fn transition(path: &Path, state: CommitState) {
	log::debug!("Commit `{}`: {state}", path.display());
}
