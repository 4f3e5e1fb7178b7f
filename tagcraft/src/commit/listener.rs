use std::fmt::{Display, Formatter};
use std::path::Path;

/// A listener's refusal of a modification
///
/// Returned from [`ModificationListener::before_modify`] or [`ModificationListener::after_modify`]
/// to stop a commit. Nothing on disk is touched once a veto fires.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Veto {
	reason: String,
}

impl Veto {
	/// Create a `Veto` with a human readable reason
	pub fn new(reason: impl Into<String>) -> Self {
		Self {
			reason: reason.into(),
		}
	}

	/// Why the modification was refused
	pub fn reason(&self) -> &str {
		&self.reason
	}
}

impl Display for Veto {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "Modification vetoed: {}", self.reason)
	}
}

impl std::error::Error for Veto {}

/// Observes, and may veto, every modification made by a [`CommitEngine`](super::CommitEngine)
///
/// All methods have default implementations, so a listener only needs to implement the
/// events it cares about.
///
/// # Examples
///
/// ```rust
/// use std::path::Path;
/// use tagcraft::commit::{ModificationListener, Veto};
///
/// /// Refuses to touch anything in a read-only library
/// struct ReadOnlyLibrary;
///
/// impl ModificationListener for ReadOnlyLibrary {
/// 	fn before_modify(&self, path: &Path, _is_deleting: bool) -> Result<(), Veto> {
/// 		if path.starts_with("/library") {
/// 			return Err(Veto::new("the library is read-only"));
/// 		}
///
/// 		Ok(())
/// 	}
/// }
/// ```
pub trait ModificationListener: Send + Sync {
	/// Called before anything is staged
	///
	/// `is_deleting` is `true` when all tags are being removed.
	///
	/// # Errors
	///
	/// A [`Veto`] aborts the commit
	fn before_modify(&self, path: &Path, is_deleting: bool) -> Result<(), Veto> {
		let _ = (path, is_deleting);
		Ok(())
	}

	/// Called once the modified file is staged, and before it replaces the original
	///
	/// # Errors
	///
	/// A [`Veto`] aborts the commit, and the staged file is discarded
	fn after_modify(&self, original: &Path, staged: &Path) -> Result<(), Veto> {
		let _ = (original, staged);
		Ok(())
	}

	/// Called when an operation ends, successful or not
	///
	/// `file` is the file as it now stands: the modified file if `committed`, or the untouched
	/// original otherwise.
	fn after_operation_finished(&self, file: &Path, committed: bool) {
		let _ = (file, committed);
	}

	/// Called on every listener once any of them has vetoed
	fn vetoed(&self, path: &Path, veto: &Veto) {
		let _ = (path, veto);
	}
}

/// An ordered list of [`ModificationListener`]s
///
/// Listeners are consulted in registration order, and the first veto wins.
#[derive(Default)]
pub struct ListenerChain {
	listeners: Vec<Box<dyn ModificationListener>>,
}

impl ListenerChain {
	/// Create an empty chain
	pub fn new() -> Self {
		Self::default()
	}

	/// Append a listener
	pub fn push<L>(&mut self, listener: L)
	where
		L: ModificationListener + 'static,
	{
		self.listeners.push(Box::new(listener));
	}

	/// The number of listeners
	pub fn len(&self) -> usize {
		self.listeners.len()
	}

	/// Whether there are no listeners
	pub fn is_empty(&self) -> bool {
		self.listeners.is_empty()
	}

	/// Ask every listener whether `path` may be modified
	///
	/// # Errors
	///
	/// The first [`Veto`]
	pub fn before_modify(&self, path: &Path, is_deleting: bool) -> Result<(), Veto> {
		self.fold(path, |listener| listener.before_modify(path, is_deleting))
	}

	/// Ask every listener whether the staged file may replace `original`
	///
	/// # Errors
	///
	/// The first [`Veto`]
	pub fn after_modify(&self, original: &Path, staged: &Path) -> Result<(), Veto> {
		self.fold(original, |listener| listener.after_modify(original, staged))
	}

	/// Notify every listener that an operation has ended
	pub fn after_operation_finished(&self, file: &Path, committed: bool) {
		for listener in &self.listeners {
			listener.after_operation_finished(file, committed);
		}
	}

	fn fold<F>(&self, path: &Path, mut ask: F) -> Result<(), Veto>
	where
		F: FnMut(&dyn ModificationListener) -> Result<(), Veto>,
	{
		let result = self
			.listeners
			.iter()
			.try_for_each(|listener| ask(listener.as_ref()));

		if let Err(veto) = &result {
			log::debug!("{}: {veto}", path.display());

			for listener in &self.listeners {
				listener.vetoed(path, veto);
			}
		}

		result
	}
}
