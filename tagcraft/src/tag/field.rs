use std::borrow::Cow;

/// Common behavior of a single format-specific field
///
/// Every format stores its fields differently (ASF descriptors, MP4 atoms, ID3v2 frames,
/// `KEY=value` pairs), this gives them a common view.
pub trait TagField {
	/// The format-specific key
	fn key(&self) -> Cow<'_, str>;

	/// The content as text
	///
	/// This is `None` for binary fields.
	fn content(&self) -> Option<Cow<'_, str>>;

	/// Whether the field holds binary data
	fn is_binary(&self) -> bool;

	/// Whether the field has no content
	fn is_empty(&self) -> bool;
}

// Vorbis comments and RIFF INFO items
impl TagField for (String, String) {
	fn key(&self) -> Cow<'_, str> {
		Cow::Borrowed(&self.0)
	}

	fn content(&self) -> Option<Cow<'_, str>> {
		Some(Cow::Borrowed(&self.1))
	}

	fn is_binary(&self) -> bool {
		false
	}

	fn is_empty(&self) -> bool {
		self.1.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::TagField;

	#[test_log::test]
	fn text_pairs() {
		let field = (String::from("ARTIST"), String::new());
		assert_eq!(field.key(), "ARTIST");
		assert!(TagField::is_empty(&field));
		assert!(!field.is_binary());
	}
}
