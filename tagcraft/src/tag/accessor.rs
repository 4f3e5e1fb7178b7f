use std::borrow::Cow;

#[cfg(doc)]
use crate::{ogg::VorbisComments, tag::Tag};

// Generates the `Accessor` trait
//
// Text items get a `Cow<str>` getter and a `String` setter, number items are `u32` both ways.
// Every item also gets a `remove_*` method. All methods default to doing nothing, so a tag type
// only overrides what it can store.
macro_rules! accessor_trait {
	(
		text { $($text:ident => $text_desc:literal),+ $(,)? }
		number { $($number:ident => $number_desc:literal),+ $(,)? }
	) => {
		paste::paste! {
			/// Getters and setters for the items every tag type has in common
			///
			/// Setters **overwrite**, even in formats that allow an item to repeat. Use the
			/// format-specific methods, such as [`Tag::push()`] or [`VorbisComments::push()`], to keep
			/// multiple values.
			///
			/// # Examples
			///
			/// ```rust
			/// use tagcraft::tag::{Accessor, Tag, TagType};
			///
			/// let mut tag = Tag::new(TagType::VorbisComments);
			/// assert_eq!(tag.artist(), None);
			///
			/// tag.set_artist(String::from("Foo artist"));
			/// tag.set_track(5);
			/// assert_eq!(tag.artist().as_deref(), Some("Foo artist"));
			/// assert_eq!(tag.track(), Some(5));
			///
			/// tag.remove_artist();
			/// assert_eq!(tag.artist(), None);
			/// ```
			pub trait Accessor {
				$(
					#[doc = "The " $text_desc ", if any"]
					///
					/// Only the first value is returned if the item repeats.
					fn $text(&self) -> Option<Cow<'_, str>> {
						None
					}

					#[doc = "Replace every " $text_desc " with `value`"]
					fn [<set_ $text>](&mut self, _value: String) {}

					#[doc = "Remove every " $text_desc]
					fn [<remove_ $text>](&mut self) {}
				)+

				$(
					#[doc = "The " $number_desc ", if any"]
					fn $number(&self) -> Option<u32> {
						None
					}

					#[doc = "Set the " $number_desc]
					///
					/// When stored as part of a `number/total` pair, the other half is kept.
					fn [<set_ $number>](&mut self, _value: u32) {}

					#[doc = "Remove the " $number_desc]
					///
					/// When stored as part of a `number/total` pair, only this half is removed.
					fn [<remove_ $number>](&mut self) {}
				)+
			}
		}
	};
}

accessor_trait! {
	text {
		artist  => "track artist",
		title   => "track title",
		album   => "album title",
		genre   => "genre",
		comment => "comment",
	}
	number {
		track       => "track number",
		track_total => "total number of tracks",
		disk        => "disc number",
		disk_total  => "total number of discs",
		year        => "recording year",
	}
}
