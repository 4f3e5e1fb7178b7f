use crate::tag::TagType;

use std::collections::HashMap;

#[cfg(doc)]
use crate::tag::{Accessor, Tag};

macro_rules! first_key {
	($key:tt $(| $remaining:expr)*) => {
		$key
	};
}

macro_rules! first_variant {
	($variant:ident $(| $remaining:ident)*) => {
		ItemKey::$variant
	};
}

// Generates a two-way map between native keys and `ItemKey`s
//
//     gen_map!(VORBIS_MAP; "ARTIST" => TrackArtist, "AUTHOR" | "WRITER" => Writer);
//
// With several native keys on the left, the first is the one written. The rest are only
// recognized when reading. With several variants on the right, the first is what the key reads
// as, and all of them write to it. Native keys are matched ignoring ASCII case.
macro_rules! gen_map {
	(
		$(#[$meta:meta])?
		$NAME:ident;

		$(
			$($key:literal)|+ => $($variant:ident)|+
		),+ $(,)?
	) => {
		$(#[$meta])?
		#[allow(non_camel_case_types)]
		struct $NAME;

		$(#[$meta])?
		impl $NAME {
			pub(crate) fn get_item_key(&self, key: &str) -> Option<ItemKey> {
				static INSTANCE: std::sync::OnceLock<HashMap<String, ItemKey>> = std::sync::OnceLock::new();

				let map = INSTANCE.get_or_init(|| {
					let mut map = HashMap::new();
					$(
						let variant = first_variant!($($variant)|+);
						$(
							map.entry($key.to_ascii_uppercase()).or_insert_with(|| variant.clone());
						)+
					)+
					map
				});

				map.get(&key.to_ascii_uppercase()).cloned()
			}

			pub(crate) fn get_key(&self, item_key: &ItemKey) -> Option<&'static str> {
				match item_key {
					$(
						$(ItemKey::$variant)|+ => Some(first_key!($($key)|*)),
					)+
					_ => None
				}
			}
		}
	};
}

gen_map!(
	ASF_MAP;

	"Title"                             => TrackTitle,
	"Author"                            => TrackArtist,
	"Copyright"                         => CopyrightMessage,
	"Description"                       => Comment,
	"Rating"                            => ParentalRating,
	"WM/AlbumTitle"                     => AlbumTitle,
	"WM/SetSubTitle"                    => SetSubtitle,
	"WM/ContentGroupDescription"        => ContentGroup,
	"WM/SubTitle"                       => TrackSubtitle,
	"WM/OriginalAlbumTitle"             => OriginalAlbumTitle,
	"WM/OriginalArtist"                 => OriginalArtist,
	"WM/AlbumSortOrder"                 => AlbumTitleSortOrder,
	"WM/AlbumArtistSortOrder"           => AlbumArtistSortOrder,
	"WM/TitleSortOrder"                 => TrackTitleSortOrder,
	"WM/ArtistSortOrder"                => TrackArtistSortOrder,
	"WM/ComposerSortOrder"              => ComposerSortOrder,
	"WM/AlbumArtist"                    => AlbumArtist,
	"WM/Writer"                         => Writer | Lyricist,
	"WM/Composer"                       => Composer,
	"WM/Conductor"                      => Conductor,
	"WM/Director"                       => Director,
	"WM/Producer"                       => Producer,
	"WM/Publisher"                      => Publisher | Label,
	"WM/ModifiedBy"                     => Remixer,
	"WM/PartOfSet"                      => DiscNumber,
	"WM/DiscTotal"                      => DiscTotal,
	"WM/TrackNumber"                    => TrackNumber,
	"WM/TrackTotal"                     => TrackTotal,
	"WM/Year"                           => Year | RecordingDate,
	"WM/OriginalReleaseYear"            => OriginalReleaseDate,
	"WM/ISRC"                           => Isrc,
	"WM/Barcode"                        => Barcode,
	"WM/CatalogNo"                      => CatalogNumber,
	"WM/IsCompilation"                  => FlagCompilation,
	"WM/Media"                          => OriginalMediaType,
	"WM/EncodedBy"                      => EncodedBy,
	"WM/ToolName"                       => EncoderSoftware,
	"WM/EncodingSettings"               => EncoderSettings,
	"REPLAYGAIN_ALBUM_GAIN"             => ReplayGainAlbumGain,
	"REPLAYGAIN_ALBUM_PEAK"             => ReplayGainAlbumPeak,
	"REPLAYGAIN_TRACK_GAIN"             => ReplayGainTrackGain,
	"REPLAYGAIN_TRACK_PEAK"             => ReplayGainTrackPeak,
	"WM/Genre"                          => Genre,
	"WM/Mood"                           => Mood,
	"WM/BeatsPerMinute"                 => IntegerBpm,
	"WM/InitialKey"                     => InitialKey,
	"WM/Language"                       => Language,
	"WM/Lyrics"                         => Lyrics,
	"MusicBrainz/Track Id"              => MusicBrainzRecordingId,
	"MusicBrainz/Release Track Id"      => MusicBrainzTrackId,
	"MusicBrainz/Album Id"              => MusicBrainzReleaseId,
	"MusicBrainz/Release Group Id"      => MusicBrainzReleaseGroupId,
	"MusicBrainz/Artist Id"             => MusicBrainzArtistId,
	"MusicBrainz/Album Artist Id"       => MusicBrainzReleaseArtistId,
	"MusicBrainz/Work Id"               => MusicBrainzWorkId,
	"MusicBrainz/Album Release Country" => ReleaseCountry
);

gen_map!(
	ID3V2_MAP;

	"TALB"                                  => AlbumTitle,
	"TSST"                                  => SetSubtitle,
	"TIT1"                                  => ContentGroup,
	"TIT2"                                  => TrackTitle,
	"TIT3"                                  => TrackSubtitle,
	"TOAL"                                  => OriginalAlbumTitle,
	"TOPE"                                  => OriginalArtist,
	"TSOA"                                  => AlbumTitleSortOrder,
	"TSO2"                                  => AlbumArtistSortOrder,
	"TSOT"                                  => TrackTitleSortOrder,
	"TSOP"                                  => TrackArtistSortOrder,
	"TSOC"                                  => ComposerSortOrder,
	"TPE2"                                  => AlbumArtist,
	"TPE1"                                  => TrackArtist,
	"TEXT"                                  => Writer | Lyricist,
	"TCOM"                                  => Composer,
	"TPE3"                                  => Conductor,
	"TPUB"                                  => Publisher | Label,
	"TPE4"                                  => Remixer,
	"TPOS"                                  => DiscNumber,
	"TPOS"                                  => DiscTotal,
	"TRCK"                                  => TrackNumber,
	"TRCK"                                  => TrackTotal,
	"TDRC"                                  => RecordingDate | Year,
	"TDOR"                                  => OriginalReleaseDate,
	"TDRL"                                  => ReleaseDate,
	"TSRC"                                  => Isrc,
	"TCMP"                                  => FlagCompilation,
	"TLEN"                                  => Length,
	"TMED"                                  => OriginalMediaType,
	"TENC"                                  => EncodedBy,
	"TSSE"                                  => EncoderSoftware | EncoderSettings,
	"TCON"                                  => Genre,
	"TKEY"                                  => InitialKey,
	"TMOO"                                  => Mood,
	"TBPM"                                  => IntegerBpm,
	"TCOP"                                  => CopyrightMessage,
	"COMM"                                  => Comment,
	"TLAN"                                  => Language,
	"USLT"                                  => Lyrics,
	"BARCODE"                               => Barcode,
	"CATALOGNUMBER"                         => CatalogNumber,
	"REPLAYGAIN_ALBUM_GAIN"                 => ReplayGainAlbumGain,
	"REPLAYGAIN_ALBUM_PEAK"                 => ReplayGainAlbumPeak,
	"REPLAYGAIN_TRACK_GAIN"                 => ReplayGainTrackGain,
	"REPLAYGAIN_TRACK_PEAK"                 => ReplayGainTrackPeak,
	"MusicBrainz Release Track Id"          => MusicBrainzTrackId,
	"MusicBrainz Album Id"                  => MusicBrainzReleaseId,
	"MusicBrainz Release Group Id"          => MusicBrainzReleaseGroupId,
	"MusicBrainz Artist Id"                 => MusicBrainzArtistId,
	"MusicBrainz Album Artist Id"           => MusicBrainzReleaseArtistId,
	"MusicBrainz Work Id"                   => MusicBrainzWorkId,
	"MusicBrainz Album Release Country"     => ReleaseCountry
);

gen_map!(
	ILST_MAP;

	"\u{a9}alb"                                               => AlbumTitle,
	"----:com.apple.iTunes:DISCSUBTITLE"                      => SetSubtitle,
	"\u{a9}grp"                                               => ContentGroup,
	"\u{a9}nam"                                               => TrackTitle,
	"----:com.apple.iTunes:SUBTITLE"                          => TrackSubtitle,
	"soal"                                                    => AlbumTitleSortOrder,
	"soaa"                                                    => AlbumArtistSortOrder,
	"sonm"                                                    => TrackTitleSortOrder,
	"soar"                                                    => TrackArtistSortOrder,
	"soco"                                                    => ComposerSortOrder,
	"aART"                                                    => AlbumArtist,
	"\u{a9}ART"                                               => TrackArtist,
	"\u{a9}wrt"                                               => Composer,
	"\u{a9}dir"                                               => Director,
	"----:com.apple.iTunes:CONDUCTOR"                         => Conductor,
	"----:com.apple.iTunes:ENGINEER"                          => Engineer,
	"----:com.apple.iTunes:LYRICIST"                          => Lyricist,
	"----:com.apple.iTunes:PRODUCER"                          => Producer,
	"----:com.apple.iTunes:LABEL"                             => Label,
	"----:com.apple.iTunes:REMIXER"                           => Remixer,
	"disk"                                                    => DiscNumber,
	"disk"                                                    => DiscTotal,
	"trkn"                                                    => TrackNumber,
	"trkn"                                                    => TrackTotal,
	"rtng"                                                    => ParentalRating,
	"\u{a9}day"                                               => RecordingDate | Year,
	"----:com.apple.iTunes:ORIGINALDATE"                      => OriginalReleaseDate,
	"----:com.apple.iTunes:RELEASEDATE"                       => ReleaseDate,
	"----:com.apple.iTunes:ISRC"                              => Isrc,
	"----:com.apple.iTunes:BARCODE"                           => Barcode,
	"----:com.apple.iTunes:CATALOGNUMBER"                     => CatalogNumber,
	"cpil"                                                    => FlagCompilation,
	"----:com.apple.iTunes:MEDIA"                             => OriginalMediaType,
	"\u{a9}enc"                                               => EncodedBy,
	"\u{a9}too"                                               => EncoderSoftware,
	"\u{a9}gen"                                               => Genre,
	"----:com.apple.iTunes:MOOD"                              => Mood,
	"tmpo"                                                    => IntegerBpm,
	"----:com.apple.iTunes:BPM"                               => Bpm,
	"----:com.apple.iTunes:initialkey"                        => InitialKey,
	"----:com.apple.iTunes:replaygain_album_gain"             => ReplayGainAlbumGain,
	"----:com.apple.iTunes:replaygain_album_peak"             => ReplayGainAlbumPeak,
	"----:com.apple.iTunes:replaygain_track_gain"             => ReplayGainTrackGain,
	"----:com.apple.iTunes:replaygain_track_peak"             => ReplayGainTrackPeak,
	"cprt"                                                    => CopyrightMessage,
	"----:com.apple.iTunes:LICENSE"                           => License,
	"\u{a9}cmt"                                               => Comment,
	"desc"                                                    => Description,
	"----:com.apple.iTunes:LANGUAGE"                          => Language,
	"\u{a9}lyr"                                               => Lyrics,
	"----:com.apple.iTunes:MusicBrainz Track Id"              => MusicBrainzRecordingId,
	"----:com.apple.iTunes:MusicBrainz Release Track Id"      => MusicBrainzTrackId,
	"----:com.apple.iTunes:MusicBrainz Album Id"              => MusicBrainzReleaseId,
	"----:com.apple.iTunes:MusicBrainz Release Group Id"      => MusicBrainzReleaseGroupId,
	"----:com.apple.iTunes:MusicBrainz Artist Id"             => MusicBrainzArtistId,
	"----:com.apple.iTunes:MusicBrainz Album Artist Id"       => MusicBrainzReleaseArtistId,
	"----:com.apple.iTunes:MusicBrainz Work Id"               => MusicBrainzWorkId,
	"----:com.apple.iTunes:MusicBrainz Album Release Country" => ReleaseCountry
);

gen_map!(
	RIFF_INFO_MAP;

	"IPRD"          => AlbumTitle,
	"INAM"          => TrackTitle,
	"IART"          => TrackArtist,
	"IWRI"          => Writer,
	"IMUS"          => Composer,
	"IPRO"          => Producer,
	"IPRT" | "ITRK" => TrackNumber,
	"IFRM"          => TrackTotal,
	"ICRD"          => RecordingDate | Year,
	"TLEN"          => Length,
	"ISRF"          => OriginalMediaType,
	"ITCH"          => EncodedBy,
	"ISFT"          => EncoderSoftware,
	"IGNR"          => Genre,
	"ICOP"          => CopyrightMessage,
	"ICMT"          => Comment,
	"ILNG"          => Language,
	"ICNT"          => ReleaseCountry
);

gen_map!(
	VORBIS_MAP;

	"ALBUM"                                   => AlbumTitle,
	"DISCSUBTITLE"                            => SetSubtitle,
	"GROUPING"                                => ContentGroup,
	"TITLE"                                   => TrackTitle,
	"SUBTITLE"                                => TrackSubtitle,
	"RELEASECOUNTRY"                          => ReleaseCountry,
	"ALBUMSORT"                               => AlbumTitleSortOrder,
	"ALBUMARTISTSORT"                         => AlbumArtistSortOrder,
	"TITLESORT"                               => TrackTitleSortOrder,
	"ARTISTSORT"                              => TrackArtistSortOrder,
	"COMPOSERSORT"                            => ComposerSortOrder,
	"ALBUMARTIST"  | "ALBUM ARTIST"           => AlbumArtist,
	"ARTIST"                                  => TrackArtist,
	"ARRANGER"                                => Arranger,
	"AUTHOR" | "WRITER"                       => Writer,
	"COMPOSER"                                => Composer,
	"CONDUCTOR"                               => Conductor,
	"DIRECTOR"                                => Director,
	"ENGINEER"                                => Engineer,
	"LYRICIST"                                => Lyricist,
	"PRODUCER"                                => Producer,
	"PUBLISHER"                               => Publisher,
	"LABEL" | "ORGANIZATION"                  => Label,
	"REMIXER" | "MIXARTIST"                   => Remixer,
	"DISCNUMBER"                              => DiscNumber,
	"DISCTOTAL" | "TOTALDISCS"                => DiscTotal,
	"TRACKNUMBER"                             => TrackNumber,
	"TRACKTOTAL" | "TOTALTRACKS"              => TrackTotal,
	"DATE"                                    => RecordingDate,
	"YEAR"                                    => Year,
	"ORIGINALDATE" | "ORIGINALYEAR"           => OriginalReleaseDate,
	"RELEASEDATE"                             => ReleaseDate,
	"ISRC"                                    => Isrc,
	"BARCODE"                                 => Barcode,
	"CATALOGNUMBER"                           => CatalogNumber,
	"COMPILATION"                             => FlagCompilation,
	"MEDIA"                                   => OriginalMediaType,
	"ENCODEDBY" | "ENCODED-BY" | "ENCODED_BY" => EncodedBy,
	"ENCODER"                                 => EncoderSoftware,
	"ENCODING" | "ENCODERSETTINGS"            => EncoderSettings,
	"REPLAYGAIN_ALBUM_GAIN"                   => ReplayGainAlbumGain,
	"REPLAYGAIN_ALBUM_PEAK"                   => ReplayGainAlbumPeak,
	"REPLAYGAIN_TRACK_GAIN"                   => ReplayGainTrackGain,
	"REPLAYGAIN_TRACK_PEAK"                   => ReplayGainTrackPeak,
	"GENRE"                                   => Genre,
	"MOOD"                                    => Mood,
	"BPM"                                     => Bpm,
	"INITIALKEY" | "KEY"                      => InitialKey,
	"COPYRIGHT"                               => CopyrightMessage,
	"LICENSE"                                 => License,
	"COMMENT"                                 => Comment,
	// Kept distinct from "COMMENT", the two are rarely converted between
	"DESCRIPTION"                             => Description,
	"LANGUAGE"                                => Language,
	"LYRICS" | "UNSYNCEDLYRICS"               => Lyrics,
	"RATING"                                  => ParentalRating,
	"MUSICBRAINZ_TRACKID"                     => MusicBrainzRecordingId,
	"MUSICBRAINZ_RELEASETRACKID"              => MusicBrainzTrackId,
	"MUSICBRAINZ_ALBUMID"                     => MusicBrainzReleaseId,
	"MUSICBRAINZ_RELEASEGROUPID"              => MusicBrainzReleaseGroupId,
	"MUSICBRAINZ_ARTISTID"                    => MusicBrainzArtistId,
	"MUSICBRAINZ_ALBUMARTISTID"               => MusicBrainzReleaseArtistId,
	"MUSICBRAINZ_WORKID"                      => MusicBrainzWorkId
);

macro_rules! gen_item_keys {
	(
		MAPS => [
			$(
				[$tag_type:pat, $MAP:ident]
			),+
		];
		KEYS => [
			$(
				$(#[$variant_meta:meta])*
				$variant_ident:ident
			),+
			$(,)?
		]
	) => {
		#[derive(Clone, Debug, PartialEq, Eq, Hash)]
		#[allow(missing_docs)]
		#[non_exhaustive]
		/// A generic representation of a tag's key
		pub enum ItemKey {
			$(
				$(#[$variant_meta])*
				$variant_ident,
			)+
			/// A key with no generic equivalent
			///
			/// This holds the format-specific key, and is only preserved when converting to a
			/// format that accepts it (see [`ItemKey::map_key`]).
			Unknown(String),
		}

		impl ItemKey {
			/// Map a format specific key to an `ItemKey`, if a variant exists
			///
			/// This will never return [`ItemKey::Unknown`], see [`ItemKey::from_key_or_unknown`].
			///
			/// # Examples
			///
			/// ```rust
			/// use tagcraft::tag::{ItemKey, TagType};
			///
			/// assert_eq!(ItemKey::from_key(TagType::VorbisComments, "artist"), Some(ItemKey::TrackArtist));
			/// assert_eq!(ItemKey::from_key(TagType::VorbisComments, "MY_KEY"), None);
			/// ```
			pub fn from_key(tag_type: TagType, key: &str) -> Option<Self> {
				match tag_type {
					$(
						$tag_type => $MAP.get_item_key(key),
					)+
				}
			}

			/// Maps the variant to a format-specific key
			///
			/// For [`ItemKey::Unknown`], the stored key is returned as-is if it is a valid key
			/// in the target format.
			///
			/// # Examples
			///
			/// ```rust
			/// use tagcraft::tag::{ItemKey, TagType};
			///
			/// assert_eq!(ItemKey::TrackTitle.map_key(TagType::Mp4Ilst), Some("\u{a9}nam"));
			/// assert_eq!(ItemKey::TrackTitle.map_key(TagType::Asf), Some("Title"));
			///
			/// let custom = ItemKey::Unknown(String::from("MY_KEY"));
			/// assert_eq!(custom.map_key(TagType::VorbisComments), Some("MY_KEY"));
			/// assert_eq!(custom.map_key(TagType::RiffInfo), None);
			/// ```
			pub fn map_key(&self, tag_type: TagType) -> Option<&str> {
				if let ItemKey::Unknown(key) = self {
					return tag_type.accepts_custom_key(key).then_some(key.as_str());
				}

				match tag_type {
					$(
						$tag_type => $MAP.get_key(self),
					)+
				}
			}
		}
	}
}

gen_item_keys!(
	MAPS => [
		[TagType::Asf, ASF_MAP],

		[TagType::Id3v2, ID3V2_MAP],

		[TagType::Mp4Ilst, ILST_MAP],

		[TagType::RiffInfo, RIFF_INFO_MAP],

		[TagType::VorbisComments, VORBIS_MAP]
	];

	KEYS => [
		// Titles
		AlbumTitle,
		SetSubtitle,
		ContentGroup,
		TrackTitle,
		TrackSubtitle,

		// Original names
		OriginalAlbumTitle,
		OriginalArtist,

		// Sorting
		AlbumTitleSortOrder,
		AlbumArtistSortOrder,
		TrackTitleSortOrder,
		TrackArtistSortOrder,
		ComposerSortOrder,

		// People & Organizations
		AlbumArtist,
		TrackArtist,
		Arranger,
		Writer,
		Composer,
		Conductor,
		Director,
		Engineer,
		Lyricist,
		Producer,
		Publisher,
		Label,
		Remixer,

		// Counts & Indexes
		DiscNumber,
		DiscTotal,
		TrackNumber,
		TrackTotal,
		ParentalRating,

		// Dates
		RecordingDate,
		Year,
		OriginalReleaseDate,
		ReleaseDate,

		// Identifiers
		Isrc,
		Barcode,
		CatalogNumber,

		// Flags
		FlagCompilation,

		// File information
		Length,
		OriginalMediaType,
		EncodedBy,
		EncoderSoftware,
		EncoderSettings,

		// ReplayGain
		ReplayGainAlbumGain,
		ReplayGainAlbumPeak,
		ReplayGainTrackGain,
		ReplayGainTrackPeak,

		// Style
		Genre,
		InitialKey,
		Mood,
		Bpm,
		IntegerBpm,

		// Legal
		CopyrightMessage,
		License,

		// Misc
		Comment,
		Description,
		Language,
		Lyrics,

		// MusicBrainz
		MusicBrainzRecordingId,
		MusicBrainzTrackId,
		MusicBrainzReleaseId,
		MusicBrainzReleaseGroupId,
		MusicBrainzArtistId,
		MusicBrainzReleaseArtistId,
		MusicBrainzWorkId,
		ReleaseCountry,
	]
);

impl ItemKey {
	/// Map a format specific key to an `ItemKey`, falling back to [`ItemKey::Unknown`]
	///
	/// # Examples
	///
	/// ```rust
	/// use tagcraft::tag::{ItemKey, TagType};
	///
	/// assert_eq!(
	/// 	ItemKey::from_key_or_unknown(TagType::VorbisComments, "MY_KEY"),
	/// 	ItemKey::Unknown(String::from("MY_KEY"))
	/// );
	/// ```
	pub fn from_key_or_unknown(tag_type: TagType, key: &str) -> Self {
		Self::from_key(tag_type, key).unwrap_or_else(|| ItemKey::Unknown(key.to_owned()))
	}

	/// Whether the key is one half of a `number/total` pair
	pub fn is_composite(&self) -> bool {
		matches!(
			self,
			ItemKey::TrackNumber | ItemKey::TrackTotal | ItemKey::DiscNumber | ItemKey::DiscTotal
		)
	}
}

/// The value half of a [`TagItem`]
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ItemValue {
	/// Plain text
	Text(String),
	/// A URL or other pointer to external information
	///
	/// ID3v2 stores these in dedicated link frames. Everywhere else they are plain text.
	Locator(String),
	/// Raw bytes, such as an MP4 `data` atom of an unknown type
	Binary(Vec<u8>),
}

impl ItemValue {
	/// The text, if this is [`ItemValue::Text`]
	pub fn text(&self) -> Option<&str> {
		match self {
			Self::Text(text) => Some(text),
			_ => None,
		}
	}

	/// The locator, if this is [`ItemValue::Locator`]
	pub fn locator(&self) -> Option<&str> {
		match self {
			Self::Locator(locator) => Some(locator),
			_ => None,
		}
	}

	/// The bytes, if this is [`ItemValue::Binary`]
	pub fn binary(&self) -> Option<&[u8]> {
		match self {
			Self::Binary(bin) => Some(bin),
			_ => None,
		}
	}

	/// Either kind of string value
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::Text(s) | Self::Locator(s) => Some(s),
			Self::Binary(_) => None,
		}
	}

	/// Either kind of string value, by value
	pub fn into_string(self) -> Option<String> {
		match self {
			Self::Text(s) | Self::Locator(s) => Some(s),
			_ => None,
		}
	}

	/// The bytes, by value
	pub fn into_binary(self) -> Option<Vec<u8>> {
		match self {
			Self::Binary(b) => Some(b),
			_ => None,
		}
	}

	/// Whether the text or bytes are empty
	pub fn is_empty(&self) -> bool {
		match self {
			Self::Binary(binary) => binary.is_empty(),
			Self::Locator(locator) => locator.is_empty(),
			Self::Text(text) => text.is_empty(),
		}
	}
}

/// A single key/value pair of a [`Tag`]
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TagItem {
	pub(crate) item_key: ItemKey,
	pub(crate) item_value: ItemValue,
}

impl TagItem {
	/// Create a `TagItem` only if `item_key` has a native key in `tag_type`
	///
	/// [`Tag::insert`] already performs this check.
	pub fn new_checked(
		tag_type: TagType,
		item_key: ItemKey,
		item_value: ItemValue,
	) -> Option<Self> {
		item_key
			.map_key(tag_type)
			.is_some()
			.then(|| Self::new(item_key, item_value))
	}

	/// Create a `TagItem` without checking the key against any format
	#[must_use]
	pub const fn new(item_key: ItemKey, item_value: ItemValue) -> Self {
		Self {
			item_key,
			item_value,
		}
	}

	/// The item's key
	pub fn key(&self) -> &ItemKey {
		&self.item_key
	}

	/// The item's value
	pub fn value(&self) -> &ItemValue {
		&self.item_value
	}

	/// Discard the key
	pub fn into_value(self) -> ItemValue {
		self.item_value
	}

	/// Split into the key and value
	pub fn consume(self) -> (ItemKey, ItemValue) {
		(self.item_key, self.item_value)
	}

	pub(crate) fn re_map(&self, tag_type: TagType) -> bool {
		self.item_key.map_key(tag_type).is_some()
	}
}
