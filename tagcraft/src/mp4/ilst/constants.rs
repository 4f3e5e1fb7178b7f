/// Identifiers for flag atoms
///
/// Any identifier in here will be treated as having [`AtomData::Bool`] as its data type when parsing.
/// See [`Ilst::set_flag`] for more information.
///
/// [`AtomData::Bool`]: crate::mp4::AtomData::Bool
/// [`Ilst::set_flag`]: crate::mp4::Ilst::set_flag
pub mod flags {
	use crate::mp4::AtomIdent;

	/// Podcast flag (`pcst`)
	pub const PODCAST: AtomIdent<'_> = AtomIdent::Fourcc(*b"pcst");
	/// Gapless playback flag (`pgap`)
	pub const GAPLESS: AtomIdent<'_> = AtomIdent::Fourcc(*b"pgap");
	/// Compilation flag (`cpil`)
	pub const COMPILATION: AtomIdent<'_> = AtomIdent::Fourcc(*b"cpil");
	/// HD video flag (`hdvd`)
	pub const HD_VIDEO: AtomIdent<'_> = AtomIdent::Fourcc(*b"hdvd");
	/// Show work and movement flag (`shwm`)
	pub const SHOW_WORK: AtomIdent<'_> = AtomIdent::Fourcc(*b"shwm");

	pub(crate) fn is_flag(fourcc: &[u8; 4]) -> bool {
		matches!(fourcc, b"pcst" | b"pgap" | b"cpil" | b"hdvd" | b"shwm")
	}
}

pub(crate) const WELL_KNOWN_TYPE_SET: u8 = 0;

/// The genre vocabulary of the `gnre` atom
///
/// `gnre` stores `index + 1` into this list, as a big-endian `u16`. These are the first 80
/// ID3v1 genres.
pub const GENRES: [&str; 80] = [
	"Blues",
	"Classic Rock",
	"Country",
	"Dance",
	"Disco",
	"Funk",
	"Grunge",
	"Hip-Hop",
	"Jazz",
	"Metal",
	"New Age",
	"Oldies",
	"Other",
	"Pop",
	"R&B",
	"Rap",
	"Reggae",
	"Rock",
	"Techno",
	"Industrial",
	"Alternative",
	"Ska",
	"Death Metal",
	"Pranks",
	"Soundtrack",
	"Euro-Techno",
	"Ambient",
	"Trip-Hop",
	"Vocal",
	"Jazz+Funk",
	"Fusion",
	"Trance",
	"Classical",
	"Instrumental",
	"Acid",
	"House",
	"Game",
	"Sound Clip",
	"Gospel",
	"Noise",
	"Alternative Rock",
	"Bass",
	"Soul",
	"Punk",
	"Space",
	"Meditative",
	"Instrumental Pop",
	"Instrumental Rock",
	"Ethnic",
	"Gothic",
	"Darkwave",
	"Techno-Industrial",
	"Electronic",
	"Pop-Folk",
	"Eurodance",
	"Dream",
	"Southern Rock",
	"Comedy",
	"Cult",
	"Gangsta",
	"Top 40",
	"Christian Rap",
	"Pop/Funk",
	"Jungle",
	"Native American",
	"Cabaret",
	"New Wave",
	"Psychadelic",
	"Rave",
	"Showtunes",
	"Trailer",
	"Lo-Fi",
	"Tribal",
	"Acid Punk",
	"Acid Jazz",
	"Polka",
	"Retro",
	"Musical",
	"Rock & Roll",
	"Hard Rock",
];

/// The `gnre` code of a genre, if it is part of [`GENRES`]
///
/// # Examples
///
/// ```rust
/// use tagcraft::mp4::constants::genre_code;
///
/// assert_eq!(genre_code("Blues"), Some(1));
/// assert_eq!(genre_code("classical"), Some(33));
/// assert_eq!(genre_code("Vaporwave"), None);
/// ```
pub fn genre_code(genre: &str) -> Option<u16> {
	GENRES
		.iter()
		.position(|g| g.eq_ignore_ascii_case(genre.trim()))
		.map(|index| index as u16 + 1)
}

/// The genre for a `gnre` code
pub fn genre_name(code: u16) -> Option<&'static str> {
	GENRES.get(usize::from(code.checked_sub(1)?)).copied()
}
