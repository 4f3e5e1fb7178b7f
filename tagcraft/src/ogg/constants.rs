// Vorbis I, section 4.2.1
pub(crate) const VORBIS_IDENT_HEAD: &[u8] = b"\x01vorbis";
pub(crate) const VORBIS_COMMENT_HEAD: &[u8] = b"\x03vorbis";

// RFC 7845, section 5
pub(crate) const OPUSHEAD: &[u8] = b"OpusHead";
pub(crate) const OPUSTAGS: &[u8] = b"OpusTags";

pub(crate) const METADATA_BLOCK_PICTURE: &str = "METADATA_BLOCK_PICTURE";
