use crate::chunk::{ChunkHeader, HeaderCodec};
use crate::config::ParsingMode;
use crate::error::{ChunkErrorKind, ErrorKind, Result, TagError};

use std::io::{Read, Seek, SeekFrom};
use std::marker::PhantomData;

/// Iterates the children of a single parent chunk
///
/// The walker only ever looks at headers. It's up to the caller to either consume a chunk's
/// content, or [`skip`](ChunkWalker::skip) it.
///
/// How a malformed header is handled depends on the [`ParsingMode`]:
///
/// * An invalid identifier is fatal in [`ParsingMode::Strict`], otherwise the walk stops
/// * An invalid length is fatal unless in [`ParsingMode::Relaxed`]
pub struct ChunkWalker<C: HeaderCodec> {
	end: u64,
	parse_mode: ParsingMode,
	last_padded: bool,
	_codec: PhantomData<C>,
}

impl<C: HeaderCodec> ChunkWalker<C> {
	/// Create a walker that stops at the absolute offset `end`
	pub fn new(end: u64, parse_mode: ParsingMode) -> Self {
		Self {
			end,
			parse_mode,
			last_padded: false,
			_codec: PhantomData,
		}
	}

	/// Create a walker over the children of `parent`
	///
	/// The reader is expected to be positioned at the first child.
	pub fn for_parent(parent: &ChunkHeader<C::Ident>, parse_mode: ParsingMode) -> Self {
		Self::new(parent.end(), parse_mode)
	}

	/// The absolute offset the walk ends at
	pub fn end(&self) -> u64 {
		self.end
	}

	/// Read the next sibling header
	///
	/// Returns `None` once the parent is exhausted.
	///
	/// # Errors
	///
	/// See [`ChunkWalker`]
	pub fn next<R>(&mut self, reader: &mut R) -> Result<Option<ChunkHeader<C::Ident>>>
	where
		R: Read + Seek,
	{
		let pos = reader.stream_position()?;
		if pos >= self.end {
			return Ok(None);
		}

		let err = match C::decode(reader, self.end - pos) {
			Ok(Some(header)) => {
				log::trace!(
					"Found chunk {:?} @ {} ({} bytes)",
					header.ident,
					header.start,
					header.len
				);
				self.last_padded = false;
				return Ok(Some(header));
			},
			Ok(None) => return Ok(None),
			Err(err) => err,
		};

		let kind = chunk_error_kind(&err);

		// Some writers forget to pad odd-sized chunks, meaning we overshot by a byte
		if kind == Some(ChunkErrorKind::InvalidIdentifier) && self.last_padded && pos > 0 {
			log::warn!("Invalid chunk identifier after an odd-sized chunk, retrying one byte back");

			self.last_padded = false;
			reader.seek(SeekFrom::Start(pos - 1))?;

			if let Ok(Some(header)) = C::decode(reader, self.end - (pos - 1)) {
				return Ok(Some(header));
			}

			reader.seek(SeekFrom::Start(pos))?;
		}

		match kind {
			Some(ChunkErrorKind::InvalidIdentifier | ChunkErrorKind::Truncated)
				if self.parse_mode != ParsingMode::Strict =>
			{
				log::warn!("{err}, stopping");
			},
			Some(ChunkErrorKind::BadLength) if self.parse_mode == ParsingMode::Relaxed => {
				log::warn!("{err}, stopping");
			},
			_ => return Err(err),
		}

		// Nothing else can be gathered from this parent
		reader.seek(SeekFrom::Start(self.end))?;
		Ok(None)
	}

	/// Skip over a chunk's content (and padding)
	///
	/// # Errors
	///
	/// * [`std::io::Error`]
	pub fn skip<R>(&mut self, reader: &mut R, header: &ChunkHeader<C::Ident>) -> Result<()>
	where
		R: Seek,
	{
		let padding = C::padding(header.payload_len());
		let end = header.end() + padding;

		reader.seek(SeekFrom::Start(end.min(self.end)))?;
		self.last_padded = padding > 0;

		Ok(())
	}

	/// Find the first sibling with the identifier `ident`, skipping all others
	///
	/// The reader is left at the start of the matching chunk's content.
	///
	/// # Errors
	///
	/// See [`ChunkWalker::next`]
	pub fn seek_sibling<R>(
		&mut self,
		reader: &mut R,
		ident: C::Ident,
	) -> Result<Option<ChunkHeader<C::Ident>>>
	where
		R: Read + Seek,
	{
		while let Some(header) = self.next(reader)? {
			if header.ident == ident {
				return Ok(Some(header));
			}

			self.skip(reader, &header)?;
		}

		Ok(None)
	}

	/// Visit every remaining sibling
	///
	/// The visitor is free to consume as much of the chunk's content as it wants, the reader
	/// is moved to the next sibling afterwards.
	///
	/// # Errors
	///
	/// * See [`ChunkWalker::next`]
	/// * Any error returned by `visitor`
	pub fn for_each_child<R, V>(&mut self, reader: &mut R, mut visitor: V) -> Result<()>
	where
		R: Read + Seek,
		V: FnMut(&mut R, &ChunkHeader<C::Ident>) -> Result<()>,
	{
		while let Some(header) = self.next(reader)? {
			visitor(reader, &header)?;
			self.skip(reader, &header)?;
		}

		Ok(())
	}
}

fn chunk_error_kind(err: &TagError) -> Option<ChunkErrorKind> {
	match err.kind() {
		ErrorKind::BadChunk(chunk_err) => Some(chunk_err.kind()),
		_ => None,
	}
}

#[cfg(test)]
mod tests {
	use crate::chunk::{ChunkWalker, HeaderCodec, Mp4BoxCodec, RiffLeCodec};
	use crate::config::ParsingMode;

	use std::io::{Cursor, Read};

	fn boxed(ident: &[u8; 4], payload: &[u8]) -> Vec<u8> {
		let mut out = ((payload.len() + 8) as u32).to_be_bytes().to_vec();
		out.extend(ident);
		out.extend(payload);
		out
	}

	#[test_log::test]
	fn nested_mp4() {
		let stbl = boxed(b"stbl", &boxed(b"stco", &[0; 8]));
		let mut data = boxed(b"ftyp", b"M4A ");
		data.extend(boxed(b"moov", &boxed(b"trak", &stbl)));

		let len = data.len() as u64;
		let mut reader = Cursor::new(data);

		let mut walker = ChunkWalker::<Mp4BoxCodec>::new(len, ParsingMode::Strict);
		let moov = walker.seek_sibling(&mut reader, *b"moov").unwrap().unwrap();
		assert_eq!(moov.start, 12);

		let mut idents = Vec::new();
		let mut children = ChunkWalker::<Mp4BoxCodec>::for_parent(&moov, ParsingMode::Strict);
		children
			.for_each_child(&mut reader, |_, header| {
				idents.push(header.ident);
				Ok(())
			})
			.unwrap();

		assert_eq!(idents, vec![*b"trak"]);
		assert!(walker.next(&mut reader).unwrap().is_none());
	}

	#[test_log::test]
	fn invalid_identifier_by_mode() {
		let mut data = boxed(b"free", &[]);
		data.extend([0, 0, 0, 8, 0, 0, 0, 0]);

		let len = data.len() as u64;
		let mut reader = Cursor::new(data);

		let mut walker = ChunkWalker::<Mp4BoxCodec>::new(len, ParsingMode::BestAttempt);
		let mut count = 0;
		walker
			.for_each_child(&mut reader, |_, _| {
				count += 1;
				Ok(())
			})
			.unwrap();
		assert_eq!(count, 1);

		reader.set_position(0);
		let mut strict = ChunkWalker::<Mp4BoxCodec>::new(len, ParsingMode::Strict);
		assert!(
			strict
				.for_each_child(&mut reader, |_, _| Ok(()))
				.is_err()
		);
	}

	#[test_log::test]
	fn bad_length_is_fatal() {
		// Claims 0x100 bytes, but only 16 are available
		let mut data = vec![0, 0, 1, 0];
		data.extend(b"free");
		data.extend([0; 8]);

		let mut walker = ChunkWalker::<Mp4BoxCodec>::new(16, ParsingMode::BestAttempt);
		assert!(walker.next(&mut Cursor::new(data.clone())).is_err());

		let mut relaxed = ChunkWalker::<Mp4BoxCodec>::new(16, ParsingMode::Relaxed);
		assert!(relaxed.next(&mut Cursor::new(data)).unwrap().is_none());
	}

	#[test_log::test]
	fn riff_padding() {
		let mut data = b"abcd\x03\x00\x00\x00xyz\x00".to_vec();
		data.extend(b"efgh\x02\x00\x00\x00ok");

		let len = data.len() as u64;
		let mut reader = Cursor::new(data);
		let mut walker = ChunkWalker::<RiffLeCodec>::new(len, ParsingMode::Strict);

		let first = walker.next(&mut reader).unwrap().unwrap();
		assert_eq!(RiffLeCodec::padding(first.payload_len()), 1);
		walker.skip(&mut reader, &first).unwrap();

		let second = walker.next(&mut reader).unwrap().unwrap();
		assert_eq!(&second.ident, b"efgh");
		assert_eq!(second.start, 12);
	}

	#[test_log::test]
	fn riff_odd_offset_recovery() {
		// The first chunk is odd-sized, but the writer didn't pad it
		let mut data = b"abcd\x03\x00\x00\x00xyz".to_vec();
		data.extend(b"efgh\x02\x00\x00\x00ok");

		let len = data.len() as u64;
		let mut reader = Cursor::new(data);
		let mut walker = ChunkWalker::<RiffLeCodec>::new(len, ParsingMode::BestAttempt);

		let first = walker.next(&mut reader).unwrap().unwrap();
		walker.skip(&mut reader, &first).unwrap();

		let second = walker.next(&mut reader).unwrap().unwrap();
		assert_eq!(&second.ident, b"efgh");
		assert_eq!(second.start, 11);

		let mut content = [0; 2];
		reader.read_exact(&mut content).unwrap();
		assert_eq!(&content, b"ok");
	}
}
