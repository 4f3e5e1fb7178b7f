use crate::error::Result;
use crate::macros::{err, try_vec};

use std::io::{Read, Seek, SeekFrom, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

pub(super) const BLOCK_ID_STREAMINFO: u8 = 0;
pub(super) const BLOCK_ID_PADDING: u8 = 1;
pub(super) const BLOCK_ID_VORBIS_COMMENTS: u8 = 4;
pub(super) const BLOCK_ID_PICTURE: u8 = 6;

// Block lengths are 24 bits
const MAX_BLOCK_SIZE: usize = 0xFF_FFFF;

/// A metadata block
///
/// `content` is only filled in for the block types the reader asked for.
pub(super) struct Block {
	pub(super) ty: u8,
	pub(super) last: bool,
	pub(super) content: Vec<u8>,
	pub(super) start: u64,
	pub(super) end: u64,
}

impl Block {
	pub(super) fn read<R, P>(data: &mut R, mut predicate: P) -> Result<Self>
	where
		R: Read + Seek,
		P: FnMut(u8) -> bool,
	{
		let start = data.stream_position()?;

		let byte = data.read_u8()?;
		let last = (byte & 0x80) != 0;
		let ty = byte & 0x7F;

		let size = data.read_u24::<BigEndian>()?;
		log::trace!("Reading FLAC block, type: {ty}, size: {size}");

		let mut content = Vec::new();
		if predicate(ty) {
			content = try_vec![0; size as usize];
			data.read_exact(&mut content)?;
		} else {
			data.seek(SeekFrom::Current(i64::from(size)))?;
		}

		let end = data.stream_position()?;

		Ok(Self {
			ty,
			last,
			content,
			start,
			end,
		})
	}

	pub(super) fn new(ty: u8, content: Vec<u8>) -> Result<Self> {
		if content.len() > MAX_BLOCK_SIZE {
			err!(TooMuchData);
		}

		Ok(Self {
			ty,
			last: false,
			content,
			start: 0,
			end: 0,
		})
	}

	pub(super) fn write_to<W>(&self, writer: &mut W) -> Result<()>
	where
		W: Write,
	{
		let mut byte = self.ty;
		if self.last {
			byte |= 0x80;
		}

		writer.write_u8(byte)?;
		writer.write_u24::<BigEndian>(self.content.len() as u32)?;
		writer.write_all(&self.content)?;

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::{BLOCK_ID_PADDING, BLOCK_ID_PICTURE, Block};

	use std::io::Cursor;

	#[test_log::test]
	fn skipped_content() {
		let mut bytes = Vec::new();
		let mut block = Block::new(BLOCK_ID_PADDING, vec![0; 10]).unwrap();
		block.last = true;
		block.write_to(&mut bytes).unwrap();

		assert_eq!(&bytes[..4], &[0x81, 0, 0, 10]);

		let read = Block::read(&mut Cursor::new(&bytes), |ty| ty == BLOCK_ID_PICTURE).unwrap();
		assert!(read.last);
		assert!(read.content.is_empty());
		assert_eq!(read.end, 14);
	}

	#[test_log::test]
	fn too_large() {
		assert!(Block::new(BLOCK_ID_PADDING, vec![0; 0x100_0000]).is_err());
	}
}
