use crate::error::{PageError, Result};
use crate::paginate::paginate;
use crate::Page;

use std::fmt::{Debug, Formatter};
use std::io::{Read, Seek, Write};

/// A container for packets in an OGG file
pub struct Packets {
	content: Vec<u8>,
	packet_sizes: Vec<u64>,
}

impl Packets {
	/// Read as many packets as possible from a reader
	///
	/// # Errors
	///
	/// A page has a bad length
	///
	/// # Examples
	///
	/// ```rust,no_run
	/// use oggpage::Packets;
	///
	/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
	/// let mut file = std::fs::File::open("foo.ogg")?;
	///
	/// let packets = Packets::read(&mut file)?;
	/// # Ok(()) }
	/// ```
	pub fn read<R>(data: &mut R) -> Result<Self>
	where
		R: Read + Seek,
	{
		Self::read_count(data, -1)
	}

	/// Read a specific number of packets from a reader
	///
	/// If `count` is -1, this will read until the end of the stream. Only whole
	/// pages are read, so the reader is left at the end of the page the final
	/// packet ended on.
	///
	/// # Errors
	///
	/// * Unable to read the specified number of packets
	/// * A page has a bad length
	pub fn read_count<R>(data: &mut R, count: isize) -> Result<Self>
	where
		R: Read + Seek,
	{
		let mut content = Vec::new();
		let mut packet_sizes = Vec::new();

		if count == 0 || count < -1 {
			return Ok(Self {
				content,
				packet_sizes,
			});
		}

		let mut current_packet = Vec::new();
		'outer: loop {
			let page = match Page::read(data) {
				Ok(page) => page,
				Err(PageError::Io(e))
					if count == -1 && e.kind() == std::io::ErrorKind::UnexpectedEof =>
				{
					break;
				},
				Err(e) => return Err(e),
			};

			let page_content = page.content();

			let mut offset = 0;
			for &segment in page.header().segments() {
				let segment_len = usize::from(segment);
				current_packet.extend_from_slice(&page_content[offset..offset + segment_len]);
				offset += segment_len;

				if segment < 255 {
					packet_sizes.push(current_packet.len() as u64);
					content.append(&mut current_packet);

					if count != -1 && packet_sizes.len() == count as usize {
						break 'outer;
					}
				}
			}
		}

		if !current_packet.is_empty() {
			log::warn!(
				"Stream ended with an incomplete packet ({} bytes), discarding",
				current_packet.len()
			);
		}

		if count != -1 && packet_sizes.len() != count as usize {
			return Err(PageError::NotEnoughData);
		}

		Ok(Self {
			content,
			packet_sizes,
		})
	}

	/// Returns the number of packets
	pub fn len(&self) -> usize {
		self.packet_sizes.len()
	}

	/// Returns true if there are no packets
	pub fn is_empty(&self) -> bool {
		self.packet_sizes.is_empty()
	}

	fn offset_of(&self, idx: usize) -> usize {
		self.packet_sizes[..idx].iter().map(|&s| s as usize).sum()
	}

	/// Gets the packet at a specified index, returning its contents
	///
	/// NOTES:
	///
	/// * This is zero-indexed
	/// * If the index is out of bounds, it will return [`None`]
	pub fn get(&self, idx: usize) -> Option<&[u8]> {
		let size = *self.packet_sizes.get(idx)? as usize;
		let start = self.offset_of(idx);

		self.content.get(start..start + size)
	}

	/// Sets the packet content, if it exists
	///
	/// Returns `false` if the index is out of bounds.
	pub fn set(&mut self, idx: usize, content: &[u8]) -> bool {
		let Some(&size) = self.packet_sizes.get(idx) else {
			return false;
		};

		let start = self.offset_of(idx);
		let end = start + size as usize;

		self.content.splice(start..end, content.iter().copied());
		self.packet_sizes[idx] = content.len() as u64;

		true
	}

	/// Returns an iterator over the packets
	pub fn iter(&self) -> PacketsIter<'_> {
		<&Self as IntoIterator>::into_iter(self)
	}

	/// Convert the packets into a stream of pages
	///
	/// See [`paginate()`] for more information.
	///
	/// # Errors
	///
	/// See [`paginate()`]
	pub fn paginate(&self, stream_serial: u32, abgp: u64, flags: u8) -> Result<Vec<Page>> {
		paginate(self.iter(), stream_serial, abgp, flags)
	}

	/// Write packets to a writer
	///
	/// This will paginate and write all of the packets to a writer, returning the
	/// number of pages written.
	///
	/// # Errors
	///
	/// * Unable to write, see [`std::io::Error`]
	/// * See [`paginate()`]
	pub fn write_to<W>(
		&self,
		writer: &mut W,
		stream_serial: u32,
		abgp: u64,
		flags: u8,
	) -> Result<usize>
	where
		W: Write,
	{
		let paginated = self.paginate(stream_serial, abgp, flags)?;
		let num_pages = paginated.len();

		for mut page in paginated {
			page.gen_crc();
			writer.write_all(&page.as_bytes())?;
		}

		Ok(num_pages)
	}
}

/// An iterator over packets
pub struct PacketsIter<'a> {
	content: &'a [u8],
	packet_sizes: &'a [u64],
	cap: usize,
}

impl<'a> Iterator for PacketsIter<'a> {
	type Item = &'a [u8];

	fn next(&mut self) -> Option<Self::Item> {
		if self.cap == 0 {
			return None;
		}

		let packet_size = self.packet_sizes[0] as usize;

		self.cap -= 1;
		self.packet_sizes = &self.packet_sizes[1..];

		let (ret, remaining) = self.content.split_at(packet_size);
		self.content = remaining;

		Some(ret)
	}
}

impl<'a> IntoIterator for &'a Packets {
	type Item = &'a [u8];
	type IntoIter = PacketsIter<'a>;

	fn into_iter(self) -> Self::IntoIter {
		PacketsIter {
			content: &self.content,
			packet_sizes: &self.packet_sizes,
			cap: self.packet_sizes.len(),
		}
	}
}

impl Debug for Packets {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Packets")
			.field("total_bytes", &self.content.len())
			.field("count", &self.packet_sizes.len())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use crate::{CONTAINS_FIRST_PAGE_OF_BITSTREAM, Packets, paginate};

	use std::io::Cursor;

	fn stream() -> Vec<u8> {
		let packets: [&[u8]; 3] = [b"ident", &[0x5A; 600], b"setup"];

		let mut bytes = Vec::new();
		for (seq, mut page) in paginate(packets, 42, 0, CONTAINS_FIRST_PAGE_OF_BITSTREAM)
			.unwrap()
			.into_iter()
			.enumerate()
		{
			page.header_mut().sequence_number = seq as u32;
			page.gen_crc();
			bytes.extend(page.as_bytes());
		}

		bytes
	}

	#[test_log::test]
	fn read_all_packets() {
		let packets = Packets::read(&mut Cursor::new(stream())).unwrap();

		assert_eq!(packets.len(), 3);
		assert_eq!(packets.get(0), Some(&b"ident"[..]));
		assert_eq!(packets.get(1).map(<[u8]>::len), Some(600));
		assert_eq!(packets.get(2), Some(&b"setup"[..]));
		assert_eq!(packets.get(3), None);
	}

	#[test_log::test]
	fn read_count_stops_at_page_end() {
		let bytes = stream();
		let mut reader = Cursor::new(bytes);

		let packets = Packets::read_count(&mut reader, 1).unwrap();
		assert_eq!(packets.len(), 1);
		// 27 byte header + 1 segment + 5 bytes
		assert_eq!(reader.position(), 33);

		assert!(Packets::read_count(&mut Cursor::new(stream()), 5).is_err());
	}

	#[test_log::test]
	fn set_packet() {
		let mut packets = Packets::read(&mut Cursor::new(stream())).unwrap();

		assert!(packets.set(1, b"comment"));
		assert!(!packets.set(7, b"nope"));

		let collected = packets.iter().collect::<Vec<_>>();
		assert_eq!(collected, vec![&b"ident"[..], b"comment", b"setup"]);

		let mut out = Vec::new();
		let written = packets.write_to(&mut out, 42, 0, 0).unwrap();
		assert_eq!(written, 3);

		let reread = Packets::read(&mut Cursor::new(out)).unwrap();
		assert_eq!(reread.get(1), Some(&b"comment"[..]));
	}
}
