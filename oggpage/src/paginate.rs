use crate::error::Result;
use crate::header::PageHeader;
use crate::{
	CONTAINS_FIRST_PAGE_OF_BITSTREAM, CONTAINS_LAST_PAGE_OF_BITSTREAM, CONTINUED_PACKET,
	MAX_WRITTEN_CONTENT_SIZE, MAX_WRITTEN_SEGMENT_COUNT, Page,
};

/// Create pages from a list of packets
///
/// Every packet begins on a fresh page. Packets larger than a single page are
/// continued onto as many pages as needed, each holding at most 32 segments.
///
/// NOTES:
///
/// * The sequence numbers will start at 0, they will likely need to be adjusted
///   by the caller.
/// * The checksums are *not* generated, see [`Page::gen_crc`].
/// * Pages on which no packet finishes have an absolute granule position of -1.
///
/// # Errors
///
/// A page could not be created (this should not happen)
pub fn paginate<'a, I>(packets: I, stream_serial: u32, abgp: u64, flags: u8) -> Result<Vec<Page>>
where
	I: IntoIterator<Item = &'a [u8]>,
{
	let mut pages = Vec::new();

	for packet in packets {
		let mut remaining = packet;
		let mut continued = false;

		loop {
			// A packet whose length is a multiple of 255 needs a trailing 0 segment,
			// which may have to spill onto its own page.
			let full_segments = remaining.len() / 255;
			let finishes = full_segments < MAX_WRITTEN_SEGMENT_COUNT;

			let take = if finishes {
				remaining.len()
			} else {
				MAX_WRITTEN_CONTENT_SIZE
			};

			let (content, rest) = remaining.split_at(take);

			let mut header_type_flag = 0;
			if continued {
				header_type_flag |= CONTINUED_PACKET;
			}
			if pages.is_empty() && flags & CONTAINS_FIRST_PAGE_OF_BITSTREAM != 0 {
				header_type_flag |= CONTAINS_FIRST_PAGE_OF_BITSTREAM;
			}

			let page_abgp = if finishes { abgp } else { u64::MAX };

			let header = PageHeader::new(
				header_type_flag,
				page_abgp,
				stream_serial,
				pages.len() as u32,
			);

			let mut page = Page::new(header, content.to_vec())?;
			if !finishes {
				// Page::new terminates the segment table, a continued packet must not be
				page.header.segments = vec![255; MAX_WRITTEN_SEGMENT_COUNT];
				page.end = (crate::PAGE_HEADER_SIZE + MAX_WRITTEN_SEGMENT_COUNT + take) as u64;
			}

			pages.push(page);

			if finishes {
				break;
			}

			remaining = rest;
			continued = true;
		}
	}

	if flags & CONTAINS_LAST_PAGE_OF_BITSTREAM != 0 {
		if let Some(last) = pages.last_mut() {
			last.header.header_type_flag |= CONTAINS_LAST_PAGE_OF_BITSTREAM;
		}
	}

	Ok(pages)
}

#[cfg(test)]
mod tests {
	use crate::paginate;

	#[test_log::test]
	fn multiple_of_255_spills() {
		// 32 full segments fill a page, the terminating 0 segment goes on the next
		let packet = vec![1_u8; 255 * 32];
		let pages = paginate([packet.as_slice()], 1, 10, 0).unwrap();

		assert_eq!(pages.len(), 2);
		assert_eq!(pages[0].header().segments().len(), 32);
		assert_eq!(pages[0].header().abgp, u64::MAX);
		assert_eq!(pages[1].header().segments(), &[0]);
		assert!(pages[1].header().is_continuation());
		assert_eq!(pages[1].header().abgp, 10);
		assert!(pages[1].content().is_empty());
	}

	#[test_log::test]
	fn each_packet_starts_a_page() {
		let packets: [&[u8]; 2] = [b"one", b"two"];
		let pages = paginate(packets, 1, 0, crate::CONTAINS_FIRST_PAGE_OF_BITSTREAM).unwrap();

		assert_eq!(pages.len(), 2);
		assert_eq!(pages[0].header().header_type_flag(), 0x02);
		assert_eq!(pages[1].header().header_type_flag(), 0);
		assert_eq!(pages[1].header().sequence_number, 1);
	}
}
