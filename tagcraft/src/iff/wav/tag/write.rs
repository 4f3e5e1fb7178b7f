use super::RiffInfoList;
use crate::error::Result;
use crate::iff::wav::write::push_chunk;

/// Create a complete `LIST` chunk of type `INFO`
///
/// Empty values are skipped. If nothing is left to write, no bytes are produced, which
/// removes the list.
pub(in crate::iff::wav) fn create_riff_info(tag: &RiffInfoList) -> Result<Vec<u8>> {
	let mut items = Vec::new();

	for (key, value) in &tag.items {
		if value.is_empty() {
			continue;
		}

		let Ok(ident) = <[u8; 4]>::try_from(key.as_bytes()) else {
			log::warn!("RIFF INFO: Skipping item with an invalid key \"{key}\"");
			continue;
		};

		// Every value is null terminated, the chunk padding is handled separately
		let mut content = Vec::with_capacity(value.len() + 1);
		content.extend(value.as_bytes());
		content.push(0);

		push_chunk(&mut items, ident, &content)?;
	}

	if items.is_empty() {
		log::debug!("No items to write, removing RIFF INFO list");
		return Ok(items);
	}

	let mut list_content = Vec::with_capacity(items.len() + 4);
	list_content.extend(b"INFO");
	list_content.extend(items);

	let mut list = Vec::with_capacity(list_content.len() + 8);
	push_chunk(&mut list, *b"LIST", &list_content)?;

	log::debug!("Created RIFF INFO list, size: {} bytes", list.len());
	Ok(list)
}

#[cfg(test)]
mod tests {
	use super::create_riff_info;
	use crate::config::ParseOptions;
	use crate::iff::wav::RiffInfoList;
	use crate::iff::wav::tag::read::parse_riff_info;

	use std::io::Cursor;

	#[test_log::test]
	fn layout() {
		let mut tag = RiffInfoList::new();
		tag.insert(String::from("INAM"), String::from("Foo"));
		tag.insert(String::from("IART"), String::from("Bar"));
		tag.insert(String::from("ICMT"), String::new());

		let bytes = create_riff_info(&tag).unwrap();
		assert_eq!(
			bytes,
			b"LIST\x1C\x00\x00\x00INFOINAM\x04\x00\x00\x00Foo\x00IART\x04\x00\x00\x00Bar\x00"
		);
	}

	#[test_log::test]
	fn odd_values_are_padded() {
		let mut tag = RiffInfoList::new();
		tag.insert(String::from("INAM"), String::from("Title"));
		tag.insert(String::from("IART"), String::from("Artist"));

		let bytes = create_riff_info(&tag).unwrap();
		assert_eq!(bytes.len() % 2, 0);
		assert_eq!(&bytes[12..26], b"INAM\x06\x00\x00\x00Title\x00");
		// "Artist" + terminator is odd, so a pad byte follows
		assert_eq!(&bytes[26..], b"IART\x07\x00\x00\x00Artist\x00\x00");

		let mut read = RiffInfoList::new();
		parse_riff_info(
			&mut Cursor::new(&bytes[12..]),
			bytes.len() as u64 - 12,
			&mut read,
			ParseOptions::new(),
		)
		.unwrap();
		assert_eq!(read, tag);
	}

	#[test_log::test]
	fn empty() {
		let mut tag = RiffInfoList::new();
		assert!(create_riff_info(&tag).unwrap().is_empty());

		tag.insert(String::from("INAM"), String::new());
		assert!(create_riff_info(&tag).unwrap().is_empty());
	}
}
