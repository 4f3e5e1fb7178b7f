use super::container::{
	BANNER_IMAGE, BANNER_IMAGE_TYPE, BANNER_IMAGE_URL, CONTENT_DESCRIPTION_FIELDS, COPYRIGHT_URL,
	ContainerType, MetadataContainer,
};
use super::descriptor::DescriptorValue;
use super::guid::Guid;
use super::properties::FILE_SIZE_OFFSET;
use super::read::HEADER_EXTENSION_PREFIX_LEN;
use super::tag::AsfTag;
use crate::chunk::{AsfObjectCodec, ChunkHeader, ChunkWalker, HeaderCodec};
use crate::config::{ParsingMode, WriteOptions};
use crate::error::Result;
use crate::macros::{decode_err, encode_err};
use crate::util::io::{FileLike, overwrite};

use std::io::{Cursor, Read, Seek, SeekFrom};

// GUID + size + object count + 2 reserved bytes
const HEADER_OBJECT_PREFIX_LEN: u64 = 30;

/// A raw object, kept as-is
struct RawObject {
	guid: Guid,
	bytes: Vec<u8>,
}

pub(crate) fn write_to<F>(file: &mut F, tag: &AsfTag, _write_options: WriteOptions) -> Result<()>
where
	F: FileLike + ?Sized,
{
	file.rewind()?;
	let mut contents = Vec::new();
	file.read_to_end(&mut contents)?;

	let rebuilt = rebuild(&contents, tag)?;
	overwrite(file, &rebuilt)
}

fn rebuild(contents: &[u8], tag: &AsfTag) -> Result<Vec<u8>> {
	let mut reader = Cursor::new(contents);

	let header = match AsfObjectCodec::decode(&mut reader, contents.len() as u64)? {
		Some(header) if header.ident == Guid::HEADER_OBJECT => header,
		_ => decode_err!(@BAIL Asf, "File doesn't start with an ASF Header Object"),
	};

	let mut reserved = [0; 2];
	reader.seek(SeekFrom::Current(4))?;
	reader.read_exact(&mut reserved)?;

	let mut objects = Vec::new();
	let mut metadata_position = None;
	let mut extension = None;

	let mut walker = ChunkWalker::<AsfObjectCodec>::for_parent(&header, ParsingMode::Strict);
	while let Some(object) = walker.next(&mut reader)? {
		let bytes = &contents[object.start as usize..object.end() as usize];

		match ContainerType::from_guid(object.ident) {
			Some(container_type) if !container_type.is_extension_object() => {
				log::debug!("Replacing {container_type:?}");
				metadata_position.get_or_insert(objects.len());
			},
			_ if object.ident == Guid::HEADER_EXTENSION_OBJECT && extension.is_none() => {
				extension = Some(objects.len());
				objects.push(RawObject {
					guid: object.ident,
					bytes: rebuild_extension(bytes, &object, tag)?,
				});
			},
			_ => objects.push(RawObject {
				guid: object.ident,
				bytes: bytes.to_vec(),
			}),
		}

		walker.skip(&mut reader, &object)?;
	}

	let mut new_objects = Vec::new();
	for container_type in [
		ContainerType::ContentDescription,
		ContainerType::ContentBranding,
		ContainerType::ExtendedContent,
	] {
		let container = tag.container(container_type);
		if !container.is_empty() {
			new_objects.push(RawObject {
				guid: container_type.guid(),
				bytes: encode_container(container)?,
			});
		}
	}

	let position = metadata_position.unwrap_or(objects.len());
	objects.splice(position..position, new_objects);

	if extension.is_none() && extension_objects(tag).next().is_some() {
		objects.push(RawObject {
			guid: Guid::HEADER_EXTENSION_OBJECT,
			bytes: new_extension(tag)?,
		});
	}

	let header_len = HEADER_OBJECT_PREFIX_LEN + objects.iter().map(|o| o.bytes.len() as u64).sum::<u64>();
	let rest = &contents[header.end() as usize..];
	let file_len = header_len + rest.len() as u64;

	let mut rebuilt = Vec::with_capacity(file_len as usize);
	rebuilt.extend(AsfObjectCodec::encode(&ChunkHeader {
		ident: Guid::HEADER_OBJECT,
		len: header_len,
		start: 0,
		header_len: AsfObjectCodec::HEADER_SIZE,
		extended: false,
	}));
	rebuilt.extend((objects.len() as u32).to_le_bytes());
	rebuilt.extend(reserved);

	for mut object in objects {
		if object.guid == Guid::FILE_PROPERTIES_OBJECT {
			let offset = AsfObjectCodec::HEADER_SIZE as usize + FILE_SIZE_OFFSET;
			if let Some(field) = object.bytes.get_mut(offset..offset + 8) {
				field.copy_from_slice(&file_len.to_le_bytes());
			}
		}

		rebuilt.extend(object.bytes);
	}

	rebuilt.extend(rest);
	Ok(rebuilt)
}

fn extension_objects(tag: &AsfTag) -> impl Iterator<Item = &MetadataContainer> {
	[ContainerType::Metadata, ContainerType::MetadataLibrary]
		.into_iter()
		.map(|ty| tag.container(ty))
		.filter(|container| !container.is_empty())
}

fn rebuild_extension(bytes: &[u8], object: &ChunkHeader<Guid>, tag: &AsfTag) -> Result<Vec<u8>> {
	let prefix_end = (AsfObjectCodec::HEADER_SIZE + HEADER_EXTENSION_PREFIX_LEN) as usize;
	if bytes.len() < prefix_end {
		decode_err!(@BAIL Asf, "Header extension object is too short");
	}

	// Children offsets are relative to the object
	let relative = ChunkHeader {
		start: 0,
		..*object
	};

	let mut reader = Cursor::new(bytes);
	reader.seek(SeekFrom::Start(prefix_end as u64))?;

	let mut children = Vec::new();
	let mut metadata_position = None;

	let mut walker = ChunkWalker::<AsfObjectCodec>::for_parent(&relative, ParsingMode::Strict);
	while let Some(child) = walker.next(&mut reader)? {
		if ContainerType::from_guid(child.ident).is_some_and(ContainerType::is_extension_object) {
			metadata_position.get_or_insert(children.len());
		} else {
			children.push(bytes[child.start as usize..child.end() as usize].to_vec());
		}

		walker.skip(&mut reader, &child)?;
	}

	let mut new_children = Vec::new();
	for container in extension_objects(tag) {
		new_children.push(encode_container(container)?);
	}

	let position = metadata_position.unwrap_or(children.len());
	children.splice(position..position, new_children);

	Ok(encode_extension(&bytes[AsfObjectCodec::HEADER_SIZE as usize..prefix_end], &children))
}

fn new_extension(tag: &AsfTag) -> Result<Vec<u8>> {
	let mut prefix = Vec::with_capacity(HEADER_EXTENSION_PREFIX_LEN as usize);
	prefix.extend(Guid::HEADER_EXTENSION_RESERVED.as_bytes());
	prefix.extend(6_u16.to_le_bytes());
	prefix.extend([0; 4]);

	let children = extension_objects(tag)
		.map(encode_container)
		.collect::<Result<Vec<_>>>()?;

	Ok(encode_extension(&prefix, &children))
}

// `prefix` is the reserved GUID, reserved field, and (outdated) data size
fn encode_extension(prefix: &[u8], children: &[Vec<u8>]) -> Vec<u8> {
	let data_size = children.iter().map(Vec::len).sum::<usize>();
	let len = AsfObjectCodec::HEADER_SIZE + HEADER_EXTENSION_PREFIX_LEN + data_size as u64;

	let mut bytes = AsfObjectCodec::encode(&ChunkHeader {
		ident: Guid::HEADER_EXTENSION_OBJECT,
		len,
		start: 0,
		header_len: AsfObjectCodec::HEADER_SIZE,
		extended: false,
	});
	bytes.extend(&prefix[..18]);
	bytes.extend((data_size as u32).to_le_bytes());

	for child in children {
		bytes.extend(child);
	}

	bytes
}

/// Encode a container as a complete object, header included
pub(crate) fn encode_container(container: &MetadataContainer) -> Result<Vec<u8>> {
	let container_type = container.container_type();
	let size = container.current_size();

	let mut bytes = AsfObjectCodec::encode(&ChunkHeader {
		ident: container_type.guid(),
		len: size,
		start: 0,
		header_len: AsfObjectCodec::HEADER_SIZE,
		extended: false,
	});

	match container_type {
		ContainerType::ContentDescription => {
			let mut values = Vec::with_capacity(5);
			for name in CONTENT_DESCRIPTION_FIELDS {
				let mut value = Vec::new();
				if let Some(descriptor) = container.get(name) {
					descriptor.value.write_payload(container_type, &mut value);
				}
				values.push(value);
			}

			for value in &values {
				bytes.extend((value.len() as u16).to_le_bytes());
			}
			for value in values {
				bytes.extend(value);
			}
		},
		ContainerType::ContentBranding => {
			let banner_type = match container.get(BANNER_IMAGE_TYPE).map(|d| &d.value) {
				Some(DescriptorValue::DWord(ty)) => *ty,
				_ => 0,
			};
			bytes.extend(banner_type.to_le_bytes());

			for name in [BANNER_IMAGE, BANNER_IMAGE_URL, COPYRIGHT_URL] {
				let mut value = Vec::new();
				if let Some(descriptor) = container.get(name) {
					descriptor.value.write_payload(container_type, &mut value);
				}

				bytes.extend((value.len() as u32).to_le_bytes());
				bytes.extend(value);
			}
		},
		_ => {
			let Ok(count) = u16::try_from(container.len()) else {
				encode_err!(@BAIL Asf, "Too many descriptors for a single object");
			};

			bytes.extend(count.to_le_bytes());
			for descriptor in container.descriptors() {
				descriptor.write_record(container_type, &mut bytes)?;
			}
		},
	}

	debug_assert_eq!(bytes.len() as u64, size);
	Ok(bytes)
}

#[cfg(test)]
mod tests {
	use super::{encode_container, rebuild};
	use crate::asf::read::read_container;
	use crate::asf::{AsfTag, ContainerType, DescriptorValue, Guid, MetadataDescriptor};
	use crate::config::ParseOptions;

	#[test_log::test]
	fn containers_match_their_size() {
		let mut tag = AsfTag::new();
		tag.insert_text("Title", "Foo").unwrap();
		tag.insert_text("Author", "Bar").unwrap();
		tag.insert(MetadataDescriptor::new("BannerImageType", DescriptorValue::DWord(1)))
			.unwrap();
		tag.insert(MetadataDescriptor::text("CopyrightURL", "http://example.com"))
			.unwrap();
		tag.insert(MetadataDescriptor::new("WM/IsCompilation", DescriptorValue::Bool(true)))
			.unwrap();
		tag.insert(MetadataDescriptor::text("WM/Mood", "calm").with_stream_number(1))
			.unwrap();
		tag.add_descriptor(MetadataDescriptor::new(
			"WM/MediaClassPrimaryID",
			DescriptorValue::Guid(Guid::AUDIO_MEDIA),
		))
		.unwrap();

		for container_type in ContainerType::ORDERED {
			let container = tag.container(container_type);
			assert!(!container.is_empty(), "{container_type:?} is empty");

			let encoded = encode_container(container).unwrap();
			assert_eq!(encoded.len() as u64, container.current_size());

			let decoded =
				read_container(container_type, &encoded[24..], ParseOptions::new()).unwrap();
			assert_eq!(&decoded, container);
		}
	}

	#[test_log::test]
	fn not_asf() {
		assert!(rebuild(&[0; 64], &AsfTag::new()).is_err());
	}
}
