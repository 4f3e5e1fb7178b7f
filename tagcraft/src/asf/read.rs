use super::container::{
	BANNER_IMAGE, BANNER_IMAGE_TYPE, BANNER_IMAGE_URL, CONTENT_DESCRIPTION_FIELDS, COPYRIGHT_URL,
	ContainerType, MetadataContainer,
};
use super::descriptor::{DescriptorType, DescriptorValue, MetadataDescriptor};
use super::guid::Guid;
use super::properties::{AsfProperties, read_file_properties, read_stream_properties};
use super::{AsfFile, AsfTag};
use crate::chunk::{AsfObjectCodec, ChunkHeader, ChunkWalker, HeaderCodec};
use crate::config::{ParseOptions, ParsingMode};
use crate::error::Result;
use crate::macros::{decode_err, parse_mode_choice, try_vec};
use crate::tag::TagExt;
use crate::util::io::SeekStreamLen;
use crate::util::text::utf16le_decode;

use std::io::{Read, Seek, SeekFrom};

use byteorder::{LittleEndian, ReadBytesExt as _};

// Reserved GUID, reserved u16, data size
pub(super) const HEADER_EXTENSION_PREFIX_LEN: u64 = 22;

pub(super) fn read_from<R>(reader: &mut R, parse_options: ParseOptions) -> Result<AsfFile>
where
	R: Read + Seek,
{
	let parse_mode = parse_options.parsing_mode;
	let file_len = reader.stream_len_hack()?;

	let start = reader.stream_position()?;
	let header = match AsfObjectCodec::decode(reader, file_len - start)? {
		Some(header) if header.ident == Guid::HEADER_OBJECT => header,
		_ => decode_err!(@BAIL Asf, "File doesn't start with an ASF Header Object"),
	};

	log::debug!("Found ASF header object, {} bytes", header.len);

	// Object count, 2 reserved bytes
	let _object_count = reader.read_u32::<LittleEndian>()?;
	let _reserved = reader.read_u16::<LittleEndian>()?;

	let mut tag = AsfTag::new();
	let mut properties = AsfProperties::default();

	let mut walker = ChunkWalker::<AsfObjectCodec>::for_parent(&header, parse_mode);
	while let Some(object) = walker.next(reader)? {
		let ident = object.ident;

		if ident == Guid::FILE_PROPERTIES_OBJECT && parse_options.read_properties {
			let content = read_content(reader, &object, parse_options)?;
			read_file_properties(&content, &mut properties, file_len)?;
		} else if ident == Guid::STREAM_PROPERTIES_OBJECT
			&& parse_options.read_properties
			&& properties.channels == 0
		{
			let content = read_content(reader, &object, parse_options)?;
			read_stream_properties(&content, &mut properties)?;
		} else if ident == Guid::HEADER_EXTENSION_OBJECT && parse_options.read_tags {
			read_header_extension(reader, &object, &mut tag, parse_options)?;
		} else if let Some(container_type) = ContainerType::from_guid(ident)
			&& parse_options.read_tags
		{
			let content = read_content(reader, &object, parse_options)?;
			*tag.container_mut(container_type) =
				read_container(container_type, &content, parse_options)?;
		}

		walker.skip(reader, &object)?;
	}

	if !parse_options.read_cover_art {
		let _ = tag.remove(super::tag::PICTURE_NAME);
	}

	Ok(AsfFile {
		asf_tag: (!tag.is_empty()).then_some(tag),
		properties,
	})
}

fn read_content<R>(
	reader: &mut R,
	object: &ChunkHeader<Guid>,
	parse_options: ParseOptions,
) -> Result<Vec<u8>>
where
	R: Read,
{
	let mut content = try_vec![0; object.payload_len() as usize, parse_options.allocation_limit];
	reader.read_exact(&mut content)?;
	Ok(content)
}

fn read_header_extension<R>(
	reader: &mut R,
	object: &ChunkHeader<Guid>,
	tag: &mut AsfTag,
	parse_options: ParseOptions,
) -> Result<()>
where
	R: Read + Seek,
{
	let mut reserved = [0; 16];
	reader.read_exact(&mut reserved)?;
	let _reserved = reader.read_u16::<LittleEndian>()?;
	let data_size = u64::from(reader.read_u32::<LittleEndian>()?);

	let data_start = object.payload_start() + HEADER_EXTENSION_PREFIX_LEN;
	if data_start + data_size > object.end() {
		decode_err!(@BAIL Asf, "Header extension data size exceeds the object");
	}

	let mut walker = ChunkWalker::<AsfObjectCodec>::new(data_start + data_size, parse_options.parsing_mode);
	while let Some(child) = walker.next(reader)? {
		if let Some(container_type) = ContainerType::from_guid(child.ident)
			&& container_type.is_extension_object()
		{
			log::debug!("Found {container_type:?} in the header extension");

			let content = read_content(reader, &child, parse_options)?;
			*tag.container_mut(container_type) =
				read_container(container_type, &content, parse_options)?;
		}

		walker.skip(reader, &child)?;
	}

	reader.seek(SeekFrom::Start(object.end()))?;
	Ok(())
}

fn take<'a>(reader: &mut &'a [u8], len: usize) -> Result<&'a [u8]> {
	if len > reader.len() {
		decode_err!(@BAIL Asf, "Object ended unexpectedly");
	}

	let (taken, rest) = reader.split_at(len);
	*reader = rest;
	Ok(taken)
}

pub(super) fn read_container(
	container_type: ContainerType,
	mut content: &[u8],
	parse_options: ParseOptions,
) -> Result<MetadataContainer> {
	let reader = &mut content;
	let mut container = MetadataContainer::new(container_type);

	match container_type {
		ContainerType::ContentDescription => {
			let mut lengths = [0_u16; 5];
			for len in &mut lengths {
				*len = reader.read_u16::<LittleEndian>()?;
			}

			for (name, len) in CONTENT_DESCRIPTION_FIELDS.into_iter().zip(lengths) {
				let value = utf16le_decode(take(reader, usize::from(len))?)?;
				if !value.is_empty() {
					container.descriptors.push(MetadataDescriptor::text(name, value));
				}
			}
		},
		ContainerType::ContentBranding => {
			let banner_type = reader.read_u32::<LittleEndian>()?;
			if banner_type != 0 {
				container.descriptors.push(MetadataDescriptor::new(
					BANNER_IMAGE_TYPE,
					DescriptorValue::DWord(banner_type),
				));
			}

			for (name, ty) in [
				(BANNER_IMAGE, DescriptorType::Binary),
				(BANNER_IMAGE_URL, DescriptorType::String),
				(COPYRIGHT_URL, DescriptorType::String),
			] {
				let len = reader.read_u32::<LittleEndian>()? as usize;
				let data = take(reader, len)?;
				if !data.is_empty() {
					let value = DescriptorValue::read_payload(ty, data, container_type)?;
					container.descriptors.push(MetadataDescriptor::new(name, value));
				}
			}
		},
		ContainerType::ExtendedContent | ContainerType::Metadata | ContainerType::MetadataLibrary => {
			let count = reader.read_u16::<LittleEndian>()?;
			for _ in 0..count {
				if let Some(descriptor) = read_record(reader, container_type, parse_options.parsing_mode)? {
					container.descriptors.push(descriptor);
				}
			}
		},
	}

	log::debug!(
		"Read {} descriptors from {container_type:?}",
		container.len()
	);

	Ok(container)
}

fn read_record(
	reader: &mut &[u8],
	container_type: ContainerType,
	parse_mode: ParsingMode,
) -> Result<Option<MetadataDescriptor>> {
	let (language_index, stream_number, name, raw_type, value);

	if container_type == ContainerType::ExtendedContent {
		let name_len = reader.read_u16::<LittleEndian>()?;
		name = utf16le_decode(take(reader, usize::from(name_len))?)?;
		raw_type = reader.read_u16::<LittleEndian>()?;
		let value_len = reader.read_u16::<LittleEndian>()?;
		value = take(reader, usize::from(value_len))?;
		language_index = 0;
		stream_number = 0;
	} else {
		language_index = reader.read_u16::<LittleEndian>()?;
		stream_number = reader.read_u16::<LittleEndian>()?;
		let name_len = reader.read_u16::<LittleEndian>()?;
		raw_type = reader.read_u16::<LittleEndian>()?;
		let data_len = reader.read_u32::<LittleEndian>()?;
		name = utf16le_decode(take(reader, usize::from(name_len))?)?;
		value = take(reader, data_len as usize)?;
	}

	let Some(ty) = DescriptorType::from_u16(raw_type) else {
		parse_mode_choice!(
			parse_mode,
			STRICT: decode_err!(@BAIL Asf, "Encountered an unknown descriptor type"),
			DEFAULT: {
				log::warn!("Skipping descriptor \"{name}\" with unknown type {raw_type}");
				return Ok(None);
			}
		);
	};

	let value = DescriptorValue::read_payload(ty, value, container_type)?;

	Ok(Some(MetadataDescriptor {
		name,
		language_index,
		stream_number,
		value,
	}))
}
