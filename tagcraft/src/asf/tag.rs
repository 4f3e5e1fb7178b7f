use super::container::{ContainerType, MetadataContainer};
use super::descriptor::{DescriptorValue, MetadataDescriptor};
use crate::config::WriteOptions;
use crate::error::{Result, TagError};
use crate::macros::{err, try_vec};
use crate::picture::{MimeType, Picture, PictureType};
use crate::tag::{Accessor, ItemKey, ItemValue, Tag, TagExt, TagItem, TagType};
use crate::util::io::FileLike;
use crate::util::text::{utf16le_decode, utf16le_encode};

use std::borrow::Cow;

use byteorder::{LittleEndian, ReadBytesExt as _};

pub(crate) const PICTURE_NAME: &str = "WM/Picture";

macro_rules! impl_accessor {
	($($name:ident => $key:literal),+ $(,)?) => {
		paste::paste! {
			$(
				fn $name(&self) -> Option<Cow<'_, str>> {
					self.get($key).and_then(|d| d.value().as_text())
				}

				fn [<set_ $name>](&mut self, value: String) {
					let _ = self.insert(MetadataDescriptor::text($key, value));
				}

				fn [<remove_ $name>](&mut self) {
					let _ = self.remove($key);
				}
			)+
		}
	};
}

macro_rules! impl_number_accessor {
	($($name:ident => $key:literal),+ $(,)?) => {
		paste::paste! {
			$(
				fn $name(&self) -> Option<u32> {
					self.get_number($key)
				}

				fn [<set_ $name>](&mut self, value: u32) {
					let _ = self.insert(MetadataDescriptor::text($key, value.to_string()));
				}

				fn [<remove_ $name>](&mut self) {
					let _ = self.remove($key);
				}
			)+
		}
	};
}

/// An ASF tag
///
/// The metadata of an ASF file is spread across five objects, each represented by a
/// [`MetadataContainer`]. Descriptors are placed in the first container (see
/// [`ContainerType::ORDERED`]) whose rules accept them.
///
/// ## Pictures
///
/// Pictures are stored as `WM/Picture` binary descriptors, and are only decoded when converting
/// to a [`Tag`] or calling [`AsfTag::pictures`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AsfTag {
	pub(crate) containers: [MetadataContainer; 5],
}

impl Default for AsfTag {
	fn default() -> Self {
		Self::new()
	}
}

impl AsfTag {
	/// Create an empty `AsfTag`
	pub fn new() -> Self {
		Self {
			containers: ContainerType::ORDERED.map(MetadataContainer::new),
		}
	}

	fn index(container_type: ContainerType) -> usize {
		ContainerType::ORDERED
			.iter()
			.position(|ty| *ty == container_type)
			.unwrap_or_default()
	}

	/// Get the container of a [`ContainerType`]
	pub fn container(&self, container_type: ContainerType) -> &MetadataContainer {
		&self.containers[Self::index(container_type)]
	}

	pub(crate) fn container_mut(&mut self, container_type: ContainerType) -> &mut MetadataContainer {
		&mut self.containers[Self::index(container_type)]
	}

	/// Every descriptor, in container order
	pub fn descriptors(&self) -> impl Iterator<Item = &MetadataDescriptor> {
		self.containers.iter().flat_map(MetadataContainer::descriptors)
	}

	/// Add a descriptor to the first container that accepts it
	///
	/// Returns the [`ContainerType`] the descriptor was placed in. A descriptor whose identity is
	/// already present is a second value, and only goes to a container that allows multiple values.
	///
	/// # Errors
	///
	/// No container accepts the descriptor. The error is the one from
	/// [`ContainerType::MetadataLibrary`], the least restrictive container.
	///
	/// # Examples
	///
	/// ```rust
	/// use tagcraft::asf::{AsfTag, ContainerType, DescriptorValue, Guid, MetadataDescriptor};
	///
	/// let mut tag = AsfTag::new();
	///
	/// let title = MetadataDescriptor::text("Title", "Foo");
	/// assert_eq!(tag.add_descriptor(title)?, ContainerType::ContentDescription);
	///
	/// let guid = MetadataDescriptor::new("WM/MediaClassPrimaryID", DescriptorValue::Guid(Guid::AUDIO_MEDIA));
	/// assert_eq!(tag.add_descriptor(guid)?, ContainerType::MetadataLibrary);
	/// # Ok::<(), tagcraft::error::TagError>(())
	/// ```
	pub fn add_descriptor(&mut self, descriptor: MetadataDescriptor) -> Result<ContainerType> {
		let repeated = self
			.descriptors()
			.any(|existing| existing.identity() == descriptor.identity());

		let mut last_err = None;
		for container in &mut self.containers {
			if repeated && !container.container_type().allows_multiple_values() {
				continue;
			}

			match container.check(&descriptor) {
				Ok(()) => {
					let container_type = container.container_type();
					container.descriptors.push(descriptor);
					return Ok(container_type);
				},
				Err(e) => last_err = Some(e),
			}
		}

		match last_err {
			Some(e) => Err(e.into()),
			None => err!(UnsupportedTag),
		}
	}

	/// Replace every descriptor sharing `descriptor`'s identity, then add it
	///
	/// Nothing is removed if no container accepts the descriptor.
	///
	/// # Errors
	///
	/// See [`AsfTag::add_descriptor`]
	pub fn insert(&mut self, descriptor: MetadataDescriptor) -> Result<ContainerType> {
		if let Err(e) = ContainerType::ORDERED
			.iter()
			.map(|ty| ty.check(&descriptor))
			.find(|check| check.is_ok())
			.unwrap_or_else(|| ContainerType::MetadataLibrary.check(&descriptor))
		{
			return Err(e.into());
		}

		for container in &mut self.containers {
			container.retain(|existing| existing.identity() != descriptor.identity());
		}

		self.add_descriptor(descriptor)
	}

	/// Insert a string descriptor
	///
	/// # Errors
	///
	/// See [`AsfTag::insert`]
	pub fn insert_text(
		&mut self,
		name: impl Into<String>,
		value: impl Into<String>,
	) -> Result<ContainerType> {
		self.insert(MetadataDescriptor::text(name, value))
	}

	/// Get the first descriptor with `name`
	pub fn get(&self, name: &str) -> Option<&MetadataDescriptor> {
		self.descriptors().find(|d| d.name() == name)
	}

	/// Get every descriptor with `name`
	pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a MetadataDescriptor> {
		self.descriptors().filter(move |d| d.name() == name)
	}

	/// Remove every descriptor with `name`
	pub fn remove(&mut self, name: &str) -> Vec<MetadataDescriptor> {
		self.containers
			.iter_mut()
			.flat_map(|container| container.remove(name))
			.collect()
	}

	fn get_number(&self, name: &str) -> Option<u32> {
		match self.get(name)?.value() {
			DescriptorValue::DWord(n) => Some(*n),
			DescriptorValue::Word(n) => Some(u32::from(*n)),
			DescriptorValue::QWord(n) => u32::try_from(*n).ok(),
			DescriptorValue::String(text) => crate::util::split_pair(text).0,
			_ => None,
		}
	}

	/// The decoded `WM/Picture` descriptors
	///
	/// Descriptors that fail to decode are skipped.
	pub fn pictures(&self) -> impl Iterator<Item = Picture> + '_ {
		self.get_all(PICTURE_NAME).filter_map(|d| match d.value() {
			DescriptorValue::Binary(bytes) => picture_from_wm(bytes).ok(),
			_ => None,
		})
	}

	/// Add a picture as a `WM/Picture` descriptor
	///
	/// # Errors
	///
	/// The picture is too large for any container
	pub fn push_picture(&mut self, picture: &Picture) -> Result<ContainerType> {
		self.add_descriptor(MetadataDescriptor::new(
			PICTURE_NAME,
			DescriptorValue::Binary(picture_to_wm(picture)),
		))
	}
}

impl Accessor for AsfTag {
	impl_accessor!(
		artist  => "Author",
		title   => "Title",
		album   => "WM/AlbumTitle",
		genre   => "WM/Genre",
		comment => "Description",
	);

	impl_number_accessor!(
		track       => "WM/TrackNumber",
		track_total => "WM/TrackTotal",
		disk        => "WM/PartOfSet",
		disk_total  => "WM/DiscTotal",
		year        => "WM/Year",
	);
}

impl TagExt for AsfTag {
	type Err = TagError;
	type RefKey<'a> = &'a str;

	#[inline]
	fn tag_type(&self) -> TagType {
		TagType::Asf
	}

	fn len(&self) -> usize {
		self.containers.iter().map(MetadataContainer::len).sum()
	}

	fn contains<'a>(&'a self, key: Self::RefKey<'a>) -> bool {
		self.get(key).is_some()
	}

	fn is_empty(&self) -> bool {
		self.containers.iter().all(MetadataContainer::is_empty)
	}

	fn save_to<F>(&self, file: &mut F, write_options: WriteOptions) -> std::result::Result<(), Self::Err>
	where
		F: FileLike,
	{
		super::write::write_to(file, self, write_options)
	}

	fn clear(&mut self) {
		*self = Self::new();
	}
}

impl From<AsfTag> for Tag {
	fn from(input: AsfTag) -> Self {
		let mut tag = Tag::new(TagType::Asf);

		for container in input.containers {
			for descriptor in container.descriptors {
				let MetadataDescriptor { name, value, .. } = descriptor;

				if name == PICTURE_NAME {
					if let DescriptorValue::Binary(bytes) = &value
						&& let Ok(picture) = picture_from_wm(bytes)
					{
						tag.push_picture(picture);
					}

					continue;
				}

				let item_value = match value {
					DescriptorValue::String(text) => ItemValue::Text(text),
					DescriptorValue::Binary(bytes) => ItemValue::Binary(bytes),
					other => match other.as_text() {
						Some(text) => ItemValue::Text(text.into_owned()),
						None => continue,
					},
				};

				tag.push_unchecked(TagItem::new(
					ItemKey::from_key_or_unknown(TagType::Asf, &name),
					item_value,
				));
			}
		}

		tag
	}
}

impl From<Tag> for AsfTag {
	fn from(input: Tag) -> Self {
		let mut asf = AsfTag::new();

		for item in input.items {
			let Some(name) = item.key().map_key(TagType::Asf).map(str::to_owned) else {
				log::debug!("Dropping item with no ASF mapping: {:?}", item.key());
				continue;
			};

			let value = match item.into_value() {
				ItemValue::Text(text) | ItemValue::Locator(text) => DescriptorValue::String(text),
				ItemValue::Binary(bytes) => DescriptorValue::Binary(bytes),
			};

			if let Err(e) = asf.add_descriptor(MetadataDescriptor::new(name, value)) {
				log::warn!("Dropping ASF descriptor: {e}");
			}
		}

		for picture in &input.pictures {
			if let Err(e) = asf.push_picture(picture) {
				log::warn!("Dropping ASF picture: {e}");
			}
		}

		asf
	}
}

// UTF-16 LE, terminated by a 2 byte null
fn read_wide_str(reader: &mut &[u8]) -> Result<String> {
	let Some(end) = reader.chunks_exact(2).position(|unit| unit == [0, 0]) else {
		err!(NotAPicture);
	};

	let (text, rest) = reader.split_at(end * 2);
	let text = utf16le_decode(text)?;
	*reader = &rest[2..];
	Ok(text)
}

/// Decode a `WM/Picture` payload
///
/// Layout: picture type (u8), data length (u32), MIME type, description, data
pub(crate) fn picture_from_wm(bytes: &[u8]) -> Result<Picture> {
	let reader = &mut &*bytes;

	let pic_type = PictureType::from_u8(reader.read_u8()?);
	let data_len = reader.read_u32::<LittleEndian>()? as usize;
	let mime_type = read_wide_str(reader)?;
	let description = read_wide_str(reader)?;

	if data_len > reader.len() {
		err!(SizeMismatch);
	}

	let mut data = try_vec![0; data_len];
	data.copy_from_slice(&reader[..data_len]);

	let mut builder = Picture::unchecked(data).pic_type(pic_type);
	if !mime_type.is_empty() {
		builder = builder.mime_type(MimeType::from_str(&mime_type));
	}
	if !description.is_empty() {
		builder = builder.description(description);
	}

	Ok(builder.build())
}

/// Encode a `WM/Picture` payload
pub(crate) fn picture_to_wm(picture: &Picture) -> Vec<u8> {
	let mut bytes = Vec::with_capacity(picture.data().len() + 64);

	bytes.push(picture.pic_type().as_u8());
	bytes.extend((picture.data().len() as u32).to_le_bytes());
	bytes.extend(utf16le_encode(picture.mime_str()));
	bytes.extend(utf16le_encode(picture.description().unwrap_or_default()));
	bytes.extend(picture.data());

	bytes
}
