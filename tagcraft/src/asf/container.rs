use super::descriptor::{DescriptorType, DescriptorValue, MetadataDescriptor};
use super::guid::Guid;
use crate::error::{DescriptorError, DescriptorErrorKind};

use std::ops::RangeInclusive;

// GUID + object size + record count
const LIST_OBJECT_HEADER_SIZE: u64 = 26;
// GUID + object size + 5 string lengths
const CONTENT_DESCRIPTION_HEADER_SIZE: u64 = 24 + 10;
// GUID + object size + banner type + 3 data lengths
const CONTENT_BRANDING_HEADER_SIZE: u64 = 24 + 16;

pub(crate) const CONTENT_DESCRIPTION_FIELDS: [&str; 5] =
	["Title", "Author", "Copyright", "Description", "Rating"];

pub(crate) const BANNER_IMAGE_TYPE: &str = "BannerImageType";
pub(crate) const BANNER_IMAGE: &str = "BannerImage";
pub(crate) const BANNER_IMAGE_URL: &str = "BannerImageURL";
pub(crate) const COPYRIGHT_URL: &str = "CopyrightURL";

/// The ASF objects that can hold [`MetadataDescriptor`]s
///
/// Each has its own set of rules for what it can hold:
///
/// | container            | max payload | GUID | stream   | language | multiple values |
/// |----------------------|-------------|------|----------|----------|-----------------|
/// | `ContentDescription` | 16-bit      | no   | no       | no       | no              |
/// | `ContentBranding`    | 32-bit      | no   | no       | no       | no              |
/// | `ExtendedContent`    | 16-bit      | no   | no       | no       | no              |
/// | `Metadata`           | 16-bit      | no   | 0..=127  | no       | no              |
/// | `MetadataLibrary`    | 32-bit      | yes  | 0..=127  | 0..=126  | yes             |
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ContainerType {
	/// Content Description Object, holding the five fixed fields
	ContentDescription,
	/// Content Branding Object, holding the banner image and copyright URL
	ContentBranding,
	/// Extended Content Description Object
	ExtendedContent,
	/// Metadata Object, in the header extension
	Metadata,
	/// Metadata Library Object, in the header extension
	MetadataLibrary,
}

impl ContainerType {
	/// Every container, from the most restrictive to the least
	///
	/// This is the order in which a new descriptor is offered to the containers.
	pub const ORDERED: [ContainerType; 5] = [
		ContainerType::ContentDescription,
		ContainerType::ContentBranding,
		ContainerType::ExtendedContent,
		ContainerType::Metadata,
		ContainerType::MetadataLibrary,
	];

	/// The object's GUID
	pub fn guid(self) -> Guid {
		match self {
			ContainerType::ContentDescription => Guid::CONTENT_DESCRIPTION_OBJECT,
			ContainerType::ContentBranding => Guid::CONTENT_BRANDING_OBJECT,
			ContainerType::ExtendedContent => Guid::EXTENDED_CONTENT_DESCRIPTION_OBJECT,
			ContainerType::Metadata => Guid::METADATA_OBJECT,
			ContainerType::MetadataLibrary => Guid::METADATA_LIBRARY_OBJECT,
		}
	}

	pub(crate) fn from_guid(guid: Guid) -> Option<Self> {
		Self::ORDERED.into_iter().find(|ty| ty.guid() == guid)
	}

	/// Whether the object lives in the Header Extension Object
	pub fn is_extension_object(self) -> bool {
		matches!(self, ContainerType::Metadata | ContainerType::MetadataLibrary)
	}

	/// The largest payload a single descriptor can have
	pub fn max_payload(self) -> u64 {
		match self {
			ContainerType::ContentDescription
			| ContainerType::ExtendedContent
			| ContainerType::Metadata => u64::from(u16::MAX),
			ContainerType::ContentBranding | ContainerType::MetadataLibrary => u64::from(u32::MAX),
		}
	}

	/// Whether GUID values are allowed
	pub fn allows_guid(self) -> bool {
		self == ContainerType::MetadataLibrary
	}

	/// The range of legal stream numbers
	pub fn stream_numbers(self) -> RangeInclusive<u16> {
		match self {
			ContainerType::Metadata | ContainerType::MetadataLibrary => 0..=127,
			_ => 0..=0,
		}
	}

	/// The range of legal language list indices
	pub fn language_indices(self) -> RangeInclusive<u16> {
		match self {
			ContainerType::MetadataLibrary => 0..=126,
			_ => 0..=0,
		}
	}

	/// Whether a single identity can have multiple values
	pub fn allows_multiple_values(self) -> bool {
		self == ContainerType::MetadataLibrary
	}

	/// Check whether `descriptor` is legal in this container on its own
	///
	/// This doesn't consider other descriptors, see [`MetadataContainer::add_descriptor`].
	///
	/// # Errors
	///
	/// The first rule the descriptor violates
	pub fn check(self, descriptor: &MetadataDescriptor) -> Result<(), DescriptorError> {
		let fail = |kind| -> Result<(), DescriptorError> { Err(DescriptorError::new(self, kind)) };

		if descriptor.name.is_empty() {
			return fail(DescriptorErrorKind::EmptyName);
		}

		match self {
			ContainerType::ContentDescription => {
				if !CONTENT_DESCRIPTION_FIELDS.contains(&descriptor.name.as_str()) {
					return fail(DescriptorErrorKind::UnsupportedName(descriptor.name.clone()));
				}

				if descriptor.descriptor_type() != DescriptorType::String {
					return fail(DescriptorErrorKind::UnsupportedType(descriptor.descriptor_type()));
				}
			},
			ContainerType::ContentBranding => {
				let expected = match descriptor.name.as_str() {
					BANNER_IMAGE_TYPE => DescriptorType::DWord,
					BANNER_IMAGE => DescriptorType::Binary,
					BANNER_IMAGE_URL | COPYRIGHT_URL => DescriptorType::String,
					_ => {
						return fail(DescriptorErrorKind::UnsupportedName(descriptor.name.clone()));
					},
				};

				if descriptor.descriptor_type() != expected {
					return fail(DescriptorErrorKind::UnsupportedType(descriptor.descriptor_type()));
				}

				if let DescriptorValue::String(url) = &descriptor.value
					&& !url.is_ascii()
				{
					return fail(DescriptorErrorKind::UnsupportedType(DescriptorType::String));
				}
			},
			_ => {},
		}

		let size = descriptor.value.payload_len(self);
		if size > self.max_payload() {
			return fail(DescriptorErrorKind::PayloadTooLarge {
				size,
				max: self.max_payload(),
			});
		}

		if matches!(descriptor.value, DescriptorValue::Guid(_)) && !self.allows_guid() {
			return fail(DescriptorErrorKind::GuidNotAllowed);
		}

		if !self.stream_numbers().contains(&descriptor.stream_number) {
			return fail(DescriptorErrorKind::StreamNotAllowed(descriptor.stream_number));
		}

		if !self.language_indices().contains(&descriptor.language_index) {
			return fail(DescriptorErrorKind::LanguageNotAllowed(descriptor.language_index));
		}

		Ok(())
	}
}

/// An ordered collection of [`MetadataDescriptor`]s, belonging to one ASF object
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MetadataContainer {
	container_type: ContainerType,
	pub(crate) descriptors: Vec<MetadataDescriptor>,
}

impl MetadataContainer {
	/// Create an empty container
	pub fn new(container_type: ContainerType) -> Self {
		Self {
			container_type,
			descriptors: Vec::new(),
		}
	}

	/// The container's [`ContainerType`]
	pub fn container_type(&self) -> ContainerType {
		self.container_type
	}

	/// The descriptors, in order
	pub fn descriptors(&self) -> &[MetadataDescriptor] {
		&self.descriptors
	}

	/// The number of descriptors
	pub fn len(&self) -> usize {
		self.descriptors.len()
	}

	/// Whether the container has no descriptors
	pub fn is_empty(&self) -> bool {
		self.descriptors.is_empty()
	}

	/// Validate `descriptor` against this container and append it
	///
	/// Nothing is changed unless the descriptor is accepted.
	///
	/// # Errors
	///
	/// * See [`ContainerType::check`]
	/// * The container is single-valued and already has a descriptor with the same
	///   name, language index and stream number
	pub fn add_descriptor(&mut self, descriptor: MetadataDescriptor) -> Result<(), DescriptorError> {
		self.check(&descriptor)?;
		self.descriptors.push(descriptor);
		Ok(())
	}

	pub(crate) fn check(&self, descriptor: &MetadataDescriptor) -> Result<(), DescriptorError> {
		self.container_type.check(descriptor)?;

		if !self.container_type.allows_multiple_values()
			&& self
				.descriptors
				.iter()
				.any(|existing| existing.identity() == descriptor.identity())
		{
			return Err(DescriptorError::new(
				self.container_type,
				DescriptorErrorKind::MultipleValuesNotAllowed,
			));
		}

		Ok(())
	}

	/// The first descriptor with `name`
	pub fn get(&self, name: &str) -> Option<&MetadataDescriptor> {
		self.descriptors.iter().find(|d| d.name == name)
	}

	/// Every descriptor with `name`
	pub fn get_all<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a MetadataDescriptor> {
		self.descriptors.iter().filter(move |d| d.name == name)
	}

	/// Remove every descriptor with `name`, returning them
	pub fn remove(&mut self, name: &str) -> Vec<MetadataDescriptor> {
		let (removed, kept) = std::mem::take(&mut self.descriptors)
			.into_iter()
			.partition(|d| d.name == name);
		self.descriptors = kept;
		removed
	}

	/// Retain the descriptors matching the predicate
	pub fn retain<F>(&mut self, f: F)
	where
		F: FnMut(&MetadataDescriptor) -> bool,
	{
		self.descriptors.retain(f)
	}

	/// The size of the object this container would be written as, header included
	pub fn current_size(&self) -> u64 {
		let base = match self.container_type {
			ContainerType::ContentDescription => CONTENT_DESCRIPTION_HEADER_SIZE,
			ContainerType::ContentBranding => CONTENT_BRANDING_HEADER_SIZE,
			_ => LIST_OBJECT_HEADER_SIZE,
		};

		base + self
			.descriptors
			.iter()
			.map(|d| d.encoded_size(self.container_type))
			.sum::<u64>()
	}
}
