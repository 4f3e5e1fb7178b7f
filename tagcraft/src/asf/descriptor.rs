use super::container::{BANNER_IMAGE_TYPE, ContainerType};
use super::guid::Guid;
use crate::error::Result;
use crate::macros::{decode_err, encode_err};
use crate::tag::TagField;
use crate::util::text::{utf16le_decode, utf16le_encode};

use std::borrow::Cow;
use std::fmt::{Display, Formatter};

/// The type of a [`DescriptorValue`], as stored on disk
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u16)]
#[allow(missing_docs)]
pub enum DescriptorType {
	String = 0,
	Binary = 1,
	Bool = 2,
	DWord = 3,
	QWord = 4,
	Word = 5,
	Guid = 6,
}

impl DescriptorType {
	/// Get a `DescriptorType` from its on-disk value
	pub fn from_u16(value: u16) -> Option<Self> {
		match value {
			0 => Some(Self::String),
			1 => Some(Self::Binary),
			2 => Some(Self::Bool),
			3 => Some(Self::DWord),
			4 => Some(Self::QWord),
			5 => Some(Self::Word),
			6 => Some(Self::Guid),
			_ => None,
		}
	}
}

/// The value of a [`MetadataDescriptor`]
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum DescriptorValue {
	String(String),
	Binary(Vec<u8>),
	Bool(bool),
	DWord(u32),
	QWord(u64),
	Word(u16),
	Guid(Guid),
}

impl DescriptorValue {
	/// The [`DescriptorType`] of the value
	pub fn descriptor_type(&self) -> DescriptorType {
		match self {
			Self::String(_) => DescriptorType::String,
			Self::Binary(_) => DescriptorType::Binary,
			Self::Bool(_) => DescriptorType::Bool,
			Self::DWord(_) => DescriptorType::DWord,
			Self::QWord(_) => DescriptorType::QWord,
			Self::Word(_) => DescriptorType::Word,
			Self::Guid(_) => DescriptorType::Guid,
		}
	}

	/// The value as text
	///
	/// Numbers, booleans and GUIDs are formatted, binary values have no text.
	pub fn as_text(&self) -> Option<Cow<'_, str>> {
		match self {
			Self::String(text) => Some(Cow::Borrowed(text)),
			Self::Binary(_) => None,
			Self::Bool(b) => Some(Cow::Borrowed(if *b { "1" } else { "0" })),
			Self::DWord(n) => Some(Cow::Owned(n.to_string())),
			Self::QWord(n) => Some(Cow::Owned(n.to_string())),
			Self::Word(n) => Some(Cow::Owned(n.to_string())),
			Self::Guid(guid) => Some(Cow::Owned(guid.to_string())),
		}
	}

	/// The number of bytes the value occupies in a container
	///
	/// This is not constant: strings in the content branding object are ASCII, and booleans
	/// are 4 bytes in the extended content description object but 2 bytes elsewhere.
	pub fn payload_len(&self, container: ContainerType) -> u64 {
		match self {
			Self::String(text) if container == ContainerType::ContentBranding => text.len() as u64,
			// UTF-16, null terminated
			Self::String(text) => (text.encode_utf16().count() as u64 + 1) * 2,
			Self::Binary(bytes) => bytes.len() as u64,
			Self::Bool(_) if container == ContainerType::ExtendedContent => 4,
			Self::Bool(_) | Self::Word(_) => 2,
			Self::DWord(_) => 4,
			Self::QWord(_) => 8,
			Self::Guid(_) => 16,
		}
	}

	pub(crate) fn write_payload(&self, container: ContainerType, out: &mut Vec<u8>) {
		match self {
			Self::String(text) if container == ContainerType::ContentBranding => {
				out.extend(text.as_bytes())
			},
			Self::String(text) => out.extend(utf16le_encode(text)),
			Self::Binary(bytes) => out.extend(bytes),
			Self::Bool(b) if container == ContainerType::ExtendedContent => {
				out.extend(u32::from(*b).to_le_bytes())
			},
			Self::Bool(b) => out.extend(u16::from(*b).to_le_bytes()),
			Self::DWord(n) => out.extend(n.to_le_bytes()),
			Self::QWord(n) => out.extend(n.to_le_bytes()),
			Self::Word(n) => out.extend(n.to_le_bytes()),
			Self::Guid(guid) => out.extend(guid.as_bytes()),
		}
	}

	pub(crate) fn read_payload(
		ty: DescriptorType,
		payload: &[u8],
		container: ContainerType,
	) -> Result<Self> {
		fn fixed<const N: usize>(payload: &[u8]) -> Result<[u8; N]> {
			match payload.get(..N) {
				Some(bytes) => {
					let mut array = [0; N];
					array.copy_from_slice(bytes);
					Ok(array)
				},
				None => Err(decode_err!(Asf, "Descriptor value is too short for its type")),
			}
		}

		let value = match ty {
			DescriptorType::String if container == ContainerType::ContentBranding => {
				Self::String(String::from_utf8_lossy(payload).into_owned())
			},
			DescriptorType::String => Self::String(utf16le_decode(payload)?),
			DescriptorType::Binary => Self::Binary(payload.to_vec()),
			DescriptorType::Bool => Self::Bool(payload.iter().any(|b| *b != 0)),
			DescriptorType::DWord => Self::DWord(u32::from_le_bytes(fixed(payload)?)),
			DescriptorType::QWord => Self::QWord(u64::from_le_bytes(fixed(payload)?)),
			DescriptorType::Word => Self::Word(u16::from_le_bytes(fixed(payload)?)),
			DescriptorType::Guid => Self::Guid(Guid::from_bytes(fixed(payload)?)),
		};

		Ok(value)
	}
}

impl Display for DescriptorValue {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self.as_text() {
			Some(text) => f.write_str(&text),
			None => write!(f, "<{} bytes>", self.payload_len(ContainerType::MetadataLibrary)),
		}
	}
}

/// A single ASF attribute
///
/// A descriptor is identified by its name, language index and stream number. Which of those
/// (and which values) are legal depends on the [`ContainerType`] it ends up in.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MetadataDescriptor {
	pub(crate) name: String,
	pub(crate) language_index: u16,
	pub(crate) stream_number: u16,
	pub(crate) value: DescriptorValue,
}

impl MetadataDescriptor {
	/// Create a new descriptor for the entire file (stream 0, language 0)
	pub fn new(name: impl Into<String>, value: DescriptorValue) -> Self {
		Self {
			name: name.into(),
			language_index: 0,
			stream_number: 0,
			value,
		}
	}

	/// Create a new string descriptor
	pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
		Self::new(name, DescriptorValue::String(value.into()))
	}

	/// Set the stream number
	pub fn with_stream_number(mut self, stream_number: u16) -> Self {
		self.stream_number = stream_number;
		self
	}

	/// Set the language list index
	pub fn with_language_index(mut self, language_index: u16) -> Self {
		self.language_index = language_index;
		self
	}

	/// The descriptor's name
	pub fn name(&self) -> &str {
		&self.name
	}

	/// The index into the language list object
	pub fn language_index(&self) -> u16 {
		self.language_index
	}

	/// The stream this descriptor applies to, 0 being the whole file
	pub fn stream_number(&self) -> u16 {
		self.stream_number
	}

	/// The descriptor's value
	pub fn value(&self) -> &DescriptorValue {
		&self.value
	}

	/// The [`DescriptorType`] of the value
	pub fn descriptor_type(&self) -> DescriptorType {
		self.value.descriptor_type()
	}

	/// Consume the descriptor, returning its value
	pub fn into_value(self) -> DescriptorValue {
		self.value
	}

	pub(crate) fn identity(&self) -> (&str, u16, u16) {
		(&self.name, self.language_index, self.stream_number)
	}

	/// The number of bytes this descriptor occupies in `container`
	pub fn encoded_size(&self, container: ContainerType) -> u64 {
		let name_len = (self.name.encode_utf16().count() as u64 + 1) * 2;
		let payload_len = self.value.payload_len(container);

		match container {
			// The banner type field is always present, whether or not it is set
			ContainerType::ContentBranding if self.name == BANNER_IMAGE_TYPE => 0,
			// The fixed fields are stored positionally, the lengths are part of the object
			ContainerType::ContentDescription | ContainerType::ContentBranding => payload_len,
			// Name length, value type, value length
			ContainerType::ExtendedContent => 6 + name_len + payload_len,
			// Language/reserved, stream number, name length, data type, data length
			ContainerType::Metadata | ContainerType::MetadataLibrary => 12 + name_len + payload_len,
		}
	}

	/// Encode the record for one of the attribute list objects
	pub(crate) fn write_record(&self, container: ContainerType, out: &mut Vec<u8>) -> Result<()> {
		let name = utf16le_encode(&self.name);
		let ty = self.descriptor_type() as u16;
		let payload_len = self.value.payload_len(container);

		match container {
			ContainerType::ExtendedContent => {
				out.extend((name.len() as u16).to_le_bytes());
				out.extend(name);
				out.extend(ty.to_le_bytes());
				out.extend((payload_len as u16).to_le_bytes());
			},
			ContainerType::Metadata | ContainerType::MetadataLibrary => {
				out.extend(self.language_index.to_le_bytes());
				out.extend(self.stream_number.to_le_bytes());
				out.extend((name.len() as u16).to_le_bytes());
				out.extend(ty.to_le_bytes());
				out.extend((payload_len as u32).to_le_bytes());
				out.extend(name);
			},
			ContainerType::ContentDescription | ContainerType::ContentBranding => {
				encode_err!(@BAIL Asf, "Fixed fields are not stored as records")
			},
		}

		self.value.write_payload(container, out);
		Ok(())
	}
}

impl TagField for MetadataDescriptor {
	fn key(&self) -> Cow<'_, str> {
		Cow::Borrowed(&self.name)
	}

	fn content(&self) -> Option<Cow<'_, str>> {
		self.value.as_text()
	}

	fn is_binary(&self) -> bool {
		matches!(self.value, DescriptorValue::Binary(_))
	}

	fn is_empty(&self) -> bool {
		match &self.value {
			DescriptorValue::String(text) => text.is_empty(),
			DescriptorValue::Binary(bytes) => bytes.is_empty(),
			_ => false,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::{DescriptorValue, MetadataDescriptor};
	use crate::asf::ContainerType;
	use crate::tag::TagField;

	#[test_log::test]
	fn bool_size_depends_on_container() {
		let descriptor = MetadataDescriptor::new("WM/IsCompilation", DescriptorValue::Bool(true));

		assert_eq!(descriptor.value().payload_len(ContainerType::ExtendedContent), 4);
		assert_eq!(descriptor.value().payload_len(ContainerType::Metadata), 2);

		// "WM/IsCompilation" + null, UTF-16
		let name_len = 17 * 2;
		assert_eq!(
			descriptor.encoded_size(ContainerType::ExtendedContent),
			6 + name_len + 4
		);
		assert_eq!(
			descriptor.encoded_size(ContainerType::MetadataLibrary),
			12 + name_len + 2
		);
	}

	#[test_log::test]
	fn records() {
		let descriptor = MetadataDescriptor::text("WM/Mood", "calm");

		let mut record = Vec::new();
		descriptor
			.write_record(ContainerType::ExtendedContent, &mut record)
			.unwrap();
		assert_eq!(
			record.len() as u64,
			descriptor.encoded_size(ContainerType::ExtendedContent)
		);

		assert!(
			descriptor
				.write_record(ContainerType::ContentDescription, &mut Vec::new())
				.is_err()
		);
	}

	#[test_log::test]
	fn field_view() {
		let number = MetadataDescriptor::new("WM/TrackNumber", DescriptorValue::DWord(5));
		assert_eq!(number.content().as_deref(), Some("5"));
		assert!(!number.is_binary());

		let binary = MetadataDescriptor::new("WM/Picture", DescriptorValue::Binary(Vec::new()));
		assert!(binary.content().is_none());
		assert!(TagField::is_empty(&binary));
	}
}
