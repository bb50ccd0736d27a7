use std::fmt::{self, Display, Formatter};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Kind {
	End,
	I8,
	I16,
	I32,
	I64,
	F32,
	F64,
	U8Array,
	String,
	List,
	Compound,
	I32Array,
	I64Array
}

impl Kind {
	pub fn from_id(id: u8) -> Option<Self> {
		Some(match id {
			0 => Kind::End,
			1 => Kind::I8,
			2 => Kind::I16,
			3 => Kind::I32,
			4 => Kind::I64,
			5 => Kind::F32,
			6 => Kind::F64,
			7 => Kind::U8Array,
			8 => Kind::String,
			9 => Kind::List,
			10 => Kind::Compound,
			11 => Kind::I32Array,
			12 => Kind::I64Array,
			_ => return None
		})
	}

	pub fn id(self) -> u8 {
		self as u8
	}
}

impl Display for Kind {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		let name = match *self {
			Kind::End => "TAG_End",
			Kind::I8 => "TAG_Byte",
			Kind::I16 => "TAG_Short",
			Kind::I32 => "TAG_Int",
			Kind::I64 => "TAG_Long",
			Kind::F32 => "TAG_Float",
			Kind::F64 => "TAG_Double",
			Kind::U8Array => "TAG_Byte_Array",
			Kind::String => "TAG_String",
			Kind::List => "TAG_List",
			Kind::Compound => "TAG_Compound",
			Kind::I32Array => "TAG_Int_Array",
			Kind::I64Array => "TAG_Long_Array"
		};

		f.write_str(name)
	}
}

/// A single NBT value.
#[derive(Debug, Clone, PartialEq)]
pub enum Tag {
	I8(i8),
	I16(i16),
	I32(i32),
	I64(i64),
	F32(f32),
	F64(f64),
	U8Array(Vec<u8>),
	String(String),
	List(List),
	Compound(Compound),
	I32Array(Vec<i32>),
	I64Array(Vec<i64>)
}

impl Tag {
	pub fn kind(&self) -> Kind {
		match *self {
			Tag::I8(_) => Kind::I8,
			Tag::I16(_) => Kind::I16,
			Tag::I32(_) => Kind::I32,
			Tag::I64(_) => Kind::I64,
			Tag::F32(_) => Kind::F32,
			Tag::F64(_) => Kind::F64,
			Tag::U8Array(_) => Kind::U8Array,
			Tag::String(_) => Kind::String,
			Tag::List(_) => Kind::List,
			Tag::Compound(_) => Kind::Compound,
			Tag::I32Array(_) => Kind::I32Array,
			Tag::I64Array(_) => Kind::I64Array
		}
	}

	/// Widens any integral tag to an i64. Floating point and container tags return None.
	pub fn as_i64(&self) -> Option<i64> {
		match *self {
			Tag::I8(value) => Some(value as i64),
			Tag::I16(value) => Some(value as i64),
			Tag::I32(value) => Some(value as i64),
			Tag::I64(value) => Some(value),
			_ => None
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			Tag::String(value) => Some(value),
			_ => None
		}
	}

	pub fn as_u8_array(&self) -> Option<&[u8]> {
		match self {
			Tag::U8Array(value) => Some(value),
			_ => None
		}
	}

	pub fn as_compound(&self) -> Option<&Compound> {
		match self {
			Tag::Compound(value) => Some(value),
			_ => None
		}
	}
}

/// A homogenous list of tags. The element kind is stored separately so that empty lists
/// keep their declared kind across a read/write cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct List {
	kind: Kind,
	items: Vec<Tag>
}

impl List {
	pub fn new(kind: Kind) -> Self {
		List { kind, items: Vec::new() }
	}

	pub fn kind(&self) -> Kind {
		self.kind
	}

	/// Adds an element, handing it back if its kind differs from the kind of the list.
	pub fn push(&mut self, tag: Tag) -> Result<(), Tag> {
		if tag.kind() != self.kind {
			return Err(tag);
		}

		self.items.push(tag);
		Ok(())
	}

	pub fn len(&self) -> usize {
		self.items.len()
	}

	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}

	pub fn iter(&self) -> std::slice::Iter<Tag> {
		self.items.iter()
	}
}

/// Named tags in the order they were inserted.
///
/// Order matters to anyone diffing files, so lookups are linear instead of hashed. Compounds in
/// structure files hold a handful of entries, where a scan beats hashing anyway.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Compound {
	entries: Vec<(String, Tag)>
}

impl Compound {
	pub fn new() -> Self {
		Compound::default()
	}

	pub fn get(&self, name: &str) -> Option<&Tag> {
		self.entries.iter().find(|(key, _)| key == name).map(|(_, tag)| tag)
	}

	pub fn get_mut(&mut self, name: &str) -> Option<&mut Tag> {
		self.entries.iter_mut().find(|(key, _)| key == name).map(|(_, tag)| tag)
	}

	pub fn contains(&self, name: &str) -> bool {
		self.get(name).is_some()
	}

	/// Inserts a tag, replacing an existing tag of the same name in place.
	/// Returns the previous value if there was one.
	pub fn insert<S: Into<String>>(&mut self, name: S, tag: Tag) -> Option<Tag> {
		let name = name.into();

		match self.get_mut(&name) {
			Some(existing) => Some(std::mem::replace(existing, tag)),
			None => {
				self.entries.push((name, tag));
				None
			}
		}
	}

	pub fn remove(&mut self, name: &str) -> Option<Tag> {
		let position = self.entries.iter().position(|(key, _)| key == name)?;

		Some(self.entries.remove(position).1)
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &Tag)> {
		self.entries.iter().map(|(key, tag)| (key.as_str(), tag))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn insert_replaces_in_place() {
		let mut compound = Compound::new();
		compound.insert("Width", Tag::I16(3));
		compound.insert("Height", Tag::I16(4));

		assert_eq!(compound.insert("Width", Tag::I16(5)), Some(Tag::I16(3)));

		let names: Vec<&str> = compound.iter().map(|(name, _)| name).collect();
		assert_eq!(names, ["Width", "Height"]);
		assert_eq!(compound.get("Width").and_then(Tag::as_i64), Some(5));
	}

	#[test]
	fn list_rejects_mismatched_kind() {
		let mut list = List::new(Kind::I32);

		assert!(list.push(Tag::I32(1)).is_ok());
		assert_eq!(list.push(Tag::I8(1)), Err(Tag::I8(1)));
		assert_eq!(list.len(), 1);
	}

	#[test]
	fn kind_ids_round_trip() {
		for id in 0..13 {
			assert_eq!(Kind::from_id(id).map(Kind::id), Some(id));
		}

		assert_eq!(Kind::from_id(13), None);
	}
}
