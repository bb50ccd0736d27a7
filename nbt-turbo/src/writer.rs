use crate::tag::{Compound, Kind, List, Tag};

pub trait Output {
	fn push(&mut self, value: u8);
	fn extend_from_slice(&mut self, slice: &[u8]);
}

impl<T> Output for &mut T where T: Output {
	fn push(&mut self, value: u8) {
		T::push(self, value)
	}

	fn extend_from_slice(&mut self, slice: &[u8]) {
		T::extend_from_slice(self, slice);
	}
}

impl Output for Vec<u8> {
	fn push(&mut self, value: u8) {
		Vec::push(self, value)
	}

	fn extend_from_slice(&mut self, slice: &[u8]) {
		Vec::extend_from_slice(self, slice)
	}
}

pub struct CompoundWriter<T: Output> {
	out: T
}

impl<T: Output> CompoundWriter<T> {
	/// Begins a new compound tag.
	pub fn start(name: &str, out: T) -> Self {
		let mut writer = CompoundWriter { out };

		writer.header(Kind::Compound, name);
		writer
	}

	pub fn write<F>(name: &str, out: T, filler: F) -> T where F: FnOnce(&mut CompoundWriter<T>) {
		let mut writer = CompoundWriter::start(name, out);

		filler(&mut writer);

		writer.end()
	}

	/// Writes a complete root compound from an in-memory tree.
	pub fn write_compound(name: &str, out: T, compound: &Compound) -> T {
		CompoundWriter::write(name, out, |writer| {
			writer.entries(compound);
		})
	}

	/// Ends the compound tag, returning the buffer.
	pub fn end(mut self) -> T {
		self.out.push(Kind::End.id());
		self.out
	}

	fn header(&mut self, kind: Kind, name: &str) {
		self.out.push(kind.id());
		write_str(&mut self.out, name);
	}

	pub fn bool(&mut self, name: &str, value: bool) -> &mut Self {
		self.i8(name, value as i8)
	}

	pub fn i8(&mut self, name: &str, value: i8) -> &mut Self {
		self.header(Kind::I8, name);
		self.out.push(value as u8);

		self
	}

	pub fn i16(&mut self, name: &str, value: i16) -> &mut Self {
		self.header(Kind::I16, name);
		self.out.extend_from_slice(&value.to_be_bytes());

		self
	}

	pub fn i32(&mut self, name: &str, value: i32) -> &mut Self {
		self.header(Kind::I32, name);
		self.out.extend_from_slice(&value.to_be_bytes());

		self
	}

	pub fn i64(&mut self, name: &str, value: i64) -> &mut Self {
		self.header(Kind::I64, name);
		self.out.extend_from_slice(&value.to_be_bytes());

		self
	}

	pub fn string(&mut self, name: &str, value: &str) -> &mut Self {
		self.header(Kind::String, name);
		write_str(&mut self.out, value);

		self
	}

	pub fn u8_array(&mut self, name: &str, value: &[u8]) -> &mut Self {
		self.header(Kind::U8Array, name);
		write_u8_array(&mut self.out, value);

		self
	}

	pub fn compound<F>(&mut self, name: &str, filler: F) -> &mut Self where F: FnOnce(&mut CompoundWriter<&mut T>) {
		let mut writer = CompoundWriter::start(name, &mut self.out);

		filler(&mut writer);

		writer.end();

		self
	}

	/// Writes every tag of `compound` into the currently open compound.
	pub fn entries(&mut self, compound: &Compound) -> &mut Self {
		for (name, tag) in compound.iter() {
			self.tag(name, tag);
		}

		self
	}

	/// Writes an arbitrary named tag.
	pub fn tag(&mut self, name: &str, tag: &Tag) -> &mut Self {
		self.header(tag.kind(), name);
		write_payload(&mut self.out, tag);

		self
	}
}

fn write_str<T: Output>(out: &mut T, value: &str) {
	assert!(value.len() <= 65535, "Tag string too long: {} bytes", value.len());

	out.extend_from_slice(&u16::to_be_bytes(value.len() as u16));
	out.extend_from_slice(value.as_bytes());
}

fn write_length<T: Output>(out: &mut T, len: usize) {
	assert!(len <= std::i32::MAX as usize, "Array too long: {} (maximum length: {})", len, std::i32::MAX);

	out.extend_from_slice(&u32::to_be_bytes(len as u32));
}

fn write_u8_array<T: Output>(out: &mut T, value: &[u8]) {
	write_length(out, value.len());
	out.extend_from_slice(value);
}

fn write_list<T: Output>(out: &mut T, list: &List) {
	// An empty list may carry any element kind, Minecraft itself writes TAG_End.
	out.push(list.kind().id());
	write_length(out, list.len());

	for item in list.iter() {
		write_payload(out, item);
	}
}

fn write_payload<T: Output>(out: &mut T, tag: &Tag) {
	match tag {
		Tag::I8(value) => out.push(*value as u8),
		Tag::I16(value) => out.extend_from_slice(&value.to_be_bytes()),
		Tag::I32(value) => out.extend_from_slice(&value.to_be_bytes()),
		Tag::I64(value) => out.extend_from_slice(&value.to_be_bytes()),
		Tag::F32(value) => out.extend_from_slice(&value.to_bits().to_be_bytes()),
		Tag::F64(value) => out.extend_from_slice(&value.to_bits().to_be_bytes()),
		Tag::U8Array(value) => write_u8_array(out, value),
		Tag::String(value) => write_str(out, value),
		Tag::List(list) => write_list(out, list),
		Tag::Compound(compound) => {
			// Stays on the same sink type, a nested CompoundWriter<&mut T> would recurse forever
			// during monomorphization.
			for (name, tag) in compound.iter() {
				out.push(tag.kind().id());
				write_str(out, name);
				write_payload(out, tag);
			}

			out.push(Kind::End.id());
		},
		Tag::I32Array(value) => {
			write_length(out, value.len());

			for entry in value {
				out.extend_from_slice(&entry.to_be_bytes());
			}
		},
		Tag::I64Array(value) => {
			write_length(out, value.len());

			for entry in value {
				out.extend_from_slice(&entry.to_be_bytes());
			}
		}
	}
}
