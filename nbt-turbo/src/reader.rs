use crate::tag::{Compound, Kind, List, Tag};
use thiserror::Error;

/// Compounds and lists nested deeper than this are rejected instead of overflowing the stack.
pub const MAX_DEPTH: usize = 512;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ReadError {
	#[error("unexpected end of data at byte {0}")]
	UnexpectedEof(usize),
	#[error("unknown tag kind {kind} at byte {offset}")]
	UnknownKind { kind: u8, offset: usize },
	#[error("negative length {len} at byte {offset}")]
	NegativeLength { len: i32, offset: usize },
	#[error("string at byte {0} is not valid UTF-8")]
	InvalidString(usize),
	#[error("root tag must be a compound, found {0}")]
	RootNotCompound(Kind),
	#[error("tags nested deeper than {} levels", MAX_DEPTH)]
	TooDeep,
	#[error("list of {expected} holds a {found}")]
	MixedList { expected: Kind, found: Kind }
}

/// Reads an uncompressed root compound, returning its name and contents.
/// Trailing bytes after the root compound are ignored.
pub fn read_root(data: &[u8]) -> Result<(String, Compound), ReadError> {
	let mut reader = Reader { data, position: 0 };

	let kind = reader.kind()?;
	if kind != Kind::Compound {
		return Err(ReadError::RootNotCompound(kind));
	}

	let name = reader.string()?;
	let root = reader.compound(0)?;

	Ok((name, root))
}

struct Reader<'d> {
	data: &'d [u8],
	position: usize
}

impl<'d> Reader<'d> {
	fn take(&mut self, len: usize) -> Result<&'d [u8], ReadError> {
		let end = self.position.checked_add(len).filter(|&end| end <= self.data.len())
			.ok_or(ReadError::UnexpectedEof(self.data.len()))?;

		let slice = &self.data[self.position..end];
		self.position = end;

		Ok(slice)
	}

	fn array<const N: usize>(&mut self) -> Result<[u8; N], ReadError> {
		let mut bytes = [0; N];
		bytes.copy_from_slice(self.take(N)?);

		Ok(bytes)
	}

	fn u8(&mut self) -> Result<u8, ReadError> {
		Ok(self.take(1)?[0])
	}

	fn i16(&mut self) -> Result<i16, ReadError> {
		Ok(i16::from_be_bytes(self.array()?))
	}

	fn i32(&mut self) -> Result<i32, ReadError> {
		Ok(i32::from_be_bytes(self.array()?))
	}

	fn i64(&mut self) -> Result<i64, ReadError> {
		Ok(i64::from_be_bytes(self.array()?))
	}

	fn kind(&mut self) -> Result<Kind, ReadError> {
		let offset = self.position;
		let id = self.u8()?;

		Kind::from_id(id).ok_or(ReadError::UnknownKind { kind: id, offset })
	}

	fn length(&mut self) -> Result<usize, ReadError> {
		let offset = self.position;
		let len = self.i32()?;

		if len < 0 {
			return Err(ReadError::NegativeLength { len, offset });
		}

		Ok(len as usize)
	}

	fn string(&mut self) -> Result<String, ReadError> {
		let len = u16::from_be_bytes(self.array()?) as usize;
		let offset = self.position;
		let bytes = self.take(len)?;

		String::from_utf8(bytes.to_vec()).map_err(|_| ReadError::InvalidString(offset))
	}

	fn compound(&mut self, depth: usize) -> Result<Compound, ReadError> {
		if depth >= MAX_DEPTH {
			return Err(ReadError::TooDeep);
		}

		let mut compound = Compound::new();

		loop {
			let kind = self.kind()?;
			if kind == Kind::End {
				return Ok(compound);
			}

			let name = self.string()?;
			let tag = self.payload(kind, depth + 1)?;

			compound.insert(name, tag);
		}
	}

	fn payload(&mut self, kind: Kind, depth: usize) -> Result<Tag, ReadError> {
		Ok(match kind {
			// Only valid as a list element kind, and empty lists never read a payload.
			Kind::End => return Err(ReadError::UnknownKind { kind: 0, offset: self.position }),
			Kind::I8 => Tag::I8(self.u8()? as i8),
			Kind::I16 => Tag::I16(self.i16()?),
			Kind::I32 => Tag::I32(self.i32()?),
			Kind::I64 => Tag::I64(self.i64()?),
			Kind::F32 => Tag::F32(f32::from_bits(self.i32()? as u32)),
			Kind::F64 => Tag::F64(f64::from_bits(self.i64()? as u64)),
			Kind::U8Array => {
				let len = self.length()?;

				Tag::U8Array(self.take(len)?.to_vec())
			},
			Kind::String => Tag::String(self.string()?),
			Kind::List => Tag::List(self.list(depth)?),
			Kind::Compound => Tag::Compound(self.compound(depth)?),
			Kind::I32Array => {
				let len = self.length()?;
				let bytes = self.take(len.checked_mul(4).ok_or(ReadError::UnexpectedEof(self.data.len()))?)?;

				Tag::I32Array(bytes.chunks_exact(4).map(|c| i32::from_be_bytes([c[0], c[1], c[2], c[3]])).collect())
			},
			Kind::I64Array => {
				let len = self.length()?;
				let bytes = self.take(len.checked_mul(8).ok_or(ReadError::UnexpectedEof(self.data.len()))?)?;

				Tag::I64Array(bytes.chunks_exact(8).map(|c| {
					let mut word = [0u8; 8];
					word.copy_from_slice(c);

					i64::from_be_bytes(word)
				}).collect())
			}
		})
	}

	fn list(&mut self, depth: usize) -> Result<List, ReadError> {
		if depth >= MAX_DEPTH {
			return Err(ReadError::TooDeep);
		}

		let kind = self.kind()?;
		let len = self.length()?;

		let mut list = List::new(kind);

		for _ in 0..len {
			let tag = self.payload(kind, depth + 1)?;

			if let Err(tag) = list.push(tag) {
				return Err(ReadError::MixedList { expected: kind, found: tag.kind() });
			}
		}

		Ok(list)
	}
}
