use crate::error::{MalformedStructure, SchematicError};
use crate::grid::{Palette, VoxelGrid};
use crate::gzip::{self, GzipOutput};
use crate::spec::MAX_SPEC_LEN;
use log::{debug, warn};
use nbt_turbo::writer::{CompoundWriter, Output};
use nbt_turbo::{read_root, Compound, Tag};
use std::fs;
use std::path::Path;

pub const WIDTH: &str = "Width";
pub const HEIGHT: &str = "Height";
pub const LENGTH: &str = "Length";
pub const PALETTE: &str = "Palette";
pub const PALETTE_MAX: &str = "PaletteMax";
pub const BLOCK_DATA: &str = "BlockData";

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Compression {
	Gzip,
	None
}

/// A parsed structure file.
///
/// The grid owns the palette and block data. Every other tag of the root compound is kept
/// untouched, in its original position, and written back on save.
#[derive(Debug, Clone, PartialEq)]
pub struct Schematic {
	name: String,
	root: Compound,
	compression: Compression,
	grid: VoxelGrid
}

impl Schematic {
	pub fn parse(data: &[u8]) -> Result<Self, SchematicError> {
		let (compression, decompressed);

		let nbt = if gzip::is_gzip(data) {
			compression = Compression::Gzip;
			decompressed = gzip::decompress(data)?;
			&decompressed[..]
		} else {
			compression = Compression::None;
			data
		};

		let (name, mut root) = read_root(nbt).map_err(MalformedStructure::from)?;

		let width = dimension(&root, WIDTH)?;
		let height = dimension(&root, HEIGHT)?;
		let length = dimension(&root, LENGTH)?;

		let palette = match root.insert(PALETTE, Tag::Compound(Compound::new())) {
			Some(Tag::Compound(palette)) => read_palette(&palette)?,
			Some(other) => return Err(wrong_kind(PALETTE, "a compound", &other).into()),
			None => return Err(MalformedStructure::MissingTag(PALETTE).into())
		};

		let blocks = match root.insert(BLOCK_DATA, Tag::U8Array(Vec::new())) {
			Some(Tag::U8Array(blocks)) => blocks,
			Some(other) => return Err(wrong_kind(BLOCK_DATA, "a byte array", &other).into()),
			None => return Err(MalformedStructure::MissingTag(BLOCK_DATA).into())
		};

		if let Some(tag) = root.get(PALETTE_MAX) {
			match tag.as_i64() {
				Some(declared) if declared == palette.len() as i64 => (),
				Some(declared) => warn!("{} is {} but the palette has {} entries, correcting", PALETTE_MAX, declared, palette.len()),
				None => return Err(wrong_kind(PALETTE_MAX, "an integer", tag).into())
			}

			root.insert(PALETTE_MAX, Tag::I32(0));
		}

		let grid = VoxelGrid::new(width, height, length, palette, blocks)?;

		debug!("parsed {}x{}x{} structure with {} palette entries", width, height, length, grid.palette_max());

		Ok(Schematic { name, root, compression, grid })
	}

	pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SchematicError> {
		let data = fs::read(path)?;

		Schematic::parse(&data)
	}

	/// Encodes the structure with the compression it was read with.
	pub fn to_bytes(&self) -> Result<Vec<u8>, SchematicError> {
		if let Some((name, _)) = self.grid.palette().iter().find(|(name, _)| name.len() > MAX_SPEC_LEN) {
			return Err(SchematicError::NameTooLong(name.len()));
		}

		Ok(match self.compression {
			Compression::Gzip => self.write(GzipOutput::new()).finish()?,
			Compression::None => self.write(Vec::new())
		})
	}

	pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SchematicError> {
		fs::write(path, self.to_bytes()?)?;

		Ok(())
	}

	/// Writes the root compound, substituting the grid's current palette and block data.
	pub fn write<T: Output>(&self, out: T) -> T {
		let palette_max = self.grid.palette_max() as i32;

		CompoundWriter::write(&self.name, out, |writer| {
			for (name, tag) in self.root.iter() {
				match name {
					PALETTE => {
						writer.compound(PALETTE, |writer| {
							for (block, index) in self.grid.palette().iter() {
								writer.i32(block, index as i32);
							}
						});
					},
					BLOCK_DATA => {
						writer.u8_array(BLOCK_DATA, self.grid.blocks());
					},
					PALETTE_MAX => {
						writer.i32(PALETTE_MAX, palette_max);
					},
					_ => {
						writer.tag(name, tag);
					}
				}
			}

			if !self.root.contains(PALETTE_MAX) {
				writer.i32(PALETTE_MAX, palette_max);
			}
		})
	}

	/// Name of the root tag, usually `Schematic`.
	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn compression(&self) -> Compression {
		self.compression
	}

	pub fn set_compression(&mut self, compression: Compression) {
		self.compression = compression;
	}

	pub fn grid(&self) -> &VoxelGrid {
		&self.grid
	}

	pub fn grid_mut(&mut self) -> &mut VoxelGrid {
		&mut self.grid
	}

	pub fn into_grid(self) -> VoxelGrid {
		self.grid
	}

	/// Tags the grid does not manage, such as `Offset`, `Metadata` or `BlockEntities`.
	pub fn extra_tags(&self) -> impl Iterator<Item = (&str, &Tag)> {
		self.root.iter().filter(|(name, _)| ![PALETTE, PALETTE_MAX, BLOCK_DATA, WIDTH, HEIGHT, LENGTH].contains(name))
	}
}

fn wrong_kind(name: &str, expected: &'static str, found: &Tag) -> MalformedStructure {
	MalformedStructure::WrongKind { name: name.to_owned(), expected, found: found.kind() }
}

fn dimension(root: &Compound, name: &'static str) -> Result<u32, MalformedStructure> {
	let value = match root.get(name) {
		// Sponge schematics store dimensions as unsigned shorts
		Some(Tag::I16(value)) => *value as u16 as i64,
		Some(tag) => tag.as_i64().ok_or_else(|| wrong_kind(name, "an integer", tag))?,
		None => return Err(MalformedStructure::MissingTag(name))
	};

	if value <= 0 || value > u32::max_value() as i64 {
		return Err(MalformedStructure::BadDimension { name, value });
	}

	Ok(value as u32)
}

fn read_palette(compound: &Compound) -> Result<Palette, MalformedStructure> {
	let mut entries = Vec::with_capacity(compound.len());

	for (name, tag) in compound.iter() {
		let value = tag.as_i64().ok_or_else(|| wrong_kind(name, "an integer", tag))?;

		if value < 0 || value > 255 {
			return Err(MalformedStructure::IndexOutOfRange { name: name.to_owned(), value });
		}

		entries.push((name, value as u8));
	}

	Palette::from_entries(entries)
}

#[cfg(test)]
pub(crate) mod tests {
	use super::*;
	use crate::spec::BlockSpec;
	use nbt_turbo::{Kind, List};

	/// Builds an uncompressed structure file with some unmanaged tags around the grid.
	pub(crate) fn structure(width: i16, height: i16, length: i16, palette: &[(&str, i32)], blocks: &[u8]) -> Vec<u8> {
		CompoundWriter::write("Schematic", Vec::new(), |writer| {
			writer
				.i32("Version", 2)
				.i16(WIDTH, width)
				.i16(HEIGHT, height)
				.i16(LENGTH, length)
				.compound(PALETTE, |writer| {
					for &(name, index) in palette {
						writer.i32(name, index);
					}
				})
				.i32(PALETTE_MAX, palette.len() as i32)
				.u8_array(BLOCK_DATA, blocks)
				.tag("BlockEntities", &Tag::List(List::new(Kind::Compound)))
				.compound("Metadata", |writer| {
					writer.string("Author", "northernmockingbird");
				});
		})
	}

	fn gzipped(data: &[u8]) -> Vec<u8> {
		let mut output = GzipOutput::new();
		output.extend_from_slice(data);

		output.finish().unwrap()
	}

	#[test]
	fn parses_grid() {
		let data = structure(2, 1, 2, &[("minecraft:air", 0), ("minecraft:oak_log[axis=y]", 1)], &[0, 1, 1, 0]);
		let schematic = Schematic::parse(&data).unwrap();

		assert_eq!(schematic.name(), "Schematic");
		assert_eq!(schematic.compression(), Compression::None);
		assert_eq!(schematic.grid().dimensions(), (2, 1, 2));
		assert_eq!(schematic.grid().palette_max(), 2);
		assert_eq!(schematic.grid().get(1, 0, 0), Some("minecraft:oak_log[axis=y]"));
		assert_eq!(schematic.extra_tags().map(|(name, _)| name).collect::<Vec<_>>(), ["Version", "BlockEntities", "Metadata"]);
	}

	#[test]
	fn unmodified_round_trip_is_byte_identical() {
		let data = structure(3, 2, 1, &[("minecraft:stone", 0), ("minecraft:air", 1)], &[0, 1, 0, 1, 1, 1]);
		let schematic = Schematic::parse(&data).unwrap();

		assert_eq!(schematic.to_bytes().unwrap(), data);
	}

	#[test]
	fn gzip_round_trip_preserves_compression() {
		let data = gzipped(&structure(1, 2, 1, &[("minecraft:air", 0), ("minecraft:dirt", 1)], &[1, 0]));

		let first = Schematic::parse(&data).unwrap();
		assert_eq!(first.compression(), Compression::Gzip);

		let written = first.to_bytes().unwrap();
		assert!(gzip::is_gzip(&written));

		let second = Schematic::parse(&written).unwrap();
		assert_eq!(second, first);
	}

	#[test]
	fn large_dimensions_are_unsigned() {
		let blocks = vec![0u8; 40000];
		let data = structure(-25536, 1, 1, &[("minecraft:air", 0)], &blocks);

		assert_eq!(Schematic::parse(&data).unwrap().grid().width(), 40000);
	}

	#[test]
	fn rejects_length_mismatch() {
		let data = structure(2, 2, 2, &[("minecraft:air", 0)], &[0; 6]);

		match Schematic::parse(&data) {
			Err(SchematicError::Malformed(MalformedStructure::LengthMismatch { expected: 8, actual: 6, .. })) => (),
			other => panic!("unexpected result: {:?}", other)
		}
	}

	#[test]
	fn rejects_missing_dimension() {
		let data = CompoundWriter::write("Schematic", Vec::new(), |writer| {
			writer.i16(WIDTH, 1).i16(HEIGHT, 1);
		});

		match Schematic::parse(&data) {
			Err(SchematicError::Malformed(MalformedStructure::MissingTag(LENGTH))) => (),
			other => panic!("unexpected result: {:?}", other)
		}
	}

	#[test]
	fn rejects_palette_index_out_of_range() {
		let data = structure(1, 1, 1, &[("minecraft:air", 300)], &[0]);

		match Schematic::parse(&data) {
			Err(SchematicError::Malformed(MalformedStructure::IndexOutOfRange { value: 300, .. })) => (),
			other => panic!("unexpected result: {:?}", other)
		}
	}

	#[test]
	fn oversized_palette_name_fails_save() {
		let state = format!("ns:a[x={}]", "1".repeat(40000));
		let data = structure(1, 1, 1, &[(state.as_str(), 0)], &[0]);
		let mut schematic = Schematic::parse(&data).unwrap();

		let target = BlockSpec::parse(&format!("ns:{}", "b".repeat(30000))).unwrap();
		let outcome = crate::mapper::replace(schematic.grid_mut(), &BlockSpec::parse("ns:a").unwrap(), &target);
		assert!(outcome.is_change());

		match schematic.to_bytes() {
			Err(SchematicError::NameTooLong(len)) => assert!(len > MAX_SPEC_LEN),
			other => panic!("unexpected result: {:?}", other.map(|bytes| bytes.len()))
		}
	}

	#[test]
	fn corrects_palette_max() {
		let data = CompoundWriter::write("Schematic", Vec::new(), |writer| {
			writer
				.i32(WIDTH, 1)
				.i32(HEIGHT, 1)
				.i32(LENGTH, 1)
				.compound(PALETTE, |writer| {
					writer.i32("minecraft:air", 0);
				})
				.u8_array(BLOCK_DATA, &[0]);
		});

		let schematic = Schematic::parse(&data).unwrap();
		let reparsed = Schematic::parse(&schematic.to_bytes().unwrap()).unwrap();

		let (_, root) = read_root(&schematic.to_bytes().unwrap()).unwrap();
		assert_eq!(root.get(PALETTE_MAX), Some(&Tag::I32(1)));
		assert_eq!(reparsed.grid(), schematic.grid());
	}
}
