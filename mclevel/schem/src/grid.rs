use crate::error::MalformedStructure;

/// Mapping between block state strings and the byte stored for each voxel.
///
/// Entries keep the order they were read in, so an unmodified structure writes back in the
/// same order. Lookups are linear: a one byte index caps the palette at 256 entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Palette {
	entries: Vec<(String, u8)>
}

impl Palette {
	pub fn new() -> Self {
		Palette::default()
	}

	/// Builds a palette from (block, index) pairs, rejecting indices used twice.
	/// Later duplicates of a block name replace earlier ones, like a compound tag would.
	pub fn from_entries<I, S>(entries: I) -> Result<Self, MalformedStructure> where I: IntoIterator<Item = (S, u8)>, S: Into<String> {
		let mut palette = Palette::new();

		for (name, index) in entries {
			let name = name.into();

			if let Some(first) = palette.name_of(index) {
				if first != name {
					return Err(MalformedStructure::DuplicateIndex { index, first: first.to_owned(), second: name });
				}
			}

			match palette.entries.iter_mut().find(|(key, _)| *key == name) {
				Some(entry) => entry.1 = index,
				None => palette.entries.push((name, index))
			}
		}

		Ok(palette)
	}

	pub fn get(&self, name: &str) -> Option<u8> {
		self.entries.iter().find(|(key, _)| key == name).map(|&(_, index)| index)
	}

	pub fn name_of(&self, index: u8) -> Option<&str> {
		self.entries.iter().find(|&&(_, value)| value == index).map(|(key, _)| key.as_str())
	}

	pub fn contains(&self, name: &str) -> bool {
		self.get(name).is_some()
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, u8)> {
		self.entries.iter().map(|(key, index)| (key.as_str(), *index))
	}

	/// Lookup table from voxel byte to block name.
	pub fn by_index(&self) -> Vec<Option<&str>> {
		let mut table = vec![None; 256];

		for (name, index) in self.iter() {
			table[index as usize] = Some(name);
		}

		table
	}

	/// Re-keys an entry in place, keeping its index and position. The new key must not exist yet.
	pub(crate) fn rename(&mut self, old: &str, new: String) -> bool {
		debug_assert!(!self.contains(&new), "renaming {} onto existing entry {}", old, new);

		match self.entries.iter_mut().find(|(key, _)| key == old) {
			Some(entry) => {
				entry.0 = new;
				true
			},
			None => false
		}
	}

	pub(crate) fn remove(&mut self, name: &str) -> Option<u8> {
		let position = self.entries.iter().position(|(key, _)| key == name)?;

		Some(self.entries.remove(position).1)
	}
}

/// One structure's block grid: dimensions, palette, and one palette byte per voxel.
///
/// Voxels are stored Y-major, then Z, then X, matching the on-disk `BlockData` layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoxelGrid {
	width: u32,
	height: u32,
	length: u32,
	palette: Palette,
	blocks: Box<[u8]>
}

impl VoxelGrid {
	/// Validates and assembles a grid. Every voxel byte must name a palette entry.
	pub fn new(width: u32, height: u32, length: u32, palette: Palette, blocks: Vec<u8>) -> Result<Self, MalformedStructure> {
		for &(name, value) in &[("Width", width), ("Height", height), ("Length", length)] {
			if value == 0 {
				return Err(MalformedStructure::BadDimension { name, value: 0 });
			}
		}

		let expected = width as u64 * height as u64 * length as u64;

		if expected != blocks.len() as u64 {
			return Err(MalformedStructure::LengthMismatch { width, height, length, expected, actual: blocks.len() });
		}

		let mut mapped = [false; 256];
		for (_, index) in palette.iter() {
			mapped[index as usize] = true;
		}

		if let Some((offset, &index)) = blocks.iter().enumerate().find(|&(_, &index)| !mapped[index as usize]) {
			return Err(MalformedStructure::UnmappedIndex { offset, index });
		}

		Ok(VoxelGrid { width, height, length, palette, blocks: blocks.into_boxed_slice() })
	}

	pub fn width(&self) -> u32 {
		self.width
	}

	pub fn height(&self) -> u32 {
		self.height
	}

	pub fn length(&self) -> u32 {
		self.length
	}

	/// (width, height, length)
	pub fn dimensions(&self) -> (u32, u32, u32) {
		(self.width, self.height, self.length)
	}

	pub fn palette(&self) -> &Palette {
		&self.palette
	}

	/// Always the number of palette entries.
	pub fn palette_max(&self) -> usize {
		self.palette.len()
	}

	pub fn blocks(&self) -> &[u8] {
		&self.blocks
	}

	/// Linear offset of a voxel in the block buffer.
	///
	/// # Panics
	/// If any coordinate is outside of the grid.
	pub fn index(&self, x: u32, y: u32, z: u32) -> usize {
		assert!(x < self.width, "x out of bounds: {} >= {}", x, self.width);
		assert!(y < self.height, "y out of bounds: {} >= {}", y, self.height);
		assert!(z < self.length, "z out of bounds: {} >= {}", z, self.length);

		(y as usize * self.length as usize + z as usize) * self.width as usize + x as usize
	}

	/// Block state string of a voxel.
	pub fn get(&self, x: u32, y: u32, z: u32) -> Option<&str> {
		self.palette.name_of(self.blocks[self.index(x, y, z)])
	}

	/// Number of voxels using each palette entry, in palette order. Unused entries report zero.
	pub fn block_counts(&self) -> Vec<(&str, usize)> {
		let mut counts = [0usize; 256];
		for &index in self.blocks.iter() {
			counts[index as usize] += 1;
		}

		self.palette.iter().map(|(name, index)| (name, counts[index as usize])).collect()
	}

	pub(crate) fn palette_mut(&mut self) -> &mut Palette {
		&mut self.palette
	}

	/// Points every voxel using `from` at `to`, returning how many voxels changed.
	pub(crate) fn remap(&mut self, from: u8, to: u8) -> usize {
		let mut changed = 0;

		for index in self.blocks.iter_mut() {
			if *index == from {
				*index = to;
				changed += 1;
			}
		}

		changed
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn palette(entries: &[(&str, u8)]) -> Palette {
		Palette::from_entries(entries.iter().cloned()).unwrap()
	}

	#[test]
	fn offsets_are_y_z_x() {
		let grid = VoxelGrid::new(2, 3, 4, palette(&[("minecraft:air", 0)]), vec![0; 24]).unwrap();

		assert_eq!(grid.index(0, 0, 0), 0);
		assert_eq!(grid.index(1, 0, 0), 1);
		assert_eq!(grid.index(0, 0, 1), 2);
		assert_eq!(grid.index(0, 1, 0), 8);
		assert_eq!(grid.index(1, 2, 3), 2 * 4 * 2 + 3 * 2 + 1);
	}

	#[test]
	fn get_resolves_palette() {
		let grid = VoxelGrid::new(2, 1, 1, palette(&[("minecraft:air", 0), ("minecraft:stone", 1)]), vec![1, 0]).unwrap();

		assert_eq!(grid.get(0, 0, 0), Some("minecraft:stone"));
		assert_eq!(grid.get(1, 0, 0), Some("minecraft:air"));
		assert_eq!(grid.block_counts(), [("minecraft:air", 1), ("minecraft:stone", 1)]);
	}

	#[test]
	fn rejects_length_mismatch() {
		let result = VoxelGrid::new(2, 2, 2, palette(&[("minecraft:air", 0)]), vec![0; 7]);

		assert!(matches!(result, Err(MalformedStructure::LengthMismatch { expected: 8, actual: 7, .. })));
	}

	#[test]
	fn rejects_zero_dimension() {
		let result = VoxelGrid::new(2, 0, 2, palette(&[("minecraft:air", 0)]), vec![]);

		assert_eq!(result, Err(MalformedStructure::BadDimension { name: "Height", value: 0 }));
	}

	#[test]
	fn rejects_unmapped_index() {
		let result = VoxelGrid::new(3, 1, 1, palette(&[("minecraft:air", 0)]), vec![0, 0, 4]);

		assert_eq!(result, Err(MalformedStructure::UnmappedIndex { offset: 2, index: 4 }));
	}

	#[test]
	fn rejects_shared_index() {
		let result = Palette::from_entries(vec![("minecraft:air", 0), ("minecraft:stone", 0)]);

		assert!(matches!(result, Err(MalformedStructure::DuplicateIndex { index: 0, .. })));
	}
}
